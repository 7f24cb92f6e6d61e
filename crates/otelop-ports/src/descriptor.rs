//! Declarative per-type parser descriptors
//!
//! A descriptor says everything the data-driven parser needs to know about a
//! component type: whether it is a scraper, which field holds its listen
//! address, and its default port or protocol table.

use otelop_common::PortProtocol;

use crate::endpoint::EndpointField;

/// Key under which multi-protocol components list their protocols
pub const PROTOCOLS_KEY: &str = "protocols";

/// Default settings of one sub-protocol of a multi-protocol component
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolDescriptor {
    /// Protocol key (e.g., "grpc", "thrift_compact")
    pub name: &'static str,
    /// Default port, 0 when the protocol has no default
    pub default_port: u16,
    /// Transport protocol
    pub protocol: PortProtocol,
    /// Application protocol hint
    pub app_protocol: Option<&'static str>,
    /// Target port emitted alongside the default port
    pub target_port: Option<u16>,
}

impl ProtocolDescriptor {
    /// A TCP protocol with the given default port
    pub const fn tcp(name: &'static str, default_port: u16) -> Self {
        Self {
            name,
            default_port,
            protocol: PortProtocol::Tcp,
            app_protocol: None,
            target_port: None,
        }
    }

    /// A UDP protocol with the given default port
    pub const fn udp(name: &'static str, default_port: u16) -> Self {
        Self {
            name,
            default_port,
            protocol: PortProtocol::Udp,
            app_protocol: None,
            target_port: None,
        }
    }

    /// Set the application protocol hint
    pub fn app_protocol(mut self, app_protocol: &'static str) -> Self {
        self.app_protocol = Some(app_protocol);
        self
    }

    /// Emit the default port as target port as well
    pub fn with_target_port(mut self) -> Self {
        self.target_port = Some(self.default_port);
        self
    }
}

/// Port layout of a component type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortLayout {
    /// Pull-only: never yields a port, whatever the configuration says
    Scraper,
    /// One listen address
    Single {
        /// Default port, `None` when the component has no well-known port
        default_port: Option<u16>,
        /// Transport protocol
        protocol: PortProtocol,
        /// Application protocol hint
        app_protocol: Option<&'static str>,
    },
    /// Independently togglable sub-protocols
    Multi {
        /// Key holding the protocol sections, `None` when they sit at the top level
        protocols_key: Option<&'static str>,
        /// Known protocols, in output order
        protocols: Vec<ProtocolDescriptor>,
    },
}

/// Everything the data-driven parser needs to know about one component type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserDescriptor {
    /// Field holding the listen address
    pub endpoint_field: EndpointField,
    /// Port layout
    pub layout: PortLayout,
}

impl ParserDescriptor {
    /// A pull-only component
    pub fn scraper() -> Self {
        Self {
            endpoint_field: EndpointField::Endpoint,
            layout: PortLayout::Scraper,
        }
    }

    /// A single-port TCP component with a well-known port
    pub fn single(default_port: u16) -> Self {
        Self {
            endpoint_field: EndpointField::Endpoint,
            layout: PortLayout::Single {
                default_port: Some(default_port),
                protocol: PortProtocol::Tcp,
                app_protocol: None,
            },
        }
    }

    /// A single-port TCP component that only listens where configured
    pub fn single_without_default() -> Self {
        Self {
            endpoint_field: EndpointField::Endpoint,
            layout: PortLayout::Single {
                default_port: None,
                protocol: PortProtocol::Tcp,
                app_protocol: None,
            },
        }
    }

    /// A multi-protocol component with protocols under `protocols:`
    pub fn multi(protocols: Vec<ProtocolDescriptor>) -> Self {
        Self {
            endpoint_field: EndpointField::Endpoint,
            layout: PortLayout::Multi {
                protocols_key: Some(PROTOCOLS_KEY),
                protocols,
            },
        }
    }

    /// Read the listen address from a different field
    pub fn with_endpoint_field(mut self, field: EndpointField) -> Self {
        self.endpoint_field = field;
        self
    }

    /// Set the transport protocol of a single-port component
    pub fn with_protocol(mut self, transport: PortProtocol) -> Self {
        if let PortLayout::Single { protocol, .. } = &mut self.layout {
            *protocol = transport;
        }
        self
    }

    /// Set the application protocol hint of a single-port component
    pub fn with_app_protocol(mut self, hint: &'static str) -> Self {
        if let PortLayout::Single { app_protocol, .. } = &mut self.layout {
            *app_protocol = Some(hint);
        }
        self
    }

    /// Look for protocol sections at the top level instead of under `protocols:`
    pub fn with_top_level_protocols(mut self) -> Self {
        if let PortLayout::Multi { protocols_key, .. } = &mut self.layout {
            *protocols_key = None;
        }
        self
    }

    /// True for pull-only components
    pub fn is_scraper(&self) -> bool {
        matches!(self.layout, PortLayout::Scraper)
    }
}
