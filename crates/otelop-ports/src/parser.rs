//! Component parsers
//!
//! A parser is built fresh for one component entry, asked for its ports (and
//! any access it needs), then dropped. [`DescriptorParser`] covers every
//! table-driven component; custom parsers implement [`ComponentParser`]
//! directly.

use otelop_common::naming::{port_name, PortNameLimit};
use otelop_common::value::ValueKind;
use otelop_common::{ConfigValue, Lookup, PortProtocol, ServicePortSpec};
use tracing::{debug, warn};

use crate::component::component_type;
use crate::descriptor::{ParserDescriptor, PortLayout, ProtocolDescriptor};
use crate::endpoint::extract_port;
use crate::error::PortError;
use crate::rbac::DynamicRolePolicy;

/// Behaviour shared by every component parser
pub trait ComponentParser {
    /// Ports the component listens on
    fn ports(&self) -> Result<Vec<ServicePortSpec>, PortError>;

    /// Access the component needs to the Kubernetes API
    fn rbac_policies(&self) -> Vec<DynamicRolePolicy> {
        Vec::new()
    }

    /// Name used in logs, e.g. `__otlp` for an `otlp/2` receiver
    fn parser_name(&self) -> String;
}

/// Build a port for a component, naming it after `candidate`
fn named_port(
    candidate: &str,
    port: u16,
    protocol: PortProtocol,
    app_protocol: Option<&str>,
) -> ServicePortSpec {
    let mut spec =
        ServicePortSpec::new(port_name(candidate, port, PortNameLimit::Service), port)
            .with_protocol(protocol);
    spec.app_protocol = app_protocol.map(str::to_string);
    spec
}

// =============================================================================
// Data-driven parser
// =============================================================================

/// Parser driven by a [`ParserDescriptor`]
pub struct DescriptorParser<'a> {
    name: &'a str,
    config: &'a ConfigValue,
    descriptor: &'a ParserDescriptor,
}

impl<'a> DescriptorParser<'a> {
    /// Create a parser for the component `name` configured with `config`
    pub fn new(name: &'a str, config: &'a ConfigValue, descriptor: &'a ParserDescriptor) -> Self {
        Self {
            name,
            config,
            descriptor,
        }
    }

    fn single_port(
        &self,
        default_port: Option<u16>,
        protocol: PortProtocol,
        app_protocol: Option<&str>,
    ) -> Result<Vec<ServicePortSpec>, PortError> {
        let port = match extract_port(self.config, self.descriptor.endpoint_field) {
            Ok(Some(port)) => port,
            Ok(None) => match default_port {
                Some(port) => port,
                None => {
                    debug!(component = %self.name, "no endpoint configured and no default port");
                    return Ok(Vec::new());
                }
            },
            Err(err) => match default_port {
                Some(port) => {
                    debug!(component = %self.name, error = %err, port, "falling back to default port");
                    port
                }
                None => return Err(err),
            },
        };

        Ok(vec![named_port(self.name, port, protocol, app_protocol)])
    }

    fn protocol_port(&self, table: &ProtocolDescriptor, body: &ConfigValue) -> Option<ServicePortSpec> {
        let candidate = format!("{}-{}", self.name, table.name);

        let (port, target_port) = match extract_port(body, self.descriptor.endpoint_field) {
            Ok(Some(port)) => (port, None),
            Ok(None) if table.default_port == 0 => {
                debug!(component = %self.name, protocol = table.name, "protocol has no endpoint and no default port");
                return None;
            }
            Ok(None) => (table.default_port, table.target_port),
            Err(err) => {
                warn!(component = %self.name, protocol = table.name, error = %err, "skipping protocol");
                return None;
            }
        };

        let mut spec = named_port(&candidate, port, table.protocol, table.app_protocol);
        spec.target_port = target_port;
        Some(spec)
    }

    fn multi_port(
        &self,
        protocols_key: Option<&str>,
        table: &[ProtocolDescriptor],
    ) -> Result<Vec<ServicePortSpec>, PortError> {
        let sections = match protocols_key {
            Some(key) => match self.config.mapping_field(key) {
                Lookup::Found(sections) => sections,
                Lookup::Missing => return Ok(Vec::new()),
                Lookup::WrongType { found, .. } => {
                    // `protocols:` with an empty body
                    if found != ValueKind::Null {
                        warn!(component = %self.name, %found, "protocols is not a mapping");
                    }
                    return Ok(Vec::new());
                }
            },
            None => match self.config.as_mapping() {
                Some(sections) => sections,
                None => return Ok(Vec::new()),
            },
        };

        // Only an explicit `protocols:` section is a closed set; top-level
        // sections share the map with unrelated settings.
        if protocols_key.is_some() {
            if let Some(unknown) = sections
                .keys()
                .find(|key| !table.iter().any(|p| p.name == key.as_str()))
            {
                return Err(PortError::unknown_protocol(self.name, unknown));
            }
        }

        Ok(table
            .iter()
            .filter_map(|proto| {
                let body = sections.get(proto.name)?;
                self.protocol_port(proto, body)
            })
            .collect())
    }
}

impl ComponentParser for DescriptorParser<'_> {
    fn ports(&self) -> Result<Vec<ServicePortSpec>, PortError> {
        match &self.descriptor.layout {
            PortLayout::Scraper => Ok(Vec::new()),
            PortLayout::Single {
                default_port,
                protocol,
                app_protocol,
            } => self.single_port(*default_port, *protocol, *app_protocol),
            PortLayout::Multi {
                protocols_key,
                protocols,
            } => self.multi_port(*protocols_key, protocols),
        }
    }

    fn parser_name(&self) -> String {
        format!("__{}", component_type(self.name))
    }
}

// =============================================================================
// No ports
// =============================================================================

/// Parser for components that never listen
pub struct NoPortsParser<'a> {
    name: &'a str,
}

impl<'a> NoPortsParser<'a> {
    /// Create a parser for the component `name`
    pub fn new(name: &'a str) -> Self {
        Self { name }
    }
}

impl ComponentParser for NoPortsParser<'_> {
    fn ports(&self) -> Result<Vec<ServicePortSpec>, PortError> {
        Ok(Vec::new())
    }

    fn parser_name(&self) -> String {
        format!("__{}", component_type(self.name))
    }
}
