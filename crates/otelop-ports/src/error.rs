//! Errors raised while inferring ports from a single component

use thiserror::Error;

/// Why a component could not be resolved to ports
///
/// These never abort inference for a whole document: the caller logs them
/// and moves on to the next component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// An endpoint string has no parseable, non-zero trailing port
    #[error("no port found in endpoint '{endpoint}'")]
    PortNotFound {
        /// The endpoint string as configured
        endpoint: String,
    },

    /// A multi-protocol component enables a protocol it doesn't know
    #[error("unknown protocol '{protocol}' for component '{component}'")]
    UnknownProtocol {
        /// Component key (e.g., "otlp/2")
        component: String,
        /// Protocol key found under `protocols`
        protocol: String,
    },
}

impl PortError {
    /// Create a PortNotFound error
    pub fn port_not_found(endpoint: impl Into<String>) -> Self {
        Self::PortNotFound {
            endpoint: endpoint.into(),
        }
    }

    /// Create an UnknownProtocol error
    pub fn unknown_protocol(component: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self::UnknownProtocol {
            component: component.into(),
            protocol: protocol.into(),
        }
    }
}

impl From<PortError> for otelop_common::Error {
    fn from(err: PortError) -> Self {
        let section = match &err {
            PortError::PortNotFound { .. } => "endpoint",
            PortError::UnknownProtocol { .. } => "protocols",
        };
        otelop_common::Error::config(section, err.to_string())
    }
}
