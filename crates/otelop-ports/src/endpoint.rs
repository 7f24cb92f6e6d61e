//! Endpoint extraction
//!
//! Components announce where they listen through a `host:port` string. Most
//! use an `endpoint` field; the tcp/udp log family and syslog use
//! `listen_address`.

use otelop_common::{ConfigValue, Lookup};
use tracing::debug;

use crate::error::PortError;

/// Field a component keeps its listen address in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndpointField {
    /// `endpoint`
    #[default]
    Endpoint,
    /// `listen_address`
    ListenAddress,
}

impl EndpointField {
    /// Configuration key of the field
    pub fn key(self) -> &'static str {
        match self {
            EndpointField::Endpoint => "endpoint",
            EndpointField::ListenAddress => "listen_address",
        }
    }
}

/// Parse the port out of a `host:port` string
///
/// The port is whatever follows the last `:`, so IPv6 hosts (`[::1]:4317`)
/// and templated hosts (`${env:POD_IP}:4317`) work. A missing colon, a
/// suffix that isn't plain decimal digits or port 0 is `PortNotFound`.
pub fn port_from_endpoint(endpoint: &str) -> Result<u16, PortError> {
    let (_, suffix) = endpoint
        .rsplit_once(':')
        .ok_or_else(|| PortError::port_not_found(endpoint))?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortError::port_not_found(endpoint));
    }

    match suffix.parse::<u16>() {
        Ok(0) | Err(_) => Err(PortError::port_not_found(endpoint)),
        Ok(port) => Ok(port),
    }
}

/// Extract the listen port of a component's sub-configuration
///
/// Returns `Ok(None)` when the field is absent or not a string (the latter
/// is logged), and `PortNotFound` when a string is present but carries no
/// usable port.
pub fn extract_port(config: &ConfigValue, field: EndpointField) -> Result<Option<u16>, PortError> {
    match config.str_field(field.key()) {
        Lookup::Found(endpoint) => port_from_endpoint(endpoint).map(Some),
        Lookup::Missing => Ok(None),
        Lookup::WrongType { expected, found } => {
            debug!(
                field = field.key(),
                %expected,
                %found,
                "endpoint field has the wrong type, treating as absent"
            );
            Ok(None)
        }
    }
}
