//! Service port specification shared by the inference core and the manifest builders

use std::fmt;

use k8s_openapi::api::core::v1::{ContainerPort, ServicePort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Transport protocol of a port
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PortProtocol {
    /// TCP (the Kubernetes default)
    #[default]
    #[serde(rename = "TCP")]
    Tcp,
    /// UDP
    #[serde(rename = "UDP")]
    Udp,
}

impl PortProtocol {
    /// Kubernetes spelling of the protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            PortProtocol::Tcp => "TCP",
            PortProtocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, numbered, protocol-typed port to expose
///
/// Used both for ports declared on the collector CR and for ports inferred
/// from the collector configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortSpec {
    /// Port name (DNS label)
    pub name: String,
    /// Port number
    pub port: u16,
    /// Container port the traffic is forwarded to (defaults to `port`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    /// Transport protocol
    #[serde(default)]
    pub protocol: PortProtocol,
    /// Application protocol hint (e.g., "grpc", "http")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_protocol: Option<String>,
}

impl ServicePortSpec {
    /// Create a TCP port with no target port or app protocol
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            target_port: None,
            protocol: PortProtocol::Tcp,
            app_protocol: None,
        }
    }

    /// Set the transport protocol
    pub fn with_protocol(mut self, protocol: PortProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the target port
    pub fn with_target_port(mut self, target_port: u16) -> Self {
        self.target_port = Some(target_port);
        self
    }

    /// Set the application protocol hint
    pub fn with_app_protocol(mut self, app_protocol: impl Into<String>) -> Self {
        self.app_protocol = Some(app_protocol.into());
        self
    }

    /// Convert into a Kubernetes Service port
    pub fn to_service_port(&self) -> ServicePort {
        ServicePort {
            name: Some(self.name.clone()),
            port: i32::from(self.port),
            target_port: self.target_port.map(|p| IntOrString::Int(i32::from(p))),
            protocol: Some(self.protocol.as_str().to_string()),
            app_protocol: self.app_protocol.clone(),
            ..Default::default()
        }
    }

    /// Convert into a container port, under the given (already sanitized) name
    pub fn to_container_port(&self, name: impl Into<String>) -> ContainerPort {
        ContainerPort {
            name: Some(name.into()),
            container_port: i32::from(self.target_port.unwrap_or(self.port)),
            protocol: Some(self.protocol.as_str().to_string()),
            ..Default::default()
        }
    }
}
