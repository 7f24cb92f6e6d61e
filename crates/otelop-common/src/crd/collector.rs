//! OpenTelemetryCollector CRD
//!
//! The collector resource carries the raw pipeline configuration as a string
//! plus the few Kubernetes-facing knobs the operator needs to expose it:
//! explicitly declared ports and the ingress flavour.

use std::collections::{BTreeMap, HashSet};

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::naming::{is_valid_port_name, PortNameLimit};
use crate::port::ServicePortSpec;
use crate::{Error, Result};

// =============================================================================
// CRD
// =============================================================================

/// Spec for an OpenTelemetryCollector
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "opentelemetry.io",
    version = "v1alpha1",
    kind = "OpenTelemetryCollector",
    plural = "opentelemetrycollectors",
    shortname = "otelcol",
    namespaced,
    status = "OpenTelemetryCollectorStatus",
    printcolumn = r#"{"name":"Mode","type":"string","jsonPath":".spec.mode"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".status.version"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryCollectorSpec {
    /// How the collector is deployed
    #[serde(default)]
    pub mode: CollectorMode,

    /// Raw collector configuration (YAML)
    pub config: String,

    /// Ports exposed in addition to the ones inferred from `config`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePortSpec>,

    /// How the collector is exposed outside the cluster
    #[serde(default)]
    pub ingress: IngressConfig,

    /// Collector container image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// ServiceAccount the collector runs as (generated when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

/// Deployment mode of the collector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollectorMode {
    /// Deployment
    #[default]
    Deployment,
    /// DaemonSet (one collector per node)
    DaemonSet,
    /// StatefulSet
    StatefulSet,
    /// Injected as a sidecar container
    Sidecar,
}

/// External exposure settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressConfig {
    /// Which kind of object exposes the collector, if any
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<IngressType>,

    /// Host the ingress rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Annotations copied onto the Ingress/Route objects
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// IngressClass to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,

    /// OpenShift Route settings
    #[serde(default)]
    pub route: RouteConfig,
}

/// Kind of object used to expose the collector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IngressType {
    /// networking.k8s.io Ingress
    Ingress,
    /// OpenShift Route
    Route,
}

/// OpenShift Route settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// TLS termination of the generated routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TlsRouteTermination>,
}

/// TLS termination type of an OpenShift Route
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TlsRouteTermination {
    /// Plain HTTP
    Insecure,
    /// TLS terminated at the router
    #[default]
    Edge,
    /// TLS passed through to the collector
    Passthrough,
    /// TLS terminated at the router and re-encrypted
    Reencrypt,
}

/// Observed state of an OpenTelemetryCollector
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryCollectorStatus {
    /// Collector version last reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Human-readable reconciliation message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

impl OpenTelemetryCollector {
    /// Name of the collector (empty if unset)
    pub fn collector_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Namespace of the collector (`default` if unset)
    pub fn collector_namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or("default")
    }
}

impl OpenTelemetryCollectorSpec {
    /// Validate the explicitly declared ports
    pub fn validate(&self, collector: &str) -> Result<()> {
        validate_declared_ports(collector, &self.ports)
    }
}

/// Validate a list of explicitly declared ports
///
/// Declared ports are emitted verbatim, so they must already be valid
/// Service ports: non-zero, DNS-label names, no repeated name or number.
pub fn validate_declared_ports(collector: &str, ports: &[ServicePortSpec]) -> Result<()> {
    let mut names = HashSet::new();
    let mut numbers = HashSet::new();

    for (i, port) in ports.iter().enumerate() {
        let field = |suffix: &str| format!("spec.ports[{i}].{suffix}");

        if port.port == 0 {
            return Err(Error::validation_for_field(
                collector,
                field("port"),
                "port number must be between 1 and 65535",
            ));
        }
        if !is_valid_port_name(&port.name, PortNameLimit::Service) {
            return Err(Error::validation_for_field(
                collector,
                field("name"),
                format!("port name '{}' is not a valid DNS label", port.name),
            ));
        }
        if !names.insert(port.name.as_str()) {
            return Err(Error::validation_for_field(
                collector,
                field("name"),
                format!("duplicate port name '{}'", port.name),
            ));
        }
        if !numbers.insert(port.port) {
            return Err(Error::validation_for_field(
                collector,
                field("port"),
                format!("duplicate port number {}", port.port),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_ports(ports: Vec<ServicePortSpec>) -> OpenTelemetryCollectorSpec {
        OpenTelemetryCollectorSpec {
            mode: CollectorMode::Deployment,
            config: String::new(),
            ports,
            ingress: IngressConfig::default(),
            image: None,
            service_account: None,
        }
    }

    #[test]
    fn test_deserialize_minimal_cr() {
        let yaml = r#"
apiVersion: opentelemetry.io/v1alpha1
kind: OpenTelemetryCollector
metadata:
  name: simplest
  namespace: observability
spec:
  config: |
    receivers:
      otlp:
        protocols:
          grpc:
  ports:
    - name: web
      port: 8080
  ingress:
    type: route
    route:
      termination: passthrough
"#;
        let collector: OpenTelemetryCollector = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(collector.collector_name(), "simplest");
        assert_eq!(collector.collector_namespace(), "observability");
        assert_eq!(collector.spec.mode, CollectorMode::Deployment);
        assert_eq!(collector.spec.ports, vec![ServicePortSpec::new("web", 8080)]);
        assert_eq!(collector.spec.ingress.type_, Some(IngressType::Route));
        assert_eq!(
            collector.spec.ingress.route.termination,
            Some(TlsRouteTermination::Passthrough)
        );
    }

    #[test]
    fn test_mode_spelling() {
        let mode: CollectorMode = serde_json::from_value(serde_json::json!("daemonset")).unwrap();
        assert_eq!(mode, CollectorMode::DaemonSet);
    }

    #[test]
    fn test_validate_accepts_distinct_ports() {
        let spec = spec_with_ports(vec![
            ServicePortSpec::new("web", 8080),
            ServicePortSpec::new("metrics", 9090),
        ]);
        assert!(spec.validate("simplest").is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let spec = spec_with_ports(vec![
            ServicePortSpec::new("web", 8080),
            ServicePortSpec::new("web", 8081),
        ]);
        let err = spec.validate("simplest").unwrap_err();
        assert!(err.to_string().contains("duplicate port name"));
    }

    #[test]
    fn test_validate_rejects_duplicate_numbers() {
        let spec = spec_with_ports(vec![
            ServicePortSpec::new("web", 8080),
            ServicePortSpec::new("admin", 8080),
        ]);
        match spec.validate("simplest").unwrap_err() {
            Error::Validation { field, .. } => assert_eq!(field.as_deref(), Some("spec.ports[1].port")),
            other => panic!("Expected Validation variant, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_names_and_zero() {
        let spec = spec_with_ports(vec![ServicePortSpec::new("-web", 8080)]);
        assert!(spec.validate("simplest").is_err());

        let spec = spec_with_ports(vec![ServicePortSpec::new("web", 0)]);
        assert!(spec.validate("simplest").is_err());
    }

    #[test]
    fn test_namespace_defaults() {
        let collector = OpenTelemetryCollector::new("simplest", spec_with_ports(vec![]));
        assert_eq!(collector.collector_namespace(), "default");
    }
}
