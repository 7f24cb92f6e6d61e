//! Built-in exporters
//!
//! Exporters mostly push to remote endpoints, so an unknown exporter never
//! yields a port. The exceptions are registered here.

use otelop_common::{ConfigValue, ServicePortSpec};

use crate::component::{component_type, ComponentKind};
use crate::descriptor::ParserDescriptor;
use crate::error::PortError;
use crate::parser::ComponentParser;
use crate::rbac::{loadbalancing_policy, DynamicRolePolicy};
use crate::registry::{ComponentRegistry, Fallback};

/// Default port of the Prometheus exporter's scrape endpoint
pub const PROMETHEUS_EXPORTER_PORT: u16 = 8889;

/// The exporter registry with every built-in type
pub fn builtin() -> ComponentRegistry {
    ComponentRegistry::new(ComponentKind::Exporter, Fallback::NoPorts)
        .with("prometheus", ParserDescriptor::single(PROMETHEUS_EXPORTER_PORT))
        .with_custom("loadbalancing", loadbalancing)
}

/// Exporter that resolves its backends from a Service's endpoints
struct LoadBalancingParser<'a> {
    name: &'a str,
    config: &'a ConfigValue,
}

fn loadbalancing<'a>(name: &'a str, config: &'a ConfigValue) -> Box<dyn ComponentParser + 'a> {
    Box::new(LoadBalancingParser { name, config })
}

impl ComponentParser for LoadBalancingParser<'_> {
    fn ports(&self) -> Result<Vec<ServicePortSpec>, PortError> {
        Ok(Vec::new())
    }

    fn rbac_policies(&self) -> Vec<DynamicRolePolicy> {
        loadbalancing_policy(self.config).into_iter().collect()
    }

    fn parser_name(&self) -> String {
        format!("__{}", component_type(self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::yaml::parse_config;

    #[test]
    fn test_prometheus_exporter_port() {
        let registry = builtin();

        let config = ConfigValue::Null;
        let ports = registry.parser("prometheus", &config).ports().unwrap();
        assert_eq!(ports, vec![ServicePortSpec::new("prometheus", 8889)]);

        let config = parse_config("endpoint: 0.0.0.0:9999").unwrap();
        let ports = registry.parser("prometheus/app", &config).ports().unwrap();
        assert_eq!(ports, vec![ServicePortSpec::new("prometheus-app", 9999)]);
    }

    #[test]
    fn test_push_exporters_have_no_ports() {
        let registry = builtin();
        let config = parse_config("endpoint: tempo.observability:4317").unwrap();
        assert!(registry.parser("otlp", &config).ports().unwrap().is_empty());
    }

    #[test]
    fn test_loadbalancing_policy() {
        let registry = builtin();
        let config = parse_config(
            r#"
protocol:
  otlp:
    timeout: 1s
resolver:
  k8s:
    service: sampling.observability
"#,
        )
        .unwrap();
        let parser = registry.parser("loadbalancing", &config);
        assert!(parser.ports().unwrap().is_empty());

        let policies = parser.rbac_policies();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].namespaces, vec!["observability"]);
    }

    #[test]
    fn test_loadbalancing_without_resolver_needs_nothing() {
        let registry = builtin();
        let config = parse_config("resolver: {dns: {hostname: otelcol.example}}").unwrap();
        assert!(registry.parser("loadbalancing", &config).rbac_policies().is_empty());
    }
}
