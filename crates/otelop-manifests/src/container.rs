//! Collector container ports and probes

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ContainerPort, HTTPGetAction, Probe};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use otelop_common::crd::OpenTelemetryCollector;
use otelop_common::naming::{port_name, PortNameLimit};
use otelop_common::ServicePortSpec;
use otelop_ports::ProbeTarget;
use tracing::debug;

/// Name of the container port serving the collector's own metrics
pub const METRICS_PORT_NAME: &str = "metrics";

/// Ports of the collector container, sorted by name
///
/// Inferred ports are renamed to fit the 15-character IANA limit of
/// container port names. The metrics port and the CR's declared ports are
/// added after them and win on name clashes.
pub fn container_ports(
    collector: &OpenTelemetryCollector,
    inferred: &[ServicePortSpec],
    metrics_port: u16,
) -> Vec<ContainerPort> {
    let mut ports: BTreeMap<String, ContainerPort> = BTreeMap::new();

    for port in inferred {
        let name = port_name(&port.name, port.port, PortNameLimit::Ingress);
        if name != port.name {
            debug!(from = %port.name, to = %name, "renaming container port");
        }
        ports.insert(name.clone(), port.to_container_port(name));
    }

    ports.insert(
        METRICS_PORT_NAME.to_string(),
        ServicePortSpec::new(METRICS_PORT_NAME, metrics_port).to_container_port(METRICS_PORT_NAME),
    );

    for port in &collector.spec.ports {
        ports.insert(port.name.clone(), port.to_container_port(port.name.clone()));
    }

    ports.into_values().collect()
}

/// Liveness probe hitting the health_check extension
pub fn liveness_probe(target: Option<&ProbeTarget>) -> Option<Probe> {
    let target = target?;
    Some(Probe {
        http_get: Some(HTTPGetAction {
            path: Some(target.path.clone()),
            port: IntOrString::Int(i32::from(target.port)),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::crd::OpenTelemetryCollectorSpec;
    use otelop_common::PortProtocol;

    fn collector(declared: Vec<ServicePortSpec>) -> OpenTelemetryCollector {
        OpenTelemetryCollector::new(
            "simplest",
            OpenTelemetryCollectorSpec {
                mode: Default::default(),
                config: String::new(),
                ports: declared,
                ingress: Default::default(),
                image: None,
                service_account: None,
            },
        )
    }

    fn summary(ports: &[ContainerPort]) -> Vec<(String, i32)> {
        ports
            .iter()
            .map(|p| (p.name.clone().unwrap_or_default(), p.container_port))
            .collect()
    }

    #[test]
    fn test_container_ports_sorted_with_metrics() {
        let ports = container_ports(
            &collector(vec![]),
            &[
                ServicePortSpec::new("otlp-http", 4318),
                ServicePortSpec::new("otlp-grpc", 4317),
            ],
            8888,
        );
        assert_eq!(
            summary(&ports),
            vec![
                ("metrics".to_string(), 8888),
                ("otlp-grpc".to_string(), 4317),
                ("otlp-http".to_string(), 4318),
            ]
        );
    }

    #[test]
    fn test_long_names_and_protocols() {
        let ports = container_ports(
            &collector(vec![]),
            &[ServicePortSpec::new("jaeger-thrift-compact", 6831).with_protocol(PortProtocol::Udp)],
            8888,
        );
        let compact = ports.iter().find(|p| p.container_port == 6831).unwrap();
        assert_eq!(compact.name.as_deref(), Some("port-6831"));
        assert_eq!(compact.protocol.as_deref(), Some("UDP"));
    }

    #[test]
    fn test_declared_ports_override_by_name() {
        let ports = container_ports(
            &collector(vec![ServicePortSpec::new("metrics", 9999)]),
            &[],
            8888,
        );
        assert_eq!(summary(&ports), vec![("metrics".to_string(), 9999)]);
    }

    #[test]
    fn test_liveness_probe() {
        assert!(liveness_probe(None).is_none());

        let target = ProbeTarget {
            path: "/healthz".to_string(),
            port: 13133,
        };
        let probe = liveness_probe(Some(&target)).unwrap();
        let get = probe.http_get.unwrap();
        assert_eq!(get.path.as_deref(), Some("/healthz"));
        assert_eq!(get.port, IntOrString::Int(13133));
    }
}
