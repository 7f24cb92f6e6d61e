//! Ingress exposing the collector's receivers

use std::collections::HashSet;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_common::crd::{CollectorMode, IngressType, OpenTelemetryCollector};
use otelop_common::naming::{self, fallback_port_name, port_name, PortNameLimit};
use otelop_common::ServicePortSpec;
use otelop_ports::merge_ports;
use tracing::{debug, warn};

use crate::labels::ingress_labels;

/// Name of a port as seen by Ingress paths and Route target ports
pub fn ingress_port_name(port: &ServicePortSpec) -> String {
    port_name(&port.name, port.port, PortNameLimit::Ingress)
}

/// A Service port reachable from outside the cluster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposedPort {
    /// Name used for Ingress paths and Route names/hosts (15-character limit)
    pub name: String,
    /// Service port receiving the traffic
    pub service_port: ServicePortSpec,
}

impl ExposedPort {
    /// True if [`name`](Self::name) is also the Service port's name
    ///
    /// Otherwise the Service port can only be referenced by number.
    pub fn shares_service_name(&self) -> bool {
        self.name == self.service_port.name
    }
}

/// Ports reachable from outside: declared ports plus inferred receiver ports
///
/// Every exposed port gets a distinct 15-character name. A re-derived name
/// that is already taken falls back to `port-<number>`; the port is dropped
/// if that is taken too.
pub fn exposed_ports(collector: &OpenTelemetryCollector, receiver_ports: &[ServicePortSpec]) -> Vec<ExposedPort> {
    let mut used_names = HashSet::new();

    merge_ports(&collector.spec.ports, receiver_ports.iter().cloned())
        .into_iter()
        .filter_map(|service_port| {
            let mut name = ingress_port_name(&service_port);
            if used_names.contains(&name) {
                let fallback = fallback_port_name(service_port.port);
                if used_names.contains(&fallback) {
                    warn!(
                        collector = collector.collector_name(),
                        name = %service_port.name,
                        port = service_port.port,
                        "exposed port name already in use, not exposing port"
                    );
                    return None;
                }
                name = fallback;
            }
            used_names.insert(name.clone());
            Some(ExposedPort { name, service_port })
        })
        .collect()
}

/// True if the collector should be exposed through `kind`
pub(crate) fn exposed_through(collector: &OpenTelemetryCollector, kind: IngressType) -> bool {
    if collector.spec.ingress.type_ != Some(kind) {
        return false;
    }
    if collector.spec.mode == CollectorMode::Sidecar {
        debug!(collector = collector.collector_name(), "ingress is not supported in sidecar mode");
        return false;
    }
    true
}

fn backend_port(port: &ExposedPort) -> ServiceBackendPort {
    if port.shares_service_name() {
        ServiceBackendPort {
            name: Some(port.name.clone()),
            number: None,
        }
    } else {
        ServiceBackendPort {
            name: None,
            number: Some(i32::from(port.service_port.port)),
        }
    }
}

/// The Ingress, one `Prefix` path per exposed port
///
/// Only rendered for `ingress.type: ingress`. Paths use the 15-character
/// port name; the backend refers to the Service port by name when that name
/// is the Service port's own, by number otherwise.
pub fn ingress(collector: &OpenTelemetryCollector, receiver_ports: &[ServicePortSpec]) -> Option<Ingress> {
    if !exposed_through(collector, IngressType::Ingress) {
        return None;
    }

    let ports = exposed_ports(collector, receiver_ports);
    if ports.is_empty() {
        debug!(collector = collector.collector_name(), "configuration yields no ports, skipping ingress");
        return None;
    }

    let service_name = naming::service(collector.collector_name());
    let paths = ports
        .iter()
        .map(|port| HTTPIngressPath {
            path: Some(format!("/{}", port.name)),
            path_type: "Prefix".to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service_name.clone(),
                    port: Some(backend_port(port)),
                }),
                ..Default::default()
            },
        })
        .collect();

    let name = naming::ingress(collector.collector_name());
    let settings = &collector.spec.ingress;

    Some(Ingress {
        metadata: ObjectMeta {
            labels: Some(ingress_labels(collector, &name)),
            name: Some(name),
            namespace: Some(collector.collector_namespace().to_string()),
            annotations: (!settings.annotations.is_empty()).then(|| settings.annotations.clone()),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: settings.ingress_class_name.clone(),
            rules: Some(vec![IngressRule {
                host: settings.hostname.clone(),
                http: Some(HTTPIngressRuleValue { paths }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::crd::{IngressConfig, OpenTelemetryCollectorSpec};

    fn collector(type_: Option<IngressType>) -> OpenTelemetryCollector {
        let mut collector = OpenTelemetryCollector::new(
            "simplest",
            OpenTelemetryCollectorSpec {
                mode: CollectorMode::Deployment,
                config: String::new(),
                ports: vec![],
                ingress: IngressConfig {
                    type_,
                    hostname: Some("collector.example.com".to_string()),
                    ingress_class_name: Some("nginx".to_string()),
                    ..Default::default()
                },
                image: None,
                service_account: None,
            },
        );
        collector.metadata.namespace = Some("observability".to_string());
        collector
    }

    fn paths(ingress: &Ingress) -> Vec<HTTPIngressPath> {
        ingress.spec.as_ref().unwrap().rules.as_ref().unwrap()[0]
            .http
            .as_ref()
            .unwrap()
            .paths
            .clone()
    }

    #[test]
    fn test_only_for_ingress_type() {
        let ports = [ServicePortSpec::new("otlp-grpc", 4317)];
        assert!(ingress(&collector(None), &ports).is_none());
        assert!(ingress(&collector(Some(IngressType::Route)), &ports).is_none());
        assert!(ingress(&collector(Some(IngressType::Ingress)), &ports).is_some());
    }

    #[test]
    fn test_no_ports_no_ingress() {
        assert!(ingress(&collector(Some(IngressType::Ingress)), &[]).is_none());
    }

    #[test]
    fn test_sidecars_are_not_exposed() {
        let mut c = collector(Some(IngressType::Ingress));
        c.spec.mode = CollectorMode::Sidecar;
        assert!(ingress(&c, &[ServicePortSpec::new("otlp-grpc", 4317)]).is_none());
    }

    #[test]
    fn test_paths_and_backends() {
        let c = collector(Some(IngressType::Ingress));
        let ingress = ingress(
            &c,
            &[
                ServicePortSpec::new("otlp-grpc", 4317),
                ServicePortSpec::new("jaeger-thrift-compact", 6831),
            ],
        )
        .unwrap();

        assert_eq!(ingress.metadata.name.as_deref(), Some("simplest-ingress"));
        let spec = ingress.spec.as_ref().unwrap();
        assert_eq!(spec.ingress_class_name.as_deref(), Some("nginx"));
        assert_eq!(
            spec.rules.as_ref().unwrap()[0].host.as_deref(),
            Some("collector.example.com")
        );

        let paths = paths(&ingress);
        assert_eq!(paths[0].path.as_deref(), Some("/otlp-grpc"));
        assert_eq!(paths[0].path_type, "Prefix");
        let backend = paths[0].backend.service.as_ref().unwrap();
        assert_eq!(backend.name, "simplest-collector");
        assert_eq!(
            backend.port.as_ref().unwrap().name.as_deref(),
            Some("otlp-grpc")
        );

        // too long for an IANA service name: path falls back, backend by number
        assert_eq!(paths[1].path.as_deref(), Some("/port-6831"));
        let backend = paths[1].backend.service.as_ref().unwrap();
        assert_eq!(backend.port.as_ref().unwrap().number, Some(6831));
        assert_eq!(backend.port.as_ref().unwrap().name, None);
    }

    #[test]
    fn test_fallback_names_stay_unique() {
        let mut c = collector(Some(IngressType::Ingress));
        c.spec.ports = vec![ServicePortSpec::new("port-6831", 9000)];
        let ingress = ingress(
            &c,
            &[
                ServicePortSpec::new("jaeger-thrift-compact", 6831),
                ServicePortSpec::new("jaeger-thrift-binary", 6832),
            ],
        )
        .unwrap();

        let got: Vec<_> = paths(&ingress).into_iter().filter_map(|p| p.path).collect();
        assert_eq!(got, vec!["/port-6831", "/port-6832"]);
    }

    #[test]
    fn test_renamed_clash_is_referenced_by_number() {
        let mut c = collector(Some(IngressType::Ingress));
        c.spec.ports = vec![ServicePortSpec::new("otlp-grpc-internal", 5317)];
        let exposed = exposed_ports(&c, &[ServicePortSpec::new("port-5317", 4317)]);

        assert_eq!(exposed[0].name, "port-5317");
        assert!(!exposed[0].shares_service_name());
        assert_eq!(exposed[1].name, "port-4317");
        assert!(!exposed[1].shares_service_name());
        assert_eq!(backend_port(&exposed[1]).number, Some(4317));
    }

    #[test]
    fn test_declared_ports_are_exposed_first() {
        let mut c = collector(Some(IngressType::Ingress));
        c.spec.ports = vec![ServicePortSpec::new("web", 8080)];
        let ingress = ingress(&c, &[ServicePortSpec::new("otlp-grpc", 4317)]).unwrap();
        let got: Vec<_> = paths(&ingress).into_iter().filter_map(|p| p.path).collect();
        assert_eq!(got, vec!["/web", "/otlp-grpc"]);
    }
}
