//! Services exposing the collector

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_common::crd::{CollectorMode, IngressType, OpenTelemetryCollector};
use otelop_common::{naming, ServicePortSpec};
use otelop_ports::merge_ports;
use tracing::debug;

use crate::labels::{labels, selector_labels};

/// Label marking the headless Service
pub const HEADLESS_LABEL: &str = "operator.opentelemetry.io/collector-headless-service";

/// Value of [`HEADLESS_LABEL`]
pub const HEADLESS_EXISTS: &str = "Exists";

/// Annotation asking OpenShift for a serving certificate
pub const SERVING_CERT_ANNOTATION: &str = "service.beta.openshift.io/serving-cert-secret-name";

/// Name of the monitoring Service's only port
pub const MONITORING_PORT_NAME: &str = "monitoring";

/// Inferred ports with `grpc` app protocols rewritten for OpenShift's router
///
/// The router configures HTTP/2 from the app protocol, so gRPC ports need
/// `h2c` when Routes expose the collector.
pub fn route_app_protocols(collector: &OpenTelemetryCollector, inferred: &[ServicePortSpec]) -> Vec<ServicePortSpec> {
    let routed = collector.spec.ingress.type_ == Some(IngressType::Route);
    inferred
        .iter()
        .cloned()
        .map(|mut port| {
            if routed
                && port
                    .app_protocol
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case("grpc"))
            {
                port.app_protocol = Some("h2c".to_string());
            }
            port
        })
        .collect()
}

/// The primary Service, `None` when there is nothing to expose
///
/// `inferred` are the ports inferred from the configuration; the declared
/// ports of the CR are merged in front of them.
pub fn service(collector: &OpenTelemetryCollector, inferred: &[ServicePortSpec]) -> Option<Service> {
    let ports = merge_ports(
        &collector.spec.ports,
        route_app_protocols(collector, inferred),
    );
    if ports.is_empty() {
        debug!(
            collector = collector.collector_name(),
            namespace = collector.collector_namespace(),
            "configuration yields no ports, skipping service"
        );
        return None;
    }

    let name = naming::service(collector.collector_name());
    let traffic_policy = match collector.spec.mode {
        CollectorMode::DaemonSet => "Local",
        _ => "Cluster",
    };

    Some(Service {
        metadata: ObjectMeta {
            labels: Some(labels(collector, &name)),
            name: Some(name),
            namespace: Some(collector.collector_namespace().to_string()),
            annotations: collector.metadata.annotations.clone(),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            internal_traffic_policy: Some(traffic_policy.to_string()),
            selector: Some(selector_labels(collector)),
            ports: Some(ports.iter().map(ServicePortSpec::to_service_port).collect()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// The headless variant of [`service`], for per-pod DNS
pub fn headless_service(collector: &OpenTelemetryCollector, inferred: &[ServicePortSpec]) -> Option<Service> {
    let mut svc = service(collector, inferred)?;
    let name = naming::headless_service(collector.collector_name());

    let mut annotations = BTreeMap::from([(
        SERVING_CERT_ANNOTATION.to_string(),
        format!("{name}-tls"),
    )]);
    annotations.extend(svc.metadata.annotations.take().unwrap_or_default());

    svc.metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(HEADLESS_LABEL.to_string(), HEADLESS_EXISTS.to_string());
    svc.metadata.annotations = Some(annotations);
    svc.metadata.name = Some(name);
    if let Some(spec) = svc.spec.as_mut() {
        spec.cluster_ip = Some("None".to_string());
    }
    Some(svc)
}

/// Service exposing the collector's own metrics endpoint
pub fn monitoring_service(collector: &OpenTelemetryCollector, metrics_port: u16) -> Service {
    let name = naming::monitoring_service(collector.collector_name());
    Service {
        metadata: ObjectMeta {
            labels: Some(labels(collector, &name)),
            name: Some(name),
            namespace: Some(collector.collector_namespace().to_string()),
            annotations: collector.metadata.annotations.clone(),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(selector_labels(collector)),
            ports: Some(vec![ServicePort {
                name: Some(MONITORING_PORT_NAME.to_string()),
                port: i32::from(metrics_port),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
