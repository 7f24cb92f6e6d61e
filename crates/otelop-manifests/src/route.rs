//! OpenShift Routes exposing the collector's receivers
//!
//! `k8s-openapi` has no OpenShift types, so the Route is modelled here with
//! just the fields the operator sets.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use otelop_common::crd::{IngressType, OpenTelemetryCollector, TlsRouteTermination};
use otelop_common::kube_utils::HasApiResource;
use otelop_common::naming;
use otelop_common::ServicePortSpec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingress::{exposed_ports, exposed_through, ExposedPort};
use crate::labels::ingress_labels;

// =============================================================================
// Route types
// =============================================================================

/// OpenShift Route (route.openshift.io/v1)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// API version
    #[serde(default = "Route::default_api_version")]
    pub api_version: String,
    /// Resource kind
    #[serde(default = "Route::default_kind")]
    pub kind: String,
    /// Resource metadata
    pub metadata: ObjectMeta,
    /// Route specification
    pub spec: RouteSpec,
}

impl HasApiResource for Route {
    const API_VERSION: &'static str = "route.openshift.io/v1";
    const KIND: &'static str = "Route";
}

impl Route {
    fn default_api_version() -> String {
        <Self as HasApiResource>::API_VERSION.to_string()
    }

    fn default_kind() -> String {
        <Self as HasApiResource>::KIND.to_string()
    }

    /// Create a new Route
    pub fn new(metadata: ObjectMeta, spec: RouteSpec) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata,
            spec,
        }
    }
}

/// Route specification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// Host the route answers on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix
    pub path: String,
    /// Service receiving the traffic
    pub to: RouteTargetReference,
    /// Service port receiving the traffic
    pub port: RoutePort,
    /// Wildcard policy (always `None`)
    pub wildcard_policy: String,
    /// TLS settings, absent for insecure routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
}

/// Route backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    /// Kind of the backend (`Service`)
    pub kind: String,
    /// Name of the backend
    pub name: String,
}

/// Route backend port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    /// Service port name or number
    pub target_port: IntOrString,
}

/// Route TLS settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// Termination type (`edge`, `passthrough`, `reencrypt`)
    pub termination: String,
}

// =============================================================================
// Compilation
// =============================================================================

fn tls_config(termination: TlsRouteTermination) -> Option<TlsConfig> {
    let termination = match termination {
        TlsRouteTermination::Insecure => return None,
        TlsRouteTermination::Edge => "edge",
        TlsRouteTermination::Passthrough => "passthrough",
        TlsRouteTermination::Reencrypt => "reencrypt",
    };
    Some(TlsConfig {
        termination: termination.to_string(),
    })
}

/// One Route per exposed port, for `ingress.type: route`
pub fn routes(collector: &OpenTelemetryCollector, receiver_ports: &[ServicePortSpec]) -> Vec<Route> {
    if !exposed_through(collector, IngressType::Route) {
        return Vec::new();
    }

    let ports = exposed_ports(collector, receiver_ports);
    if ports.is_empty() {
        debug!(collector = collector.collector_name(), "configuration yields no ports, skipping routes");
        return Vec::new();
    }

    let settings = &collector.spec.ingress;
    let tls = tls_config(settings.route.termination.unwrap_or_default());
    let annotations: Option<BTreeMap<String, String>> =
        (!settings.annotations.is_empty()).then(|| settings.annotations.clone());

    ports
        .into_iter()
        .map(|port| {
            let name = naming::route(collector.collector_name(), &port.name);
            let metadata = ObjectMeta {
                labels: Some(ingress_labels(collector, &name)),
                name: Some(name),
                namespace: Some(collector.collector_namespace().to_string()),
                annotations: annotations.clone(),
                ..Default::default()
            };
            let spec = RouteSpec {
                host: settings
                    .hostname
                    .as_ref()
                    .map(|hostname| format!("{}.{hostname}", port.name)),
                path: format!("/{}", port.name),
                to: RouteTargetReference {
                    kind: "Service".to_string(),
                    name: naming::service(collector.collector_name()),
                },
                port: RoutePort {
                    target_port: target_port(&port),
                },
                wildcard_policy: "None".to_string(),
                tls: tls.clone(),
            };
            Route::new(metadata, spec)
        })
        .collect()
}

/// The Service port a Route sends traffic to, by name when the name is shared
fn target_port(port: &ExposedPort) -> IntOrString {
    if port.shares_service_name() {
        IntOrString::String(port.name.clone())
    } else {
        IntOrString::Int(i32::from(port.service_port.port))
    }
}
