//! Collector compiler
//!
//! Runs port inference once per reconciliation pass and feeds the result to
//! every builder in this crate.
//!
//! # Usage
//!
//! ```text
//! let compiler = CollectorCompiler::new(&BUILTIN, ManifestOptions::default());
//! let output = compiler.compile(&collector)?;
//! // output.service, output.ingress, output.rbac, ...
//! ```

use k8s_openapi::api::core::v1::{ContainerPort, Probe, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_common::crd::OpenTelemetryCollector;
use otelop_common::{Result, ServicePortSpec};
use otelop_ports::{merge_ports, CollectorConfig, DynamicRolePolicy, PortInference, Registries};
use serde::Serialize;
use tracing::info;

use crate::container::{container_ports, liveness_probe};
use crate::ingress::ingress;
use crate::labels::labels;
use crate::rbac::{rbac, service_account_name, GeneratedRbac};
use crate::route::{routes, Route};
use crate::service::{headless_service, monitoring_service, service};

/// Errors that can occur during collector compilation
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// OpenTelemetryCollector is missing required metadata
    #[error("OpenTelemetryCollector missing {field}")]
    MissingMetadata {
        /// The missing metadata field
        field: &'static str,
    },
}

impl From<CompileError> for otelop_common::Error {
    fn from(err: CompileError) -> Self {
        otelop_common::Error::validation(err.to_string())
    }
}

/// Settings that come from the operator, not the CR
#[derive(Clone, Debug)]
pub struct ManifestOptions {
    /// Whether the OpenShift Route API is served (routes are skipped otherwise)
    pub openshift_routes: bool,
    /// Whether to render a ServiceAccount when the CR doesn't name one
    pub create_service_account: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            openshift_routes: true,
            create_service_account: true,
        }
    }
}

/// Everything rendered for one collector
#[derive(Clone, Debug, Default)]
pub struct CompiledCollector {
    /// Ports of the primary Service (declared first, then inferred)
    pub ports: Vec<ServicePortSpec>,
    /// Primary Service
    pub service: Option<Service>,
    /// Headless Service
    pub headless_service: Option<Service>,
    /// Monitoring Service
    pub monitoring_service: Option<Service>,
    /// Ingress
    pub ingress: Option<Ingress>,
    /// OpenShift Routes
    pub routes: Vec<Route>,
    /// ServiceAccount the collector runs as
    pub service_account: Option<ServiceAccount>,
    /// RBAC objects
    pub rbac: GeneratedRbac,
    /// Ports of the collector container
    pub container_ports: Vec<ContainerPort>,
    /// Liveness probe of the collector container
    pub liveness_probe: Option<Probe>,
    /// Policies the RBAC objects were rendered from
    pub policies: Vec<DynamicRolePolicy>,
}

impl CompiledCollector {
    /// True if no Kubernetes objects were generated
    pub fn is_empty(&self) -> bool {
        self.resource_count() == 0
    }

    /// Total count of generated Kubernetes objects
    pub fn resource_count(&self) -> usize {
        [
            self.service.is_some(),
            self.headless_service.is_some(),
            self.monitoring_service.is_some(),
            self.ingress.is_some(),
            self.service_account.is_some(),
        ]
        .iter()
        .filter(|&&x| x)
        .count()
            + self.routes.len()
            + self.rbac.total_count()
    }

    /// Every generated object as JSON, in apply order
    pub fn objects(&self) -> std::result::Result<Vec<serde_json::Value>, serde_json::Error> {
        fn push<T: Serialize>(
            out: &mut Vec<serde_json::Value>,
            obj: &T,
        ) -> std::result::Result<(), serde_json::Error> {
            out.push(serde_json::to_value(obj)?);
            Ok(())
        }

        let mut out = Vec::with_capacity(self.resource_count());
        if let Some(sa) = &self.service_account {
            push(&mut out, sa)?;
        }
        if let Some(role) = &self.rbac.cluster_role {
            push(&mut out, role)?;
        }
        if let Some(binding) = &self.rbac.cluster_role_binding {
            push(&mut out, binding)?;
        }
        for role in &self.rbac.roles {
            push(&mut out, role)?;
        }
        for binding in &self.rbac.role_bindings {
            push(&mut out, binding)?;
        }
        for svc in [&self.service, &self.headless_service, &self.monitoring_service]
            .into_iter()
            .flatten()
        {
            push(&mut out, svc)?;
        }
        if let Some(ingress) = &self.ingress {
            push(&mut out, ingress)?;
        }
        for route in &self.routes {
            push(&mut out, route)?;
        }
        Ok(out)
    }
}

/// Compiles OpenTelemetryCollector CRs into Kubernetes objects
pub struct CollectorCompiler<'a> {
    inference: PortInference<'a>,
    options: ManifestOptions,
}

impl<'a> CollectorCompiler<'a> {
    /// Create a compiler using the given component registries
    pub fn new(registries: &'a Registries, options: ManifestOptions) -> Self {
        Self {
            inference: PortInference::new(registries),
            options,
        }
    }

    /// Compile a collector
    ///
    /// Fails when the CR is invalid or its configuration can't be decoded;
    /// components that can't be resolved to ports are skipped, not fatal.
    pub fn compile(&self, collector: &OpenTelemetryCollector) -> Result<CompiledCollector> {
        let name = collector
            .metadata
            .name
            .as_deref()
            .ok_or(CompileError::MissingMetadata { field: "name" })?;
        collector.spec.validate(name)?;

        let config = CollectorConfig::from_yaml(&collector.spec.config)?;
        let inferred = self.inference.ports(&config);
        let receiver_ports = self.inference.receiver_ports(&config);
        let metrics_port = self.inference.metrics_port(&config);
        let policies = self.inference.rbac_policies(&config);

        let service_account = (self.options.create_service_account
            && collector.spec.service_account.is_none())
        .then(|| {
            let sa_name = service_account_name(collector);
            ServiceAccount {
                metadata: ObjectMeta {
                    labels: Some(labels(collector, &sa_name)),
                    name: Some(sa_name),
                    namespace: Some(collector.collector_namespace().to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }
        });

        let compiled = CompiledCollector {
            ports: merge_ports(&collector.spec.ports, inferred.iter().cloned()),
            service: service(collector, &inferred),
            headless_service: headless_service(collector, &inferred),
            monitoring_service: Some(monitoring_service(collector, metrics_port)),
            ingress: ingress(collector, &receiver_ports),
            routes: if self.options.openshift_routes {
                routes(collector, &receiver_ports)
            } else {
                Vec::new()
            },
            service_account,
            rbac: rbac(collector, &policies),
            container_ports: container_ports(collector, &inferred, metrics_port),
            liveness_probe: liveness_probe(self.inference.health_check_probe(&config).as_ref()),
            policies,
        };

        info!(
            collector = name,
            namespace = collector.collector_namespace(),
            ports = compiled.ports.len(),
            resources = compiled.resource_count(),
            "compiled collector"
        );
        Ok(compiled)
    }
}
