//! Whole-document port inference
//!
//! [`PortInference`] walks the enabled receivers and exporters of a
//! [`CollectorConfig`], dispatching each to its registry. A component that
//! fails is logged and skipped; it never takes the rest of the document down.

use otelop_common::{
    ConfigValue, ServicePortSpec, DEFAULT_HEALTH_CHECK_PATH, DEFAULT_HEALTH_CHECK_PORT,
    DEFAULT_METRICS_PORT,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::component::{component_type, ComponentKind};
use crate::config::CollectorConfig;
use crate::endpoint::{extract_port, port_from_endpoint, EndpointField};
use crate::merge::merge_ports;
use crate::rbac::DynamicRolePolicy;
use crate::registry::{Registries, BUILTIN};

/// Extension type serving the collector's health endpoint
const HEALTH_CHECK_EXTENSION: &str = "health_check";

/// HTTP endpoint a liveness probe should hit
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProbeTarget {
    /// Request path
    pub path: String,
    /// Container port
    pub port: u16,
}

/// Infers ports and access policies from collector configurations
#[derive(Clone, Copy, Debug)]
pub struct PortInference<'r> {
    registries: &'r Registries,
}

impl Default for PortInference<'static> {
    fn default() -> Self {
        Self::new(&BUILTIN)
    }
}

impl<'r> PortInference<'r> {
    /// Infer using the given registries
    pub fn new(registries: &'r Registries) -> Self {
        Self { registries }
    }

    fn component_ports(&self, kind: ComponentKind, config: &CollectorConfig) -> Vec<ServicePortSpec> {
        let Some(registry) = self.registries.for_kind(kind) else {
            return Vec::new();
        };

        let mut ports = Vec::new();
        for (id, component) in config.enabled_components(kind) {
            let parser = registry.parser(id, component);
            match parser.ports() {
                Ok(found) => {
                    debug!(%kind, component = %id, parser = %parser.parser_name(), count = found.len(), "inferred ports");
                    ports.extend(found);
                }
                Err(err) => {
                    warn!(%kind, component = %id, error = %err, "skipping component");
                }
            }
        }
        ports
    }

    /// Ports of the enabled receivers, ordered by component id
    pub fn receiver_ports(&self, config: &CollectorConfig) -> Vec<ServicePortSpec> {
        self.component_ports(ComponentKind::Receiver, config)
    }

    /// Ports of the enabled exporters, ordered by component id
    pub fn exporter_ports(&self, config: &CollectorConfig) -> Vec<ServicePortSpec> {
        self.component_ports(ComponentKind::Exporter, config)
    }

    /// Receiver and exporter ports, sorted by name
    pub fn ports(&self, config: &CollectorConfig) -> Vec<ServicePortSpec> {
        let mut ports = self.receiver_ports(config);
        ports.extend(self.exporter_ports(config));
        ports.sort_by(|a, b| a.name.cmp(&b.name));
        ports
    }

    /// [`ports`](Self::ports) merged behind the declared ports
    pub fn merged_ports(&self, config: &CollectorConfig, declared: &[ServicePortSpec]) -> Vec<ServicePortSpec> {
        merge_ports(declared, self.ports(config))
    }

    /// Access policies needed by the enabled receivers and exporters
    pub fn rbac_policies(&self, config: &CollectorConfig) -> Vec<DynamicRolePolicy> {
        [ComponentKind::Receiver, ComponentKind::Exporter]
            .into_iter()
            .filter_map(|kind| self.registries.for_kind(kind).map(|registry| (kind, registry)))
            .flat_map(|(kind, registry)| {
                config
                    .enabled_components(kind)
                    .into_iter()
                    .flat_map(move |(id, component)| registry.parser(id, component).rbac_policies())
            })
            .collect()
    }

    /// Port of the collector's own metrics endpoint
    ///
    /// Read from `service.telemetry.metrics.address`, 8888 when absent or
    /// unparseable.
    pub fn metrics_port(&self, config: &CollectorConfig) -> u16 {
        let Some(address) = config
            .path(&["service", "telemetry", "metrics", "address"])
            .and_then(ConfigValue::as_str)
        else {
            return DEFAULT_METRICS_PORT;
        };

        port_from_endpoint(address).unwrap_or_else(|err| {
            warn!(error = %err, "invalid metrics address, using default port");
            DEFAULT_METRICS_PORT
        })
    }

    /// Where to probe the collector's health, if a health_check extension is enabled
    pub fn health_check_probe(&self, config: &CollectorConfig) -> Option<ProbeTarget> {
        let enabled = config.path(&["service", "extensions"])?.as_sequence()?;
        let extensions = config.extensions()?;

        let (id, extension) = enabled
            .iter()
            .filter_map(ConfigValue::as_str)
            .filter(|id| component_type(id).starts_with(HEALTH_CHECK_EXTENSION))
            .find_map(|id| extensions.get(id).map(|ext| (id, ext)))?;

        let port = match extract_port(extension, EndpointField::Endpoint) {
            Ok(Some(port)) => port,
            Ok(None) => DEFAULT_HEALTH_CHECK_PORT,
            Err(err) => {
                warn!(extension = %id, error = %err, "invalid health check endpoint, using default port");
                DEFAULT_HEALTH_CHECK_PORT
            }
        };
        let path = extension
            .str_field("path")
            .found()
            .unwrap_or(DEFAULT_HEALTH_CHECK_PATH)
            .to_string();

        Some(ProbeTarget { path, port })
    }
}
