//! Naming of ports and of the Kubernetes objects derived from a collector
//!
//! Port names have two consumers with different limits: Service ports accept
//! up to 63 characters, while Ingress backends, Route target ports and
//! container ports are IANA service names capped at 15. Callers pick the
//! limit explicitly through [`PortNameLimit`].

use std::sync::LazyLock;

use regex::Regex;

/// Grammar a port name candidate must match before it is used as-is
static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$").expect("valid DNS label regex")
});

/// Maximum length of Kubernetes object names and Service port names
pub const MAX_NAME_LEN: usize = 63;

/// Maximum length of IANA service names (ingress/route/container port names)
pub const MAX_SVC_NAME_LEN: usize = 15;

/// Name of the collector container
pub const CONTAINER_NAME: &str = "otc-container";

/// Which consumer a port name is being derived for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortNameLimit {
    /// Service ports (63 characters)
    Service,
    /// Ingress paths and backends, Route target ports, container ports (15 characters)
    Ingress,
}

impl PortNameLimit {
    /// Maximum name length for this consumer
    pub const fn max_len(self) -> usize {
        match self {
            PortNameLimit::Service => MAX_NAME_LEN,
            PortNameLimit::Ingress => MAX_SVC_NAME_LEN,
        }
    }
}

/// Fallback name used when a candidate can't be used
pub fn fallback_port_name(port: u16) -> String {
    format!("port-{port}")
}

/// Derive a port name from a component key for the given consumer
pub fn port_name(candidate: &str, port: u16, limit: PortNameLimit) -> String {
    port_name_within(candidate, port, limit.max_len())
}

/// Derive a port name with an explicit length limit
///
/// `/` and `_` become `-`. A result that is empty, longer than `max_len` or
/// outside the label grammar is replaced by `port-<port>`.
pub fn port_name_within(candidate: &str, port: u16, max_len: usize) -> String {
    let sanitized = candidate.replace(['/', '_'], "-");
    if sanitized.is_empty() || sanitized.len() > max_len || !DNS_LABEL.is_match(&sanitized) {
        return fallback_port_name(port);
    }
    sanitized
}

/// True if `name` is usable as-is for the given consumer
pub fn is_valid_port_name(name: &str, limit: PortNameLimit) -> bool {
    !name.is_empty() && name.len() <= limit.max_len() && DNS_LABEL.is_match(name)
}

/// Cut `name` to at most `max` characters without leaving a trailing `-` or `.`
pub fn truncate(name: &str, max: usize) -> String {
    let cut: String = name.chars().take(max).collect();
    cut.trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

/// Turn an arbitrary string into a DNS-1123 compatible object name
///
/// Lowercases, maps every character outside `[a-z0-9-.]` to `-` and strips
/// non-alphanumeric characters from both ends.
pub fn dns_name(name: &str) -> String {
    let mapped: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    mapped
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

fn object_name(raw: String) -> String {
    dns_name(&truncate(&raw, MAX_NAME_LEN))
}

/// Name of the collector workload (Deployment/DaemonSet/StatefulSet)
pub fn collector(otelcol: &str) -> String {
    object_name(format!("{otelcol}-collector"))
}

/// Name of the primary Service
pub fn service(otelcol: &str) -> String {
    object_name(format!("{otelcol}-collector"))
}

/// Name of the headless Service
pub fn headless_service(otelcol: &str) -> String {
    object_name(format!("{}-headless", service(otelcol)))
}

/// Name of the monitoring Service
pub fn monitoring_service(otelcol: &str) -> String {
    object_name(format!("{}-monitoring", service(otelcol)))
}

/// Name of the Ingress
pub fn ingress(otelcol: &str) -> String {
    object_name(format!("{otelcol}-ingress"))
}

/// Name of the Route exposing one port
pub fn route(otelcol: &str, port_name: &str) -> String {
    object_name(format!("{port_name}-{otelcol}-route"))
}

/// Name of the collector's ServiceAccount
pub fn service_account(otelcol: &str) -> String {
    object_name(format!("{otelcol}-collector"))
}

/// Name of the ClusterRole granting cluster-wide access
pub fn cluster_role(otelcol: &str, namespace: &str) -> String {
    object_name(format!("{otelcol}-{namespace}-cluster-role"))
}

/// Name of the ClusterRoleBinding for [`cluster_role`]
pub fn cluster_role_binding(otelcol: &str, namespace: &str) -> String {
    object_name(format!("{otelcol}-{namespace}-collector"))
}

/// Name of a namespaced Role
pub fn role(otelcol: &str) -> String {
    object_name(format!("{otelcol}-role"))
}

/// Name of a namespaced RoleBinding
pub fn role_binding(otelcol: &str) -> String {
    object_name(format!("{otelcol}-rolebinding"))
}
