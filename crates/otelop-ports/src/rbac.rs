//! Access grants derived from component configuration
//!
//! A few components need to read cluster state to work: the loadbalancing
//! exporter resolves a Service's endpoints, the kubeletstats receiver reads
//! node stats. Their parsers turn the relevant configuration into
//! [`DynamicRolePolicy`] values; turning those into Role/ClusterRole objects
//! is up to the manifest builders.

use k8s_openapi::api::rbac::v1::PolicyRule;
use otelop_common::ConfigValue;
use serde::Serialize;
use tracing::debug;

/// Access the collector needs, and where
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DynamicRolePolicy {
    /// Namespaces to grant in; empty means cluster-wide
    pub namespaces: Vec<String>,
    /// Rules to grant
    pub rules: Vec<PolicyRule>,
}

impl DynamicRolePolicy {
    /// A cluster-wide policy
    pub fn cluster_wide(rules: Vec<PolicyRule>) -> Self {
        Self {
            namespaces: Vec::new(),
            rules,
        }
    }

    /// True if the grant must be cluster-scoped
    pub fn is_cluster_wide(&self) -> bool {
        self.namespaces.is_empty()
    }
}

fn rule(api_group: &str, resources: &[&str], verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![api_group.to_string()]),
        resources: Some(resources.iter().map(|s| s.to_string()).collect()),
        verbs: verbs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

// =============================================================================
// loadbalancing exporter
// =============================================================================

/// Split a `name` or `name.namespace[.svc...]` service reference
///
/// Returns `(name, namespace)`, the namespace empty when not given. An empty
/// name, or a dot with nothing after it, is malformed.
pub fn parse_service_reference(reference: &str) -> Option<(&str, &str)> {
    let mut segments = reference.split('.');
    let name = segments.next().filter(|s| !s.is_empty())?;
    match segments.next() {
        None => Some((name, "")),
        Some("") => None,
        Some(namespace) => Some((name, namespace)),
    }
}

/// Policy for the `resolver.k8s.service` of a loadbalancing exporter
pub fn loadbalancing_policy(config: &ConfigValue) -> Option<DynamicRolePolicy> {
    let reference = config
        .path(&["resolver", "k8s"])
        .and_then(|k8s| k8s.str_field("service").found())?;

    let Some((name, namespace)) = parse_service_reference(reference) else {
        debug!(service = reference, "malformed loadbalancing service reference");
        return None;
    };

    let mut endpoints = rule("", &["endpoints"], &["get", "watch", "list"]);
    endpoints.resource_names = Some(vec![name.to_string()]);

    let namespaces = if namespace.is_empty() {
        Vec::new()
    } else {
        vec![namespace.to_string()]
    };

    Some(DynamicRolePolicy {
        namespaces,
        rules: vec![endpoints],
    })
}

// =============================================================================
// kubeletstats receiver
// =============================================================================

fn is_utilization_metric(name: &str) -> bool {
    (name.starts_with("k8s.container.") || name.starts_with("k8s.pod."))
        && name.ends_with("_utilization")
}

/// True if any `k8s.{container,pod}.*_utilization` metric is enabled
fn utilization_metrics_enabled(config: &ConfigValue) -> bool {
    let Some(metrics) = config.mapping_field("metrics").found() else {
        return false;
    };
    metrics.iter().any(|(name, settings)| {
        is_utilization_metric(name)
            && settings.get("enabled").found().and_then(ConfigValue::as_bool) == Some(true)
    })
}

/// Cluster-wide policy for a kubeletstats receiver
///
/// Node stats are always needed; node proxy access only when pod metadata
/// labels or utilization metrics (which need container limits) are requested.
pub fn kubeletstats_policy(config: &ConfigValue) -> DynamicRolePolicy {
    let mut rules = vec![rule("", &["nodes/stats"], &["get"])];

    let extra_labels = config
        .sequence_field("extra_metadata_labels")
        .found()
        .is_some_and(|labels| !labels.is_empty());

    if extra_labels || utilization_metrics_enabled(config) {
        rules.push(rule("", &["nodes/proxy"], &["get"]));
    }

    DynamicRolePolicy::cluster_wide(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::yaml::parse_config;
    use rstest::rstest;

    #[rstest]
    #[case::bare("collector", Some(("collector", "")))]
    #[case::namespaced("collector.observability", Some(("collector", "observability")))]
    #[case::fqdn(
        "collector.observability.svc.cluster.local",
        Some(("collector", "observability"))
    )]
    #[case::empty("", None)]
    #[case::leading_dot(".observability", None)]
    #[case::trailing_dot("collector.", None)]
    fn test_parse_service_reference(
        #[case] reference: &str,
        #[case] want: Option<(&str, &str)>,
    ) {
        assert_eq!(parse_service_reference(reference), want);
    }

    #[test]
    fn test_loadbalancing_namespaced() {
        let config = parse_config(
            r#"
resolver:
  k8s:
    service: backends.observability
"#,
        )
        .unwrap();
        let policy = loadbalancing_policy(&config).unwrap();
        assert_eq!(policy.namespaces, vec!["observability"]);
        assert!(!policy.is_cluster_wide());

        let rule = &policy.rules[0];
        assert_eq!(rule.api_groups, Some(vec![String::new()]));
        assert_eq!(rule.resources, Some(vec!["endpoints".to_string()]));
        assert_eq!(rule.resource_names, Some(vec!["backends".to_string()]));
        assert_eq!(rule.verbs, vec!["get", "watch", "list"]);
    }

    #[test]
    fn test_loadbalancing_without_namespace_is_cluster_wide() {
        let config = parse_config("resolver: {k8s: {service: backends}}").unwrap();
        let policy = loadbalancing_policy(&config).unwrap();
        assert!(policy.is_cluster_wide());
    }

    #[test]
    fn test_loadbalancing_without_k8s_resolver() {
        let config = parse_config("resolver: {static: {hostnames: [a, b]}}").unwrap();
        assert_eq!(loadbalancing_policy(&config), None);
        assert_eq!(loadbalancing_policy(&ConfigValue::Null), None);

        let config = parse_config("resolver: {k8s: {service: 42}}").unwrap();
        assert_eq!(loadbalancing_policy(&config), None);
    }

    #[test]
    fn test_kubeletstats_minimal() {
        let policy = kubeletstats_policy(&ConfigValue::Null);
        assert!(policy.is_cluster_wide());
        assert_eq!(policy.rules.len(), 1);
        assert_eq!(policy.rules[0].resources, Some(vec!["nodes/stats".to_string()]));
    }

    #[test]
    fn test_kubeletstats_extra_labels_need_proxy() {
        let config = parse_config("extra_metadata_labels: [container.id]").unwrap();
        let policy = kubeletstats_policy(&config);
        assert_eq!(policy.rules.len(), 2);
        assert_eq!(policy.rules[1].resources, Some(vec!["nodes/proxy".to_string()]));
    }

    #[test]
    fn test_kubeletstats_utilization_metrics_need_proxy() {
        let enabled = parse_config(
            r#"
metrics:
  k8s.pod.cpu_limit_utilization:
    enabled: true
"#,
        )
        .unwrap();
        assert_eq!(kubeletstats_policy(&enabled).rules.len(), 2);

        let disabled = parse_config(
            r#"
metrics:
  k8s.pod.cpu_limit_utilization:
    enabled: false
  k8s.node.cpu.utilization:
    enabled: true
"#,
        )
        .unwrap();
        assert_eq!(kubeletstats_policy(&disabled).rules.len(), 1);
    }
}
