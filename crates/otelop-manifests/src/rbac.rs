//! RBAC objects granting the collector the access its components need

use std::collections::BTreeMap;

use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_common::crd::OpenTelemetryCollector;
use otelop_common::naming;
use otelop_ports::DynamicRolePolicy;

use crate::labels::labels;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// RBAC objects rendered for a collector
#[derive(Clone, Debug, Default)]
pub struct GeneratedRbac {
    /// ClusterRole holding every cluster-wide rule
    pub cluster_role: Option<ClusterRole>,
    /// Binding of [`cluster_role`](Self::cluster_role) to the collector's ServiceAccount
    pub cluster_role_binding: Option<ClusterRoleBinding>,
    /// One Role per namespace with namespaced rules
    pub roles: Vec<Role>,
    /// One RoleBinding per Role
    pub role_bindings: Vec<RoleBinding>,
}

impl GeneratedRbac {
    /// True if no access is needed
    pub fn is_empty(&self) -> bool {
        self.cluster_role.is_none() && self.roles.is_empty()
    }

    /// Number of generated objects
    pub fn total_count(&self) -> usize {
        usize::from(self.cluster_role.is_some())
            + usize::from(self.cluster_role_binding.is_some())
            + self.roles.len()
            + self.role_bindings.len()
    }
}

/// Name of the ServiceAccount the collector runs as
pub fn service_account_name(collector: &OpenTelemetryCollector) -> String {
    collector
        .spec
        .service_account
        .clone()
        .unwrap_or_else(|| naming::service_account(collector.collector_name()))
}

fn subject(collector: &OpenTelemetryCollector) -> Subject {
    Subject {
        kind: "ServiceAccount".to_string(),
        name: service_account_name(collector),
        namespace: Some(collector.collector_namespace().to_string()),
        ..Default::default()
    }
}

fn role_ref(kind: &str, name: &str) -> RoleRef {
    RoleRef {
        api_group: RBAC_API_GROUP.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

/// Render the policies derived from the configuration
///
/// Cluster-wide policies are merged into one ClusterRole; namespaced ones
/// into one Role per namespace. Everything is bound to the collector's
/// ServiceAccount.
pub fn rbac(collector: &OpenTelemetryCollector, policies: &[DynamicRolePolicy]) -> GeneratedRbac {
    let mut cluster_rules: Vec<PolicyRule> = Vec::new();
    let mut namespaced_rules: BTreeMap<&str, Vec<PolicyRule>> = BTreeMap::new();

    for policy in policies {
        if policy.is_cluster_wide() {
            cluster_rules.extend(policy.rules.iter().cloned());
        } else {
            for namespace in &policy.namespaces {
                namespaced_rules
                    .entry(namespace.as_str())
                    .or_default()
                    .extend(policy.rules.iter().cloned());
            }
        }
    }

    let otelcol = collector.collector_name();
    let namespace = collector.collector_namespace();
    let mut generated = GeneratedRbac::default();

    if !cluster_rules.is_empty() {
        let role_name = naming::cluster_role(otelcol, namespace);
        let binding_name = naming::cluster_role_binding(otelcol, namespace);
        generated.cluster_role_binding = Some(ClusterRoleBinding {
            metadata: ObjectMeta {
                labels: Some(labels(collector, &binding_name)),
                name: Some(binding_name),
                ..Default::default()
            },
            role_ref: role_ref("ClusterRole", &role_name),
            subjects: Some(vec![subject(collector)]),
        });
        generated.cluster_role = Some(ClusterRole {
            metadata: ObjectMeta {
                labels: Some(labels(collector, &role_name)),
                name: Some(role_name),
                ..Default::default()
            },
            rules: Some(cluster_rules),
            ..Default::default()
        });
    }

    for (target_namespace, rules) in namespaced_rules {
        let role_name = naming::role(otelcol);
        let binding_name = naming::role_binding(otelcol);
        generated.role_bindings.push(RoleBinding {
            metadata: ObjectMeta {
                labels: Some(labels(collector, &binding_name)),
                name: Some(binding_name),
                namespace: Some(target_namespace.to_string()),
                ..Default::default()
            },
            role_ref: role_ref("Role", &role_name),
            subjects: Some(vec![subject(collector)]),
        });
        generated.roles.push(Role {
            metadata: ObjectMeta {
                labels: Some(labels(collector, &role_name)),
                name: Some(role_name),
                namespace: Some(target_namespace.to_string()),
                ..Default::default()
            },
            rules: Some(rules),
        });
    }

    generated
}
