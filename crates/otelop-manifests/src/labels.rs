//! Standard labels for collector resources

use std::collections::BTreeMap;

use otelop_common::crd::OpenTelemetryCollector;
use otelop_common::naming::{truncate, MAX_NAME_LEN};
use otelop_common::{
    COMPONENT_COLLECTOR, LABEL_COMPONENT, LABEL_INSTANCE, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_OTELOP, LABEL_NAME,
};

/// Label key grouping everything the operator deploys
pub const LABEL_PART_OF: &str = "app.kubernetes.io/part-of";

/// Label key carrying the collector version
pub const LABEL_VERSION: &str = "app.kubernetes.io/version";

/// `<namespace>.<name>` instance label value
pub fn instance(collector: &OpenTelemetryCollector) -> String {
    truncate(
        &format!(
            "{}.{}",
            collector.collector_namespace(),
            collector.collector_name()
        ),
        MAX_NAME_LEN,
    )
}

/// Labels selecting the collector's pods
pub fn selector_labels(collector: &OpenTelemetryCollector) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_OTELOP.to_string()),
        (LABEL_INSTANCE.to_string(), instance(collector)),
        (LABEL_PART_OF.to_string(), "opentelemetry".to_string()),
        (LABEL_COMPONENT.to_string(), COMPONENT_COLLECTOR.to_string()),
    ])
}

/// Version label value derived from an image reference
///
/// `repo/img:1.2.3` gives `1.2.3`, digests are ignored, and anything without
/// a tag is `latest`.
pub fn version_from_image(image: Option<&str>) -> String {
    let Some(image) = image else {
        return "latest".to_string();
    };
    let without_digest = image.split_once('@').map_or(image, |(name, _)| name);
    match without_digest.rsplit_once(':') {
        Some((_, tag)) if !tag.is_empty() && !tag.contains('/') => truncate(tag, MAX_NAME_LEN),
        _ => "latest".to_string(),
    }
}

/// Labels of a resource named `name` belonging to the collector
///
/// The CR's own labels are carried over; the `name` label is only set when
/// the CR doesn't set one.
pub fn labels(collector: &OpenTelemetryCollector, name: &str) -> BTreeMap<String, String> {
    let mut labels = collector.metadata.labels.clone().unwrap_or_default();
    labels.extend(selector_labels(collector));
    labels.insert(
        LABEL_VERSION.to_string(),
        version_from_image(collector.spec.image.as_deref()),
    );
    labels
        .entry(LABEL_NAME.to_string())
        .or_insert_with(|| name.to_string());
    labels
}

/// Minimal labels used on Ingress and Route objects
pub fn ingress_labels(collector: &OpenTelemetryCollector, name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_NAME.to_string(), name.to_string()),
        (LABEL_INSTANCE.to_string(), instance(collector)),
        (LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_OTELOP.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::crd::OpenTelemetryCollectorSpec;
    use rstest::rstest;

    fn collector() -> OpenTelemetryCollector {
        let mut collector = OpenTelemetryCollector::new(
            "simplest",
            OpenTelemetryCollectorSpec {
                mode: Default::default(),
                config: String::new(),
                ports: vec![],
                ingress: Default::default(),
                image: Some("otel/opentelemetry-collector:0.98.0".to_string()),
                service_account: None,
            },
        );
        collector.metadata.namespace = Some("observability".to_string());
        collector
    }

    #[rstest]
    #[case::tagged(Some("otel/opentelemetry-collector:0.98.0"), "0.98.0")]
    #[case::registry_port(Some("localhost:5000/otelcol"), "latest")]
    #[case::registry_port_and_tag(Some("localhost:5000/otelcol:1.0"), "1.0")]
    #[case::digest(Some("otelcol:1.0@sha256:abcdef"), "1.0")]
    #[case::untagged(Some("otelcol"), "latest")]
    #[case::no_image(None, "latest")]
    fn test_version_from_image(#[case] image: Option<&str>, #[case] want: &str) {
        assert_eq!(version_from_image(image), want);
    }

    #[test]
    fn test_selector_labels() {
        let labels = selector_labels(&collector());
        assert_eq!(labels[LABEL_INSTANCE], "observability.simplest");
        assert_eq!(labels[LABEL_COMPONENT], "opentelemetry-collector");
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_labels_keep_user_name_label() {
        let mut collector = collector();
        collector.metadata.labels = Some(BTreeMap::from([
            (LABEL_NAME.to_string(), "custom".to_string()),
            ("team".to_string(), "platform".to_string()),
        ]));
        let labels = labels(&collector, "simplest-collector");
        assert_eq!(labels[LABEL_NAME], "custom");
        assert_eq!(labels["team"], "platform");
        assert_eq!(labels[LABEL_VERSION], "0.98.0");
    }
}
