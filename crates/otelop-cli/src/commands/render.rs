//! Render command

use std::path::PathBuf;

use clap::Args;
use otelop_common::crd::OpenTelemetryCollector;
use otelop_manifests::{CollectorCompiler, ManifestOptions};
use otelop_ports::BUILTIN;
use tracing::info;

use super::OutputFormat;
use crate::input::load_collector;
use crate::Result;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// OpenTelemetryCollector manifest
    #[arg(long)]
    pub collector: PathBuf,

    /// Skip OpenShift Routes (for clusters without the Route API)
    #[arg(long)]
    pub no_routes: bool,

    /// Don't render a ServiceAccount when the CR names none
    #[arg(long)]
    pub no_service_account: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub output: OutputFormat,
}

impl RenderArgs {
    fn options(&self) -> ManifestOptions {
        ManifestOptions {
            openshift_routes: !self.no_routes,
            create_service_account: !self.no_service_account,
        }
    }
}

pub fn run(args: RenderArgs) -> Result<String> {
    let collector = load_collector(&args.collector)?;
    render(&collector, args.options(), args.output)
}

/// Render every object derived from `collector`
pub fn render(
    collector: &OpenTelemetryCollector,
    options: ManifestOptions,
    output: OutputFormat,
) -> Result<String> {
    let compiled = CollectorCompiler::new(&BUILTIN, options).compile(collector)?;
    let objects = compiled.objects()?;
    info!(
        collector = collector.collector_name(),
        objects = objects.len(),
        "rendered collector manifests"
    );
    output.serialize_documents(&objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_collector;

    const COLLECTOR: &str = r#"
apiVersion: opentelemetry.io/v1alpha1
kind: OpenTelemetryCollector
metadata:
  name: simplest
  namespace: observability
spec:
  ingress:
    type: route
  config: |
    receivers:
      zipkin:
"#;

    #[test]
    fn test_render_yaml_stream() {
        let collector = parse_collector(COLLECTOR).unwrap();
        let out = render(&collector, ManifestOptions::default(), OutputFormat::Yaml).unwrap();
        assert_eq!(out.matches("---\n").count(), 5);
        assert!(out.contains("kind: Route"));
    }

    #[test]
    fn test_render_without_routes() {
        let collector = parse_collector(COLLECTOR).unwrap();
        let options = ManifestOptions {
            openshift_routes: false,
            create_service_account: false,
        };
        let out = render(&collector, options, OutputFormat::Json).unwrap();
        let objects: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
        let kinds: Vec<_> = objects.iter().filter_map(|o| o["kind"].as_str()).collect();
        assert_eq!(kinds, vec!["Service", "Service", "Service"]);
    }
}
