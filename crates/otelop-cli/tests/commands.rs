//! Running the otelop commands against files on disk

use std::path::PathBuf;

use clap::Parser;
use otelop_cli::commands;
use otelop_cli::{Cli, Commands};

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("otelop-cli-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn write(&self, file: &str, contents: &str) -> String {
        let path = self.dir.join(file);
        std::fs::write(&path, contents).unwrap();
        path.display().to_string()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

const CONFIG: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
      http:
  kubeletstats:
    endpoint: ${env:K8S_NODE_NAME}:10250
exporters:
  prometheus:
    endpoint: 0.0.0.0:9464
service:
  pipelines:
    metrics:
      receivers: [otlp, kubeletstats]
      exporters: [prometheus]
"#;

fn run(args: &[&str]) -> String {
    let cli = Cli::parse_from(args);
    match cli.command {
        Commands::Ports(args) => commands::ports::run(args),
        Commands::Rbac(args) => commands::rbac::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Crd(args) => commands::crd::run(args),
    }
    .unwrap()
}

// =============================================================================
// Story Tests
// =============================================================================

/// Story: an operator engineer checks which ports a raw config opens
#[test]
fn story_ports_from_raw_config() {
    let fixture = Fixture::new("ports");
    let config = fixture.write("config.yaml", CONFIG);
    let declared = fixture.write("declared.yaml", "- name: web\n  port: 8080\n");

    let out = run(&[
        "otelop", "ports", "--config", &config, "--declared", &declared, "-o", "json",
    ]);
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    let names: Vec<_> = report["ports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["web", "otlp-grpc", "otlp-http", "prometheus"]);
    assert_eq!(report["metricsPort"], 8888);
}

/// Story: inferred-only output leaves declared ports out
#[test]
fn story_inferred_only() {
    let fixture = Fixture::new("inferred");
    let config = fixture.write("config.yaml", CONFIG);

    let out = run(&["otelop", "ports", "--config", &config, "--inferred-only"]);
    let ports: Vec<otelop_common::ServicePortSpec> = serde_yaml::from_str(&out).unwrap();
    assert_eq!(ports.len(), 3);
    assert_eq!(ports[2].port, 9464);
}

/// Story: a scraping receiver asks for node access
#[test]
fn story_rbac_for_kubeletstats() {
    let fixture = Fixture::new("rbac");
    let config = fixture.write("config.yaml", CONFIG);

    let out = run(&["otelop", "rbac", "--config", &config, "-o", "json"]);
    let policies: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(policies.as_array().unwrap().len(), 1);
    assert_eq!(policies[0]["rules"][0]["resources"][0], "nodes/stats");
}

/// Story: rendering a CR manifest yields a YAML stream of objects
#[test]
fn story_render_collector() {
    let fixture = Fixture::new("render");
    let indented: String = CONFIG.trim_start().lines().map(|l| format!("    {l}\n")).collect();
    let collector = fixture.write(
        "collector.yaml",
        &format!(
            "apiVersion: opentelemetry.io/v1alpha1\nkind: OpenTelemetryCollector\nmetadata:\n  name: agent\n  namespace: observability\nspec:\n  mode: daemonset\n  config: |\n{indented}"
        ),
    );

    let out = run(&["otelop", "render", "--collector", &collector]);
    assert!(out.starts_with("---\n"));
    assert!(out.contains("kind: ClusterRole\n"));
    assert!(out.contains("kind: ClusterRoleBinding\n"));
    assert!(out.contains("internalTrafficPolicy: Local"));
}
