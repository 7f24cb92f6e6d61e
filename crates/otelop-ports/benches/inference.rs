//! Criterion benchmarks for PortInference
//!
//! Measures whole-document inference across collector configurations:
//! - Minimal: a single OTLP receiver
//! - Gateway: several multi-protocol receivers behind pipelines
//! - Wide: many qualified receivers of every built-in type

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use otelop_ports::receivers::SCRAPERS;
use otelop_ports::{CollectorConfig, PortInference};

// =============================================================================
// Fixtures
// =============================================================================

const MINIMAL: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
"#;

const GATEWAY: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
      http:
  jaeger:
    protocols:
      grpc:
      thrift_http:
      thrift_compact:
      thrift_binary:
  zipkin:
  kubeletstats:
    extra_metadata_labels: [container.id]
exporters:
  prometheus:
    endpoint: 0.0.0.0:9464
  loadbalancing:
    resolver:
      k8s:
        service: sampling.observability
service:
  pipelines:
    traces:
      receivers: [otlp, jaeger, zipkin]
      exporters: [loadbalancing]
    metrics:
      receivers: [otlp, kubeletstats]
      exporters: [prometheus]
"#;

fn wide_config(copies: usize) -> String {
    let mut yaml = String::from("receivers:\n");
    for i in 0..copies {
        yaml.push_str(&format!("  otlp/{i}:\n    protocols:\n      grpc:\n        endpoint: 0.0.0.0:{}\n", 10000 + i));
        yaml.push_str(&format!("  zipkin/{i}:\n    endpoint: 0.0.0.0:{}\n", 20000 + i));
        for scraper in SCRAPERS {
            yaml.push_str(&format!("  {scraper}/{i}:\n    endpoint: target:9000\n"));
        }
    }
    yaml
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_inference(c: &mut Criterion) {
    let inference = PortInference::default();
    let mut group = c.benchmark_group("inference");

    let minimal = CollectorConfig::from_yaml(MINIMAL).unwrap();
    group.bench_function("minimal", |b| {
        b.iter(|| inference.ports(black_box(&minimal)))
    });

    let gateway = CollectorConfig::from_yaml(GATEWAY).unwrap();
    group.bench_function("gateway", |b| {
        b.iter(|| {
            let ports = inference.ports(black_box(&gateway));
            let policies = inference.rbac_policies(black_box(&gateway));
            (ports, policies)
        })
    });

    for copies in [1, 10, 50] {
        let wide = CollectorConfig::from_yaml(&wide_config(copies)).unwrap();
        group.bench_with_input(BenchmarkId::new("wide", copies), &wide, |b, config| {
            b.iter(|| inference.ports(black_box(config)))
        });
    }

    group.finish();
}

fn bench_parse_and_infer(c: &mut Criterion) {
    let inference = PortInference::default();
    c.bench_function("parse_and_infer/gateway", |b| {
        b.iter(|| {
            let config = CollectorConfig::from_yaml(black_box(GATEWAY)).unwrap();
            inference.ports(&config)
        })
    });
}

criterion_group!(benches, bench_inference, bench_parse_and_infer);
criterion_main!(benches);
