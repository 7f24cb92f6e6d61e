//! Built-in receivers
//!
//! Default port tables of the receivers shipped with the collector
//! distributions, the set of pull-only receivers, and the kubeletstats
//! parser.

use otelop_common::{ConfigValue, PortProtocol, ServicePortSpec};

use crate::component::{component_type, ComponentKind};
use crate::descriptor::{ParserDescriptor, ProtocolDescriptor};
use crate::endpoint::EndpointField;
use crate::error::PortError;
use crate::parser::ComponentParser;
use crate::rbac::{kubeletstats_policy, DynamicRolePolicy};
use crate::registry::{ComponentRegistry, Fallback};

/// Receivers that poll a target instead of listening
///
/// An `endpoint` on these names what they scrape, never a listen address.
pub const SCRAPERS: &[&str] = &[
    "aerospike",
    "chrony",
    "cloudfoundry",
    "couchdb",
    "docker_stats",
    "filelog",
    "flinkmetrics",
    "googlecloudpubsub",
    "haproxy",
    "httpcheck",
    "jmx",
    "memcached",
    "mysql",
    "nginx",
    "nsxt",
    "oracledb",
    "podman_stats",
    "postgresql",
    "prometheus",
    "prometheus_simple",
    "pulsar",
    "purefb",
    "rabbitmq",
    "redis",
    "riak",
    "saphana",
    "snmp",
    "sshcheck",
    "vcenter",
    "zookeeper",
];

/// Single-port receivers with a well-known TCP port
const SINGLE_PORT: &[(&str, u16)] = &[
    ("awsxray", 2000),
    ("carbon", 2003),
    ("collectd", 8081),
    ("fluentforward", 8006),
    ("influxdb", 8086),
    ("opencensus", 55678),
    ("sapm", 7276),
    ("signalfx", 9943),
    ("splunk_hec", 8088),
    ("wavefront", 2003),
    ("zipkin_scribe", 9410),
];

fn two_protocols(grpc: u16, http: u16) -> ParserDescriptor {
    ParserDescriptor::multi(vec![
        ProtocolDescriptor::tcp("grpc", grpc).app_protocol("grpc"),
        ProtocolDescriptor::tcp("http", http).app_protocol("http"),
    ])
}

fn otlp() -> ParserDescriptor {
    ParserDescriptor::multi(vec![
        ProtocolDescriptor::tcp("grpc", 4317)
            .app_protocol("grpc")
            .with_target_port(),
        ProtocolDescriptor::tcp("http", 4318)
            .app_protocol("http")
            .with_target_port(),
    ])
}

fn jaeger() -> ParserDescriptor {
    ParserDescriptor::multi(vec![
        ProtocolDescriptor::tcp("grpc", 14250).app_protocol("grpc"),
        ProtocolDescriptor::tcp("thrift_http", 14268).app_protocol("http"),
        ProtocolDescriptor::udp("thrift_compact", 6831),
        ProtocolDescriptor::udp("thrift_binary", 6832),
    ])
}

fn syslog() -> ParserDescriptor {
    ParserDescriptor::multi(vec![
        ProtocolDescriptor::tcp("tcp", 0),
        ProtocolDescriptor::udp("udp", 0),
    ])
    .with_endpoint_field(EndpointField::ListenAddress)
    .with_top_level_protocols()
}

/// The receiver registry with every built-in type
pub fn builtin() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new(ComponentKind::Receiver, Fallback::GenericSinglePort)
        .with("otlp", otlp())
        .with("jaeger", jaeger())
        .with("skywalking", two_protocols(11800, 12800))
        .with("loki", two_protocols(9095, 3100))
        .with("syslog", syslog())
        .with(
            "statsd",
            ParserDescriptor::single(8125).with_protocol(PortProtocol::Udp),
        )
        .with(
            "zipkin",
            ParserDescriptor::single(9411).with_app_protocol("http"),
        )
        .with(
            "tcplog",
            ParserDescriptor::single_without_default()
                .with_endpoint_field(EndpointField::ListenAddress),
        )
        .with(
            "udplog",
            ParserDescriptor::single_without_default()
                .with_endpoint_field(EndpointField::ListenAddress)
                .with_protocol(PortProtocol::Udp),
        );

    for (ty, port) in SINGLE_PORT {
        registry.register(*ty, ParserDescriptor::single(*port));
    }
    for ty in SCRAPERS {
        registry.register(*ty, ParserDescriptor::scraper());
    }

    registry.with_custom("kubeletstats", kubeletstats)
}

// =============================================================================
// kubeletstats
// =============================================================================

/// Scraper that additionally needs read access to node stats
struct KubeletStatsParser<'a> {
    name: &'a str,
    config: &'a ConfigValue,
}

fn kubeletstats<'a>(name: &'a str, config: &'a ConfigValue) -> Box<dyn ComponentParser + 'a> {
    Box::new(KubeletStatsParser { name, config })
}

impl ComponentParser for KubeletStatsParser<'_> {
    fn ports(&self) -> Result<Vec<ServicePortSpec>, PortError> {
        Ok(Vec::new())
    }

    fn rbac_policies(&self) -> Vec<DynamicRolePolicy> {
        vec![kubeletstats_policy(self.config)]
    }

    fn parser_name(&self) -> String {
        format!("__{}", component_type(self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otelop_common::yaml::parse_config;

    fn ports_of(name: &str, yaml: &str) -> Result<Vec<ServicePortSpec>, PortError> {
        let registry = builtin();
        let config = parse_config(yaml).unwrap();
        let ports = registry.parser(name, &config).ports();
        ports
    }

    #[test]
    fn test_otlp_both_protocols() {
        let ports = ports_of("otlp", "protocols: {grpc: {}, http: {}}").unwrap();
        let summary: Vec<_> = ports.iter().map(|p| (p.name.as_str(), p.port)).collect();
        assert_eq!(summary, vec![("otlp-grpc", 4317), ("otlp-http", 4318)]);
    }

    #[test]
    fn test_jaeger_all_protocols() {
        let ports = ports_of(
            "jaeger",
            r#"
protocols:
  grpc:
  thrift_http:
  thrift_compact:
  thrift_binary:
"#,
        )
        .unwrap();
        let summary: Vec<_> = ports
            .iter()
            .map(|p| (p.name.as_str(), p.port, p.protocol))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("jaeger-grpc", 14250, PortProtocol::Tcp),
                ("jaeger-thrift-http", 14268, PortProtocol::Tcp),
                ("jaeger-thrift-compact", 6831, PortProtocol::Udp),
                ("jaeger-thrift-binary", 6832, PortProtocol::Udp),
            ]
        );
    }

    #[test]
    fn test_scrapers_never_listen() {
        for scraper in SCRAPERS.iter().chain(["kubeletstats"].iter()) {
            let ports = ports_of(scraper, "endpoint: 0.0.0.0:9000").unwrap();
            assert!(ports.is_empty(), "{scraper} should not yield ports");
        }
    }

    #[test]
    fn test_kubeletstats_needs_node_stats() {
        let registry = builtin();
        let config = parse_config("auth_type: serviceAccount").unwrap();
        let policies = registry.parser("kubeletstats", &config).rbac_policies();
        assert_eq!(policies.len(), 1);
        assert!(policies[0].is_cluster_wide());
    }

    #[test]
    fn test_single_port_defaults() {
        for (ty, port) in SINGLE_PORT {
            let ports = ports_of(ty, "{}").unwrap();
            assert_eq!(ports.len(), 1);
            assert_eq!(ports[0].port, *port);
        }
    }

    #[test]
    fn test_statsd_is_udp() {
        let ports = ports_of("statsd", "{}").unwrap();
        assert_eq!(ports[0].protocol, PortProtocol::Udp);
        assert_eq!(ports[0].port, 8125);
    }

    #[test]
    fn test_log_receivers_use_listen_address() {
        let ports = ports_of("tcplog", "listen_address: 0.0.0.0:54525").unwrap();
        assert_eq!(ports, vec![ServicePortSpec::new("tcplog", 54525)]);

        let ports = ports_of("udplog/raw", "listen_address: 0.0.0.0:54526").unwrap();
        assert_eq!(ports[0].name, "udplog-raw");
        assert_eq!(ports[0].protocol, PortProtocol::Udp);

        assert!(ports_of("tcplog", "{}").unwrap().is_empty());
    }

    #[test]
    fn test_syslog_sections_at_top_level() {
        let ports = ports_of(
            "syslog",
            r#"
tcp:
  listen_address: "0.0.0.0:54527"
protocol: rfc5424
"#,
        )
        .unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name, "syslog-tcp");
        assert_eq!(ports[0].port, 54527);
    }

    #[test]
    fn test_unregistered_receiver() {
        let ports = ports_of("myreceiver", "endpoint: 0.0.0.0:1234").unwrap();
        assert_eq!(ports, vec![ServicePortSpec::new("myreceiver", 1234)]);
        assert!(ports_of("myreceiver", "endpoint: 0.0.0.0").is_err());
    }
}
