//! Ports command

use clap::Args;
use otelop_common::ServicePortSpec;
use otelop_ports::{PortInference, ProbeTarget};
use serde::Serialize;
use tracing::info;

use super::OutputFormat;
use crate::input::{CollectorInput, InputArgs};
use crate::Result;

#[derive(Args, Debug)]
pub struct PortsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only print the ports inferred from the configuration
    #[arg(long)]
    pub inferred_only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub output: OutputFormat,
}

/// What the operator learns about a collector's ports
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortsReport {
    /// Service ports: declared first, then inferred
    pub ports: Vec<ServicePortSpec>,
    /// Port of the collector's own metrics endpoint
    pub metrics_port: u16,
    /// Target of the liveness probe, if a health_check extension is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<ProbeTarget>,
}

pub fn run(args: PortsArgs) -> Result<String> {
    let input = CollectorInput::load(&args.input)?;
    let inference = PortInference::default();

    if args.inferred_only {
        return args.output.serialize(&inference.ports(&input.config));
    }

    let report = report(&inference, &input);
    info!(ports = report.ports.len(), "inferred collector ports");
    args.output.serialize(&report)
}

/// Build the ports report for one input
pub fn report(inference: &PortInference<'_>, input: &CollectorInput) -> PortsReport {
    PortsReport {
        ports: inference.merged_ports(&input.config, &input.declared),
        metrics_port: inference.metrics_port(&input.config),
        health_check: inference.health_check_probe(&input.config),
    }
}
