//! CRD command

use clap::Args;
use kube::CustomResourceExt;
use otelop_common::crd::OpenTelemetryCollector;

use super::OutputFormat;
use crate::Result;

#[derive(Args, Debug)]
pub struct CrdArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub output: OutputFormat,
}

pub fn run(args: CrdArgs) -> Result<String> {
    args.output.serialize(&OpenTelemetryCollector::crd())
}
