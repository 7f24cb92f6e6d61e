//! RBAC command

use clap::Args;
use otelop_ports::PortInference;
use tracing::info;

use super::OutputFormat;
use crate::input::{CollectorInput, InputArgs};
use crate::Result;

#[derive(Args, Debug)]
pub struct RbacArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub output: OutputFormat,
}

pub fn run(args: RbacArgs) -> Result<String> {
    let input = CollectorInput::load(&args.input)?;
    let policies = PortInference::default().rbac_policies(&input.config);
    info!(policies = policies.len(), "derived access policies");
    args.output.serialize(&policies)
}
