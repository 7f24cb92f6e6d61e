//! otelop CLI
//!
//! Inspects OpenTelemetry collector configurations offline: inferred ports,
//! RBAC needs and the manifests the operator would render.

use clap::Parser;

use otelop_cli::{Cli, Result};
use otelop_common::telemetry::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        format: cli.log_format,
        ..Default::default()
    })?;

    cli.run()
}
