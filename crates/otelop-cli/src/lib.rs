//! otelop CLI library

pub mod commands;
pub mod error;
pub mod input;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};
use otelop_common::telemetry::LogFormat;

/// otelop - port inference for OpenTelemetry collectors
#[derive(Parser, Debug)]
#[command(name = "otelop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log line format (text or json)
    #[arg(
        long,
        env = "OTELOP_LOG_FORMAT",
        default_value = "text",
        global = true,
        value_parser = parse_log_format
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the ports inferred from a collector configuration
    Ports(commands::ports::PortsArgs),
    /// Print the access policies a collector configuration needs
    Rbac(commands::rbac::RbacArgs),
    /// Render every manifest derived from an OpenTelemetryCollector
    Render(commands::render::RenderArgs),
    /// Print the OpenTelemetryCollector CustomResourceDefinition
    Crd(commands::crd::CrdArgs),
}

fn parse_log_format(s: &str) -> std::result::Result<LogFormat, String> {
    s.parse().map_err(|e: otelop_common::telemetry::TelemetryError| e.to_string())
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let output = match self.command {
            Commands::Ports(args) => commands::ports::run(args)?,
            Commands::Rbac(args) => commands::rbac::run(args)?,
            Commands::Render(args) => commands::render::run(args)?,
            Commands::Crd(args) => commands::crd::run(args)?,
        };
        print!("{output}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["otelop", "--log-format", "json", "crd"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        let err = Cli::try_parse_from(["otelop", "--log-format", "xml", "crd"]).unwrap_err();
        assert!(err.to_string().contains("unknown log format"));
    }

    #[rstest]
    #[case::none(&["otelop", "ports"], false)]
    #[case::raw_config(&["otelop", "ports", "--config", "c.yaml"], true)]
    #[case::collector(&["otelop", "rbac", "--collector", "cr.yaml"], true)]
    #[case::both(&["otelop", "ports", "--config", "c.yaml", "--collector", "cr.yaml"], false)]
    #[case::render_needs_collector(&["otelop", "render"], false)]
    fn test_input_flags(#[case] args: &[&str], #[case] ok: bool) {
        assert_eq!(Cli::try_parse_from(args).is_ok(), ok);
    }

    #[test]
    fn test_declared_requires_raw_config() {
        assert!(Cli::try_parse_from([
            "otelop",
            "ports",
            "--collector",
            "cr.yaml",
            "--declared",
            "ports.yaml"
        ])
        .is_err());
    }
}
