//! Loading collector configurations from disk
//!
//! Every inspecting subcommand takes either a whole OpenTelemetryCollector
//! manifest (`--collector`) or a raw collector configuration (`--config`),
//! optionally with a YAML list of declared ports (`--declared`).

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args};
use otelop_common::crd::{validate_declared_ports, OpenTelemetryCollector};
use otelop_common::ServicePortSpec;
use otelop_ports::CollectorConfig;
use tracing::debug;

use crate::{Error, Result};

/// Context named in validation errors about `--declared` ports
const DECLARED_CONTEXT: &str = "--declared";

/// Where the collector configuration comes from
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("input").required(true).args(["collector", "config"])))]
pub struct InputArgs {
    /// OpenTelemetryCollector manifest
    #[arg(long)]
    pub collector: Option<PathBuf>,

    /// Raw collector configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// YAML list of explicitly declared ports (with --config only)
    #[arg(long, requires = "config")]
    pub declared: Option<PathBuf>,
}

/// A decoded collector configuration and its declared ports
#[derive(Debug)]
pub struct CollectorInput {
    /// Decoded configuration document
    pub config: CollectorConfig,
    /// Ports declared next to the configuration
    pub declared: Vec<ServicePortSpec>,
}

impl CollectorInput {
    /// Load the input named by the flags
    pub fn load(args: &InputArgs) -> Result<Self> {
        match (&args.collector, &args.config) {
            (Some(path), _) => Self::from_collector(&load_collector(path)?),
            (None, Some(path)) => {
                let declared = match &args.declared {
                    Some(declared) => parse_declared(&read(declared)?)?,
                    None => Vec::new(),
                };
                Self::from_config(&read(path)?, declared)
            }
            (None, None) => Err(Error::validation("one of --collector or --config is required")),
        }
    }

    /// Take the configuration and declared ports of a collector CR
    pub fn from_collector(collector: &OpenTelemetryCollector) -> Result<Self> {
        Self::decode(
            collector.collector_name(),
            &collector.spec.config,
            collector.spec.ports.clone(),
        )
    }

    /// Decode a raw configuration with the ports declared next to it
    pub fn from_config(config: &str, declared: Vec<ServicePortSpec>) -> Result<Self> {
        Self::decode(DECLARED_CONTEXT, config, declared)
    }

    fn decode(context: &str, config: &str, declared: Vec<ServicePortSpec>) -> Result<Self> {
        validate_declared_ports(context, &declared)?;
        Ok(Self {
            config: CollectorConfig::from_yaml(config)?,
            declared,
        })
    }
}

/// Read and decode an OpenTelemetryCollector manifest
pub fn load_collector(path: &Path) -> Result<OpenTelemetryCollector> {
    parse_collector(&read(path)?)
}

/// Decode an OpenTelemetryCollector manifest
pub fn parse_collector(manifest: &str) -> Result<OpenTelemetryCollector> {
    let collector: OpenTelemetryCollector = serde_yaml::from_str(manifest)?;
    if collector.metadata.name.is_none() {
        return Err(Error::validation("OpenTelemetryCollector missing metadata.name"));
    }
    Ok(collector)
}

/// Decode a YAML list of declared ports
pub fn parse_declared(contents: &str) -> Result<Vec<ServicePortSpec>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(contents)?)
}

fn read(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading input");
    std::fs::read_to_string(path).map_err(|e| Error::read_file(path, e))
}
