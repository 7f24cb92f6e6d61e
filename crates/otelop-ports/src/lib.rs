//! Port inference for OpenTelemetry collector configurations
//!
//! This crate turns the weakly-typed `receivers:` / `exporters:` sections of a
//! collector configuration into the network ports the collector listens on:
//!
//! - **Registry**: maps a component type (`otlp` in `otlp/2`) to a parser
//! - **Descriptors**: declarative per-type default port tables and scraper flags
//! - **Parser**: one data-driven parser for single-port and multi-protocol components
//! - **Merge**: combines inferred ports with ports declared on the collector CR
//! - **RBAC**: access grants some components need (loadbalancing, kubeletstats)
//!
//! Everything here is pure: no I/O, no API server, no shared mutable state.

#![deny(missing_docs)]

pub mod component;
pub mod config;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod exporters;
pub mod inference;
pub mod merge;
pub mod parser;
pub mod rbac;
pub mod receivers;
pub mod registry;

pub use component::{component_type, ComponentKind};
pub use config::CollectorConfig;
pub use descriptor::{ParserDescriptor, ProtocolDescriptor};
pub use endpoint::{extract_port, port_from_endpoint, EndpointField};
pub use error::PortError;
pub use inference::{PortInference, ProbeTarget};
pub use merge::merge_ports;
pub use parser::ComponentParser;
pub use rbac::DynamicRolePolicy;
pub use registry::{ComponentRegistry, Fallback, Registries, RegistryEntry, BUILTIN};
