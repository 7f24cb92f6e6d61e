//! Manifest builders for OpenTelemetryCollector resources
//!
//! This crate turns a collector CR and the ports inferred from its
//! configuration into the Kubernetes objects that expose it:
//!
//! - **Services**: primary, headless and monitoring Services
//! - **Ingress**: one Ingress with a path per port, or one OpenShift Route per port
//! - **Container**: container ports and the liveness probe
//! - **RBAC**: Roles/ClusterRoles for components that read cluster state
//! - **Compiler**: runs all of the above for one reconciliation pass
//!
//! Builders are pure; applying the objects is the controller's job.

#![deny(missing_docs)]

pub mod compiler;
pub mod container;
pub mod ingress;
pub mod labels;
pub mod rbac;
pub mod route;
pub mod service;

pub use compiler::{CollectorCompiler, CompileError, CompiledCollector, ManifestOptions};
pub use rbac::GeneratedRbac;
pub use route::Route;
