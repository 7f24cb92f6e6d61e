//! Common types for otelop: CRDs, the collector configuration tree, naming and errors

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod naming;
pub mod port;
pub mod telemetry;
pub mod value;
pub mod yaml;

pub use error::Error;
pub use port::{PortProtocol, ServicePortSpec};
pub use value::{ConfigValue, Lookup, Mapping};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Default port of the collector's own metrics endpoint
pub const DEFAULT_METRICS_PORT: u16 = 8888;

/// Default port of the `health_check` extension
pub const DEFAULT_HEALTH_CHECK_PORT: u16 = 13133;

/// Default path of the `health_check` extension
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";

/// Label key identifying the component that manages a resource
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Label value for resources managed by otelop
pub const LABEL_MANAGED_BY_OTELOP: &str = "opentelemetry-operator";

/// Label key carrying the collector instance (`<namespace>.<name>`)
pub const LABEL_INSTANCE: &str = "app.kubernetes.io/instance";

/// Label key carrying the resource name
pub const LABEL_NAME: &str = "app.kubernetes.io/name";

/// Label key carrying the component kind
pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";

/// Component label value for collector resources
pub const COMPONENT_COLLECTOR: &str = "opentelemetry-collector";
