//! Kubernetes API type helpers
//!
//! Rendered objects whose types aren't in `k8s-openapi` (OpenShift Routes)
//! carry their apiVersion/kind as constants through [`HasApiResource`].

/// Types with an apiVersion and kind known at compile time
///
/// # Example
/// ```ignore
/// impl HasApiResource for Route {
///     const API_VERSION: &'static str = "route.openshift.io/v1";
///     const KIND: &'static str = "Route";
/// }
/// ```
pub trait HasApiResource {
    /// Full API version (e.g., "route.openshift.io/v1", "v1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g., "Route")
    const KIND: &'static str;
}
