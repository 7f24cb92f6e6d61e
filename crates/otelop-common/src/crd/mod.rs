//! Custom Resource Definitions for otelop
//!
//! This module contains the CRD definitions used by the operator.

mod collector;

pub use collector::{
    CollectorMode, IngressConfig, IngressType, OpenTelemetryCollector, OpenTelemetryCollectorSpec,
    OpenTelemetryCollectorStatus, RouteConfig, TlsRouteTermination, validate_declared_ports,
};
