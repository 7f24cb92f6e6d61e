//! Component kinds and type extraction

use std::fmt;

/// Pipeline component kinds of a collector configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Receivers (the only kind that listens by default)
    Receiver,
    /// Exporters
    Exporter,
    /// Processors (no port semantics)
    Processor,
    /// Connectors (no port semantics)
    Connector,
}

impl ComponentKind {
    /// Top-level key of this kind's section, also used inside pipelines
    pub fn section_key(self) -> &'static str {
        match self {
            ComponentKind::Receiver => "receivers",
            ComponentKind::Exporter => "exporters",
            ComponentKind::Processor => "processors",
            ComponentKind::Connector => "connectors",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::Receiver => "receiver",
            ComponentKind::Exporter => "exporter",
            ComponentKind::Processor => "processor",
            ComponentKind::Connector => "connector",
        };
        f.write_str(s)
    }
}

/// Type of a component identifier: everything before the first `/`
///
/// `otlp/2` is an `otlp` receiver; the qualifier only affects naming.
pub fn component_type(id: &str) -> &str {
    match id.split_once('/') {
        Some((ty, _)) => ty,
        None => id,
    }
}
