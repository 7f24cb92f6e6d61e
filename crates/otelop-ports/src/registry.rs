//! Component registries
//!
//! A registry maps a component type to the way its parser is built. It is
//! filled once at startup and only read afterwards, so a single instance can
//! serve any number of concurrent inference calls.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use otelop_common::ConfigValue;
use tracing::trace;

use crate::component::{component_type, ComponentKind};
use crate::descriptor::ParserDescriptor;
use crate::parser::{ComponentParser, DescriptorParser, NoPortsParser};
use crate::{exporters, receivers};

/// Builds a parser for one component entry
pub type ParserBuilder = for<'a> fn(&'a str, &'a ConfigValue) -> Box<dyn ComponentParser + 'a>;

/// How a registered component type is parsed
#[derive(Clone)]
pub enum RegistryEntry {
    /// Table-driven parser
    Descriptor(Arc<ParserDescriptor>),
    /// Hand-written parser
    Custom(ParserBuilder),
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEntry::Descriptor(desc) => f.debug_tuple("Descriptor").field(desc).finish(),
            RegistryEntry::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Parser used for component types nobody registered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// One port if an endpoint is configured, none otherwise
    GenericSinglePort,
    /// Never any ports
    NoPorts,
}

/// Registry of parsers for one component kind
#[derive(Debug)]
pub struct ComponentRegistry {
    kind: ComponentKind,
    entries: HashMap<String, RegistryEntry>,
    fallback: Fallback,
    generic: ParserDescriptor,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new(kind: ComponentKind, fallback: Fallback) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            fallback,
            generic: ParserDescriptor::single_without_default(),
        }
    }

    /// Component kind this registry serves
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Register a table-driven component type (last registration wins)
    pub fn register(&mut self, component_type: impl Into<String>, descriptor: ParserDescriptor) {
        self.entries.insert(
            component_type.into(),
            RegistryEntry::Descriptor(Arc::new(descriptor)),
        );
    }

    /// Register a hand-written parser (last registration wins)
    pub fn register_custom(&mut self, component_type: impl Into<String>, builder: ParserBuilder) {
        self.entries
            .insert(component_type.into(), RegistryEntry::Custom(builder));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, component_type: impl Into<String>, descriptor: ParserDescriptor) -> Self {
        self.register(component_type, descriptor);
        self
    }

    /// Builder-style [`register_custom`](Self::register_custom)
    pub fn with_custom(mut self, component_type: impl Into<String>, builder: ParserBuilder) -> Self {
        self.register_custom(component_type, builder);
        self
    }

    /// Entry registered for a component type
    pub fn get(&self, component_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(component_type)
    }

    /// True if the type of `id` has a registered parser
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(component_type(id))
    }

    /// True if the type of `id` is registered as pull-only
    pub fn is_scraper(&self, id: &str) -> bool {
        matches!(
            self.get(component_type(id)),
            Some(RegistryEntry::Descriptor(desc)) if desc.is_scraper()
        )
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the parser for the component `name`
    pub fn parser<'a>(&'a self, name: &'a str, config: &'a ConfigValue) -> Box<dyn ComponentParser + 'a> {
        match self.get(component_type(name)) {
            Some(RegistryEntry::Descriptor(desc)) => Box::new(DescriptorParser::new(name, config, desc)),
            Some(RegistryEntry::Custom(builder)) => builder(name, config),
            None => {
                trace!(kind = %self.kind, component = %name, fallback = ?self.fallback, "unregistered component type");
                match self.fallback {
                    Fallback::GenericSinglePort => {
                        Box::new(DescriptorParser::new(name, config, &self.generic))
                    }
                    Fallback::NoPorts => Box::new(NoPortsParser::new(name)),
                }
            }
        }
    }
}

/// Receiver and exporter registries
#[derive(Debug)]
pub struct Registries {
    /// Receivers
    pub receivers: ComponentRegistry,
    /// Exporters
    pub exporters: ComponentRegistry,
}

impl Registries {
    /// Registries with every built-in component type
    pub fn builtin() -> Self {
        Self {
            receivers: receivers::builtin(),
            exporters: exporters::builtin(),
        }
    }

    /// Registry for a component kind (processors and connectors have none)
    pub fn for_kind(&self, kind: ComponentKind) -> Option<&ComponentRegistry> {
        match kind {
            ComponentKind::Receiver => Some(&self.receivers),
            ComponentKind::Exporter => Some(&self.exporters),
            ComponentKind::Processor | ComponentKind::Connector => None,
        }
    }
}

/// Process-wide built-in registries
pub static BUILTIN: LazyLock<Registries> = LazyLock::new(Registries::builtin);
