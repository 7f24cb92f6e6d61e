//! Collector configuration document
//!
//! Wraps the decoded configuration tree, checks the handful of sections
//! inference relies on are mappings, and answers which components the
//! pipelines actually use.

use std::collections::BTreeSet;

use otelop_common::yaml::parse_config;
use otelop_common::{ConfigValue, Error, Lookup, Mapping, Result};
use tracing::debug;

use crate::component::ComponentKind;

/// Sections that must be mappings when present
const MAPPING_SECTIONS: &[&str] = &["receivers", "exporters", "extensions", "service"];

/// A decoded collector configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectorConfig {
    root: Mapping,
}

impl CollectorConfig {
    /// Decode a YAML configuration document
    pub fn from_yaml(input: &str) -> Result<Self> {
        Self::from_value(parse_config(input)?)
    }

    /// Wrap an already decoded tree
    ///
    /// An empty document is an empty configuration.
    pub fn from_value(value: ConfigValue) -> Result<Self> {
        let root = match value {
            ConfigValue::Mapping(root) => root,
            ConfigValue::Null => Mapping::new(),
            other => {
                return Err(Error::config(
                    "config",
                    format!("document must be a mapping, got {}", other.kind()),
                ))
            }
        };

        for section in MAPPING_SECTIONS {
            match root.get(*section) {
                None | Some(ConfigValue::Null) | Some(ConfigValue::Mapping(_)) => {}
                Some(other) => {
                    return Err(Error::config(
                        *section,
                        format!("must be a mapping, got {}", other.kind()),
                    ))
                }
            }
        }

        Ok(Self { root })
    }

    /// The whole document
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// A top-level section, if present and a mapping
    pub fn section(&self, name: &str) -> Option<&Mapping> {
        self.root.get(name).and_then(ConfigValue::as_mapping)
    }

    /// `receivers:`
    pub fn receivers(&self) -> Option<&Mapping> {
        self.section("receivers")
    }

    /// `exporters:`
    pub fn exporters(&self) -> Option<&Mapping> {
        self.section("exporters")
    }

    /// `extensions:`
    pub fn extensions(&self) -> Option<&Mapping> {
        self.section("extensions")
    }

    /// `service:`
    pub fn service(&self) -> Option<&Mapping> {
        self.section("service")
    }

    /// Descend from the root through nested mappings
    pub fn path(&self, keys: &[&str]) -> Option<&ConfigValue> {
        let (first, rest) = keys.split_first()?;
        self.root.get(*first)?.path(rest)
    }

    /// Component ids referenced by any pipeline, `None` without `service.pipelines`
    fn pipeline_references(&self, kind: ComponentKind) -> Option<BTreeSet<&str>> {
        let pipelines = self.path(&["service", "pipelines"])?.as_mapping()?;

        let mut referenced = BTreeSet::new();
        for (pipeline, body) in pipelines {
            match body.sequence_field(kind.section_key()) {
                Lookup::Found(ids) => referenced.extend(ids.iter().filter_map(ConfigValue::as_str)),
                Lookup::Missing => {}
                Lookup::WrongType { found, .. } => {
                    debug!(%pipeline, section = kind.section_key(), %found, "ignoring malformed pipeline section");
                }
            }
        }
        Some(referenced)
    }

    /// Components of a kind that take part in the configuration
    ///
    /// With `service.pipelines` present only referenced components count;
    /// without it every configured component does. Pipelines referencing
    /// unknown components are not an error here.
    pub fn enabled_components(&self, kind: ComponentKind) -> Vec<(&str, &ConfigValue)> {
        let Some(section) = self.section(kind.section_key()) else {
            return Vec::new();
        };
        let referenced = self.pipeline_references(kind);

        section
            .iter()
            .filter(|(id, _)| {
                referenced
                    .as_ref()
                    .map_or(true, |set| set.contains(id.as_str()))
            })
            .map(|(id, config)| (id.as_str(), config))
            .collect()
    }
}
