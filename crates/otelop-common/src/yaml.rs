//! YAML decoding of raw collector configuration using yaml-rust2
//!
//! The collector CR carries its pipeline configuration as an opaque string.
//! It is decoded into a [`ConfigValue`] tree on every reconciliation pass and
//! never cached.

use tracing::debug;
use yaml_rust2::{Yaml, YamlLoader};

use crate::value::{ConfigValue, Mapping};

/// Error type for YAML parsing
#[derive(Debug, Clone)]
pub struct YamlError(String);

impl std::fmt::Display for YamlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for YamlError {}

/// Parse a YAML string into a configuration tree.
///
/// For multi-document YAML, returns only the first document.
/// Returns `ConfigValue::Null` for empty input.
pub fn parse_config(input: &str) -> Result<ConfigValue, YamlError> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| YamlError(e.to_string()))?;
    if docs.len() > 1 {
        debug!(documents = docs.len(), "ignoring all but the first YAML document");
    }
    match docs.into_iter().next() {
        Some(doc) => yaml_to_value(doc),
        None => Ok(ConfigValue::Null),
    }
}

/// Convert a yaml_rust2::Yaml node into a configuration tree node
///
/// Scalar mapping keys are coerced to strings the way the collector itself
/// reads them (`8080: x` keys the string "8080").
fn yaml_to_value(yaml: Yaml) -> Result<ConfigValue, YamlError> {
    // `.inf`, `-.inf` and `.nan` are floats to YAML but not to `str::parse`
    match yaml {
        real @ Yaml::Real(_) => real
            .as_f64()
            .map(ConfigValue::Float)
            .ok_or_else(|| YamlError("invalid float literal".to_string())),
        Yaml::Null => Ok(ConfigValue::Null),
        Yaml::Boolean(b) => Ok(ConfigValue::Bool(b)),
        Yaml::Integer(i) => Ok(ConfigValue::Integer(i)),
        Yaml::String(s) => Ok(ConfigValue::String(s)),
        Yaml::Array(arr) => arr
            .into_iter()
            .map(yaml_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigValue::Sequence),
        Yaml::Hash(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = match k {
                    Yaml::String(s) => s,
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Real(r) => r,
                    Yaml::Boolean(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    _ => return Err(YamlError("unsupported YAML key type".to_string())),
                };
                yaml_to_value(v).map(|v| (key, v))
            })
            .collect::<Result<Mapping, _>>()
            .map(ConfigValue::Mapping),
        Yaml::Alias(_) => Err(YamlError("unresolved YAML alias".to_string())),
        Yaml::BadValue => Err(YamlError("bad YAML value".to_string())),
    }
}
