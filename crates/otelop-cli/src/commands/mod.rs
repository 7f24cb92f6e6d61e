//! CLI commands
//!
//! Each command returns the text it would print so it can be exercised
//! without capturing stdout.

use clap::ValueEnum;
use serde::Serialize;

use crate::Result;

pub mod crd;
pub mod ports;
pub mod rbac;
pub mod render;

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Serialize a single value
    pub fn serialize<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(value)?;
                out.push('\n');
                Ok(out)
            }
        }
    }

    /// Serialize a list of objects as separate documents
    ///
    /// YAML output is a multi-document stream; JSON output is an array.
    pub fn serialize_documents<T: Serialize>(self, values: &[T]) -> Result<String> {
        match self {
            OutputFormat::Yaml => {
                let mut out = String::new();
                for value in values {
                    out.push_str("---\n");
                    out.push_str(&serde_yaml::to_string(value)?);
                }
                Ok(out)
            }
            OutputFormat::Json => self.serialize(&values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_documents_are_separated() {
        let docs = OutputFormat::Yaml
            .serialize_documents(&[serde_json::json!({"a": 1}), serde_json::json!({"b": 2})])
            .unwrap();
        assert_eq!(docs, "---\na: 1\n---\nb: 2\n");
    }

    #[test]
    fn test_json_documents_are_an_array() {
        let docs = OutputFormat::Json
            .serialize_documents(&[serde_json::json!({"a": 1})])
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&docs).unwrap();
        assert_eq!(parsed, serde_json::json!([{"a": 1}]));
    }

    #[test]
    fn test_empty_document_list() {
        assert_eq!(OutputFormat::Yaml.serialize_documents::<u8>(&[]).unwrap(), "");
    }
}
