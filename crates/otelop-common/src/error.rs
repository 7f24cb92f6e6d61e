//! Error types for the otelop operator
//!
//! Errors are structured with fields to aid debugging in production.
//! Each variant carries the context it was raised in (collector name,
//! configuration section) next to the message.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for otelop operations
#[derive(Debug, Error)]
pub enum Error {
    /// The collector configuration document has the wrong shape
    #[error("configuration error in {section}: {message}")]
    Config {
        /// Section of the document that is malformed (e.g., "receivers")
        section: String,
        /// Description of what's wrong
        message: String,
    },

    /// Validation error for CRD specs
    #[error("validation error for {collector}: {message}")]
    Validation {
        /// Name of the collector with invalid configuration
        collector: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.ports[1].name")
        field: Option<String>,
    },

    /// The configuration document could not be decoded
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a configuration-shape error for a document section
    pub fn config(section: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            section: section.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error with the given message
    ///
    /// For simple validation errors without collector context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            collector: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with collector context and field path
    pub fn validation_for_field(
        collector: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            collector: collector.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }
}

impl From<crate::yaml::YamlError> for Error {
    fn from(err: crate::yaml::YamlError) -> Self {
        Error::serialization(err.to_string())
    }
}
