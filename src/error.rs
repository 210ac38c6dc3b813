//! Error types for XMI import and export.

use thiserror::Error;

/// Errors that can occur while loading or saving XMI.
///
/// Only failures at the outer boundary are errors: I/O, XML well-formedness
/// and malformed trees handed to a materializer. Unknown concept types,
/// missing attributes and dangling references are absorbed by the mapping
/// layer and never surface here.
#[derive(Debug, Error)]
pub enum XmiError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing required element or attribute.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid element type or structure.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },
}

impl XmiError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    /// Create a missing element error.
    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "element",
            name: name.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "record",
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for XmiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type for XMI operations.
pub type Result<T> = std::result::Result<T, XmiError>;
