//! Error types for the maybe-path crate
//!
//! Absence is never an error here. The only failure of the core is asking an
//! empty [`Maybe`](crate::Maybe) for its value; the remaining variants belong
//! to the key parser, the request sources and the configuration layer.

use thiserror::Error;

/// Result type alias for maybe-path operations
pub type Result<T> = std::result::Result<T, MaybeError>;

/// Error type for maybe-path operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaybeError {
    /// `get` was called on an absent value
    #[error("No value present: cannot get from an absent value")]
    NoValuePresent,

    /// A textual path key could not be turned into a [`PathKey`](crate::PathKey)
    #[error("Invalid path key: '{key}'")]
    InvalidPathKey {
        /// The rejected key text
        key: String,
    },

    /// A query or form body string could not be decoded
    #[error("Invalid query string: {message}")]
    InvalidQuery {
        /// Human-readable error message
        message: String,
    },

    /// Unknown source precedence name
    #[error("Invalid precedence '{value}', expected 'query' or 'form'")]
    InvalidPrecedence {
        /// The rejected value
        value: String,
    },

    /// JSON document could not be parsed
    #[error("JSON error: {message}")]
    Json {
        /// Message reported by the JSON parser
        message: String,
    },
}

impl MaybeError {
    /// Create an invalid path key error
    pub fn invalid_path_key(key: impl Into<String>) -> Self {
        Self::InvalidPathKey { key: key.into() }
    }

    /// Create an invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create an invalid precedence error
    pub fn invalid_precedence(value: impl Into<String>) -> Self {
        Self::InvalidPrecedence {
            value: value.into(),
        }
    }

    /// Whether this is the error raised by an unchecked `get`
    pub fn is_no_value_present(&self) -> bool {
        matches!(self, Self::NoValuePresent)
    }
}

impl From<serde_json::Error> for MaybeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}
