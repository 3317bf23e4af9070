//! Configuration for request sources

use crate::error::MaybeError;
use serde::{Deserialize, Serialize};

/// Which request source wins when both bind the same path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precedence {
    /// Query string first, form body as fallback
    #[default]
    #[serde(rename = "query")]
    QueryFirst,
    /// Form body first, query string as fallback
    #[serde(rename = "form")]
    FormFirst,
}

impl std::fmt::Display for Precedence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precedence::QueryFirst => write!(f, "query"),
            Precedence::FormFirst => write!(f, "form"),
        }
    }
}

impl std::str::FromStr for Precedence {
    type Err = MaybeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "query" | "get" => Ok(Precedence::QueryFirst),
            "form" | "post" => Ok(Precedence::FormFirst),
            _ => Err(MaybeError::invalid_precedence(s)),
        }
    }
}

/// Settings for building [`RequestSources`](crate::RequestSources)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Precedence used by `RequestSources::preferred`
    pub precedence: Precedence,
    /// Fill the server source from the process environment
    pub include_environment: bool,
}

impl SourcesConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request precedence
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Enable or disable the environment-backed server source
    pub fn with_environment(mut self, include: bool) -> Self {
        self.include_environment = include;
        self
    }

    /// Load a configuration from JSON, filling missing fields with defaults
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
