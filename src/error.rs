use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ExpandError {
    /// Pattern text that does not have the `service:action` shape.
    #[error("invalid action pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A well-formed pattern naming a service or action the catalog does not know.
    #[error("invalid action pattern '{pattern}': {reason}")]
    UnknownTarget { pattern: String, reason: String },

    /// A pattern error raised while rewriting a specific policy statement.
    #[error("Statement {index}: {source}")]
    Statement {
        index: usize,
        #[source]
        source: Box<ExpandError>,
    },

    #[error("malformed policy document: {0}")]
    Document(String),

    #[error("invalid JSON policy: {0}")]
    Json(String),
}

impl ExpandError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        ExpandError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(pattern: &str, reason: impl Into<String>) -> Self {
        ExpandError::UnknownTarget {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this is the unknown-service/unknown-action case that the pure
    /// resolver degrades to an empty result.
    pub fn is_unknown_target(&self) -> bool {
        matches!(self, ExpandError::UnknownTarget { .. })
    }
}

impl From<serde_json::Error> for ExpandError {
    fn from(err: serde_json::Error) -> Self {
        ExpandError::Json(err.to_string())
    }
}
