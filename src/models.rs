use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What to do with a pattern that cannot be resolved: malformed text, an
/// unknown service, or an unknown action under an existing service.
///
/// The policy is chosen per call site; a single document rewrite may use
/// different policies for `Action` and `NotAction`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InvalidHandling {
    /// Propagate the pattern error and discard any partial result.
    #[default]
    RaiseError,
    /// Insert the literal pattern string into the result, unexpanded.
    Keep,
    /// Drop the pattern and continue.
    Remove,
}

/// One or many action patterns, as policy documents write them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    /// Normalize to a sequence.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern],
            Patterns::Many(patterns) => patterns,
        }
    }
}

impl From<&str> for Patterns {
    fn from(pattern: &str) -> Self {
        Patterns::One(pattern.to_string())
    }
}

impl From<String> for Patterns {
    fn from(pattern: String) -> Self {
        Patterns::One(pattern)
    }
}

impl From<Vec<String>> for Patterns {
    fn from(patterns: Vec<String>) -> Self {
        Patterns::Many(patterns)
    }
}

impl From<Vec<&str>> for Patterns {
    fn from(patterns: Vec<&str>) -> Self {
        Patterns::Many(patterns.into_iter().map(str::to_string).collect())
    }
}
