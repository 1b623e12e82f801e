//! Parsing of `service:action` patterns into per-side matchers.

use regex::Regex;

use crate::error::ExpandError;

/// One side of a parsed pattern, lower-cased for matching.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    /// `*` on its own, matches every name.
    Any,
    /// Contains `*`/`?` metacharacters, compiled to an anchored regex.
    Glob(Regex),
    /// No metacharacters, exact match on the lower-cased name.
    Literal(String),
}

impl Matcher {
    fn new(part_lower: &str) -> Self {
        if part_lower == "*" {
            Matcher::Any
        } else if part_lower.contains('*') || part_lower.contains('?') {
            Matcher::Glob(glob_regex(part_lower))
        } else {
            Matcher::Literal(part_lower.to_string())
        }
    }

    /// Match `name` (canonical casing) against this side of the pattern.
    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Glob(re) => re.is_match(&name.to_lowercase()),
            Matcher::Literal(want) => name.to_lowercase() == *want,
        }
    }

    pub(crate) fn is_literal(&self) -> bool {
        matches!(self, Matcher::Literal(_))
    }
}

/// A parsed action pattern: `service:action` or the bare `*`.
#[derive(Debug, Clone)]
pub(crate) struct ActionPattern {
    raw: String,
    service_part: String,
    action_part: String,
    service: Matcher,
    action: Matcher,
}

impl ActionPattern {
    /// Split on the first `:`; both sides must be non-empty after trimming.
    /// The bare `*` stands for `*:*`.
    pub(crate) fn parse(pattern: &str) -> Result<Self, ExpandError> {
        let (service_part, action_part) = if pattern == "*" {
            ("*", "*")
        } else {
            match pattern.split_once(':') {
                None => {
                    return Err(ExpandError::invalid(
                        pattern,
                        "must be 'service:action' or '*'; missing colon",
                    ));
                }
                Some((service, action)) => {
                    if service.trim().is_empty() || action.trim().is_empty() {
                        return Err(ExpandError::invalid(
                            pattern,
                            "service and action parts must both be non-empty",
                        ));
                    }
                    (service, action)
                }
            }
        };

        Ok(ActionPattern {
            raw: pattern.to_string(),
            service: Matcher::new(&service_part.to_lowercase()),
            action: Matcher::new(&action_part.to_lowercase()),
            service_part: service_part.to_string(),
            action_part: action_part.to_string(),
        })
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    /// The service part as written, original casing.
    pub(crate) fn service_part(&self) -> &str {
        &self.service_part
    }

    /// The action part as written, original casing.
    pub(crate) fn action_part(&self) -> &str {
        &self.action_part
    }

    pub(crate) fn service(&self) -> &Matcher {
        &self.service
    }

    pub(crate) fn action(&self) -> &Matcher {
        &self.action
    }
}

/// Translate a glob into an anchored regex: `*` becomes any run of
/// characters, `?` exactly one, everything else is escaped.
fn glob_regex(glob: &str) -> Regex {
    let mut expr = String::with_capacity(glob.len() + 2);
    expr.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => {
                let mut buf = [0u8; 4];
                expr.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            }
        }
    }
    expr.push('$');
    // Every metacharacter above is escaped, so the expression always compiles.
    Regex::new(&expr).expect("escaped glob compiles")
}
