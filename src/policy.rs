//! Rewriting of policy documents: every statement's `Action`/`NotAction`
//! is replaced by its expansion.

use serde_json::Value;
use tracing::debug;

use crate::engine::ActionExpander;
use crate::error::ExpandError;
use crate::models::{InvalidHandling, Patterns};

impl ActionExpander {
    /// Rewrite a policy document, replacing each statement's `Action` and
    /// `NotAction` value with its sorted expansion.
    ///
    /// `document.Statement` must be an array, and each statement's action
    /// fields must be a string or an array of strings; anything else is a
    /// fatal document error naming the statement index and field. All other
    /// content passes through untouched, in its original order. The input
    /// value is never mutated.
    ///
    /// Pattern errors surfaced under `RaiseError` are wrapped with the
    /// offending statement's index.
    pub fn expand_policy_actions(
        &self,
        document: &Value,
        action_handling: InvalidHandling,
        not_action_handling: InvalidHandling,
    ) -> Result<Value, ExpandError> {
        let mut rewritten = document.clone();

        let statements = match rewritten.get_mut("Statement") {
            None => {
                return Err(ExpandError::Document("missing 'Statement' key".to_string()));
            }
            Some(Value::Array(statements)) => statements,
            Some(_) => {
                return Err(ExpandError::Document(
                    "'Statement' value must be a list".to_string(),
                ));
            }
        };

        for (index, statement) in statements.iter_mut().enumerate() {
            self.rewrite_field(statement, index, "Action", action_handling)?;
            self.rewrite_field(statement, index, "NotAction", not_action_handling)?;
        }

        Ok(rewritten)
    }

    fn rewrite_field(
        &self,
        statement: &mut Value,
        index: usize,
        field: &str,
        handling: InvalidHandling,
    ) -> Result<(), ExpandError> {
        let Some(value) = statement.get(field) else {
            return Ok(());
        };

        let patterns = patterns_from_value(value, index, field)?;
        let expanded = self
            .expand(patterns, handling)
            .map_err(|err| ExpandError::Statement {
                index,
                source: Box::new(err),
            })?;

        debug!(
            event = "Rewrite",
            statement = index,
            field,
            actions = expanded.len()
        );
        statement[field] = Value::Array(expanded.into_iter().map(Value::String).collect());
        Ok(())
    }
}

/// Validate the string-or-list-of-strings shape of an action field.
fn patterns_from_value(value: &Value, index: usize, field: &str) -> Result<Patterns, ExpandError> {
    match value {
        Value::String(pattern) => Ok(Patterns::One(pattern.clone())),
        Value::Array(items) => {
            let mut patterns = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(pattern) => patterns.push(pattern.clone()),
                    _ => return Err(shape_error(index, field)),
                }
            }
            Ok(Patterns::Many(patterns))
        }
        _ => Err(shape_error(index, field)),
    }
}

fn shape_error(index: usize, field: &str) -> ExpandError {
    ExpandError::Document(format!(
        "Statement {index}: '{field}' must be a string or list of strings"
    ))
}
