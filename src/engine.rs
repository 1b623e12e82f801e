use std::collections::HashSet;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::catalog::ActionCatalog;
use crate::error::ExpandError;
use crate::models::{InvalidHandling, Patterns};
use crate::pattern::ActionPattern;

/// The main expansion handle. Cloneable and thread-safe: the catalog is
/// shared read-only behind an `Arc` and never mutated.
#[derive(Clone)]
pub struct ActionExpander {
    catalog: Arc<dyn ActionCatalog>,
}

impl ActionExpander {
    /// Create an expander over an already-shared catalog.
    pub fn new(catalog: Arc<dyn ActionCatalog>) -> Self {
        ActionExpander { catalog }
    }

    /// Create an expander that takes ownership of `catalog`.
    pub fn with_catalog<C: ActionCatalog + 'static>(catalog: C) -> Self {
        ActionExpander {
            catalog: Arc::new(catalog),
        }
    }

    /// Expand one or more patterns into a sorted, deduplicated list of
    /// canonical `Service:Action` strings.
    ///
    /// Patterns resolve in order. A pattern that is malformed, names an
    /// unknown service, or names an unknown action under an existing service
    /// branches on `handling`; with `RaiseError` the whole call fails and any
    /// partial result is discarded. A wildcard that matches nothing is not
    /// invalid and simply contributes nothing.
    pub fn expand<P>(
        &self,
        patterns: P,
        handling: InvalidHandling,
    ) -> Result<Vec<String>, ExpandError>
    where
        P: Into<Patterns>,
    {
        let mut expanded: HashSet<String> = HashSet::new();

        for pattern in patterns.into().into_vec() {
            match self.expand_single(&pattern) {
                Ok(matched) => expanded.extend(matched),
                Err(err) => match handling {
                    InvalidHandling::RaiseError => return Err(err),
                    InvalidHandling::Keep => {
                        warn!(
                            event = "Expand",
                            handling = %handling,
                            pattern = %pattern,
                            "keeping invalid pattern verbatim"
                        );
                        expanded.insert(pattern);
                    }
                    InvalidHandling::Remove => {
                        warn!(
                            event = "Expand",
                            handling = %handling,
                            pattern = %pattern,
                            "dropping invalid pattern"
                        );
                    }
                },
            }
        }

        Ok(expanded.into_iter().sorted().collect())
    }

    /// Every catalog action *except* those matching the patterns, sorted.
    ///
    /// Invalid-pattern handling runs before the universe is enumerated, so
    /// `RaiseError` short-circuits without walking the full catalog.
    pub fn invert<P>(
        &self,
        patterns: P,
        handling: InvalidHandling,
    ) -> Result<Vec<String>, ExpandError>
    where
        P: Into<Patterns>,
    {
        let excluded: HashSet<String> = self.expand(patterns, handling)?.into_iter().collect();

        Ok(self
            .all_actions_set()
            .into_iter()
            .filter(|action| !excluded.contains(action))
            .sorted()
            .collect())
    }

    /// Resolve a single pattern without invalid-target detection: an unknown
    /// service or action yields an empty result, and only malformed pattern
    /// text is an error.
    pub fn resolve(&self, pattern: &str) -> Result<Vec<String>, ExpandError> {
        match self.expand_single(pattern) {
            Ok(matched) => Ok(matched.into_iter().sorted().collect()),
            Err(err) if err.is_unknown_target() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// The full catalog universe as sorted `Service:Action` strings.
    pub fn all_actions(&self) -> Vec<String> {
        self.all_actions_set().into_iter().sorted().collect()
    }

    fn all_actions_set(&self) -> HashSet<String> {
        let mut all = HashSet::new();
        for key in self.catalog.service_keys() {
            for action in self.catalog.actions_for_service(&key) {
                all.insert(format!("{key}:{action}"));
            }
        }
        all
    }

    fn expand_single(&self, pattern: &str) -> Result<HashSet<String>, ExpandError> {
        let parsed = ActionPattern::parse(pattern)?;
        let services = self.target_services(&parsed)?;

        let mut matched = HashSet::new();
        for service in &services {
            for action in self.catalog.actions_for_service(service) {
                if parsed.action().matches(&action) {
                    matched.insert(format!("{service}:{action}"));
                }
            }
        }

        // An exact action name that an existing, exactly-named service does
        // not have. Wildcards that match nothing stay empty without error.
        if matched.is_empty() && parsed.service().is_literal() && parsed.action().is_literal() {
            return Err(ExpandError::unknown(
                pattern,
                format!(
                    "action '{}' not found in service '{}'",
                    parsed.action_part(),
                    parsed.service_part()
                ),
            ));
        }

        debug!(
            event = "Expand",
            pattern = %pattern,
            services = services.len(),
            actions = matched.len()
        );

        Ok(matched)
    }

    /// Resolve the service side to canonical catalog keys. An exact name with
    /// no catalog entry is the unknown-service condition; a wildcard that
    /// selects nothing is just an empty selection.
    fn target_services(&self, parsed: &ActionPattern) -> Result<Vec<String>, ExpandError> {
        // Canonically-cased exact names skip the scan.
        if parsed.service().is_literal() && self.catalog.service_exists(parsed.service_part()) {
            return Ok(vec![parsed.service_part().to_string()]);
        }

        let targets: Vec<String> = self
            .catalog
            .service_keys()
            .into_iter()
            .filter(|key| parsed.service().matches(key))
            .collect();

        if targets.is_empty() && parsed.service().is_literal() {
            return Err(ExpandError::unknown(
                parsed.raw(),
                format!("service '{}' not found", parsed.service_part()),
            ));
        }

        Ok(targets)
    }
}
