use std::collections::BTreeMap;

/// Read-only view of the known services and their actions.
///
/// The casing of returned keys and names is canonical: matching against the
/// catalog is case-insensitive, but results always use the catalog's casing.
pub trait ActionCatalog: Send + Sync {
    /// Every known service key, in a stable order.
    fn service_keys(&self) -> Vec<String>;

    /// Whether `key` names a known service (canonical casing).
    fn service_exists(&self, key: &str) -> bool;

    /// The action names of `key`, empty when the service is unknown.
    fn actions_for_service(&self, key: &str) -> Vec<String>;
}

/// An immutable in-memory catalog over a `service -> actions` map.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    services: BTreeMap<String, Vec<String>>,
}

impl StaticCatalog {
    pub fn new<I, K, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<A>)>,
        K: Into<String>,
        A: Into<String>,
    {
        let services = entries
            .into_iter()
            .map(|(key, actions)| (key.into(), actions.into_iter().map(Into::into).collect()))
            .collect();
        StaticCatalog { services }
    }

    /// Load a catalog from a JSON object mapping service keys to action lists,
    /// e.g. `{"S3": ["GetObject", "GetBucket"]}`.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let services: BTreeMap<String, Vec<String>> = serde_json::from_str(text)?;
        Ok(StaticCatalog { services })
    }
}

impl ActionCatalog for StaticCatalog {
    fn service_keys(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    fn service_exists(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }

    fn actions_for_service(&self, key: &str) -> Vec<String> {
        self.services.get(key).cloned().unwrap_or_default()
    }
}
