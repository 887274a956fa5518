//! The immutable result of a resolution.

use super::files::ConfigSource;
use super::types::BelbioSettings;
use crate::error::{ConfigError, ConfigResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Reserved top-level key holding the secrets overlay.
pub const SECRETS_KEY: &str = "secrets";

/// Merged configuration tree plus where it came from.
///
/// There is no way to mutate a `ResolvedConfig` after construction. A reload
/// builds a new one; holders of the old value keep seeing the old tree.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Combined tree: settings namespaces plus `secrets` when an overlay was found.
    tree: Value,
    main_source: Option<ConfigSource>,
    secrets_source: Option<ConfigSource>,
    resolved_at: DateTime<Utc>,
}

impl ResolvedConfig {
    /// Assemble a resolved config from already-merged parts.
    ///
    /// `settings` must be a mapping without a `secrets` key; the loader checks this.
    pub(crate) fn new(
        settings: Value,
        secrets: Option<Value>,
        main_source: Option<ConfigSource>,
        secrets_source: Option<ConfigSource>,
    ) -> Self {
        let mut tree = settings;
        if let (Some(secrets), Value::Object(map)) = (secrets, &mut tree) {
            map.insert(SECRETS_KEY.to_string(), secrets);
        }
        Self {
            tree,
            main_source,
            secrets_source,
            resolved_at: Utc::now(),
        }
    }

    /// The combined tree, with `secrets` beside the normal namespaces.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Look up a dotted key path, e.g. `bel.lang.default_bel_version`.
    ///
    /// Numeric segments index into sequences: `bel.canonical.HGNC.0`.
    /// Returns `None` when any segment is missing.
    pub fn get(&self, key_path: &str) -> Option<&Value> {
        lookup(&self.tree, key_path)
    }

    /// Look up and deserialize a value. `Ok(None)` when the key is missing.
    pub fn get_as<T: DeserializeOwned>(&self, key_path: &str) -> ConfigResult<Option<T>> {
        match self.get(key_path) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::invalid_value(key_path, e)),
            None => Ok(None),
        }
    }

    /// Look up and deserialize a value that must be present.
    pub fn require<T: DeserializeOwned>(&self, key_path: &str) -> ConfigResult<T> {
        self.get_as(key_path)?
            .ok_or_else(|| ConfigError::missing_key(key_path))
    }

    /// Whole subtree for a namespace, e.g. everything under `bel_resources`.
    pub fn section(&self, namespace: &str) -> Option<&Value> {
        self.get(namespace)
    }

    /// Deserialize a whole namespace into a typed struct.
    pub fn section_as<T: DeserializeOwned>(&self, namespace: &str) -> ConfigResult<T> {
        self.require(namespace)
    }

    /// The secrets overlay, if one was found.
    pub fn secrets(&self) -> Option<&Value> {
        self.tree.get(SECRETS_KEY)
    }

    /// Look up a key path inside the secrets overlay only.
    pub fn secret(&self, key_path: &str) -> Option<&Value> {
        self.secrets().and_then(|secrets| lookup(secrets, key_path))
    }

    /// The tree without the secrets overlay.
    pub fn settings(&self) -> Value {
        let mut settings = self.tree.clone();
        if let Value::Object(map) = &mut settings {
            map.remove(SECRETS_KEY);
        }
        settings
    }

    /// Read a credential: the secret at `secrets.<key_path>` when it is set and
    /// non-empty, otherwise the plain setting at `key_path`.
    pub fn credential(&self, key_path: &str) -> Option<&Value> {
        match self.secret(key_path) {
            Some(value) if !is_blank(value) => Some(value),
            _ => self.get(key_path),
        }
    }

    /// Typed view of the BEL namespaces.
    pub fn settings_typed(&self) -> ConfigResult<BelbioSettings> {
        serde_json::from_value(self.settings()).map_err(|e| ConfigError::invalid_value("", e))
    }

    /// The `logging` section, passed through untouched.
    pub fn logging(&self) -> Option<&Value> {
        self.section("logging")
    }

    /// The main configuration file used, or `None` for defaults only.
    pub fn main_source(&self) -> Option<&ConfigSource> {
        self.main_source.as_ref()
    }

    /// The secrets file used, if any.
    pub fn secrets_source(&self) -> Option<&ConfigSource> {
        self.secrets_source.as_ref()
    }

    /// When this value was built.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

/// Walk a dotted key path through mappings and sequences.
pub fn lookup<'a>(root: &'a Value, key_path: &str) -> Option<&'a Value> {
    if key_path.is_empty() {
        return Some(root);
    }
    key_path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
