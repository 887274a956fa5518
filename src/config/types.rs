//! Typed views over the resolved configuration tree.
//!
//! These cover the namespaces the BEL toolkit reads directly. Keys not modeled
//! here stay reachable through the untyped tree on [`super::ResolvedConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level typed settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BelbioSettings {
    #[serde(default)]
    pub bel: BelSettings,

    #[serde(default)]
    pub bel_api: BelApiSettings,

    #[serde(default)]
    pub bel_resources: BelResourcesSettings,
}

/// `bel` namespace: language and canonicalization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BelSettings {
    #[serde(default)]
    pub lang: LangSettings,

    /// Namespace prefix to ordered fallback prefixes for canonicalization.
    #[serde(default)]
    pub canonical: BTreeMap<String, Vec<String>>,

    /// Namespace prefix to ordered preferred prefixes for decanonicalization.
    #[serde(default)]
    pub decanonical: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub nanopub: NanopubSettings,

    #[serde(default)]
    pub edges: EdgeSettings,
}

impl BelSettings {
    /// Fallback prefixes for canonicalizing `prefix`, empty if none configured.
    pub fn canonical_targets(&self, prefix: &str) -> &[String] {
        self.canonical.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Preferred prefixes for decanonicalizing `prefix`, empty if none configured.
    pub fn decanonical_targets(&self, prefix: &str) -> &[String] {
        self.decanonical.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `bel.lang` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangSettings {
    /// BEL language version used when a caller does not name one.
    #[serde(default = "default_bel_version")]
    pub default_bel_version: String,

    /// Directory holding the BEL specification files.
    #[serde(default = "default_specifications_dir")]
    pub specifications: String,

    /// Whether specifications are refreshed from GitHub.
    #[serde(default = "default_true")]
    pub specification_github_repo: bool,
}

impl Default for LangSettings {
    fn default() -> Self {
        Self {
            default_bel_version: default_bel_version(),
            specifications: default_specifications_dir(),
            specification_github_repo: true,
        }
    }
}

fn default_bel_version() -> String {
    "2.0.0".to_string()
}

fn default_specifications_dir() -> String {
    "bel/lang/versions".to_string()
}

fn default_true() -> bool {
    true
}

/// `bel.nanopub` settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NanopubSettings {
    /// URI of the nanopub JSON schema.
    #[serde(default)]
    pub schema_uri: Option<String>,
}

/// `bel.edges` settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSettings {
    /// Computed edge rules to emit. Empty means all.
    #[serde(default)]
    pub edge_rules: Vec<String>,
}

/// `bel_api` namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BelApiSettings {
    #[serde(default)]
    pub authenticated: bool,

    #[serde(default)]
    pub servers: ServerSettings,
}

/// `bel_api.servers` endpoints.
///
/// Credential fields are normally empty here and supplied by the secrets
/// overlay; read them through [`super::ResolvedConfig::credential`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_elasticsearch")]
    pub elasticsearch: String,

    #[serde(default = "default_arangodb_protocol")]
    pub arangodb_protocol: String,

    #[serde(default = "default_arangodb_host")]
    pub arangodb_host: String,

    #[serde(default = "default_arangodb_port")]
    pub arangodb_port: u16,

    #[serde(default)]
    pub arangodb_username: String,

    #[serde(default)]
    pub arangodb_password: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            elasticsearch: default_elasticsearch(),
            arangodb_protocol: default_arangodb_protocol(),
            arangodb_host: default_arangodb_host(),
            arangodb_port: default_arangodb_port(),
            arangodb_username: String::new(),
            arangodb_password: String::new(),
        }
    }
}

impl ServerSettings {
    /// Base URL of the graph database, e.g. `http://localhost:8529`.
    pub fn arangodb_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.arangodb_protocol, self.arangodb_host, self.arangodb_port
        )
    }
}

fn default_api_url() -> String {
    "http://localhost:8181".to_string()
}

fn default_elasticsearch() -> String {
    "http://localhost:9200".to_string()
}

fn default_arangodb_protocol() -> String {
    "http".to_string()
}

fn default_arangodb_host() -> String {
    "localhost".to_string()
}

fn default_arangodb_port() -> u16 {
    8529
}

/// `bel_resources` namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BelResourcesSettings {
    /// Taxonomy ids to keep when building namespaces, e.g. `TAX:9606`.
    #[serde(default)]
    pub species_list: Vec<String>,

    /// Days between refreshes of downloaded resources.
    #[serde(default = "default_update_cycle_days")]
    pub update_cycle_days: u32,

    /// Logical location name to relative or absolute path.
    #[serde(default)]
    pub file_locations: BTreeMap<String, String>,

    /// Source feed tables keyed by short code.
    #[serde(default)]
    pub openbel: OpenbelSources,
}

impl Default for BelResourcesSettings {
    fn default() -> Self {
        Self {
            species_list: Vec::new(),
            update_cycle_days: default_update_cycle_days(),
            file_locations: BTreeMap::new(),
            openbel: OpenbelSources::default(),
        }
    }
}

impl BelResourcesSettings {
    /// Path configured for a logical location name.
    pub fn file_location(&self, name: &str) -> Option<&str> {
        self.file_locations.get(name).map(String::as_str)
    }
}

fn default_update_cycle_days() -> u32 {
    7
}

/// `bel_resources.openbel` source URL tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenbelSources {
    #[serde(default)]
    pub openbel_annotation_sources: BTreeMap<String, String>,

    #[serde(default)]
    pub openbel_namespace_sources: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tree_uses_field_defaults() {
        let settings: BelbioSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings.bel.lang.default_bel_version, "2.0.0");
        assert!(settings.bel.lang.specification_github_repo);
        assert_eq!(settings.bel_api.servers.arangodb_port, 8529);
        assert_eq!(settings.bel_resources.update_cycle_days, 7);
    }

    #[test]
    fn test_canonical_targets() {
        let settings: BelSettings = serde_json::from_value(json!({
            "canonical": {"HGNC": ["EG", "SP"]},
            "decanonical": {"EG": ["HGNC"]}
        }))
        .unwrap();
        assert_eq!(settings.canonical_targets("HGNC"), ["EG", "SP"]);
        assert!(settings.canonical_targets("MGI").is_empty());
        assert_eq!(settings.decanonical_targets("EG"), ["HGNC"]);
    }

    #[test]
    fn test_arangodb_url() {
        let servers: ServerSettings = serde_json::from_value(json!({
            "arangodb_protocol": "https",
            "arangodb_host": "arango.example.org",
            "arangodb_port": 443
        }))
        .unwrap();
        assert_eq!(servers.arangodb_url(), "https://arango.example.org:443");
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result: Result<BelResourcesSettings, _> =
            serde_json::from_value(json!({"update_cycle_days": "weekly"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_location_lookup() {
        let resources: BelResourcesSettings = serde_json::from_value(json!({
            "file_locations": {"downloads": "../downloads"}
        }))
        .unwrap();
        assert_eq!(resources.file_location("downloads"), Some("../downloads"));
        assert_eq!(resources.file_location("missing"), None);
    }
}
