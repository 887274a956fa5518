//! Configuration loader: locate, parse, merge.
//!
//! Resolution takes the compiled-in defaults, deep-merges at most one main
//! configuration file on top, then places the secrets file (if any) under the
//! reserved `secrets` key.

use super::defaults::{DEFAULTS_LABEL, default_tree};
use super::files::{ConfigSource, FileRole, SourceKind};
use super::merge::deep_merge_all;
use super::resolved::{ResolvedConfig, SECRETS_KEY};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::{
    Candidate, MAIN_FILE_NAMES, SECRETS_FILE_NAMES, SearchNames, absolutize, candidate_paths,
    find_first,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Explicit main configuration file; bypasses the search.
pub const CONFIG_PATH_ENV: &str = "BELBIO_CONF";
/// Explicit secrets file; bypasses the search.
pub const SECRETS_PATH_ENV: &str = "BELBIO_SECRETS";
/// Directory searched for the hidden dotfiles instead of the user's home.
pub const HOME_DIR_ENV: &str = "BELBIO_HOME";

/// Where to look for configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Directory where the upward search starts
    pub search_start_dir: PathBuf,
    /// Directory holding `.belbio_conf` / `.belbio_secrets`
    pub home_dir: Option<PathBuf>,
    /// Main configuration file named by the operator
    pub explicit_config: Option<PathBuf>,
    /// Secrets file named by the operator
    pub explicit_secrets: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from the environment, the working directory and the home directory.
    pub fn discover() -> Self {
        let search_start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        // Home dir: BELBIO_HOME or the user's home
        let home_dir = std::env::var_os(HOME_DIR_ENV)
            .map(PathBuf::from)
            .or_else(dirs::home_dir);

        let explicit_config = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let explicit_secrets = std::env::var_os(SECRETS_PATH_ENV).map(PathBuf::from);

        Self {
            search_start_dir,
            home_dir,
            explicit_config,
            explicit_secrets,
        }
    }

    /// Create paths with explicit directories and no environment lookups.
    pub fn with_dirs(search_start_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            search_start_dir: search_start_dir.into(),
            home_dir,
            explicit_config: None,
            explicit_secrets: None,
        }
    }

    /// Use this main configuration file instead of searching.
    pub fn with_explicit_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_config = Some(path.into());
        self
    }

    /// Use this secrets file instead of searching.
    pub fn with_explicit_secrets(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_secrets = Some(path.into());
        self
    }

    fn names(role: FileRole) -> &'static SearchNames {
        match role {
            FileRole::Main => &MAIN_FILE_NAMES,
            FileRole::Secrets => &SECRETS_FILE_NAMES,
        }
    }

    fn explicit(&self, role: FileRole) -> Option<&Path> {
        match role {
            FileRole::Main => self.explicit_config.as_deref(),
            FileRole::Secrets => self.explicit_secrets.as_deref(),
        }
    }

    /// The search start directory, made absolute against the working directory.
    pub fn search_dir(&self) -> PathBuf {
        if self.search_start_dir.is_absolute() {
            self.search_start_dir.clone()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => absolutize(&self.search_start_dir, &cwd),
                Err(_) => self.search_start_dir.clone(),
            }
        }
    }

    /// Ordered search candidates for a role (ignores explicit overrides).
    pub fn candidates(&self, role: FileRole) -> Vec<Candidate> {
        candidate_paths(&self.search_dir(), self.home_dir.as_deref(), Self::names(role))
    }

    /// Locate the file to use for a role, if any.
    ///
    /// An explicit path is returned as-is, whether or not it exists; loading
    /// it reports the I/O error.
    pub fn locate(&self, role: FileRole) -> Option<ConfigSource> {
        self.locate_with(role, |p| p.is_file())
    }

    /// Like [`locate`](Self::locate) with an injected existence check.
    pub fn locate_with<F>(&self, role: FileRole, exists: F) -> Option<ConfigSource>
    where
        F: Fn(&Path) -> bool,
    {
        if let Some(path) = self.explicit(role) {
            return Some(ConfigSource::new(SourceKind::Explicit, role, path));
        }
        let candidates = self.candidates(role);
        find_first(&candidates, exists).map(|c| ConfigSource::new(c.kind, role, &c.path))
    }

    /// Describe the search for a role: every candidate and whether it exists.
    pub fn report(&self, role: FileRole) -> SearchReport {
        let candidates = self
            .candidates(role)
            .into_iter()
            .map(|candidate| {
                let exists = candidate.path.is_file();
                (candidate, exists)
            })
            .collect();
        SearchReport {
            role,
            explicit: self.explicit(role).map(Path::to_path_buf),
            candidates,
            selected: self.locate(role),
        }
    }
}

/// Result of examining the candidate paths for one role.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub role: FileRole,
    pub explicit: Option<PathBuf>,
    pub candidates: Vec<(Candidate, bool)>,
    pub selected: Option<ConfigSource>,
}

/// Configuration loader bound to a set of paths and a defaults tree.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each source
    pub paths: ConfigPaths,
    /// Base layer
    defaults: Value,
}

impl ConfigLoader {
    /// Loader over discovered paths and the compiled-in defaults.
    pub fn discover() -> ConfigResult<Self> {
        Self::with_paths(ConfigPaths::discover())
    }

    /// Loader over explicit paths and the compiled-in defaults.
    pub fn with_paths(paths: ConfigPaths) -> ConfigResult<Self> {
        Ok(Self::new(paths, default_tree()?))
    }

    /// Loader over explicit paths and a caller-supplied defaults tree.
    pub fn new(paths: ConfigPaths, defaults: Value) -> Self {
        Self { paths, defaults }
    }

    /// The defaults layer.
    pub fn defaults(&self) -> &Value {
        &self.defaults
    }

    /// Run a full resolution from scratch.
    pub fn resolve(&self) -> ConfigResult<ResolvedConfig> {
        check_layer_shape(&self.defaults, DEFAULTS_LABEL)?;

        let main_source = self.paths.locate(FileRole::Main);
        let mut layers = vec![(DEFAULTS_LABEL.to_string(), self.defaults.clone())];
        if let Some(ref source) = main_source {
            let layer = source.load()?;
            let label = source.label();
            check_layer_shape(&layer, &label)?;
            layers.push((label, layer));
        } else {
            debug!("No config file found; using defaults only");
        }

        let settings = deep_merge_all(
            layers
                .iter()
                .map(|(label, layer)| (label.as_str(), layer.clone())),
        )?;

        let secrets_source = self.paths.locate(FileRole::Secrets);
        let secrets = match secrets_source {
            Some(ref source) => Some(source.load()?),
            None => {
                debug!("No secrets file found");
                None
            }
        };

        info!(
            config = %source_display(main_source.as_ref()),
            secrets = %source_display(secrets_source.as_ref()),
            "Configuration resolved"
        );

        Ok(ResolvedConfig::new(
            settings,
            secrets,
            main_source,
            secrets_source,
        ))
    }
}

/// Resolve configuration starting the upward search at `search_start_dir`.
///
/// `home_override_path` replaces the user's home directory for the dotfile
/// fallback. `defaults` is the base layer.
pub fn resolve(
    search_start_dir: &Path,
    home_override_path: Option<&Path>,
    defaults: Value,
) -> ConfigResult<ResolvedConfig> {
    let home_dir = home_override_path
        .map(Path::to_path_buf)
        .or_else(dirs::home_dir);
    ConfigLoader::new(ConfigPaths::with_dirs(search_start_dir, home_dir), defaults).resolve()
}

/// A non-secrets layer must be a mapping and must not define `secrets`.
fn check_layer_shape(layer: &Value, label: &str) -> ConfigResult<()> {
    match layer {
        Value::Object(map) if map.contains_key(SECRETS_KEY) => Err(ConfigError::ReservedKey {
            key: SECRETS_KEY.to_string(),
            source_name: label.to_string(),
        }),
        Value::Object(_) => Ok(()),
        _ => Err(ConfigError::invalid_value(
            "",
            format!("{label} must be a mapping"),
        )),
    }
}

fn source_display(source: Option<&ConfigSource>) -> String {
    source
        .map(|s| s.path.display().to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// An empty tree, handy as a defaults layer in tests and tools.
pub fn empty_tree() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    /// Temp dir whose ancestors hold no config file the upward search could pick up.
    fn isolated_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        for dir in temp.path().ancestors().skip(1) {
            for name in MAIN_FILE_NAMES.project.iter().chain(SECRETS_FILE_NAMES.project) {
                let stray = dir.join(name);
                assert!(
                    !stray.exists(),
                    "{} would shadow test fixtures; remove it",
                    stray.display()
                );
            }
        }
        temp
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_locate_with_explicit_ignores_search() {
        let paths = ConfigPaths::with_dirs("/work", None).with_explicit_config("/etc/bel.yaml");
        let source = paths.locate_with(FileRole::Main, |_| true).unwrap();
        assert_eq!(source.kind, SourceKind::Explicit);
        assert_eq!(source.path, PathBuf::from("/etc/bel.yaml"));
        // Secrets still searched
        let secrets = paths.locate_with(FileRole::Secrets, |_| false);
        assert!(secrets.is_none());
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = isolated_dir();
        let start = temp.path().join("project");
        std::fs::create_dir_all(&start).unwrap();

        let defaults = json!({"bel": {"lang": {"default_bel_version": "2.0.0"}}});
        let loader = ConfigLoader::new(
            ConfigPaths::with_dirs(&start, Some(temp.path().join("home"))),
            defaults.clone(),
        );
        let resolved = loader.resolve().unwrap();
        assert_eq!(resolved.tree(), &defaults);
        assert!(resolved.secrets().is_none());
        assert!(resolved.main_source().is_none());
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = isolated_dir();
        let project = temp.path().join("project");
        write(
            &project.join("belbio_conf.yaml"),
            "bel:\n  lang:\n    specification_github_repo: false\n",
        );

        let loader = ConfigLoader::new(
            ConfigPaths::with_dirs(&project, Some(temp.path().join("home"))),
            json!({"bel": {"lang": {"default_bel_version": "2.0.0"}}}),
        );
        let resolved = loader.resolve().unwrap();
        assert_eq!(
            resolved.tree(),
            &json!({"bel": {"lang": {
                "default_bel_version": "2.0.0",
                "specification_github_repo": false
            }}})
        );
        assert_eq!(resolved.main_source().unwrap().kind, SourceKind::Project);
    }

    #[test]
    fn test_reserved_key_in_main_file_rejected() {
        let temp = isolated_dir();
        write(
            &temp.path().join("belbio_conf.yaml"),
            "secrets:\n  bel_api:\n    token: abc\n",
        );
        let loader = ConfigLoader::new(ConfigPaths::with_dirs(temp.path(), None), empty_tree());
        let err = loader.resolve().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReservedKey);
    }

    #[test]
    fn test_reserved_key_in_defaults_rejected() {
        let temp = isolated_dir();
        let loader = ConfigLoader::new(
            ConfigPaths::with_dirs(temp.path(), None),
            json!({"secrets": {}}),
        );
        assert_eq!(loader.resolve().unwrap_err().code(), ErrorCode::ReservedKey);
    }

    #[test]
    fn test_compiled_defaults_loader() {
        let temp = isolated_dir();
        let loader =
            ConfigLoader::with_paths(ConfigPaths::with_dirs(temp.path(), None)).unwrap();
        let resolved = loader.resolve().unwrap();
        assert_eq!(
            resolved.get("bel.lang.default_bel_version"),
            Some(&json!("2.0.0"))
        );
    }

    #[test]
    fn test_report_marks_existing_candidates() {
        let temp = isolated_dir();
        let project = temp.path().join("a").join("b");
        std::fs::create_dir_all(&project).unwrap();
        write(&temp.path().join("a").join("belbio_conf.yml"), "bel: {}\n");

        let report = ConfigPaths::with_dirs(&project, None).report(FileRole::Main);
        let found: Vec<_> = report
            .candidates
            .iter()
            .filter(|(_, exists)| *exists)
            .collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].0.path.ends_with("a/belbio_conf.yml"));
        assert_eq!(
            report.selected.unwrap().path,
            temp.path().join("a").join("belbio_conf.yml")
        );
    }
}
