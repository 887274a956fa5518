//! Process-lifetime owner of the resolved configuration.
//!
//! Readers take a snapshot with [`ConfigStore::current`] and keep it as long as
//! they like. [`ConfigStore::reload`] resolves from scratch and swaps the new
//! value in atomically; a failed reload leaves the current value in place.

use super::loader::ConfigLoader;
use super::resolved::ResolvedConfig;
use super::watcher::WatchPaths;
use crate::error::ConfigResult;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ConfigStore {
    loader: ConfigLoader,
    current: ArcSwap<ResolvedConfig>,
}

impl ConfigStore {
    /// Resolve once and hold the result. Fails if the initial resolution fails.
    pub fn open(loader: ConfigLoader) -> ConfigResult<Self> {
        let resolved = loader.resolve()?;
        Ok(Self::from_resolved(loader, resolved))
    }

    /// Hold an already resolved value; `loader` is used for later reloads.
    pub fn from_resolved(loader: ConfigLoader, resolved: ResolvedConfig) -> Self {
        Self {
            loader,
            current: ArcSwap::from_pointee(resolved),
        }
    }

    /// Snapshot of the current configuration. Lock-free.
    pub fn current(&self) -> Arc<ResolvedConfig> {
        self.current.load_full()
    }

    /// Re-run the full resolution and publish the result.
    pub fn reload(&self) -> ConfigResult<Arc<ResolvedConfig>> {
        info!("Reloading configuration from disk...");
        match self.loader.resolve() {
            Ok(resolved) => {
                let resolved = Arc::new(resolved);
                self.current.store(Arc::clone(&resolved));
                info!("Configuration reloaded successfully");
                Ok(resolved)
            }
            Err(e) => {
                warn!("Config reload failed: {}. Keeping current config.", e);
                Err(e)
            }
        }
    }

    /// The loader used for reloads.
    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    /// Directories worth watching for changes to this store's sources.
    ///
    /// Covers every directory the upward search visits (start directory up to
    /// the root), the home directory and the directories of the files
    /// currently in use. Creating, editing or deleting a file in any of them
    /// can change the search result, so each one triggers a reload.
    pub fn watch_paths(&self) -> WatchPaths {
        let paths = &self.loader.paths;
        let current = self.current();
        let mut dirs: Vec<PathBuf> = Vec::new();

        let mut push = |dir: PathBuf| {
            if !dir.as_os_str().is_empty() && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        };

        for dir in paths.search_dir().ancestors() {
            push(dir.to_path_buf());
        }
        if let Some(ref home) = paths.home_dir {
            push(home.clone());
        }
        for source in [current.main_source(), current.secrets_source()]
            .into_iter()
            .flatten()
        {
            if let Some(parent) = source.path.parent() {
                push(parent.to_path_buf());
            }
        }

        WatchPaths {
            dirs,
            explicit_config: paths.explicit_config.clone(),
            explicit_secrets: paths.explicit_secrets.clone(),
        }
    }
}
