//! File watcher for configuration and secrets files.
//!
//! Watches the directories where configuration files live (non-recursively)
//! and emits change events through a tokio watch channel. Uses debouncing to
//! coalesce rapid file changes, e.g. editors writing via a temp file.

use super::files::FileRole;
use crate::paths::{MAIN_FILE_NAMES, SECRETS_FILE_NAMES, SearchNames};
use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Event types emitted when configuration files change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChangeEvent {
    /// A main configuration file changed
    MainConfig(PathBuf),
    /// A secrets file changed
    Secrets(PathBuf),
    /// Multiple files changed in quick succession
    BatchChange(Vec<PathBuf>),
    /// Watcher encountered an error
    Error(String),
}

impl ConfigChangeEvent {
    /// Returns true if this event requires a config reload.
    pub fn requires_reload(&self) -> bool {
        !matches!(self, ConfigChangeEvent::Error(_))
    }

    /// Get the affected paths for this event.
    pub fn affected_paths(&self) -> Vec<&Path> {
        match self {
            ConfigChangeEvent::MainConfig(p) | ConfigChangeEvent::Secrets(p) => vec![p.as_path()],
            ConfigChangeEvent::BatchChange(paths) => paths.iter().map(|p| p.as_path()).collect(),
            ConfigChangeEvent::Error(_) => vec![],
        }
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration for coalescing rapid changes.
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
        }
    }
}

/// What to watch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchPaths {
    /// Directories watched non-recursively
    pub dirs: Vec<PathBuf>,
    /// Explicit main file, which may have any name
    pub explicit_config: Option<PathBuf>,
    /// Explicit secrets file, which may have any name
    pub explicit_secrets: Option<PathBuf>,
}

impl WatchPaths {
    /// Which role a changed path plays, if any.
    ///
    /// With an explicit file for a role, only that exact path counts for it;
    /// otherwise any conventional name for the role does.
    pub fn role_of(&self, path: &Path) -> Option<FileRole> {
        if matches_role(path, self.explicit_config.as_deref(), &MAIN_FILE_NAMES) {
            return Some(FileRole::Main);
        }
        if matches_role(path, self.explicit_secrets.as_deref(), &SECRETS_FILE_NAMES) {
            return Some(FileRole::Secrets);
        }
        None
    }
}

fn matches_role(path: &Path, explicit: Option<&Path>, names: &SearchNames) -> bool {
    if let Some(explicit) = explicit {
        return path == explicit || path.ends_with(explicit);
    }
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    file_name == names.home || names.project.contains(&file_name)
}

/// Handle to control the config watcher.
pub struct ConfigWatcherHandle {
    /// Receiver for config change events.
    pub events: watch::Receiver<Option<ConfigChangeEvent>>,
    /// Handle to the watcher task (dropping this will stop the watcher).
    _task_handle: tokio::task::JoinHandle<()>,
}

impl ConfigWatcherHandle {
    /// Wait for the next config change event.
    pub async fn wait_for_change(&mut self) -> Option<ConfigChangeEvent> {
        // Skip the initial None value
        loop {
            if self.events.changed().await.is_err() {
                return None; // Sender dropped
            }
            let event = self.events.borrow().clone();
            if event.is_some() {
                return event;
            }
        }
    }
}

/// Starts the configuration file watcher. Must be called inside a tokio runtime.
///
/// Directories that do not exist are skipped with a warning.
///
/// # Example
/// ```ignore
/// let mut handle = start_config_watcher(store.watch_paths(), WatcherConfig::default())?;
/// while let Some(event) = handle.wait_for_change().await {
///     if event.requires_reload() {
///         let _ = store.reload();
///     }
/// }
/// ```
pub fn start_config_watcher(
    paths: WatchPaths,
    config: WatcherConfig,
) -> Result<ConfigWatcherHandle, notify::Error> {
    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(config.debounce_duration, notify_tx)?;
    let watcher = debouncer.watcher();

    let mut watching = 0;
    for dir in &paths.dirs {
        if dir.is_dir() {
            // Ancestors of the search directory may not be watchable
            match watcher.watch(dir, notify::RecursiveMode::NonRecursive) {
                Ok(()) => {
                    debug!("Watching config directory: {}", dir.display());
                    watching += 1;
                }
                Err(e) => warn!("Cannot watch {}: {}", dir.display(), e),
            }
        } else {
            warn!(
                "Config directory does not exist, skipping watch: {}",
                dir.display()
            );
        }
    }

    info!("Watching {} config directories", watching);

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &paths);
    });

    Ok(ConfigWatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

/// Process events from the notify debouncer and convert to ConfigChangeEvents.
fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<ConfigChangeEvent>>,
    paths: &WatchPaths,
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events
                    .into_iter()
                    .filter(|e| {
                        matches!(
                            e.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    })
                    .map(|e| e.path)
                    .collect();
                if let Some(event) = classify_paths(changed, paths) {
                    debug!("Config change detected: {:?}", event);
                    if tx.send(Some(event)).is_err() {
                        info!("Config watcher receiver dropped, stopping");
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(ConfigChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Config watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Collapse a batch of changed paths into at most one event.
fn classify_paths(changed: Vec<PathBuf>, paths: &WatchPaths) -> Option<ConfigChangeEvent> {
    let mut relevant: Vec<(PathBuf, FileRole)> = changed
        .into_iter()
        .filter_map(|p| paths.role_of(&p).map(|role| (p, role)))
        .collect();
    relevant.dedup_by(|a, b| a.0 == b.0);

    match relevant.len() {
        0 => None,
        1 => {
            let (path, role) = relevant.remove(0);
            Some(match role {
                FileRole::Main => ConfigChangeEvent::MainConfig(path),
                FileRole::Secrets => ConfigChangeEvent::Secrets(path),
            })
        }
        _ => Some(ConfigChangeEvent::BatchChange(
            relevant.into_iter().map(|(p, _)| p).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch_dir(dir: &str) -> WatchPaths {
        WatchPaths {
            dirs: vec![PathBuf::from(dir)],
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_main_config() {
        let paths = watch_dir("/work");
        let event = classify_paths(vec![PathBuf::from("/work/belbio_conf.yaml")], &paths);
        assert!(matches!(event, Some(ConfigChangeEvent::MainConfig(_))));

        let event = classify_paths(vec![PathBuf::from("/home/ann/.belbio_conf")], &paths);
        assert!(matches!(event, Some(ConfigChangeEvent::MainConfig(_))));
    }

    #[test]
    fn test_classify_secrets() {
        let paths = watch_dir("/work");
        let event = classify_paths(vec![PathBuf::from("/work/belbio_secrets.yml")], &paths);
        assert!(matches!(event, Some(ConfigChangeEvent::Secrets(_))));
    }

    #[test]
    fn test_classify_unrelated_file() {
        let paths = watch_dir("/work");
        assert!(classify_paths(vec![PathBuf::from("/work/notes.yaml")], &paths).is_none());
    }

    #[test]
    fn test_classify_batch() {
        let paths = watch_dir("/work");
        let event = classify_paths(
            vec![
                PathBuf::from("/work/belbio_conf.yaml"),
                PathBuf::from("/work/belbio_secrets.yaml"),
                PathBuf::from("/work/README.md"),
            ],
            &paths,
        );
        match event {
            Some(ConfigChangeEvent::BatchChange(batch)) => assert_eq!(batch.len(), 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_config_matches_only_that_file() {
        let paths = WatchPaths {
            dirs: vec![PathBuf::from("/etc/bel")],
            explicit_config: Some(PathBuf::from("/etc/bel/site.yaml")),
            explicit_secrets: None,
        };
        assert_eq!(
            paths.role_of(Path::new("/etc/bel/site.yaml")),
            Some(FileRole::Main)
        );
        assert_eq!(paths.role_of(Path::new("/etc/bel/belbio_conf.yaml")), None);
        assert_eq!(
            paths.role_of(Path::new("/etc/bel/belbio_secrets.yaml")),
            Some(FileRole::Secrets)
        );
    }

    #[test]
    fn test_event_requires_reload() {
        assert!(ConfigChangeEvent::MainConfig(PathBuf::new()).requires_reload());
        assert!(ConfigChangeEvent::Secrets(PathBuf::new()).requires_reload());
        assert!(ConfigChangeEvent::BatchChange(vec![]).requires_reload());
        assert!(!ConfigChangeEvent::Error("test".to_string()).requires_reload());
    }
}
