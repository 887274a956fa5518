//! BEL Toolkit Configuration Library
//!
//! Resolves one immutable configuration tree from embedded defaults, the
//! nearest `belbio_conf.yaml` (or `~/.belbio_conf`) and an optional secrets
//! file, and keeps it reloadable for long-running processes.
//!
//! ```no_run
//! use belbio_conf::config::{ConfigLoader, ConfigStore};
//!
//! let store = ConfigStore::open(ConfigLoader::discover()?)?;
//! let config = store.current();
//! let version: String = config.require("bel.lang.default_bel_version")?;
//! # Ok::<(), belbio_conf::error::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod paths;
