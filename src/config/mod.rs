//! Layered configuration for the BEL toolkit.
//!
//! Resolution builds one immutable tree from:
//! 1. **Defaults** - Embedded at build time from `./config/belbio_conf.yaml`
//! 2. **Main file** - the first of:
//!    - `$BELBIO_CONF` (explicit, must exist)
//!    - `belbio_conf.yaml` / `belbio_conf.yml` in the start directory or any parent
//!    - `~/.belbio_conf`
//! 3. **Secrets** - the first of `$BELBIO_SECRETS`, `belbio_secrets.yaml` /
//!    `belbio_secrets.yml` upward, or `~/.belbio_secrets`, placed under the
//!    reserved `secrets` key
//!
//! ## Merge Strategy
//! - Mappings: deep merge field-by-field, file over defaults
//! - Sequences and scalars: replaced whole
//! - `null` in the file: replaces the default (the key is present, so it wins)
//! - Mapping vs. non-mapping (or sequence vs. scalar): error
//!
//! ## Environment Variables
//! - `BELBIO_CONF` - Explicit main config file
//! - `BELBIO_SECRETS` - Explicit secrets file
//! - `BELBIO_HOME` - Directory searched for dotfiles (default: home directory)

pub mod defaults;
mod files;
mod loader;
mod merge;
mod resolved;
mod store;
pub mod types;
pub mod watcher;

pub use files::{ConfigSource, FileRole, SourceKind, parse_layer};
pub use loader::{
    CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, HOME_DIR_ENV, SECRETS_PATH_ENV, SearchReport,
    empty_tree, resolve,
};
pub use merge::{deep_merge, deep_merge_all};
pub use resolved::{ResolvedConfig, SECRETS_KEY, lookup};
pub use store::ConfigStore;
pub use types::*;
