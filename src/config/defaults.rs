//! Built-in defaults, embedded at build time from `config/belbio_conf.yaml`.

use super::files::{FileRole, parse_layer};
use crate::error::ConfigResult;
use serde_json::Value;
use std::path::Path;

/// Raw text of the compiled-in defaults.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../config/belbio_conf.yaml");

/// Name used for the defaults layer in error messages.
pub const DEFAULTS_LABEL: &str = "defaults(embedded)";

/// Parse the compiled-in defaults into a tree.
pub fn default_tree() -> ConfigResult<Value> {
    parse_layer(DEFAULT_CONFIG_YAML, Path::new(DEFAULTS_LABEL), FileRole::Main)
}
