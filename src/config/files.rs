//! Reading configuration layers from disk.
//!
//! Each file is read, parsed as YAML and checked to be a mapping. Errors carry
//! the file path and, for syntax errors, the position reported by the parser.

use crate::error::{ConfigError, ConfigResult, Location};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a configuration fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// Compiled into the binary; always present
    Defaults,
    /// Found by the upward search from the start directory
    Project,
    /// Hidden dotfile in the home directory
    Home,
    /// Named explicitly by the operator (flag or environment variable)
    Explicit,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Defaults => write!(f, "defaults"),
            SourceKind::Project => write!(f, "project"),
            SourceKind::Home => write!(f, "home"),
            SourceKind::Explicit => write!(f, "explicit"),
        }
    }
}

/// Which file a layer is: main configuration or secrets.
///
/// The role only decides which error variant a syntax error becomes, so an
/// operator can tell which file to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Main,
    Secrets,
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Main => write!(f, "config"),
            FileRole::Secrets => write!(f, "secrets"),
        }
    }
}

/// A located configuration file and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub kind: SourceKind,
    pub role: FileRole,
    pub path: PathBuf,
}

impl ConfigSource {
    pub fn new(kind: SourceKind, role: FileRole, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            role,
            path: path.into(),
        }
    }

    /// Label used in merge error messages, e.g. `project(/work/belbio_conf.yaml)`.
    pub fn label(&self) -> String {
        format!("{}({})", self.kind, self.path.display())
    }

    /// Read and parse this source.
    pub fn load(&self) -> ConfigResult<Value> {
        debug!(
            "loading {} layer (source={}, path={})",
            self.role,
            self.kind,
            self.path.display()
        );
        let bytes = std::fs::read(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            syntax_error(
                self.role,
                &self.path,
                None,
                format!("file is not valid UTF-8: {}", e.utf8_error()),
            )
        })?;
        parse_layer(&content, &self.path, self.role)
    }
}

/// Parse YAML text into a mapping.
///
/// An empty document is an empty mapping. Anything other than a mapping at the
/// top level is rejected.
pub fn parse_layer(content: &str, path: &Path, role: FileRole) -> ConfigResult<Value> {
    if is_blank_document(content) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_yaml::from_str(content).map_err(|e| {
        let location = e.location().map(|loc| Location {
            line: loc.line(),
            column: loc.column(),
        });
        syntax_error(role, path, location, e.to_string())
    })?;

    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        other => Err(syntax_error(
            role,
            path,
            None,
            format!("top level must be a mapping, found {}", type_name(&other)),
        )),
    }
}

/// True when the text holds nothing but whitespace, comments and document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn syntax_error(
    role: FileRole,
    path: &Path,
    location: Option<Location>,
    message: String,
) -> ConfigError {
    let path = path.to_path_buf();
    match role {
        FileRole::Main => ConfigError::Parse {
            path,
            location,
            message,
        },
        FileRole::Secrets => ConfigError::SecretsParse {
            path,
            location,
            message,
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
