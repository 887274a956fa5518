//! Structured error types for configuration resolution.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Source errors
    NotFound,
    IoError,
    ParseError,
    SecretsParseError,

    // Merge errors
    MergeConflictTypeMismatch,
    ReservedKey,

    // Accessor errors
    MissingKey,
    InvalidValue,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::SecretsParseError => "SECRETS_PARSE_ERROR",
            ErrorCode::MergeConflictTypeMismatch => "MERGE_CONFLICT_TYPE_MISMATCH",
            ErrorCode::ReservedKey => "RESERVED_KEY",
            ErrorCode::MissingKey => "MISSING_KEY",
            ErrorCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a syntax error inside a configuration file (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors returned while resolving or reading configuration.
///
/// Every variant aborts resolution as a whole; no partially merged tree is
/// ever handed out alongside one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A found (or explicitly named) file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The main configuration file is not valid YAML or not a mapping.
    #[error("invalid config file {}{}: {message}", path.display(), fmt_location(location))]
    Parse {
        path: PathBuf,
        location: Option<Location>,
        message: String,
    },

    /// The secrets file is not valid YAML or not a mapping.
    #[error("invalid secrets file {}{}: {message}", path.display(), fmt_location(location))]
    SecretsParse {
        path: PathBuf,
        location: Option<Location>,
        message: String,
    },

    /// A key holds a mapping or sequence in one layer and something else in another.
    #[error(
        "type mismatch at '{key_path}' from {source_name}: {base} in lower layer, {overlay} in override"
    )]
    MergeConflictTypeMismatch {
        key_path: String,
        base: &'static str,
        overlay: &'static str,
        source_name: String,
    },

    /// A layer other than the secrets overlay tried to define a reserved top-level key.
    #[error("'{key}' is reserved and cannot be set in {source_name}")]
    ReservedKey { key: String, source_name: String },

    /// A required key is absent from the resolved tree.
    #[error("missing config key '{0}'")]
    MissingKey(String),

    /// A key exists but does not have the requested shape.
    #[error("invalid value at '{key_path}': {message}")]
    InvalidValue { key_path: String, message: String },
}

fn fmt_location(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" ({})", loc),
        None => String::new(),
    }
}

impl ConfigError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::NotFound
            }
            ConfigError::Io { .. } => ErrorCode::IoError,
            ConfigError::Parse { .. } => ErrorCode::ParseError,
            ConfigError::SecretsParse { .. } => ErrorCode::SecretsParseError,
            ConfigError::MergeConflictTypeMismatch { .. } => ErrorCode::MergeConflictTypeMismatch,
            ConfigError::ReservedKey { .. } => ErrorCode::ReservedKey,
            ConfigError::MissingKey(_) => ErrorCode::MissingKey,
            ConfigError::InvalidValue { .. } => ErrorCode::InvalidValue,
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::SecretsParse { path, .. } => Some(path),
            _ => None,
        }
    }

    // Convenience constructors

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_key(key_path: &str) -> Self {
        ConfigError::MissingKey(key_path.to_string())
    }

    pub fn invalid_value(key_path: &str, err: impl std::fmt::Display) -> Self {
        ConfigError::InvalidValue {
            key_path: key_path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
