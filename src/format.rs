//! Output formatting for resolved configuration trees.

use crate::config::SECRETS_KEY;
use anyhow::Result;
use serde_json::Value;

/// Replacement text for masked secret values.
pub const MASK: &str = "********";

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: yaml, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a tree in the given format. Output always ends with a newline.
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Render a single looked-up value.
///
/// Strings, numbers and booleans print bare so the output can be used in
/// shell scripts; mappings and sequences go through [`render`].
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match value {
        Value::String(s) => Ok(format!("{}\n", s)),
        Value::Number(n) => Ok(format!("{}\n", n)),
        Value::Bool(b) => Ok(format!("{}\n", b)),
        Value::Null if format == OutputFormat::Yaml => Ok("~\n".to_string()),
        _ => render(value, format),
    }
}

/// Copy of `tree` with every non-empty scalar under `secrets` masked.
///
/// Empty strings and nulls stay visible so unset credentials are obvious.
pub fn mask_secrets(tree: &Value) -> Value {
    let mut masked = tree.clone();
    if let Some(secrets) = masked.get_mut(SECRETS_KEY) {
        mask_leaves(secrets);
    }
    masked
}

/// Mask every non-empty scalar leaf in place.
pub fn mask_leaves(value: &mut Value) {
    match value {
        Value::Object(map) => map.values_mut().for_each(mask_leaves),
        Value::Array(items) => items.iter_mut().for_each(mask_leaves),
        Value::Null => {}
        Value::String(s) if s.is_empty() => {}
        leaf => *leaf = Value::String(MASK.to_string()),
    }
}
