//! Deep merge for YAML configuration layers.
//!
//! Implements field-by-field merging where higher precedence values override lower ones.
//! Arrays are replaced entirely, not concatenated.

use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;

/// Coarse shape of a value, used to detect layers that disagree on structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Null,
    Scalar,
    Sequence,
    Mapping,
}

impl Shape {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Array(_) => Shape::Sequence,
            Value::Object(_) => Shape::Mapping,
            _ => Shape::Scalar,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Scalar => "scalar",
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
        }
    }
}

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers and booleans in overlay replace base entirely
/// - An explicit null in overlay replaces base, whatever its shape
/// - A null base accepts any overlay
/// - Any other change of shape (mapping vs scalar, sequence vs scalar, ...) is an error
///
/// `source_name` labels the overlay layer in error messages.
///
/// # Example
/// ```
/// use serde_json::json;
/// use belbio_conf::config::deep_merge;
///
/// let base = json!({
///     "bel": { "lang": { "default_bel_version": "2.0.0" } },
///     "canonical": { "HGNC": ["EG", "SP"] }
/// });
/// let overlay = json!({
///     "bel": { "lang": { "specification_github_repo": false } },
///     "canonical": { "HGNC": ["EG"] }
/// });
/// let result = deep_merge(base, overlay, "belbio_conf.yaml").unwrap();
/// assert_eq!(result["bel"]["lang"]["default_bel_version"], "2.0.0");
/// assert_eq!(result["canonical"]["HGNC"], json!(["EG"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value, source_name: &str) -> ConfigResult<Value> {
    let mut path = Vec::new();
    merge_at(base, overlay, source_name, &mut path)
}

fn merge_at(
    base: Value,
    overlay: Value,
    source_name: &str,
    path: &mut Vec<String>,
) -> ConfigResult<Value> {
    match (base, overlay) {
        // Both are objects: merge recursively
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    path.push(key.clone());
                    let merged = merge_at(base_value, overlay_value, source_name, path)?;
                    path.pop();
                    merged
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Ok(Value::Object(base_map))
        }
        // Overlay is an explicit null: it wins like any other present value
        (_, Value::Null) => Ok(Value::Null),
        // Base is null: nothing to conflict with
        (Value::Null, overlay) => Ok(overlay),
        (base, overlay) => {
            let (base_shape, overlay_shape) = (Shape::of(&base), Shape::of(&overlay));
            if base_shape != overlay_shape {
                return Err(ConfigError::MergeConflictTypeMismatch {
                    key_path: path.join("."),
                    base: base_shape.name(),
                    overlay: overlay_shape.name(),
                    source_name: source_name.to_string(),
                });
            }
            Ok(overlay)
        }
    }
}

/// Merge multiple named layers in order, with later layers taking precedence.
///
/// Equivalent to folding `deep_merge` over the list, stopping at the first conflict.
pub fn deep_merge_all<'a>(
    layers: impl IntoIterator<Item = (&'a str, Value)>,
) -> ConfigResult<Value> {
    layers
        .into_iter()
        .try_fold(Value::Null, |acc, (name, layer)| deep_merge(acc, layer, name))
}
