//! Show subcommand: print the resolved tree.

use crate::config::{ResolvedConfig, lookup};
use crate::format::{OutputFormat, mask_secrets, render};
use anyhow::{Result, anyhow};
use clap::Args;

/// Arguments for the show subcommand
#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Only print this namespace or dotted key path (e.g. bel_api.servers)
    #[arg(long, value_name = "KEY")]
    pub section: Option<String>,

    /// Output format: yaml (default) or json
    #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Print secret values instead of masking them
    #[arg(long)]
    pub reveal_secrets: bool,
}

/// Render the resolved configuration for display.
pub fn run_show(config: &ResolvedConfig, args: &ShowArgs) -> Result<String> {
    let tree = if args.reveal_secrets {
        config.tree().clone()
    } else {
        mask_secrets(config.tree())
    };

    let value = match args.section.as_deref() {
        Some(section) => {
            lookup(&tree, section).ok_or_else(|| anyhow!("Section '{}' not found", section))?
        }
        None => &tree,
    };
    render(value, args.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MASK;
    use serde_json::{Value, json};

    fn resolved() -> ResolvedConfig {
        ResolvedConfig::new(
            json!({"bel_api": {"servers": {"arangodb_host": "localhost"}}}),
            Some(json!({"bel_api": {"servers": {"arangodb_password": "hunter2"}}})),
            None,
            None,
        )
    }

    #[test]
    fn test_show_masks_secrets_by_default() {
        let out = run_show(&resolved(), &ShowArgs::default()).unwrap();
        assert!(!out.contains("hunter2"));
        assert!(out.contains(MASK));
        assert!(out.contains("localhost"));
    }

    #[test]
    fn test_show_reveal_secrets() {
        let args = ShowArgs {
            reveal_secrets: true,
            ..Default::default()
        };
        let out = run_show(&resolved(), &args).unwrap();
        assert!(out.contains("hunter2"));
    }

    #[test]
    fn test_show_section_json() {
        let args = ShowArgs {
            section: Some("bel_api.servers".to_string()),
            format: OutputFormat::Json,
            ..Default::default()
        };
        let out = run_show(&resolved(), &args).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"arangodb_host": "localhost"}));
    }

    #[test]
    fn test_show_missing_section() {
        let args = ShowArgs {
            section: Some("bel_nlp".to_string()),
            ..Default::default()
        };
        let err = run_show(&resolved(), &args).unwrap_err();
        assert!(err.to_string().contains("bel_nlp"));
    }
}
