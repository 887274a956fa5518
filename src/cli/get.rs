//! Get subcommand: print one value by dotted key path.

use crate::config::{ResolvedConfig, SECRETS_KEY, lookup};
use crate::error::ConfigError;
use crate::format::{OutputFormat, mask_secrets, render_value};
use anyhow::Result;
use clap::Args;

/// Arguments for the get subcommand
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Dotted key path, e.g. bel.lang.default_bel_version or bel.canonical.HGNC.0
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Output format for mappings and sequences: yaml (default) or json
    #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Print secret values instead of masking them
    #[arg(long)]
    pub reveal_secrets: bool,
}

/// Look up the key; a missing key is an error so the process exits non-zero.
pub fn run_get(config: &ResolvedConfig, args: &GetArgs) -> Result<String> {
    let under_secrets = args.key == SECRETS_KEY || args.key.starts_with("secrets.");
    if under_secrets && !args.reveal_secrets {
        let masked = mask_secrets(config.tree());
        let value = lookup(&masked, &args.key).ok_or_else(|| ConfigError::missing_key(&args.key))?;
        return render_value(value, args.format);
    }

    let value = config
        .get(&args.key)
        .ok_or_else(|| ConfigError::missing_key(&args.key))?;
    render_value(value, args.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::format::MASK;
    use serde_json::json;

    fn resolved() -> ResolvedConfig {
        ResolvedConfig::new(
            json!({"bel": {"lang": {"default_bel_version": "2.0.0"}, "canonical": {"HGNC": ["EG", "SP"]}}}),
            Some(json!({"bel_api": {"servers": {"arangodb_password": "hunter2"}}})),
            None,
            None,
        )
    }

    fn args(key: &str) -> GetArgs {
        GetArgs {
            key: key.to_string(),
            format: OutputFormat::Yaml,
            reveal_secrets: false,
        }
    }

    #[test]
    fn test_get_scalar() {
        let out = run_get(&resolved(), &args("bel.lang.default_bel_version")).unwrap();
        assert_eq!(out, "2.0.0\n");
    }

    #[test]
    fn test_get_sequence_index() {
        let out = run_get(&resolved(), &args("bel.canonical.HGNC.1")).unwrap();
        assert_eq!(out, "SP\n");
    }

    #[test]
    fn test_get_secret_masked_unless_revealed() {
        let key = "secrets.bel_api.servers.arangodb_password";
        assert_eq!(run_get(&resolved(), &args(key)).unwrap(), format!("{}\n", MASK));

        let mut revealed = args(key);
        revealed.reveal_secrets = true;
        assert_eq!(run_get(&resolved(), &revealed).unwrap(), "hunter2\n");
    }

    #[test]
    fn test_get_missing_key_is_error() {
        let err = run_get(&resolved(), &args("bel.lang.nope")).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert_eq!(config_err.code(), ErrorCode::MissingKey);
    }
}
