//! Check subcommand: validate the resolved configuration and summarize it.

use crate::config::ResolvedConfig;
use crate::error::ConfigError;
use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::fmt::Write;

/// Arguments for the check subcommand
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Key paths that must be set (comma-separated). Secrets count for their
    /// plain key, e.g. bel_api.servers.arangodb_password.
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub require: Vec<String>,
}

/// Validate the typed view and required keys; return a short summary.
pub fn run_check(config: &ResolvedConfig, args: &CheckArgs) -> Result<String> {
    let settings = config.settings_typed()?;

    for key in &args.require {
        match config.credential(key) {
            Some(value) if !is_unset(value) => {}
            _ => return Err(ConfigError::missing_key(key).into()),
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "Configuration OK");
    let _ = writeln!(
        out,
        "  config:   {}",
        config
            .main_source()
            .map(|s| s.label())
            .unwrap_or_else(|| "none (defaults only)".to_string())
    );
    let _ = writeln!(
        out,
        "  secrets:  {}",
        config
            .secrets_source()
            .map(|s| s.label())
            .unwrap_or_else(|| "none".to_string())
    );
    let _ = writeln!(
        out,
        "  bel:      version {} (specifications: {})",
        settings.bel.lang.default_bel_version, settings.bel.lang.specifications
    );
    let _ = writeln!(out, "  api:      {}", settings.bel_api.servers.api_url);
    let _ = writeln!(out, "  arangodb: {}", settings.bel_api.servers.arangodb_url());
    let _ = writeln!(
        out,
        "  resolved: {}",
        config.resolved_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(out)
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
