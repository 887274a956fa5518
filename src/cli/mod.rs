//! CLI command definitions for belbio-conf
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod get;
pub mod show;
pub mod sources;

use crate::config::ConfigPaths;
use check::CheckArgs;
use clap::{Parser, Subcommand};
use get::GetArgs;
use show::ShowArgs;
use std::path::PathBuf;

/// Resolve and inspect BEL toolkit configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Main configuration file (skips the search; overrides BELBIO_CONF)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Secrets file (skips the search; overrides BELBIO_SECRETS)
    #[arg(short, long, global = true)]
    pub secrets: Option<PathBuf>,

    /// Directory the upward search starts from (default: current directory)
    #[arg(long, global = true)]
    pub start_dir: Option<PathBuf>,

    /// Directory searched for dotfiles (overrides BELBIO_HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration (default if no subcommand given)
    Show(ShowArgs),

    /// Print a single value by dotted key path
    Get(GetArgs),

    /// List every path examined and which file was used
    Sources,

    /// Resolve and validate the configuration
    Check(CheckArgs),

    /// Resolve, then re-resolve whenever a configuration file changes
    Watch,
}

impl Cli {
    /// Search paths from the environment with command-line overrides applied.
    pub fn config_paths(&self) -> ConfigPaths {
        let mut paths = ConfigPaths::discover();
        if let Some(ref dir) = self.start_dir {
            paths.search_start_dir = dir.clone();
        }
        if let Some(ref home) = self.home {
            paths.home_dir = Some(home.clone());
        }
        if let Some(ref config) = self.config {
            paths = paths.with_explicit_config(config);
        }
        if let Some(ref secrets) = self.secrets {
            paths = paths.with_explicit_secrets(secrets);
        }
        paths
    }
}
