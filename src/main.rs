//! belbio-conf
//!
//! Resolves the layered BEL toolkit configuration and prints, checks or
//! watches it.

use anyhow::Result;
use belbio_conf::cli::check::run_check;
use belbio_conf::cli::get::run_get;
use belbio_conf::cli::show::{ShowArgs, run_show};
use belbio_conf::cli::sources::run_sources;
use belbio_conf::cli::{Cli, Command};
use belbio_conf::config::{
    ConfigLoader, ConfigStore, ResolvedConfig,
    watcher::{ConfigWatcherHandle, WatcherConfig, start_config_watcher},
};
use belbio_conf::logging::{LogHandle, LogOutput, init_tracing};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = LogOutput::parse(&cli.log);
    // Installed before resolution so the search and merge are logged
    let log = init_tracing(&output, cli.verbose)?;
    let paths = cli.config_paths();

    // Sources only inspects the search; it must work when resolution fails.
    if let Some(Command::Sources) = cli.command {
        print!("{}", run_sources(&paths));
        return Ok(());
    }

    let opened = ConfigLoader::with_paths(paths).and_then(ConfigStore::open);
    let store = match opened {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = log.apply_config(store.current().logging()) {
        warn!("Could not apply logging section: {}", e);
    }

    let current = store.current();
    match cli.command {
        Some(Command::Show(args)) => print!("{}", run_show(&current, &args)?),
        Some(Command::Get(args)) => print!("{}", run_get(&current, &args)?),
        Some(Command::Check(args)) => print!("{}", run_check(&current, &args)?),
        Some(Command::Watch) => run_watch(store, &log).await?,
        Some(Command::Sources) => print!("{}", run_sources(&store.loader().paths)),
        None => print!("{}", run_show(&current, &ShowArgs::default())?),
    }

    Ok(())
}

fn describe(config: &ResolvedConfig) -> String {
    let main = config
        .main_source()
        .map(|s| s.label())
        .unwrap_or_else(|| "defaults only".to_string());
    match config.secrets_source() {
        Some(secrets) => format!("{} + {}", main, secrets.label()),
        None => main,
    }
}

fn start_watcher(store: &ConfigStore) -> Option<ConfigWatcherHandle> {
    match start_config_watcher(store.watch_paths(), WatcherConfig::default()) {
        Ok(handle) => {
            info!("Config file watcher started");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to start config file watcher: {}", e);
            None
        }
    }
}

/// Reload on every relevant change until Ctrl-C.
async fn run_watch(store: ConfigStore, log: &LogHandle) -> Result<()> {
    println!("Resolved: {}", describe(&store.current()));

    let mut watched = store.watch_paths();
    let Some(mut handle) = start_watcher(&store) else {
        anyhow::bail!("Could not watch configuration directories");
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
            event = handle.wait_for_change() => {
                let Some(event) = event else {
                    info!("Config file watcher stopped");
                    break;
                };
                if !event.requires_reload() {
                    continue;
                }
                for path in event.affected_paths() {
                    println!("Changed: {}", path.display());
                }
                match store.reload() {
                    Ok(resolved) => {
                        println!("Reloaded: {}", describe(&resolved));
                        if let Err(e) = log.apply_config(resolved.logging()) {
                            warn!("Could not apply logging section: {}", e);
                        }
                    }
                    Err(e) => println!("Reload failed [{}]: {}. Keeping current config.", e.code(), e),
                }

                // A reload can switch to a file in a directory not yet watched.
                let now = store.watch_paths();
                if now != watched {
                    if let Some(restarted) = start_watcher(&store) {
                        handle = restarted;
                        watched = now;
                    }
                }
            }
        }
    }
    Ok(())
}
