//! Tracing setup driven by the resolved `logging` section.
//!
//! The section uses the dictionary schema of Python's `logging.config`. Only
//! the level fields are read:
//! - `root.level` becomes the default filter directive
//! - `loggers.<name>.level` becomes `<name>=<level>` (dots mapped to `::`)
//!
//! Formatters and handlers are left alone; where output goes is decided by
//! the `--log` option.

use anyhow::Result;
use serde_json::Value;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Fallback directive when nothing else sets one.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogOutput {
    /// Parse the `--log` value: 0/off, 1/stdout, 2/stderr, or a filename.
    pub fn parse(s: &str) -> Self {
        match s {
            "0" | "off" => LogOutput::Off,
            "1" | "stdout" => LogOutput::Stdout,
            "2" | "stderr" => LogOutput::Stderr,
            filename => LogOutput::File(PathBuf::from(filename)),
        }
    }
}

/// Map a Python logging level (name or number) to a tracing level.
pub fn python_level_to_tracing(level: &Value) -> Option<Level> {
    match level {
        Value::String(name) => match name.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" | "FATAL" | "ERROR" => Some(Level::ERROR),
            "WARNING" | "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "NOTSET" | "TRACE" => Some(Level::TRACE),
            _ => None,
        },
        Value::Number(n) => {
            let n = n.as_u64()?;
            Some(match n {
                40.. => Level::ERROR,
                30..=39 => Level::WARN,
                20..=29 => Level::INFO,
                10..=19 => Level::DEBUG,
                _ => Level::TRACE,
            })
        }
        _ => None,
    }
}

fn directive_level(level: Level) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Translate a `logging` section into an `EnvFilter` directive string.
///
/// Returns `None` when the section sets no usable level. Logger directives
/// are emitted in key order, so the result is deterministic.
pub fn filter_directives(logging: &Value) -> Option<String> {
    let mut directives = Vec::new();

    if let Some(level) = logging
        .get("root")
        .and_then(|root| root.get("level"))
        .and_then(python_level_to_tracing)
    {
        directives.push(directive_level(level));
    }

    if let Some(Value::Object(loggers)) = logging.get("loggers") {
        for (name, logger) in loggers {
            if name.is_empty() {
                continue;
            }
            if let Some(level) = logger.get("level").and_then(python_level_to_tracing) {
                directives.push(format!(
                    "{}={}",
                    name.replace('.', "::"),
                    directive_level(level)
                ));
            }
        }
    }

    if directives.is_empty() {
        None
    } else {
        Some(directives.join(","))
    }
}

/// Pick the filter: `--verbose` beats `RUST_LOG`, which beats the config section.
pub fn build_filter(verbose: bool, logging: Option<&Value>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = logging
        .and_then(filter_directives)
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Reload handle for the installed filter.
///
/// Tracing is installed before the configuration is resolved, so the
/// `logging` section can only be applied afterwards through this handle.
#[derive(Clone)]
pub struct LogHandle {
    filter: Option<reload::Handle<EnvFilter, Registry>>,
    verbose: bool,
}

impl LogHandle {
    /// Handle for `--log off`: nothing to reload.
    pub fn disabled(verbose: bool) -> Self {
        Self {
            filter: None,
            verbose,
        }
    }

    /// Swap in the filter derived from a resolved `logging` section.
    pub fn apply_config(&self, logging: Option<&Value>) -> Result<()> {
        self.reload_filter(build_filter(self.verbose, logging))
    }

    /// Replace the active filter.
    pub fn reload_filter(&self, filter: EnvFilter) -> Result<()> {
        if let Some(ref handle) = self.filter {
            handle.reload(filter)?;
        }
        Ok(())
    }
}

/// Install the global tracing subscriber.
///
/// The initial filter comes from `--verbose`, `RUST_LOG` or the default
/// directive. Call [`LogHandle::apply_config`] once the `logging` section is
/// known.
pub fn init_tracing(output: &LogOutput, verbose: bool) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(build_filter(verbose, None));
    let registry = tracing_subscriber::registry().with(filter);
    match output {
        LogOutput::Off => return Ok(LogHandle::disabled(verbose)),
        LogOutput::Stdout => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init()?,
        LogOutput::Stderr => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogOutput::File(path) => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_writer(file).with_ansi(false))
                .try_init()?
        }
    }
    Ok(LogHandle {
        filter: Some(handle),
        verbose,
    })
}
