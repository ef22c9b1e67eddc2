// crates/authz-chain-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: tracing subscriber setup for the authz-chain binary.
// Purpose: Route diagnostics to stderr so stdout carries only command output.
// Dependencies: clap, tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! Level priority:
//! 1. `--log-level` flag
//! 2. `AUTHZ_CHAIN_LOG` environment variable (`info`, `debug`, ...)
//! 3. `info`

use clap::ValueEnum;
use tracing::Level;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV: &str = "AUTHZ_CHAIN_LOG";

/// Log verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational events.
    Info,
    /// Debug events.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns a message when a global subscriber is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<(), String> {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_level.as_deref());
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to install logger: {err}"))
}

/// Picks the effective level from the flag, then the environment.
#[must_use]
pub fn resolve_level(cli_level: Option<LogLevel>, env_level: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_level.and_then(parse_level_str))
        .unwrap_or(Level::INFO)
}

/// Parses a level name; unknown names yield `None`.
fn parse_level_str(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
