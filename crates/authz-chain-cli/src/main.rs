// crates/authz-chain-cli/src/main.rs
// ============================================================================
// Module: Authorization Chain CLI Entry Point
// Description: Command dispatcher for chain validation and config artifacts.
// Purpose: Validate authorization settings exactly as the server would.
// Dependencies: authz-chain-config, clap, humantime, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `authz-chain validate` accepts the same authorization flags as the server,
//! resolves them into one chain (structured file or legacy flags), and reports
//! every defect at once. `schema` and `example` print the config artifacts.
//! Security posture: inputs are untrusted; any error yields a failure exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod logging;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use authz_chain_config::AuthorizationConfig;
use authz_chain_config::AuthorizationOptions;
use authz_chain_config::ConfigSource;
use authz_chain_config::LegacyAuthorizationOptions;
use authz_chain_config::LegacyWebhookOptions;
use authz_chain_config::RetryBackoff;
use authz_chain_config::config_schema;
use authz_chain_config::config_toml_example;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;

use crate::logging::LogLevel;
use crate::logging::init_logging;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "authz-chain", version, disable_help_subcommand = true)]
struct Cli {
    /// Log verbosity (overrides `AUTHZ_CHAIN_LOG`).
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve and validate the authorization chain.
    Validate(ValidateCommand),
    /// Print the JSON schema for the structured config file.
    Schema,
    /// Print an example structured config file (TOML).
    Example,
}

/// Output format for `validate`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// One-line summary.
    #[default]
    Text,
    /// Validated configuration as pretty JSON.
    Json,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Load the chain from `--authorization-config` instead of the mode flags.
    #[arg(long = "structured-authorization-config")]
    structured: bool,
    /// Structured authorization config file (TOML, YAML, or JSON).
    #[arg(long = "authorization-config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Ordered authorizer modes, comma separated.
    #[arg(
        long = "authorization-mode",
        value_name = "MODES",
        value_delimiter = ',',
        default_value = "AlwaysAllow"
    )]
    modes: Vec<String>,
    /// ABAC policy file.
    #[arg(long = "authorization-policy-file", value_name = "PATH", default_value = "")]
    policy_file: String,
    /// Kubeconfig describing the legacy webhook endpoint.
    #[arg(long = "authorization-webhook-config-file", value_name = "PATH", default_value = "")]
    webhook_config_file: String,
    /// `SubjectAccessReview` version sent to the legacy webhook.
    #[arg(long = "authorization-webhook-version", default_value = "v1beta1")]
    webhook_version: String,
    /// Cache duration for authorized webhook responses.
    #[arg(
        long = "authorization-webhook-cache-authorized-ttl",
        value_parser = humantime::parse_duration,
        default_value = "5m"
    )]
    authorized_ttl: Duration,
    /// Cache duration for unauthorized webhook responses.
    #[arg(
        long = "authorization-webhook-cache-unauthorized-ttl",
        value_parser = humantime::parse_duration,
        default_value = "30s"
    )]
    unauthorized_ttl: Duration,
    /// Webhook retry backoff settings.
    #[command(flatten)]
    retry: RetryArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Webhook retry backoff flags.
#[derive(Args, Debug)]
struct RetryArgs {
    /// Delay before the first webhook retry.
    #[arg(
        long = "authorization-webhook-retry-initial-delay",
        value_parser = humantime::parse_duration,
        default_value = "500ms"
    )]
    initial_delay: Duration,
    /// Multiplier applied to the retry delay after each attempt.
    #[arg(long = "authorization-webhook-retry-factor", default_value_t = 1.5)]
    factor: f64,
    /// Random jitter fraction added to each retry delay.
    #[arg(long = "authorization-webhook-retry-jitter", default_value_t = 0.2)]
    jitter: f64,
    /// Maximum number of webhook attempts.
    #[arg(
        long = "authorization-webhook-retry-attempts",
        default_value_t = 5,
        allow_negative_numbers = true
    )]
    steps: i32,
}

impl RetryArgs {
    /// Converts the flags into a backoff.
    const fn to_backoff(&self) -> RetryBackoff {
        RetryBackoff {
            initial_delay: self.initial_delay,
            factor: self.factor,
            jitter: self.jitter,
            steps: self.steps,
        }
    }
}

impl ValidateCommand {
    /// Builds the operator-supplied authorization options.
    fn to_options(&self) -> AuthorizationOptions {
        let modes = self.modes.iter().filter(|mode| !mode.is_empty()).cloned().collect();
        AuthorizationOptions {
            use_structured_file: self.structured,
            config_file: self.config.clone(),
            legacy: LegacyAuthorizationOptions {
                modes,
                policy_file: self.policy_file.clone(),
                webhook: LegacyWebhookOptions {
                    config_file: self.webhook_config_file.clone(),
                    version: self.webhook_version.clone(),
                    cache_authorized_ttl: self.authorized_ttl,
                    cache_unauthorized_ttl: self.unauthorized_ttl,
                },
                retry_backoff: Some(self.retry.to_backoff()),
            },
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the message shown to the operator.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level).map_err(CliError::new)?;

    match cli.command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Schema => command_schema(),
        Commands::Example => command_example(),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `validate`.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let resolved = command
        .to_options()
        .resolve()
        .map_err(|err| CliError::new(err.to_string()))?;
    let source = resolved.source.clone();
    let config = resolved.into_config().map_err(|err| CliError::new(err.to_string()))?;
    let output = match command.format {
        OutputFormat::Text => render_summary(&config, &source),
        OutputFormat::Json => render_json(&config)?,
    };
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `schema`.
fn command_schema() -> CliResult<ExitCode> {
    let output = serde_json::to_string_pretty(&config_schema())
        .map_err(|err| CliError::new(format!("failed to render schema: {err}")))?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `example`.
fn command_example() -> CliResult<ExitCode> {
    let example = config_toml_example();
    write_stdout_line(example.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the one-line success summary.
fn render_summary(config: &AuthorizationConfig, source: &ConfigSource) -> String {
    let count = config.chain.authorizers.len();
    let noun = if count == 1 { "authorizer" } else { "authorizers" };
    format!("ok: {count} {noun} ({source})")
}

/// Renders the validated configuration as pretty JSON.
fn render_json(config: &AuthorizationConfig) -> CliResult<String> {
    serde_json::to_string_pretty(config)
        .map_err(|err| CliError::new(format!("failed to render config: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
