// crates/authz-chain-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for flag parsing, option mapping, and rendering.
// Purpose: Ensure CLI flags map onto the same options the server consumes.
// Dependencies: authz-chain-cli main helpers
// ============================================================================

//! ## Overview
//! Parses argument vectors with clap and checks the resulting authorization
//! options, log level resolution, and success output.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use authz_chain_config::ConfigError;
use authz_chain_config::ConfigSource;
use clap::Parser;

use super::Cli;
use super::Commands;
use super::OutputFormat;
use super::ValidateCommand;
use super::render_json;
use super::render_summary;
use crate::logging::LogLevel;
use crate::logging::resolve_level;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse_validate(args: &[&str]) -> ValidateCommand {
    let argv = ["authz-chain", "validate"].into_iter().chain(args.iter().copied());
    match Cli::try_parse_from(argv).expect("parse cli").command {
        Commands::Validate(command) => command,
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// SECTION: Flag Mapping
// ============================================================================

#[test]
fn defaults_match_server_flag_defaults() {
    let command = parse_validate(&[]);
    let options = command.to_options();
    assert!(!options.use_structured_file);
    assert_eq!(options.config_file, None);
    assert_eq!(options.legacy.modes, vec!["AlwaysAllow".to_string()]);
    assert_eq!(options.legacy.webhook.version, "v1beta1");
    assert_eq!(options.legacy.webhook.cache_authorized_ttl, Duration::from_secs(300));
    assert_eq!(options.legacy.webhook.cache_unauthorized_ttl, Duration::from_secs(30));
    let backoff = options.legacy.retry_backoff.expect("backoff");
    assert_eq!(backoff.initial_delay, Duration::from_millis(500));
    assert_eq!(backoff.steps, 5);
    assert_eq!(command.format, OutputFormat::Text);
}

#[test]
fn mode_list_splits_on_commas() {
    let command = parse_validate(&["--authorization-mode", "Node,RBAC,Webhook"]);
    assert_eq!(command.to_options().legacy.modes, vec!["Node", "RBAC", "Webhook"]);
}

#[test]
fn empty_mode_list_yields_no_modes() {
    let command = parse_validate(&["--authorization-mode", ""]);
    assert!(command.to_options().legacy.modes.is_empty());
}

#[test]
fn durations_parse_human_readable() {
    let command = parse_validate(&[
        "--authorization-webhook-cache-authorized-ttl",
        "2m 30s",
        "--authorization-webhook-cache-unauthorized-ttl",
        "10s",
        "--authorization-webhook-retry-initial-delay",
        "1s",
    ]);
    let options = command.to_options();
    assert_eq!(options.legacy.webhook.cache_authorized_ttl, Duration::from_secs(150));
    assert_eq!(options.legacy.webhook.cache_unauthorized_ttl, Duration::from_secs(10));
    let backoff = options.legacy.retry_backoff.expect("backoff");
    assert_eq!(backoff.initial_delay, Duration::from_secs(1));
}

#[test]
fn malformed_duration_is_rejected_by_parser() {
    let result = Cli::try_parse_from([
        "authz-chain",
        "validate",
        "--authorization-webhook-cache-authorized-ttl",
        "forever",
    ]);
    assert!(result.is_err());
}

#[test]
fn structured_flags_map_to_options() {
    let command = parse_validate(&[
        "--structured-authorization-config",
        "--authorization-config",
        "/etc/authz/config.yaml",
        "--format",
        "json",
    ]);
    let options = command.to_options();
    assert!(options.use_structured_file);
    assert_eq!(options.config_file, Some(PathBuf::from("/etc/authz/config.yaml")));
    assert_eq!(command.format, OutputFormat::Json);
}

#[test]
fn negative_retry_attempts_fail_validation() {
    let command = parse_validate(&["--authorization-webhook-retry-attempts", "-1"]);
    let resolved = command.to_options().resolve().expect("resolve");
    assert!(!resolved.is_valid());
    assert!(resolved.aggregate_message().contains("retry attempts must be greater than 0"));
}

#[test]
fn toggle_without_file_is_fatal() {
    let command = parse_validate(&["--structured-authorization-config"]);
    let err = command.to_options().resolve().expect_err("missing path");
    assert!(matches!(err, ConfigError::Invalid(_)));
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

#[test]
fn summary_names_count_and_source() {
    let config = parse_validate(&["--authorization-mode", "Node,RBAC"])
        .to_options()
        .resolve()
        .expect("resolve")
        .into_config()
        .expect("valid");
    assert_eq!(
        render_summary(&config, &ConfigSource::LegacyFlags),
        "ok: 2 authorizers (legacy-flags)"
    );
}

#[test]
fn json_output_uses_wire_names() {
    let config = parse_validate(&[])
        .to_options()
        .resolve()
        .expect("resolve")
        .into_config()
        .expect("valid");
    let json = render_json(&config).expect("render");
    assert!(json.contains("\"authorizers\""));
    assert!(json.contains("\"AlwaysAllow\""));
    assert!(json.contains("\"retryBackoff\""));
    assert!(json.contains("\"initialDelay\": \"500ms\""));
}

// ============================================================================
// SECTION: Logging
// ============================================================================

#[test]
fn log_level_prefers_flag_then_env() {
    assert_eq!(resolve_level(Some(LogLevel::Debug), Some("error")), tracing::Level::DEBUG);
    assert_eq!(resolve_level(None, Some(" Warning ")), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some("verbose")), tracing::Level::INFO);
    assert_eq!(resolve_level(None, None), tracing::Level::INFO);
}
