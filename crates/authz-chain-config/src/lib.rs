// crates/authz-chain-config/src/lib.rs
// ============================================================================
// Module: Authorization Chain Config Library
// Description: Chain config model, validation, legacy builder, and loading.
// Purpose: Single source of truth for authorizer chain configuration.
// Dependencies: humantime, serde, thiserror, toml, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! `authz-chain-config` produces the ordered authorizer chain consumed by the
//! runtime authorizer. The chain comes either from a structured file or from
//! legacy flat flags; both surfaces converge on [`AuthorizerChainConfig`] and
//! pass through the same [`ChainValidator`], which reports every defect as a
//! path-attributed [`FieldError`].
//!
//! Security posture: configuration inputs are untrusted and validation fails
//! closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod examples;
pub mod field;
pub mod legacy;
pub mod load;
pub mod model;
pub mod schema;
pub mod selector;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use examples::config_toml_example;
pub use field::FieldError;
pub use field::FieldErrorKind;
pub use field::FieldErrorList;
pub use field::FieldPath;
pub use legacy::LegacyAuthorizationOptions;
pub use legacy::LegacyWebhookOptions;
pub use legacy::OptionError;
pub use legacy::build_legacy_chain;
pub use load::ConfigError;
pub use load::ConfigFormat;
pub use load::load_chain_file;
pub use load::parse_chain;
pub use model::*;
pub use schema::config_schema;
pub use selector::AuthorizationConfig;
pub use selector::AuthorizationOptions;
pub use selector::ConfigSource;
pub use selector::ResolvedAuthorization;
pub use selector::resolve_chain;
pub use validation::ChainValidator;
pub use validation::EmptyChainPolicy;
pub use validation::ExpressionChecker;
pub use validation::NoopExpressionChecker;
pub use validation::validate_chain;
pub use validation::validate_webhook;
