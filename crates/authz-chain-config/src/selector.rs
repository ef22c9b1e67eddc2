// crates/authz-chain-config/src/selector.rs
// ============================================================================
// Module: Configuration Source Selection
// Description: Chooses between the structured file and the legacy flags.
// Purpose: Produce one validated chain regardless of configuration surface.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! The structured-file toggle is resolved once into a [`ConfigSource`]. The
//! chain then comes either from [`load_chain_file`] or from the legacy
//! builder, and in both cases passes through the same [`ChainValidator`].
//! Fatal problems (toggle/path mismatch, unreadable file) are
//! [`ConfigError`] values; chain defects are collected in
//! [`ResolvedAuthorization`] so every one of them can be reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::field::FieldErrorList;
use crate::field::write_aggregate;
use crate::legacy::LegacyAuthorizationOptions;
use crate::legacy::OptionError;
use crate::load::ConfigError;
use crate::load::load_chain_file;
use crate::model::AuthorizerChainConfig;
use crate::model::RetryBackoff;
use crate::validation::ChainValidator;

// ============================================================================
// SECTION: Source Selection
// ============================================================================

/// Where the effective chain configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Structured configuration file at the given path.
    StructuredFile(PathBuf),
    /// Chain synthesized from the legacy flags.
    LegacyFlags,
}

impl ConfigSource {
    /// Resolves the structured-file toggle and the file path into a source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the toggle is on without a path,
    /// or a path is given while the toggle is off.
    pub fn select(use_structured_file: bool, file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = file.filter(|path| !path.as_os_str().is_empty());
        match (use_structured_file, file) {
            (true, Some(path)) => Ok(Self::StructuredFile(path.to_path_buf())),
            (true, None) => Err(ConfigError::Invalid(
                "structured authorization configuration is enabled but --authorization-config \
                 is not set"
                    .to_string(),
            )),
            (false, Some(_)) => Err(ConfigError::Invalid(
                "structured authorization configuration is disabled but --authorization-config \
                 is set"
                    .to_string(),
            )),
            (false, None) => Ok(Self::LegacyFlags),
        }
    }

    /// Returns a stable label for the source.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StructuredFile(_) => "structured-file",
            Self::LegacyFlags => "legacy-flags",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredFile(path) => write!(f, "{} {}", self.label(), path.display()),
            Self::LegacyFlags => f.write_str(self.label()),
        }
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Complete authorization settings as supplied by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorizationOptions {
    /// Structured-file toggle.
    pub use_structured_file: bool,
    /// Structured configuration file path.
    pub config_file: Option<PathBuf>,
    /// Legacy flat settings.
    pub legacy: LegacyAuthorizationOptions,
}

impl AuthorizationOptions {
    /// Resolves and validates the effective chain with the default validator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on fatal source selection or loading failures.
    pub fn resolve(&self) -> Result<ResolvedAuthorization, ConfigError> {
        self.resolve_with(&ChainValidator::default())
    }

    /// Resolves and validates the effective chain with `validator`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on fatal source selection or loading failures.
    pub fn resolve_with(
        &self,
        validator: &ChainValidator,
    ) -> Result<ResolvedAuthorization, ConfigError> {
        let source = ConfigSource::select(self.use_structured_file, self.config_file.as_deref())?;
        resolve_chain(source, &self.legacy, validator)
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Builds or loads the chain for `source` and validates it.
///
/// # Errors
///
/// Returns [`ConfigError`] when the structured file cannot be loaded.
pub fn resolve_chain(
    source: ConfigSource,
    legacy: &LegacyAuthorizationOptions,
    validator: &ChainValidator,
) -> Result<ResolvedAuthorization, ConfigError> {
    let (chain, option_errors) = match &source {
        ConfigSource::StructuredFile(path) => {
            let chain = load_chain_file(path)?;
            let option_errors = legacy.validate_with_structured_chain(&chain);
            (chain, option_errors)
        }
        ConfigSource::LegacyFlags => (legacy.build_chain(), legacy.validate()),
    };
    let field_errors = validator.validate(&chain);

    if field_errors.is_empty() && option_errors.is_empty() {
        tracing::info!(
            source = source.label(),
            authorizers = chain.authorizers.len(),
            webhooks = chain.webhook_count(),
            "authorization chain resolved"
        );
    } else {
        tracing::warn!(
            source = source.label(),
            field_errors = field_errors.len(),
            option_errors = option_errors.len(),
            "authorization chain rejected"
        );
    }

    Ok(ResolvedAuthorization {
        source,
        chain,
        policy_file: non_empty(&legacy.policy_file),
        retry_backoff: legacy.retry_backoff,
        field_errors,
        option_errors,
    })
}

/// Chain plus everything validation found wrong with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAuthorization {
    /// Where the chain came from.
    pub source: ConfigSource,
    /// Effective chain.
    pub chain: AuthorizerChainConfig,
    /// ABAC policy file, when configured.
    pub policy_file: Option<String>,
    /// Webhook retry backoff handed to the runtime.
    pub retry_backoff: Option<RetryBackoff>,
    /// Chain field errors.
    pub field_errors: FieldErrorList,
    /// Cross-flag errors.
    pub option_errors: Vec<OptionError>,
}

impl ResolvedAuthorization {
    /// Returns true when no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.option_errors.is_empty()
    }

    /// Renders every error as one aggregate message.
    #[must_use]
    pub fn aggregate_message(&self) -> String {
        AggregateMessage(self).to_string()
    }

    /// Converts into the consumer-facing configuration when valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] carrying the aggregate message
    /// when any error was found.
    pub fn into_config(self) -> Result<AuthorizationConfig, ConfigError> {
        if !self.is_valid() {
            return Err(ConfigError::Validation(self.aggregate_message()));
        }
        Ok(AuthorizationConfig {
            chain: self.chain,
            policy_file: self.policy_file,
            retry_backoff: self.retry_backoff,
        })
    }
}

/// Display adapter joining field and option errors.
struct AggregateMessage<'a>(&'a ResolvedAuthorization);

impl fmt::Display for AggregateMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .field_errors
            .iter()
            .map(ToString::to_string)
            .chain(self.0.option_errors.iter().map(ToString::to_string))
            .collect();
        write_aggregate(f, messages.iter())
    }
}

/// Validated configuration consumed by the runtime authorizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationConfig {
    /// Validated chain.
    pub chain: AuthorizerChainConfig,
    /// ABAC policy file, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_file: Option<String>,
    /// Webhook retry backoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff: Option<RetryBackoff>,
}

/// Returns `Some` for non-empty strings.
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
