// crates/authz-chain-config/src/legacy.rs
// ============================================================================
// Module: Legacy Flag Surface
// Description: Flat, flag-style authorization settings and chain synthesis.
// Purpose: Converge the legacy flags on the structured chain shape.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Older deployments configure authorization with flat settings: an ordered
//! mode list, a single webhook kubeconfig, a review version, two cache TTLs,
//! and a retry backoff. [`build_legacy_chain`] turns those into the same
//! [`AuthorizerChainConfig`] the structured file produces, without
//! validating it; the shared chain validator runs afterwards.
//! Cross-flag consistency rules that have no field path are reported as
//! [`OptionError`] values. When the chain comes from a structured file, the
//! same rules are checked against the loaded chain instead of the mode list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::model::AuthorizerChainConfig;
use crate::model::AuthorizerEntry;
use crate::model::ConnectionInfo;
use crate::model::ConnectionType;
use crate::model::DEFAULT_WEBHOOK_NAME;
use crate::model::FailurePolicy;
use crate::model::MAX_WEBHOOK_TIMEOUT;
use crate::model::RetryBackoff;
use crate::model::SubjectAccessReviewVersion;
use crate::model::TYPE_ABAC;
use crate::model::TYPE_ALWAYS_ALLOW;
use crate::model::TYPE_WEBHOOK;
use crate::model::WebhookSpec;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default cache duration for authorized webhook responses.
pub const DEFAULT_AUTHORIZED_TTL: Duration = Duration::from_secs(5 * 60);
/// Default cache duration for unauthorized webhook responses.
pub const DEFAULT_UNAUTHORIZED_TTL: Duration = Duration::from_secs(30);
/// Default `SubjectAccessReview` version for the legacy webhook.
pub const DEFAULT_WEBHOOK_VERSION: SubjectAccessReviewVersion = SubjectAccessReviewVersion::V1Beta1;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Flat webhook settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyWebhookOptions {
    /// Kubeconfig path describing the webhook endpoint.
    pub config_file: String,
    /// `SubjectAccessReview` version string.
    pub version: String,
    /// Cache duration for authorized responses.
    pub cache_authorized_ttl: Duration,
    /// Cache duration for unauthorized responses.
    pub cache_unauthorized_ttl: Duration,
}

impl Default for LegacyWebhookOptions {
    fn default() -> Self {
        Self {
            config_file: String::new(),
            version: DEFAULT_WEBHOOK_VERSION.as_str().to_string(),
            cache_authorized_ttl: DEFAULT_AUTHORIZED_TTL,
            cache_unauthorized_ttl: DEFAULT_UNAUTHORIZED_TTL,
        }
    }
}

/// Flat authorization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAuthorizationOptions {
    /// Ordered authorizer modes.
    pub modes: Vec<String>,
    /// ABAC policy file (consumed by the ABAC authorizer, not validated here).
    pub policy_file: String,
    /// Webhook settings, applied when `modes` contains `Webhook`.
    pub webhook: LegacyWebhookOptions,
    /// Webhook retry backoff; `None` leaves the runtime default in place.
    pub retry_backoff: Option<RetryBackoff>,
}

impl Default for LegacyAuthorizationOptions {
    fn default() -> Self {
        Self {
            modes: vec![TYPE_ALWAYS_ALLOW.to_string()],
            policy_file: String::new(),
            webhook: LegacyWebhookOptions::default(),
            retry_backoff: Some(RetryBackoff::default()),
        }
    }
}

impl LegacyAuthorizationOptions {
    /// Synthesizes the chain described by these options.
    #[must_use]
    pub fn build_chain(&self) -> AuthorizerChainConfig {
        build_legacy_chain(&self.modes, &self.webhook)
    }

    /// Checks cross-flag consistency rules.
    #[must_use]
    pub fn validate(&self) -> Vec<OptionError> {
        let mut errors = Vec::new();
        let has_mode = |mode: &str| self.modes.iter().any(|candidate| candidate == mode);

        if has_mode(TYPE_ABAC) && self.policy_file.is_empty() {
            errors.push(OptionError::AbacPolicyFileMissing);
        }
        if !self.policy_file.is_empty() && !has_mode(TYPE_ABAC) {
            errors.push(OptionError::PolicyFileWithoutAbac);
        }
        if !self.webhook.config_file.is_empty() && !has_mode(TYPE_WEBHOOK) {
            errors.push(OptionError::WebhookConfigWithoutWebhook);
        }
        if let Some(error) = validate_retry_backoff(self.retry_backoff.as_ref()) {
            errors.push(error);
        }
        errors
    }

    /// Checks the flags that still apply when `chain` was loaded from a
    /// structured file.
    ///
    /// The ABAC rules use the chain's entries in place of the mode list. The
    /// webhook kubeconfig flag has no effect on this path and is rejected.
    #[must_use]
    pub fn validate_with_structured_chain(
        &self,
        chain: &AuthorizerChainConfig,
    ) -> Vec<OptionError> {
        let mut errors = Vec::new();
        let uses_abac = chain.authorizers.iter().any(|entry| entry.authorizer_type == TYPE_ABAC);

        if uses_abac && self.policy_file.is_empty() {
            errors.push(OptionError::AbacPolicyFileMissing);
        }
        if !self.policy_file.is_empty() && !uses_abac {
            errors.push(OptionError::PolicyFileWithoutAbac);
        }
        if !self.webhook.config_file.is_empty() {
            errors.push(OptionError::WebhookConfigWithoutWebhook);
        }
        if let Some(error) = validate_retry_backoff(self.retry_backoff.as_ref()) {
            errors.push(error);
        }
        errors
    }
}

/// Checks the retry backoff attempt count.
#[must_use]
pub fn validate_retry_backoff(backoff: Option<&RetryBackoff>) -> Option<OptionError> {
    backoff
        .filter(|backoff| backoff.steps <= 0)
        .map(|backoff| OptionError::RetrySteps(backoff.steps))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Cross-flag consistency violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// ABAC mode configured without a policy file.
    #[error("authorization-mode ABAC's authorization policy file not passed")]
    AbacPolicyFileMissing,
    /// Policy file configured without ABAC mode.
    #[error("cannot specify --authorization-policy-file without mode ABAC")]
    PolicyFileWithoutAbac,
    /// Webhook kubeconfig configured without Webhook mode.
    #[error("cannot specify --authorization-webhook-config-file without mode Webhook")]
    WebhookConfigWithoutWebhook,
    /// Retry backoff allows no attempts.
    #[error("number of webhook retry attempts must be greater than 0, but is: {0}")]
    RetrySteps(i32),
}

// ============================================================================
// SECTION: Chain Synthesis
// ============================================================================

/// Builds a chain with one entry per mode, in order.
///
/// The webhook entry gets the fixed legacy timeout and failure policy; the
/// result is not validated.
#[must_use]
pub fn build_legacy_chain(
    modes: &[String],
    webhook: &LegacyWebhookOptions,
) -> AuthorizerChainConfig {
    let authorizers = modes
        .iter()
        .map(|mode| {
            if mode == TYPE_WEBHOOK {
                AuthorizerEntry::webhook(legacy_webhook_spec(webhook))
            } else {
                AuthorizerEntry::of_type(mode.as_str())
            }
        })
        .collect();
    AuthorizerChainConfig::new(authorizers)
}

/// Converts the flat webhook settings into a webhook spec.
fn legacy_webhook_spec(webhook: &LegacyWebhookOptions) -> WebhookSpec {
    WebhookSpec {
        name: DEFAULT_WEBHOOK_NAME.to_string(),
        authorized_ttl: webhook.cache_authorized_ttl,
        unauthorized_ttl: webhook.cache_unauthorized_ttl,
        timeout: MAX_WEBHOOK_TIMEOUT,
        subject_access_review_version: webhook.version.clone(),
        failure_policy: FailurePolicy::NoOpinion.as_str().to_string(),
        connection_info: ConnectionInfo {
            connection_type: ConnectionType::KubeConfigFile.as_str().to_string(),
            kube_config_file: Some(webhook.config_file.clone()),
        },
        match_conditions: Vec::new(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
