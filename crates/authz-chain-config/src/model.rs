// crates/authz-chain-config/src/model.rs
// ============================================================================
// Module: Authorization Chain Model
// Description: Typed representation of the authorizer chain configuration.
// Purpose: Shared interchange format between the file and flag surfaces.
// Dependencies: humantime, serde
// ============================================================================

//! ## Overview
//! The chain model mirrors the structured configuration file field for field.
//! String-typed enumerations (`subjectAccessReviewVersion`, `failurePolicy`,
//! `connectionInfo.type`) stay strings in the model so that out-of-range
//! values surface as field errors from the validator instead of parse
//! failures; the typed enums below are the parsed views.
//!
//! Security posture: configuration inputs are untrusted and are only
//! consumed after validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Authorizer type identifier for webhook authorizers.
pub const TYPE_WEBHOOK: &str = "Webhook";
/// Authorizer type identifier for attribute-based access control.
pub const TYPE_ABAC: &str = "ABAC";
/// Authorizer type identifier that allows every request.
pub const TYPE_ALWAYS_ALLOW: &str = "AlwaysAllow";
/// Authorizer type identifier that denies every request.
pub const TYPE_ALWAYS_DENY: &str = "AlwaysDeny";
/// Authorizer type identifier for node authorization.
pub const TYPE_NODE: &str = "Node";
/// Authorizer type identifier for role-based access control.
pub const TYPE_RBAC: &str = "RBAC";

/// All authorizer types understood by the runtime chain.
pub const AUTHORIZER_TYPE_CHOICES: &[&str] =
    &[TYPE_ALWAYS_ALLOW, TYPE_ALWAYS_DENY, TYPE_ABAC, TYPE_WEBHOOK, TYPE_RBAC, TYPE_NODE];
/// Authorizer types that may appear more than once in a chain.
pub const REPEATABLE_AUTHORIZER_TYPES: &[&str] = &[TYPE_WEBHOOK];

/// Webhook name assigned by the legacy flag surface.
pub const DEFAULT_WEBHOOK_NAME: &str = "default";
/// Upper bound for a webhook request timeout.
pub const MAX_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Expected `kind` header of a structured configuration file.
pub const CONFIG_KIND: &str = "AuthorizationConfiguration";
/// Supported `apiVersion` header values of a structured configuration file.
pub const CONFIG_API_VERSIONS: &[&str] = &["apiserver.config.k8s.io/v1alpha1"];

// ============================================================================
// SECTION: Chain Types
// ============================================================================

/// Ordered authorizer chain.
///
/// # Invariants
/// - Entry order is the runtime evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthorizerChainConfig {
    /// Optional API version header (structured files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Optional kind header (structured files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Authorizers in evaluation order.
    #[serde(default)]
    pub authorizers: Vec<AuthorizerEntry>,
}

impl AuthorizerChainConfig {
    /// Creates a chain from entries without file headers.
    #[must_use]
    pub const fn new(authorizers: Vec<AuthorizerEntry>) -> Self {
        Self {
            api_version: None,
            kind: None,
            authorizers,
        }
    }

    /// Returns the number of webhook-typed entries in the chain.
    #[must_use]
    pub fn webhook_count(&self) -> usize {
        self.authorizers.iter().filter(|entry| entry.is_webhook()).count()
    }
}

/// Single authorizer in the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthorizerEntry {
    /// Authorizer type identifier.
    #[serde(rename = "type", default)]
    pub authorizer_type: String,
    /// Webhook settings, present only for `type = "Webhook"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSpec>,
}

impl AuthorizerEntry {
    /// Creates a non-webhook entry of the given type.
    #[must_use]
    pub fn of_type(authorizer_type: impl Into<String>) -> Self {
        Self {
            authorizer_type: authorizer_type.into(),
            webhook: None,
        }
    }

    /// Creates a webhook entry.
    #[must_use]
    pub fn webhook(spec: WebhookSpec) -> Self {
        Self {
            authorizer_type: TYPE_WEBHOOK.to_string(),
            webhook: Some(spec),
        }
    }

    /// Returns true when the entry type is `Webhook`.
    #[must_use]
    pub fn is_webhook(&self) -> bool {
        self.authorizer_type == TYPE_WEBHOOK
    }
}

// ============================================================================
// SECTION: Webhook Types
// ============================================================================

/// Webhook authorizer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebhookSpec {
    /// Webhook name, used for metrics attribution.
    #[serde(default)]
    pub name: String,
    /// Cache duration for authorized responses.
    #[serde(rename = "authorizedTTL", default, with = "humantime_serde")]
    pub authorized_ttl: Duration,
    /// Cache duration for unauthorized responses.
    #[serde(rename = "unauthorizedTTL", default, with = "humantime_serde")]
    pub unauthorized_ttl: Duration,
    /// Request timeout for a single webhook call.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Duration,
    /// `SubjectAccessReview` API version sent to the webhook.
    #[serde(default)]
    pub subject_access_review_version: String,
    /// Decision when the webhook call fails.
    #[serde(default)]
    pub failure_policy: String,
    /// How the webhook endpoint is reached.
    #[serde(default)]
    pub connection_info: ConnectionInfo,
    /// Predicates gating whether the webhook is consulted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_conditions: Vec<MatchCondition>,
}

/// Webhook connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConnectionInfo {
    /// Connection type identifier.
    #[serde(rename = "type", default)]
    pub connection_type: String,
    /// Kubeconfig path for `type = "KubeConfigFile"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_config_file: Option<String>,
}

/// Predicate over the request that gates a webhook call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchCondition {
    /// Predicate expression.
    #[serde(default)]
    pub expression: String,
    /// Optional explanation reported when the condition skips the webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchCondition {
    /// Creates a match condition without a message.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: None,
        }
    }
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Supported `SubjectAccessReview` API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectAccessReviewVersion {
    /// `authorization.k8s.io/v1`.
    V1,
    /// `authorization.k8s.io/v1beta1`.
    V1Beta1,
}

impl SubjectAccessReviewVersion {
    /// Allowed wire values.
    pub const ALLOWED: &'static [&'static str] = &["v1", "v1beta1"];

    /// Parses a wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "v1" => Some(Self::V1),
            "v1beta1" => Some(Self::V1Beta1),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V1Beta1 => "v1beta1",
        }
    }
}

/// Webhook failure policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Defer to subsequent authorizers.
    NoOpinion,
    /// Reject the request outright.
    Deny,
}

impl FailurePolicy {
    /// Allowed wire values.
    pub const ALLOWED: &'static [&'static str] = &["NoOpinion", "Deny"];

    /// Parses a wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NoOpinion" => Some(Self::NoOpinion),
            "Deny" => Some(Self::Deny),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOpinion => "NoOpinion",
            Self::Deny => "Deny",
        }
    }
}

/// Webhook connection types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Use the in-cluster service account configuration.
    InClusterConfig,
    /// Use a kubeconfig file on disk.
    KubeConfigFile,
}

impl ConnectionType {
    /// Allowed wire values.
    pub const ALLOWED: &'static [&'static str] = &["InClusterConfig", "KubeConfigFile"];

    /// Parses a wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "InClusterConfig" => Some(Self::InClusterConfig),
            "KubeConfigFile" => Some(Self::KubeConfigFile),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InClusterConfig => "InClusterConfig",
            Self::KubeConfigFile => "KubeConfigFile",
        }
    }
}

/// Implements `Display` through the wire value.
macro_rules! display_as_str {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_as_str!(SubjectAccessReviewVersion, FailurePolicy, ConnectionType);

// ============================================================================
// SECTION: Retry Backoff
// ============================================================================

/// Retry backoff applied by the runtime webhook client.
///
/// # Invariants
/// - `steps` must be greater than zero once validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryBackoff {
    /// Delay before the first retry.
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub factor: f64,
    /// Random jitter fraction added to each delay.
    pub jitter: f64,
    /// Maximum number of attempts.
    pub steps: i32,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            factor: 1.5,
            jitter: 0.2,
            steps: 5,
        }
    }
}

// ============================================================================
// SECTION: Duration Serde
// ============================================================================

/// Serializes durations as human-readable strings (`"5m"`, `"30s"`).
pub(crate) mod humantime_serde {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    /// Serializes a duration as a humantime string.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a humantime string into a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
