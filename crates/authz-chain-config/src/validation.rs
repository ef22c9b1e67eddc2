// crates/authz-chain-config/src/validation.rs
// ============================================================================
// Module: Authorization Chain Validation
// Description: Structural and semantic validation of authorizer chains.
// Purpose: Report every chain defect in one pass before runtime construction.
// Dependencies: humantime, tracing
// ============================================================================

//! ## Overview
//! [`ChainValidator`] walks an [`AuthorizerChainConfig`] in order and
//! accumulates [`FieldError`] values; it never mutates its input and never
//! aborts early. Webhook entries are delegated to [`validate_webhook`], which
//! checks each webhook field independently. Match-condition expressions are
//! handed to a pluggable [`ExpressionChecker`] once they are known to be
//! non-blank.
//!
//! Security posture: chain configuration is untrusted until this module
//! reports no errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::field::FieldError;
use crate::field::FieldErrorList;
use crate::field::FieldPath;
use crate::model::AUTHORIZER_TYPE_CHOICES;
use crate::model::AuthorizerChainConfig;
use crate::model::ConnectionInfo;
use crate::model::ConnectionType;
use crate::model::FailurePolicy;
use crate::model::MAX_WEBHOOK_TIMEOUT;
use crate::model::REPEATABLE_AUTHORIZER_TYPES;
use crate::model::SubjectAccessReviewVersion;
use crate::model::TYPE_WEBHOOK;
use crate::model::WebhookSpec;

// ============================================================================
// SECTION: Expression Checking
// ============================================================================

/// Type-checks match-condition expressions against a request shape.
///
/// `review` is the selected `SubjectAccessReview` version, or `None` when the
/// webhook's version is itself invalid.
pub trait ExpressionChecker: Send + Sync {
    /// Returns errors for `expression`, attributed to `field`.
    fn check(
        &self,
        field: &FieldPath,
        expression: &str,
        review: Option<SubjectAccessReviewVersion>,
    ) -> FieldErrorList;
}

/// Checker that accepts every non-blank expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExpressionChecker;

impl ExpressionChecker for NoopExpressionChecker {
    fn check(
        &self,
        _field: &FieldPath,
        _expression: &str,
        _review: Option<SubjectAccessReviewVersion>,
    ) -> FieldErrorList {
        FieldErrorList::new()
    }
}

// ============================================================================
// SECTION: Chain Validation
// ============================================================================

/// Handling of a chain with no authorizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyChainPolicy {
    /// Report a Required error on `authorizers`.
    #[default]
    Reject,
    /// Accept an empty chain.
    Allow,
}

/// Validates authorizer chains against a set of known and repeatable types.
#[derive(Clone)]
pub struct ChainValidator {
    /// Authorizer types accepted in the chain.
    known_types: BTreeSet<String>,
    /// Authorizer types allowed to appear more than once.
    repeatable_types: BTreeSet<String>,
    /// Handling of empty chains.
    empty_chain: EmptyChainPolicy,
    /// Match-condition expression checker.
    checker: Arc<dyn ExpressionChecker>,
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::new(
            AUTHORIZER_TYPE_CHOICES.iter().copied(),
            REPEATABLE_AUTHORIZER_TYPES.iter().copied(),
        )
    }
}

impl std::fmt::Debug for ChainValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainValidator")
            .field("known_types", &self.known_types)
            .field("repeatable_types", &self.repeatable_types)
            .field("empty_chain", &self.empty_chain)
            .finish_non_exhaustive()
    }
}

impl ChainValidator {
    /// Creates a validator for the given type sets with the default policy
    /// and a no-op expression checker.
    #[must_use]
    pub fn new<K, R, S, T>(known_types: K, repeatable_types: R) -> Self
    where
        K: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            known_types: known_types.into_iter().map(Into::into).collect(),
            repeatable_types: repeatable_types.into_iter().map(Into::into).collect(),
            empty_chain: EmptyChainPolicy::default(),
            checker: Arc::new(NoopExpressionChecker),
        }
    }

    /// Sets the empty-chain policy.
    #[must_use]
    pub const fn with_empty_chain(mut self, policy: EmptyChainPolicy) -> Self {
        self.empty_chain = policy;
        self
    }

    /// Sets the match-condition expression checker.
    #[must_use]
    pub fn with_expression_checker(mut self, checker: Arc<dyn ExpressionChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Validates `chain`, returning every defect found.
    #[must_use]
    pub fn validate(&self, chain: &AuthorizerChainConfig) -> FieldErrorList {
        let mut errors = FieldErrorList::new();
        let root = FieldPath::new("authorizers");

        if chain.authorizers.is_empty() && self.empty_chain == EmptyChainPolicy::Reject {
            errors.push(FieldError::required(
                root.clone(),
                "at least one authorization mode must be defined",
            ));
        }

        let require_name = chain.webhook_count() > 1;
        let mut seen_types: BTreeSet<&str> = BTreeSet::new();
        let mut seen_names: BTreeSet<String> = BTreeSet::new();

        for (idx, entry) in chain.authorizers.iter().enumerate() {
            let path = root.index(idx);
            let entry_type = entry.authorizer_type.as_str();
            if entry_type.is_empty() {
                errors.push(FieldError::required(path.child("type"), ""));
                continue;
            }
            if !self.known_types.contains(entry_type) {
                errors.push(FieldError::not_supported(
                    path.child("type"),
                    entry_type,
                    &self.known_types.iter().collect::<Vec<_>>(),
                ));
                continue;
            }
            if seen_types.contains(entry_type) && !self.repeatable_types.contains(entry_type) {
                errors.push(FieldError::duplicate(path.child("type"), entry_type));
                continue;
            }
            seen_types.insert(entry_type);

            match (entry_type == TYPE_WEBHOOK, &entry.webhook) {
                (true, None) => {
                    errors.push(FieldError::required(
                        path.child("webhook"),
                        "required when type=Webhook",
                    ));
                }
                (true, Some(webhook)) => {
                    errors.extend(validate_webhook(
                        &path.child("webhook"),
                        webhook,
                        require_name,
                        &mut seen_names,
                        self.checker.as_ref(),
                    ));
                }
                (false, Some(_)) => {
                    errors.push(FieldError::invalid(
                        path.child("webhook"),
                        "non-null",
                        "may only be specified when type=Webhook",
                    ));
                }
                (false, None) => {}
            }
        }

        tracing::debug!(
            authorizers = chain.authorizers.len(),
            errors = errors.len(),
            "validated authorization chain"
        );
        errors
    }
}

/// Validates `chain` against the given type sets with default settings.
#[must_use]
pub fn validate_chain<K: AsRef<str>, R: AsRef<str>>(
    chain: &AuthorizerChainConfig,
    known_types: &[K],
    repeatable_types: &[R],
) -> FieldErrorList {
    ChainValidator::new(
        known_types.iter().map(|value| value.as_ref().to_string()),
        repeatable_types.iter().map(|value| value.as_ref().to_string()),
    )
    .validate(chain)
}

// ============================================================================
// SECTION: Webhook Validation
// ============================================================================

/// Validates a single webhook spec under `path`.
///
/// `seen_names` carries webhook names across one chain walk; the webhook's name
/// is always inserted, including the empty name.
pub fn validate_webhook(
    path: &FieldPath,
    spec: &WebhookSpec,
    require_name: bool,
    seen_names: &mut BTreeSet<String>,
    checker: &dyn ExpressionChecker,
) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    if spec.name.is_empty() {
        if require_name {
            errors.push(FieldError::required(path.child("name"), ""));
        }
    } else if seen_names.contains(&spec.name) {
        errors.push(FieldError::duplicate(path.child("name"), spec.name.as_str()));
    }
    seen_names.insert(spec.name.clone());

    if spec.authorized_ttl.is_zero() {
        errors.push(FieldError::required(path.child("authorizedTTL"), ""));
    }
    if spec.unauthorized_ttl.is_zero() {
        errors.push(FieldError::required(path.child("unauthorizedTTL"), ""));
    }

    if spec.timeout.is_zero() {
        errors.push(FieldError::required(path.child("timeout"), ""));
    } else if spec.timeout > MAX_WEBHOOK_TIMEOUT {
        errors.push(FieldError::invalid(
            path.child("timeout"),
            humantime::format_duration(spec.timeout).to_string(),
            "must be <= 30s",
        ));
    }

    let review = validate_review_version(path, &spec.subject_access_review_version, &mut errors);

    let failure_path = path.child("failurePolicy");
    if spec.failure_policy.is_empty() {
        errors.push(FieldError::required(failure_path, ""));
    } else if FailurePolicy::parse(&spec.failure_policy).is_none() {
        errors.push(FieldError::not_supported(
            failure_path,
            spec.failure_policy.as_str(),
            FailurePolicy::ALLOWED,
        ));
    }

    errors.extend(validate_connection_info(&path.child("connectionInfo"), &spec.connection_info));

    for (idx, condition) in spec.match_conditions.iter().enumerate() {
        let expression_path = path.child("matchConditions").index(idx).child("expression");
        if condition.expression.trim().is_empty() {
            errors.push(FieldError::required(expression_path, ""));
        } else {
            errors.extend(checker.check(&expression_path, &condition.expression, review));
        }
    }

    errors
}

/// Validates the review version, returning the parsed version when valid.
fn validate_review_version(
    path: &FieldPath,
    value: &str,
    errors: &mut FieldErrorList,
) -> Option<SubjectAccessReviewVersion> {
    let field = path.child("subjectAccessReviewVersion");
    if value.is_empty() {
        errors.push(FieldError::required(field, ""));
        return None;
    }
    let parsed = SubjectAccessReviewVersion::parse(value);
    if parsed.is_none() {
        errors.push(FieldError::not_supported(field, value, SubjectAccessReviewVersion::ALLOWED));
    }
    parsed
}

/// Validates webhook connection settings under `path`.
fn validate_connection_info(path: &FieldPath, info: &ConnectionInfo) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    let file_path = path.child("kubeConfigFile");
    if info.connection_type.is_empty() {
        errors.push(FieldError::required(path.child("type"), ""));
        return errors;
    }
    match ConnectionType::parse(&info.connection_type) {
        Some(ConnectionType::InClusterConfig) => {
            if let Some(file) = &info.kube_config_file {
                errors.push(FieldError::invalid(
                    file_path,
                    file.as_str(),
                    "can only be set when type=KubeConfigFile",
                ));
            }
        }
        Some(ConnectionType::KubeConfigFile) => match info.kube_config_file.as_deref() {
            None | Some("") => errors.push(FieldError::required(file_path, "")),
            Some(file) => {
                if let Some(error) = check_kube_config_file(&file_path, file) {
                    errors.push(error);
                }
            }
        },
        None => {
            errors.push(FieldError::not_supported(
                path.child("type"),
                info.connection_type.as_str(),
                ConnectionType::ALLOWED,
            ));
        }
    }
    errors
}

/// Checks that a kubeconfig path is absolute, exists, and is a regular file.
fn check_kube_config_file(field: &FieldPath, file: &str) -> Option<FieldError> {
    let path = Path::new(file);
    if !path.is_absolute() {
        return Some(FieldError::invalid(field.clone(), file, "must be an absolute path"));
    }
    match fs::symlink_metadata(path) {
        Err(err) => {
            Some(FieldError::invalid(field.clone(), file, format!("error loading file: {err}")))
        }
        Ok(meta) if !meta.file_type().is_file() => {
            Some(FieldError::invalid(field.clone(), file, "must be a regular file"))
        }
        Ok(_) => None,
    }
}
