// crates/authz-chain-config/tests/common/mod.rs
// =============================================================================
// Module: Chain Config Test Helpers
// Description: Shared builders and assertions for chain validation tests.
// Purpose: Reduce duplication across integration tests for authz-chain-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::time::Duration;

use authz_chain_config::AuthorizerChainConfig;
use authz_chain_config::AuthorizerEntry;
use authz_chain_config::ConnectionInfo;
use authz_chain_config::FieldErrorKind;
use authz_chain_config::FieldErrorList;
use authz_chain_config::WebhookSpec;
use tempfile::NamedTempFile;

pub type TestResult = Result<(), String>;

/// Creates an empty temp file usable as an absolute kubeconfig path.
pub fn kubeconfig_file() -> Result<NamedTempFile, String> {
    NamedTempFile::new().map_err(|err| err.to_string())
}

/// Returns the temp file's path as a string.
pub fn path_string(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

/// Returns a webhook spec that passes validation with the given kubeconfig.
pub fn valid_webhook(name: &str, kubeconfig: &str) -> WebhookSpec {
    WebhookSpec {
        name: name.to_string(),
        authorized_ttl: Duration::from_secs(300),
        unauthorized_ttl: Duration::from_secs(30),
        timeout: Duration::from_secs(5),
        subject_access_review_version: "v1".to_string(),
        failure_policy: "NoOpinion".to_string(),
        connection_info: ConnectionInfo {
            connection_type: "KubeConfigFile".to_string(),
            kube_config_file: Some(kubeconfig.to_string()),
        },
        match_conditions: Vec::new(),
    }
}

/// Returns a webhook spec connecting with in-cluster credentials.
pub fn in_cluster_webhook(name: &str) -> WebhookSpec {
    WebhookSpec {
        name: name.to_string(),
        authorized_ttl: Duration::from_secs(300),
        unauthorized_ttl: Duration::from_secs(30),
        timeout: Duration::from_secs(5),
        subject_access_review_version: "v1beta1".to_string(),
        failure_policy: "Deny".to_string(),
        connection_info: ConnectionInfo {
            connection_type: "InClusterConfig".to_string(),
            kube_config_file: None,
        },
        match_conditions: Vec::new(),
    }
}

/// Builds a chain from entries.
pub fn chain(entries: Vec<AuthorizerEntry>) -> AuthorizerChainConfig {
    AuthorizerChainConfig::new(entries)
}

/// Builds a chain holding a single webhook entry.
pub fn single_webhook_chain(spec: WebhookSpec) -> AuthorizerChainConfig {
    chain(vec![AuthorizerEntry::webhook(spec)])
}

/// Asserts that `errors` is empty.
pub fn assert_no_errors(errors: &FieldErrorList) -> TestResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no errors, got {errors}"))
    }
}

/// Asserts that `errors` holds exactly one error of `kind` at `field`.
pub fn assert_single(errors: &FieldErrorList, kind: FieldErrorKind, field: &str) -> TestResult {
    if errors.len() != 1 {
        return Err(format!("expected exactly one error, got {}: {errors}", errors.len()));
    }
    assert_contains(errors, kind, field)
}

/// Asserts that `errors` holds an error of `kind` at `field`.
pub fn assert_contains(errors: &FieldErrorList, kind: FieldErrorKind, field: &str) -> TestResult {
    if errors.iter().any(|error| error.kind == kind && error.field.to_string() == field) {
        Ok(())
    } else {
        Err(format!("expected {kind:?} at {field}, got {errors}"))
    }
}

/// Asserts that the error at `field` mentions `needle`.
pub fn assert_message(errors: &FieldErrorList, field: &str, needle: &str) -> TestResult {
    let found = errors
        .iter()
        .any(|error| error.field.to_string() == field && error.to_string().contains(needle));
    if found {
        Ok(())
    } else {
        Err(format!("expected error at {field} containing '{needle}', got {errors}"))
    }
}
