// crates/authz-chain-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example authorization configuration.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example is kept loadable by the loader and valid against the schema.
//! Its kubeconfig path is illustrative; validation additionally requires the
//! file to exist.

/// Returns a canonical example authorization configuration in TOML.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"apiVersion = "apiserver.config.k8s.io/v1alpha1"
kind = "AuthorizationConfiguration"

[[authorizers]]
type = "Node"

[[authorizers]]
type = "RBAC"

[[authorizers]]
type = "Webhook"

[authorizers.webhook]
name = "tenant-policy"
authorizedTTL = "5m"
unauthorizedTTL = "30s"
timeout = "3s"
subjectAccessReviewVersion = "v1"
failurePolicy = "Deny"

[authorizers.webhook.connectionInfo]
type = "KubeConfigFile"
kubeConfigFile = "/etc/authz/tenant-policy.kubeconfig"

[[authorizers.webhook.matchConditions]]
expression = "has(request.resourceAttributes)"
message = "only resource requests are sent to the tenant policy webhook"

[[authorizers]]
type = "Webhook"

[authorizers.webhook]
name = "audit-gate"
authorizedTTL = "1m"
unauthorizedTTL = "10s"
timeout = "2s"
subjectAccessReviewVersion = "v1beta1"
failurePolicy = "NoOpinion"

[authorizers.webhook.connectionInfo]
type = "InClusterConfig"
"#,
    )
}
