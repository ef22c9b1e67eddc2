// crates/authz-chain-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema for the structured authorization config file.
// Purpose: Give tooling and editors a machine-checkable file contract.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The schema describes the file shape only. Semantic rules that depend on
//! the whole chain (webhook name uniqueness, duplicate types, kubeconfig
//! existence) are enforced by the chain validator, not here.

use serde_json::Value;
use serde_json::json;

use crate::model::AUTHORIZER_TYPE_CHOICES;
use crate::model::CONFIG_API_VERSIONS;
use crate::model::CONFIG_KIND;
use crate::model::ConnectionType;
use crate::model::FailurePolicy;
use crate::model::SubjectAccessReviewVersion;

/// Returns the JSON schema for the structured authorization config file.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "authz-chain://schemas/authorization-config.schema.json",
        "title": "Authorization Chain Configuration",
        "description": "Ordered authorizer chain consulted for every request.",
        "type": "object",
        "properties": {
            "apiVersion": {
                "type": "string",
                "enum": CONFIG_API_VERSIONS
            },
            "kind": {
                "type": "string",
                "const": CONFIG_KIND
            },
            "authorizers": {
                "type": "array",
                "minItems": 1,
                "items": authorizer_schema()
            }
        },
        "required": ["authorizers"],
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Authorizers
// ============================================================================

/// Schema for a single authorizer entry.
fn authorizer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": AUTHORIZER_TYPE_CHOICES,
                "description": "Authorizer type identifier."
            },
            "webhook": webhook_schema()
        },
        "required": ["type"],
        "allOf": [
            {
                "if": { "properties": { "type": { "const": "Webhook" } } },
                "then": { "required": ["webhook"] },
                "else": { "not": { "required": ["webhook"] } }
            }
        ],
        "additionalProperties": false
    })
}

/// Schema for webhook settings.
fn webhook_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": schema_for_string("Webhook name; required when several webhooks exist."),
            "authorizedTTL": schema_for_duration("Cache duration for authorized responses."),
            "unauthorizedTTL": schema_for_duration("Cache duration for unauthorized responses."),
            "timeout": schema_for_duration("Request timeout, at most 30s."),
            "subjectAccessReviewVersion": {
                "type": "string",
                "enum": SubjectAccessReviewVersion::ALLOWED
            },
            "failurePolicy": {
                "type": "string",
                "enum": FailurePolicy::ALLOWED
            },
            "connectionInfo": connection_info_schema(),
            "matchConditions": {
                "type": "array",
                "items": match_condition_schema()
            }
        },
        "required": [
            "authorizedTTL",
            "unauthorizedTTL",
            "timeout",
            "subjectAccessReviewVersion",
            "failurePolicy",
            "connectionInfo"
        ],
        "additionalProperties": false
    })
}

/// Schema for webhook connection settings.
fn connection_info_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ConnectionType::ALLOWED
            },
            "kubeConfigFile": schema_for_string("Absolute kubeconfig path.")
        },
        "required": ["type"],
        "additionalProperties": false
    })
}

/// Schema for a match condition.
fn match_condition_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "expression": {
                "type": "string",
                "pattern": "\\S",
                "description": "Predicate over the request."
            },
            "message": schema_for_string("Explanation used when the webhook is skipped.")
        },
        "required": ["expression"],
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Schema for a described string.
fn schema_for_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// Schema for a human-readable duration string.
fn schema_for_duration(description: &str) -> Value {
    json!({
        "type": "string",
        "pattern": "^\\s*[0-9]",
        "description": description
    })
}
