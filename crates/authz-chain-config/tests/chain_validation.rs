//! Chain validation tests for authz-chain-config.
// crates/authz-chain-config/tests/chain_validation.rs
// =============================================================================
// Module: Chain Validation Tests
// Description: Entry-level chain rules: emptiness, types, duplicates, webhook.
// Purpose: Ensure every chain defect is reported once at the right path.
// =============================================================================

use authz_chain_config::AuthorizerChainConfig;
use authz_chain_config::AuthorizerEntry;
use authz_chain_config::ChainValidator;
use authz_chain_config::EmptyChainPolicy;
use authz_chain_config::FieldErrorKind;
use authz_chain_config::validate_chain;
use proptest::prelude::*;

mod common;

use common::TestResult;

const KNOWN: &[&str] = &["ABAC", "AlwaysAllow", "AlwaysDeny", "Node", "RBAC", "Webhook"];
const REPEATABLE: &[&str] = &["Webhook"];

// ============================================================================
// SECTION: Chain Shape
// ============================================================================

#[test]
fn empty_chain_reports_required_authorizers() -> TestResult {
    let errors = validate_chain(&AuthorizerChainConfig::default(), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::Required, "authorizers")?;
    common::assert_message(
        &errors,
        "authorizers",
        "at least one authorization mode must be defined",
    )?;
    Ok(())
}

#[test]
fn empty_chain_allowed_by_policy() -> TestResult {
    let validator = ChainValidator::default().with_empty_chain(EmptyChainPolicy::Allow);
    common::assert_no_errors(&validator.validate(&AuthorizerChainConfig::default()))
}

#[test]
fn empty_type_is_required_and_skips_entry() -> TestResult {
    let entry = AuthorizerEntry {
        authorizer_type: String::new(),
        webhook: Some(common::in_cluster_webhook("ignored")),
    };
    let errors = validate_chain(&common::chain(vec![entry]), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::Required, "authorizers[0].type")
}

#[test]
fn unknown_type_lists_known_types() -> TestResult {
    let entries = vec![AuthorizerEntry::of_type("DoesNotExist")];
    let errors = validate_chain(&common::chain(entries), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::NotSupported, "authorizers[0].type")?;
    common::assert_message(
        &errors,
        "authorizers[0].type",
        "Unsupported value: \"DoesNotExist\": supported values: \"ABAC\", \"AlwaysAllow\", \
         \"AlwaysDeny\", \"Node\", \"RBAC\", \"Webhook\"",
    )
}

#[test]
fn unknown_type_with_webhook_reports_only_type() -> TestResult {
    let entry = AuthorizerEntry {
        authorizer_type: "Custom".to_string(),
        webhook: Some(common::in_cluster_webhook("")),
    };
    let errors = validate_chain(&common::chain(vec![entry]), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::NotSupported, "authorizers[0].type")
}

#[test]
fn duplicate_non_repeatable_type_flags_second_occurrence() -> TestResult {
    let entries = vec![
        AuthorizerEntry::of_type("AlwaysAllow"),
        AuthorizerEntry::of_type("AlwaysAllow"),
    ];
    let errors = validate_chain(&common::chain(entries), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::Duplicate, "authorizers[1].type")?;
    common::assert_message(&errors, "authorizers[1].type", "Duplicate value: \"AlwaysAllow\"")
}

#[test]
fn third_occurrence_is_also_duplicate() -> TestResult {
    let entries = vec![
        AuthorizerEntry::of_type("RBAC"),
        AuthorizerEntry::of_type("RBAC"),
        AuthorizerEntry::of_type("RBAC"),
    ];
    let errors = validate_chain(&common::chain(entries), KNOWN, REPEATABLE);
    if errors.len() != 2 {
        return Err(format!("expected two duplicate errors, got {errors}"));
    }
    common::assert_contains(&errors, FieldErrorKind::Duplicate, "authorizers[1].type")?;
    common::assert_contains(&errors, FieldErrorKind::Duplicate, "authorizers[2].type")
}

#[test]
fn repeatable_type_may_repeat() -> TestResult {
    let kubeconfig = common::kubeconfig_file()?;
    let path = common::path_string(&kubeconfig);
    let entries = vec![
        AuthorizerEntry::webhook(common::valid_webhook("first", &path)),
        AuthorizerEntry::of_type("RBAC"),
        AuthorizerEntry::webhook(common::valid_webhook("second", &path)),
    ];
    common::assert_no_errors(&validate_chain(&common::chain(entries), KNOWN, REPEATABLE))
}

#[test]
fn webhook_type_requires_webhook_settings() -> TestResult {
    let entry = AuthorizerEntry::of_type("Webhook");
    let errors = validate_chain(&common::chain(vec![entry]), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::Required, "authorizers[0].webhook")?;
    common::assert_message(&errors, "authorizers[0].webhook", "required when type=Webhook")
}

#[test]
fn non_webhook_type_rejects_webhook_settings() -> TestResult {
    let entry = AuthorizerEntry {
        authorizer_type: "RBAC".to_string(),
        webhook: Some(common::in_cluster_webhook("misplaced")),
    };
    let errors = validate_chain(&common::chain(vec![entry]), KNOWN, REPEATABLE);
    common::assert_single(&errors, FieldErrorKind::Invalid, "authorizers[0].webhook")?;
    common::assert_message(
        &errors,
        "authorizers[0].webhook",
        "may only be specified when type=Webhook",
    )
}

#[test]
fn all_entry_defects_reported_in_one_pass() -> TestResult {
    let entries = vec![
        AuthorizerEntry::of_type(""),
        AuthorizerEntry::of_type("Bogus"),
        AuthorizerEntry::of_type("Node"),
        AuthorizerEntry::of_type("Node"),
        AuthorizerEntry::of_type("Webhook"),
    ];
    let errors = validate_chain(&common::chain(entries), KNOWN, REPEATABLE);
    if errors.len() != 4 {
        return Err(format!("expected four errors, got {errors}"));
    }
    common::assert_contains(&errors, FieldErrorKind::Required, "authorizers[0].type")?;
    common::assert_contains(&errors, FieldErrorKind::NotSupported, "authorizers[1].type")?;
    common::assert_contains(&errors, FieldErrorKind::Duplicate, "authorizers[3].type")?;
    common::assert_contains(&errors, FieldErrorKind::Required, "authorizers[4].webhook")
}

#[test]
fn custom_known_types_are_honored() -> TestResult {
    let entries = vec![AuthorizerEntry::of_type("Custom"), AuthorizerEntry::of_type("Custom")];
    let errors = validate_chain(&common::chain(entries), &["Custom"], &["Custom"]);
    common::assert_no_errors(&errors)
}

// ============================================================================
// SECTION: Idempotence
// ============================================================================

#[test]
fn validating_twice_yields_identical_errors() -> TestResult {
    let entries = vec![
        AuthorizerEntry::webhook(common::in_cluster_webhook("")),
        AuthorizerEntry::webhook(common::in_cluster_webhook("")),
        AuthorizerEntry::of_type("Nope"),
    ];
    let chain = common::chain(entries);
    let snapshot = chain.clone();
    let validator = ChainValidator::default();
    let first = validator.validate(&chain);
    let second = validator.validate(&chain);
    if first != second {
        return Err(format!("validation not idempotent: {first} vs {second}"));
    }
    if chain != snapshot {
        return Err("validation mutated the chain".to_string());
    }
    Ok(())
}

/// Generates entry types drawn from known, unknown, and empty identifiers.
fn entry_strategy() -> impl Strategy<Value = AuthorizerEntry> {
    let types = prop::sample::select(vec!["", "AlwaysAllow", "RBAC", "Node", "Webhook", "Other"]);
    (types, any::<bool>(), "[a-c]{0,2}").prop_map(|(entry_type, with_webhook, name)| {
        AuthorizerEntry {
            authorizer_type: entry_type.to_string(),
            webhook: with_webhook.then(|| common::in_cluster_webhook(&name)),
        }
    })
}

proptest! {
    #[test]
    fn validation_is_idempotent(entries in prop::collection::vec(entry_strategy(), 0..6)) {
        let chain = common::chain(entries);
        let first = validate_chain(&chain, KNOWN, REPEATABLE);
        let second = validate_chain(&chain, KNOWN, REPEATABLE);
        prop_assert_eq!(first, second);
    }
}
