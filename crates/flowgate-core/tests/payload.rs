// flowgate-core/tests/payload.rs
// ============================================================================
// Module: Payload Validation Tests
// Description: Tests for outbound and inbound payload checks.
// ============================================================================
//! ## Overview
//! Validates structured rejections: stable error codes, payload-relative
//! paths, sensitive-value redaction, and concrete next actions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use flowgate_core::ContractDocument;
use flowgate_core::DomainId;
use flowgate_core::FieldPath;
use flowgate_core::FieldSpec;
use flowgate_core::PayloadValidator;
use flowgate_core::PhaseContract;
use flowgate_core::PhaseId;
use flowgate_core::PipelineId;
use flowgate_core::SchemaVersion;
use flowgate_core::Severity;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a contract whose first phase requires a token at entry and whose
/// last phase requires a typed payload body at exit.
fn handoff_contract() -> ContractDocument {
    ContractDocument {
        schema_version: SchemaVersion::from("1"),
        pipeline_id: PipelineId::from("pipeline-a"),
        domain: DomainId::from("content"),
        phases: vec![
            PhaseContract {
                phase_id: PhaseId::from("ingest"),
                entry: vec![FieldSpec {
                    name: FieldPath::from("auth.token"),
                    severity: Severity::Blocking,
                    default: None,
                    source_phase: None,
                    value_type: Some("string".to_string()),
                    sensitive: true,
                }],
                exit: Vec::new(),
                enrichment: Vec::new(),
            },
            PhaseContract {
                phase_id: PhaseId::from("publish"),
                entry: Vec::new(),
                exit: vec![FieldSpec {
                    name: FieldPath::from("doc.body"),
                    severity: Severity::Blocking,
                    default: None,
                    source_phase: None,
                    value_type: Some("string".to_string()),
                    sensitive: false,
                }],
                enrichment: Vec::new(),
            },
        ],
        chains: Vec::new(),
    }
}

/// Builds a validator with the handoff contract registered.
fn validator() -> PayloadValidator {
    let mut validator = PayloadValidator::new();
    validator.register("handoff", handoff_contract());
    validator
}

// ============================================================================
// SECTION: Outbound
// ============================================================================

/// Tests a complete outbound payload validates cleanly.
#[test]
fn test_outbound_success() {
    let payload = json!({"doc": {"body": "hello"}});

    assert!(validator().validate_outbound("handoff", &payload).is_ok());
}

/// Tests an outbound rejection carries code, path, and next action.
#[test]
fn test_outbound_missing_field_rejection() {
    let payload = json!({"doc": {}});

    let rejection = validator().validate_outbound("handoff", &payload).unwrap_err();
    assert_eq!(rejection.error_code, "missing_required_field");
    assert_eq!(rejection.failed_path, "doc.body");
    assert!(!rejection.failed_path.starts_with('/'));
    assert!(rejection.next_action.contains("doc.body"));
}

// ============================================================================
// SECTION: Inbound
// ============================================================================

/// Tests a complete inbound payload validates cleanly.
#[test]
fn test_inbound_success() {
    let payload = json!({"auth": {"token": "tok-1"}});

    assert!(validator().validate_inbound("handoff", &payload).is_ok());
}

/// Tests a mistyped sensitive field never echoes its value.
#[test]
fn test_sensitive_value_is_never_echoed() {
    let payload = json!({"auth": {"token": 12345}});

    let rejection = validator().validate_inbound("handoff", &payload).unwrap_err();
    assert_eq!(rejection.error_code, "type_mismatch");
    assert_eq!(rejection.failed_path, "auth.token");
    assert!(!rejection.message.contains("12345"));
    assert!(rejection.message.contains("auth.token"));
}

/// Tests a mistyped non-sensitive field names the offending type.
#[test]
fn test_non_sensitive_mismatch_names_type() {
    let payload = json!({"doc": {"body": 7}});

    let rejection = validator().validate_outbound("handoff", &payload).unwrap_err();
    assert_eq!(rejection.error_code, "type_mismatch");
    assert!(rejection.message.contains("number"));
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Tests validating against an unregistered contract is rejected.
#[test]
fn test_unknown_contract_is_rejected() {
    let rejection =
        validator().validate_outbound("unregistered", &json!({})).unwrap_err();
    assert_eq!(rejection.error_code, "unknown_contract");
}
