// flowgate-core/tests/gate.rs
// ============================================================================
// Module: Gate Engine Tests
// Description: Tests for staged integrity checks at the handoff boundary.
// ============================================================================
//! ## Overview
//! Validates check ordering, checksum recomputation from bytes, idempotent
//! re-runs, and concrete remediation instructions on failures.

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

use flowgate_core::AuditRecord;
use flowgate_core::AuditTrail;
use flowgate_core::CONTEXT_SNAPSHOT_PATH;
use flowgate_core::ChainReport;
use flowgate_core::ChainStatus;
use flowgate_core::ChainSummary;
use flowgate_core::CheckDisposition;
use flowgate_core::CheckId;
use flowgate_core::ContractDocument;
use flowgate_core::DomainId;
use flowgate_core::ExecutionContext;
use flowgate_core::FieldPath;
use flowgate_core::GateEngine;
use flowgate_core::GateId;
use flowgate_core::GateSpec;
use flowgate_core::MemoryArtifactStore;
use flowgate_core::PhaseContract;
use flowgate_core::PhaseId;
use flowgate_core::PipelineId;
use flowgate_core::SchemaVersion;
use flowgate_core::TimePair;
use flowgate_core::export_handoff;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a minimal two-phase contract.
fn contract() -> ContractDocument {
    ContractDocument {
        schema_version: SchemaVersion::from("1"),
        pipeline_id: PipelineId::from("pipeline-a"),
        domain: DomainId::from("content"),
        phases: vec![
            PhaseContract {
                phase_id: PhaseId::from("classify"),
                entry: Vec::new(),
                exit: Vec::new(),
                enrichment: Vec::new(),
            },
            PhaseContract {
                phase_id: PhaseId::from("generate"),
                entry: Vec::new(),
                exit: Vec::new(),
                enrichment: Vec::new(),
            },
        ],
        chains: Vec::new(),
    }
}

/// Builds a chain summary with the given intact/broken mix.
fn chain_summary(intact: usize, broken: usize) -> ChainSummary {
    let mut reports = Vec::new();
    for index in 0..intact {
        reports.push(ChainReport {
            chain_id: format!("intact-{index}").into(),
            destination_field: FieldPath::from("generate.domain"),
            status: ChainStatus::Intact,
            failure: None,
        });
    }
    for index in 0..broken {
        reports.push(ChainReport {
            chain_id: format!("broken-{index}").into(),
            destination_field: FieldPath::from("generate.summary"),
            status: ChainStatus::Broken,
            failure: Some(flowgate_core::ChainFailure::SourceAbsent),
        });
    }
    ChainSummary::from_reports(reports)
}

/// Exports a complete handoff bundle into an in-memory store.
fn export_bundle(chains: &ChainSummary) -> MemoryArtifactStore {
    let mut store = MemoryArtifactStore::new();
    let mut context = ExecutionContext::new();
    context.set("generate.domain", json!("retail")).unwrap();

    let mut audit = AuditTrail::new();
    for report in &chains.reports {
        audit.push(AuditRecord::Chain(report.clone()));
    }

    export_handoff(
        &mut store,
        &context,
        &contract(),
        &audit,
        chains,
        TimePair::new(1_700_000_000_000, 0),
    )
    .unwrap();
    store
}

/// Builds an engine with the standard handoff gate registered.
fn engine() -> GateEngine {
    GateEngine::new(vec![GateSpec::standard(
        GateId::from("handoff"),
        PhaseId::from("generate"),
        1.0,
    )])
}

// ============================================================================
// SECTION: Passing Gates
// ============================================================================

/// Tests a freshly exported bundle passes every check.
#[test]
fn test_fresh_bundle_passes_all_checks() {
    let store = export_bundle(&chain_summary(2, 0));
    let results = engine().run_gate(&GateId::from("handoff"), &store).unwrap();

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|result| result.result == CheckDisposition::Pass));
    assert!(results.iter().all(|result| !result.blocking));
}

/// Tests running the same gate twice on unchanged artifacts is idempotent.
#[test]
fn test_gate_is_idempotent_on_unchanged_artifacts() {
    let store = export_bundle(&chain_summary(1, 0));
    let engine = engine();

    let first = engine.run_gate(&GateId::from("handoff"), &store).unwrap();
    let second = engine.run_gate(&GateId::from("handoff"), &store).unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// SECTION: Checksum Recomputation
// ============================================================================

/// Tests a tampered artifact is caught by recomputing checksums from bytes.
#[test]
fn test_tampered_artifact_fails_checksum_chain() {
    let mut store = export_bundle(&chain_summary(1, 0));
    store.insert(CONTEXT_SNAPSHOT_PATH, b"{}".to_vec());

    let results = engine().run_gate(&GateId::from("handoff"), &store).unwrap();

    let checksum = results
        .iter()
        .find(|result| result.check == CheckId::from("checksum_chain"))
        .unwrap();
    assert_eq!(checksum.result, CheckDisposition::Fail);
    assert!(checksum.blocking);
    assert!(checksum.reason.contains(CONTEXT_SNAPSHOT_PATH));
    assert!(checksum.next_action.as_deref().unwrap().contains("re-export"));
}

/// Tests logically identical artifacts re-serialized canonically keep their
/// checksums, regardless of host map insertion order.
#[test]
fn test_canonical_serialization_keeps_checksums_stable() {
    let mut context_forward = ExecutionContext::new();
    context_forward.set("alpha", json!(1)).unwrap();
    context_forward.set("beta", json!(2)).unwrap();
    let mut context_reverse = ExecutionContext::new();
    context_reverse.set("beta", json!(2)).unwrap();
    context_reverse.set("alpha", json!(1)).unwrap();

    let chains = chain_summary(1, 0);
    let audit = AuditTrail::new();
    let mut store_forward = MemoryArtifactStore::new();
    let mut store_reverse = MemoryArtifactStore::new();
    let exported_at = TimePair::new(1_700_000_000_000, 0);

    let manifest_forward = export_handoff(
        &mut store_forward,
        &context_forward,
        &contract(),
        &audit,
        &chains,
        exported_at,
    )
    .unwrap();
    let manifest_reverse = export_handoff(
        &mut store_reverse,
        &context_reverse,
        &contract(),
        &audit,
        &chains,
        exported_at,
    )
    .unwrap();

    assert_eq!(manifest_forward.integrity.root_hash, manifest_reverse.integrity.root_hash);
}

// ============================================================================
// SECTION: Ordering Dependencies
// ============================================================================

/// Tests a structural failure short-circuits the dependent checks.
#[test]
fn test_structural_failure_short_circuits_later_checks() {
    let mut store = export_bundle(&chain_summary(1, 0));
    store.remove(flowgate_core::AUDIT_TRAIL_PATH);

    let results = engine().run_gate(&GateId::from("handoff"), &store).unwrap();

    let structural = &results[0];
    assert_eq!(structural.check, CheckId::from("structural"));
    assert_eq!(structural.result, CheckDisposition::Fail);
    assert!(structural.next_action.as_deref().unwrap().contains("re-export"));

    for dependent in &results[1..3] {
        assert_eq!(dependent.result, CheckDisposition::Fail);
        assert!(dependent.reason.contains("structural"));
    }
}

/// Tests an unknown gate identifier is an engine error, not a result.
#[test]
fn test_unknown_gate_is_an_error() {
    let store = export_bundle(&chain_summary(1, 0));

    let result = engine().run_gate(&GateId::from("nope"), &store);
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Completeness Threshold
// ============================================================================

/// Tests completeness below threshold warns without blocking.
#[test]
fn test_low_completeness_warns_without_blocking() {
    let store = export_bundle(&chain_summary(1, 1));

    let results = engine().run_gate(&GateId::from("handoff"), &store).unwrap();

    let completeness = results
        .iter()
        .find(|result| result.check == CheckId::from("completeness"))
        .unwrap();
    assert_eq!(completeness.result, CheckDisposition::Warn);
    assert!(!completeness.blocking);
    assert!(completeness.next_action.as_deref().unwrap().contains("broken-0"));
}

/// Tests blocking status maps from the severity table, never ad hoc.
#[test]
fn test_blocking_derives_from_severity() {
    let mut store = export_bundle(&chain_summary(1, 0));
    store.insert(CONTEXT_SNAPSHOT_PATH, b"{}".to_vec());

    let results = engine().run_gate(&GateId::from("handoff"), &store).unwrap();

    for result in results {
        let expected = result.severity.blocks() && result.result != CheckDisposition::Pass;
        assert_eq!(result.blocking, expected);
    }
}
