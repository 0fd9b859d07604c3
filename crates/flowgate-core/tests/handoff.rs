// flowgate-core/tests/handoff.rs
// ============================================================================
// Module: Handoff Tests
// Description: Tests for versioned export and import of the handoff bundle.
// ============================================================================
//! ## Overview
//! Validates the explicit serialize/deserialize step across the process
//! boundary: round trips, version-skew detection, and the filesystem backend.

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

use flowgate_core::AuditTrail;
use flowgate_core::CONTEXT_SNAPSHOT_PATH;
use flowgate_core::ChainSummary;
use flowgate_core::ContractDocument;
use flowgate_core::DomainId;
use flowgate_core::ExecutionContext;
use flowgate_core::FieldPath;
use flowgate_core::FsArtifactReader;
use flowgate_core::FsArtifactSink;
use flowgate_core::HandoffError;
use flowgate_core::HandoffVersion;
use flowgate_core::MANIFEST_PATH;
use flowgate_core::MemoryArtifactStore;
use flowgate_core::PhaseContract;
use flowgate_core::PhaseId;
use flowgate_core::PipelineId;
use flowgate_core::ProvenanceTracker;
use flowgate_core::SchemaVersion;
use flowgate_core::TimePair;
use flowgate_core::VerifyOutcome;
use flowgate_core::export_handoff;
use flowgate_core::import_handoff;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a minimal single-phase contract.
fn contract() -> ContractDocument {
    ContractDocument {
        schema_version: SchemaVersion::from("1"),
        pipeline_id: PipelineId::from("pipeline-a"),
        domain: DomainId::from("content"),
        phases: vec![PhaseContract {
            phase_id: PhaseId::from("classify"),
            entry: Vec::new(),
            exit: Vec::new(),
            enrichment: Vec::new(),
        }],
        chains: Vec::new(),
    }
}

/// Exports a bundle holding the given context into a fresh memory store.
fn export_context(context: &ExecutionContext) -> MemoryArtifactStore {
    let mut store = MemoryArtifactStore::new();
    export_handoff(
        &mut store,
        context,
        &contract(),
        &AuditTrail::new(),
        &ChainSummary::from_reports(Vec::new()),
        TimePair::new(1_700_000_000_000, 0),
    )
    .unwrap();
    store
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

/// Tests exporting then importing restores the context, provenance included.
#[test]
fn test_export_import_round_trip_preserves_provenance() {
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    tracker.stamp(&mut context, &FieldPath::from("classify.domain"), &PhaseId::from("classify")).unwrap();

    let store = export_context(&context);
    let (imported, manifest) = import_handoff(&store).unwrap();

    assert_eq!(imported, context);
    assert_eq!(manifest.pipeline_id, PipelineId::from("pipeline-a"));
    assert_eq!(
        tracker.verify(&imported, &FieldPath::from("classify.domain")).unwrap(),
        VerifyOutcome::Match
    );
}

/// Tests the manifest indexes exactly the enumerated artifact set.
#[test]
fn test_manifest_indexes_enumerated_artifact_set() {
    let store = export_context(&ExecutionContext::new());
    let (_, manifest) = import_handoff(&store).unwrap();

    let mut paths: Vec<&str> =
        manifest.artifacts.iter().map(|record| record.path.as_str()).collect();
    paths.sort_unstable();
    let mut expected: Vec<&str> = flowgate_core::REQUIRED_ARTIFACT_PATHS.to_vec();
    expected.sort_unstable();
    assert_eq!(paths, expected);
}

// ============================================================================
// SECTION: Version Skew
// ============================================================================

/// Tests a handoff produced under a different version is a typed error.
#[test]
fn test_version_skew_is_a_typed_error() {
    let store = export_context(&ExecutionContext::new());
    let (_, mut manifest) = import_handoff(&store).unwrap();

    manifest.handoff_version = HandoffVersion("handoff-v0".to_string());
    let mut skewed = store.clone();
    skewed.insert(MANIFEST_PATH, serde_json::to_vec(&manifest).unwrap());

    let result = import_handoff(&skewed);
    assert!(matches!(result, Err(HandoffError::VersionMismatch { .. })));
}

/// Tests a bundle missing its context snapshot is a missing-artifact error.
#[test]
fn test_missing_snapshot_is_a_typed_error() {
    let mut store = export_context(&ExecutionContext::new());
    store.remove(CONTEXT_SNAPSHOT_PATH);

    let result = import_handoff(&store);
    assert!(matches!(result, Err(HandoffError::MissingArtifact(_))));
}

// ============================================================================
// SECTION: Filesystem Backend
// ============================================================================

/// Tests the filesystem sink and reader round-trip a bundle on disk.
#[test]
fn test_filesystem_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();

    let mut sink = FsArtifactSink::new(dir.path());
    export_handoff(
        &mut sink,
        &context,
        &contract(),
        &AuditTrail::new(),
        &ChainSummary::from_reports(Vec::new()),
        TimePair::new(1_700_000_000_000, 0),
    )
    .unwrap();

    let reader = FsArtifactReader::new(dir.path());
    let (imported, _) = import_handoff(&reader).unwrap();
    assert_eq!(imported.get("classify.domain"), Some(&json!("retail")));
}
