// flowgate-core/tests/chain.rs
// ============================================================================
// Module: Chain Validator Tests
// Description: Tests for propagation chain status derivation.
// ============================================================================
//! ## Overview
//! Validates broken-endpoint detection, waypoint observation via provenance,
//! verification failure classes, degraded sentinels, and completeness.

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

use flowgate_core::ChainFailure;
use flowgate_core::ChainId;
use flowgate_core::ChainStatus;
use flowgate_core::ChainValidator;
use flowgate_core::ContractDocument;
use flowgate_core::DomainId;
use flowgate_core::EvalLimits;
use flowgate_core::Evaluator;
use flowgate_core::ExecutionContext;
use flowgate_core::FieldPath;
use flowgate_core::FieldSpec;
use flowgate_core::PhaseContract;
use flowgate_core::PhaseId;
use flowgate_core::PipelineId;
use flowgate_core::PropagationChainSpec;
use flowgate_core::ProvenanceTracker;
use flowgate_core::SchemaVersion;
use flowgate_core::Severity;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a contract declaring the named phases and one chain.
fn contract_with_chain(chain: PropagationChainSpec, phases: &[&str]) -> ContractDocument {
    contract_with_chains(vec![chain], phases, None)
}

/// Builds a contract with chains, phases, and an optional destination default.
fn contract_with_chains(
    chains: Vec<PropagationChainSpec>,
    phases: &[&str],
    destination_default: Option<(&str, &str, Value)>,
) -> ContractDocument {
    let phases = phases
        .iter()
        .map(|phase| {
            let entry = destination_default
                .as_ref()
                .filter(|(default_phase, _, _)| default_phase == phase)
                .map(|(_, field, value)| {
                    vec![FieldSpec {
                        name: FieldPath::from(*field),
                        severity: Severity::Warning,
                        default: Some(value.clone()),
                        source_phase: None,
                        value_type: None,
                        sensitive: false,
                    }]
                })
                .unwrap_or_default();
            PhaseContract {
                phase_id: PhaseId::from(*phase),
                entry,
                exit: Vec::new(),
                enrichment: Vec::new(),
            }
        })
        .collect();
    ContractDocument {
        schema_version: SchemaVersion::from("1"),
        pipeline_id: PipelineId::from("pipeline-a"),
        domain: DomainId::from("content"),
        phases,
        chains,
    }
}

/// Builds the classify-to-generate domain chain used across tests.
fn domain_chain(verification: Option<&str>, waypoints: &[&str]) -> PropagationChainSpec {
    PropagationChainSpec {
        chain_id: ChainId::from("domain-flow"),
        source_phase: PhaseId::from("classify"),
        source_field: FieldPath::from("classify.domain"),
        destination_phase: PhaseId::from("generate"),
        destination_field: FieldPath::from("generate.domain"),
        waypoints: waypoints.iter().map(|phase| PhaseId::from(*phase)).collect(),
        verification: verification.map(str::to_string),
    }
}

/// Creates the validator under test.
fn validator() -> ChainValidator {
    ChainValidator::new(Evaluator::default())
}

// ============================================================================
// SECTION: Endpoint Checks
// ============================================================================

/// Tests an absent destination breaks the chain.
#[test]
fn test_absent_destination_is_broken() {
    let chain = domain_chain(None, &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    assert_eq!(report.failure, Some(ChainFailure::DestinationAbsent));
}

/// Tests an absent source breaks the chain before the destination is consulted.
#[test]
fn test_absent_source_is_broken() {
    let chain = domain_chain(None, &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("generate.domain", json!("retail")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    assert_eq!(report.failure, Some(ChainFailure::SourceAbsent));
}

/// Tests an intact chain with both endpoints propagated.
#[test]
fn test_propagated_chain_is_intact() {
    let chain = domain_chain(None, &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Intact);
    assert_eq!(report.failure, None);
}

// ============================================================================
// SECTION: Waypoints
// ============================================================================

/// Tests a waypoint with no observation record breaks the chain.
#[test]
fn test_skipped_waypoint_is_broken() {
    let chain = domain_chain(None, &["enrich"]);
    let contract = contract_with_chain(chain.clone(), &["classify", "enrich", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();
    tracker.stamp(&mut context, &FieldPath::from("classify.domain"), &PhaseId::from("classify")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    assert_eq!(
        report.failure,
        Some(ChainFailure::WaypointSkipped {
            phase: PhaseId::from("enrich"),
        })
    );
}

/// Tests a waypoint observation recorded by stamping keeps the chain intact.
#[test]
fn test_observed_waypoint_is_intact() {
    let chain = domain_chain(None, &["enrich"]);
    let contract = contract_with_chain(chain.clone(), &["classify", "enrich", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();
    tracker.stamp(&mut context, &FieldPath::from("classify.domain"), &PhaseId::from("classify")).unwrap();
    tracker.stamp(&mut context, &FieldPath::from("classify.domain"), &PhaseId::from("enrich")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Intact);
}

// ============================================================================
// SECTION: Verification Expressions
// ============================================================================

/// Tests a false verification resolves to a failed assertion, not an error.
#[test]
fn test_failed_assertion_class() {
    let chain = domain_chain(Some("source == dest"), &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("finance")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    assert_eq!(report.failure, Some(ChainFailure::AssertionFailed));
}

/// Tests an evaluation error is classed separately from a failed assertion.
#[test]
fn test_evaluation_error_class() {
    let chain = domain_chain(Some("source < dest"), &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!(7)).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    assert!(matches!(report.failure, Some(ChainFailure::EvaluationError { .. })));
}

/// Tests an evaluation timeout resolves to broken with a timeout detail.
#[test]
fn test_evaluation_timeout_is_broken() {
    let chain = domain_chain(Some("source == dest"), &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();

    let limits = EvalLimits {
        timeout: std::time::Duration::ZERO,
        ..EvalLimits::default()
    };
    let validator = ChainValidator::new(Evaluator::new(limits));
    let report = validator.validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Broken);
    let Some(ChainFailure::EvaluationError {
        detail,
    }) = report.failure
    else {
        panic!("expected evaluation error failure class");
    };
    assert!(detail.contains("timed out"));
}

/// Tests a passing verification over context bindings stays intact.
#[test]
fn test_passing_verification_is_intact() {
    let chain = domain_chain(Some("context.get(\"generate.domain\") == source && present(dest)"), &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Intact);
}

// ============================================================================
// SECTION: Degraded Sentinels
// ============================================================================

/// Tests a destination equal to its declared default is degraded.
#[test]
fn test_declared_default_destination_is_degraded() {
    let chain = domain_chain(None, &[]);
    let contract = contract_with_chains(
        vec![chain.clone()],
        &["classify", "generate"],
        Some(("generate", "generate.domain", json!("general"))),
    );
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("general")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Degraded);
    assert_eq!(report.failure, Some(ChainFailure::DefaultedDestination));
}

/// Tests an empty-string destination is degraded.
#[test]
fn test_empty_destination_is_degraded() {
    let chain = domain_chain(None, &[]);
    let contract = contract_with_chain(chain.clone(), &["classify", "generate"]);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("")).unwrap();

    let report = validator().validate_chain(&context, &chain, &contract, &tracker).unwrap();

    assert_eq!(report.status, ChainStatus::Degraded);
}

// ============================================================================
// SECTION: Completeness
// ============================================================================

/// Tests completeness counts intact chains only and rounds to one decimal.
#[test]
fn test_completeness_rounds_to_one_decimal() {
    let intact = domain_chain(None, &[]);
    let broken = PropagationChainSpec {
        chain_id: ChainId::from("missing-flow"),
        source_phase: PhaseId::from("classify"),
        source_field: FieldPath::from("classify.missing"),
        destination_phase: PhaseId::from("generate"),
        destination_field: FieldPath::from("generate.missing"),
        waypoints: Vec::new(),
        verification: None,
    };
    let degraded = PropagationChainSpec {
        chain_id: ChainId::from("empty-flow"),
        source_phase: PhaseId::from("classify"),
        source_field: FieldPath::from("classify.domain"),
        destination_phase: PhaseId::from("generate"),
        destination_field: FieldPath::from("generate.summary"),
        waypoints: Vec::new(),
        verification: None,
    };
    let contract = contract_with_chains(
        vec![intact, broken, degraded],
        &["classify", "generate"],
        None,
    );
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();
    context.set("generate.summary", json!("")).unwrap();

    let summary = validator().validate_chains(&context, &contract, &tracker).unwrap();

    assert_eq!(summary.intact, 1);
    assert_eq!(summary.broken, 1);
    assert_eq!(summary.degraded, 1);
    assert!((summary.completeness - 0.3).abs() < f64::EPSILON);
}

/// Tests an empty chain set reports full completeness.
#[test]
fn test_no_chains_is_fully_complete() {
    let contract = contract_with_chains(Vec::new(), &["classify"], None);
    let tracker = ProvenanceTracker::new();
    let context = ExecutionContext::new();

    let summary = validator().validate_chains(&context, &contract, &tracker).unwrap();

    assert_eq!(summary.reports.len(), 0);
    assert!((summary.completeness - 1.0).abs() < f64::EPSILON);
}

/// Tests worst-status-wins resolution for chains on the same destination.
#[test]
fn test_same_destination_worst_status_wins() {
    let intact = domain_chain(None, &[]);
    let broken = PropagationChainSpec {
        chain_id: ChainId::from("strict-flow"),
        source_phase: PhaseId::from("classify"),
        source_field: FieldPath::from("classify.missing"),
        destination_phase: PhaseId::from("generate"),
        destination_field: FieldPath::from("generate.domain"),
        waypoints: Vec::new(),
        verification: None,
    };
    let contract =
        contract_with_chains(vec![intact, broken], &["classify", "generate"], None);
    let tracker = ProvenanceTracker::new();
    let mut context = ExecutionContext::new();
    context.set("classify.domain", json!("retail")).unwrap();
    context.set("generate.domain", json!("retail")).unwrap();

    let summary = validator().validate_chains(&context, &contract, &tracker).unwrap();

    assert_eq!(
        summary.worst_for_field(&FieldPath::from("generate.domain")),
        Some(ChainStatus::Broken)
    );
    assert_eq!(summary.reports.len(), 2);
}
