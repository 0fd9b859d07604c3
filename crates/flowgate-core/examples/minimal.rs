// crates/flowgate-core/examples/minimal.rs
// ============================================================================
// Module: Flowgate Minimal Example
// Description: Minimal end-to-end pipeline run using the in-memory handoff store.
// Purpose: Demonstrate boundary validation, provenance, chains, and the gate.
// Dependencies: flowgate-core
// ============================================================================

//! ## Overview
//! Drives a two-phase pipeline through its boundaries, stamps provenance,
//! evaluates the declared chain, exports the handoff bundle, and runs the
//! standard gate against it. This example is the driver's-eye view of the
//! engine: the engine decides, the driver schedules.

use flowgate_core::AuditRecord;
use flowgate_core::AuditTrail;
use flowgate_core::BoundaryDirection;
use flowgate_core::BoundaryValidator;
use flowgate_core::ChainId;
use flowgate_core::ContractDocument;
use flowgate_core::DomainId;
use flowgate_core::ExecutionContext;
use flowgate_core::FieldPath;
use flowgate_core::FieldSpec;
use flowgate_core::GateEngine;
use flowgate_core::GateId;
use flowgate_core::GateSpec;
use flowgate_core::MemoryArtifactStore;
use flowgate_core::PhaseContract;
use flowgate_core::PhaseId;
use flowgate_core::PipelineId;
use flowgate_core::PropagationChainSpec;
use flowgate_core::ProvenanceTracker;
use flowgate_core::SchemaVersion;
use flowgate_core::Severity;
use flowgate_core::TimePair;
use flowgate_core::export_handoff;
use serde_json::json;

/// Builds the example contract: classify feeds generate through one chain.
fn build_contract() -> ContractDocument {
    ContractDocument {
        schema_version: SchemaVersion::new("1"),
        pipeline_id: PipelineId::new("example"),
        domain: DomainId::new("content"),
        phases: vec![
            PhaseContract {
                phase_id: PhaseId::new("classify"),
                entry: vec![FieldSpec {
                    name: FieldPath::new("doc.text"),
                    severity: Severity::Blocking,
                    default: None,
                    source_phase: None,
                    value_type: Some("string".to_string()),
                    sensitive: false,
                }],
                exit: vec![FieldSpec {
                    name: FieldPath::new("classify.domain"),
                    severity: Severity::Warning,
                    default: Some(json!("general")),
                    source_phase: None,
                    value_type: None,
                    sensitive: false,
                }],
                enrichment: Vec::new(),
            },
            PhaseContract {
                phase_id: PhaseId::new("generate"),
                entry: Vec::new(),
                exit: Vec::new(),
                enrichment: Vec::new(),
            },
        ],
        chains: vec![PropagationChainSpec {
            chain_id: ChainId::new("domain-flow"),
            source_phase: PhaseId::new("classify"),
            source_field: FieldPath::new("classify.domain"),
            destination_phase: PhaseId::new("generate"),
            destination_field: FieldPath::new("generate.domain"),
            waypoints: Vec::new(),
            verification: Some("source == dest".to_string()),
        }],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let contract = build_contract();
    contract.validate()?;

    let validator = BoundaryValidator::new();
    let tracker = ProvenanceTracker::new();
    let chain_validator = flowgate_core::ChainValidator::new(flowgate_core::Evaluator::default());
    let mut audit = AuditTrail::new();
    let mut context = ExecutionContext::new();

    // Phase classify: entry check, phase work, stamp, exit check.
    context.set("doc.text", json!("quarterly retail report"))?;
    let entry = validator.validate_boundary(
        &mut context,
        &PhaseId::new("classify"),
        BoundaryDirection::Entry,
        &contract,
        &tracker,
    )?;
    audit.push(AuditRecord::Boundary(entry));

    context.set("classify.domain", json!("retail"))?;
    tracker.stamp(&mut context, &FieldPath::new("classify.domain"), &PhaseId::new("classify"))?;

    let exit = validator.validate_boundary(
        &mut context,
        &PhaseId::new("classify"),
        BoundaryDirection::Exit,
        &contract,
        &tracker,
    )?;
    audit.push(AuditRecord::Boundary(exit));

    // Phase generate: propagate the domain, stamp, evaluate chains.
    context.set("generate.domain", json!("retail"))?;
    tracker.stamp(&mut context, &FieldPath::new("generate.domain"), &PhaseId::new("generate"))?;

    let chains = chain_validator.validate_chains(&context, &contract, &tracker)?;
    for report in &chains.reports {
        audit.push(AuditRecord::Chain(report.clone()));
    }

    // Handoff: export the bundle and run the standard gate against it.
    let mut store = MemoryArtifactStore::new();
    export_handoff(
        &mut store,
        &context,
        &contract,
        &audit,
        &chains,
        TimePair::new(0, 0),
    )?;

    let engine = GateEngine::new(vec![GateSpec::standard(
        GateId::new("handoff"),
        PhaseId::new("generate"),
        1.0,
    )]);
    let results = engine.run_gate(&GateId::new("handoff"), &store)?;
    let all_passed = results.iter().all(|result| !result.blocking);

    let _ = (chains.completeness, all_passed);
    Ok(())
}
