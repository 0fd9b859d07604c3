// flowgate-core/src/core/mod.rs
// ============================================================================
// Module: Flowgate Core Types
// Description: Canonical contract schema, context, provenance, and outcome structures.
// Purpose: Provide stable, serializable types for contracts, verdicts, and handoffs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Flowgate core types define the contract document schema, the execution
//! context with its reserved provenance namespace, boundary and chain
//! outcome structures, gate results, and the versioned handoff manifest.
//! These types are the canonical source of truth for every derived surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod context;
pub mod contract;
pub mod gate;
pub mod handoff;
pub mod hashing;
pub mod identifiers;
pub mod outcome;
pub mod provenance;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditRecord;
pub use audit::AuditTrail;
pub use context::ContextError;
pub use context::ExecutionContext;
pub use context::PROVENANCE_NAMESPACE;
pub use contract::BoundaryDirection;
pub use contract::ContractDocument;
pub use contract::DocumentError;
pub use contract::FieldSpec;
pub use contract::PhaseContract;
pub use contract::PropagationChainSpec;
pub use contract::Severity;
pub use gate::CheckDisposition;
pub use gate::CheckKind;
pub use gate::EvidenceItem;
pub use gate::GateCheckSpec;
pub use gate::GateResult;
pub use gate::GateSpec;
pub use handoff::AUDIT_TRAIL_PATH;
pub use handoff::CHAIN_SUMMARY_PATH;
pub use handoff::CONTEXT_SNAPSHOT_PATH;
pub use handoff::CURRENT_HANDOFF_VERSION;
pub use handoff::FileHashEntry;
pub use handoff::HandoffArtifactKind;
pub use handoff::HandoffArtifactRecord;
pub use handoff::HandoffIntegrity;
pub use handoff::HandoffManifest;
pub use handoff::HandoffMetadata;
pub use handoff::HandoffVersion;
pub use handoff::MANIFEST_PATH;
pub use handoff::METADATA_PATH;
pub use handoff::REQUIRED_ARTIFACT_PATHS;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::ChainId;
pub use identifiers::CheckId;
pub use identifiers::DomainId;
pub use identifiers::FieldPath;
pub use identifiers::GateId;
pub use identifiers::PhaseId;
pub use identifiers::PipelineId;
pub use identifiers::SchemaVersion;
pub use outcome::BoundaryOutcome;
pub use outcome::ChainFailure;
pub use outcome::ChainReport;
pub use outcome::ChainStatus;
pub use outcome::ChainSummary;
pub use outcome::CompositeBoundaryOutcome;
pub use outcome::DomainOutcome;
pub use outcome::FieldCheck;
pub use outcome::FieldState;
pub use provenance::FieldProvenance;
pub use provenance::StampHistory;
pub use provenance::default_origin;
pub use time::TimePair;
