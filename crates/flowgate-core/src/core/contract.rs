// flowgate-core/src/core/contract.rs
// ============================================================================
// Module: Flowgate Contract Schema
// Description: Field, phase, and propagation-chain contract specifications.
// Purpose: Define the canonical contract document with closed-world validation helpers.
// Dependencies: crate::core::{hashing, identifiers}, serde
// ============================================================================

//! ## Overview
//! A contract document declares which fields must flow through which phases
//! and with what severity, plus the propagation chains asserting end-to-end
//! field flow. Documents are validated at load time to enforce invariants
//! such as unique identifiers, well-formed dot-paths, and resolvable chain
//! endpoints, and are immutable for the duration of a pipeline run. Every
//! document type is a closed-world schema: unknown keys are rejected during
//! deserialization, never downgraded to warnings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::identifiers::ChainId;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::FieldPath;
use crate::core::identifiers::PhaseId;
use crate::core::identifiers::PipelineId;
use crate::core::identifiers::SchemaVersion;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Three-tier severity policy for required fields.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - The severity-to-blocking mapping lives in [`Severity::blocks`]; derived
///   gate results must use it rather than re-deriving the convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Absence halts the phase.
    Blocking,
    /// Absence applies a declared default (when present) and continues.
    Warning,
    /// Absence is recorded and execution continues.
    Advisory,
}

impl Severity {
    /// Explicit severity-to-blocking mapping shared by boundary and gate results.
    ///
    /// `Blocking` always maps to a blocking result; `Warning` and `Advisory`
    /// never do.
    #[must_use]
    pub const fn blocks(self) -> bool {
        matches!(self, Self::Blocking)
    }
}

// ============================================================================
// SECTION: Field Specifications
// ============================================================================

/// Declares one required field in one phase contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Dot-path of the required field inside the execution context.
    pub name: FieldPath,
    /// Severity applied when the field is absent or mistyped.
    pub severity: Severity,
    /// Default value injected for absent `WARNING` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Phase expected to have produced the field, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_phase: Option<PhaseId>,
    /// Expected JSON type name (`string`, `number`, `boolean`, `array`, `object`, `null`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Marks the field's value as sensitive; raw values never appear in
    /// outcome messages, telemetry, or evidence records.
    #[serde(default)]
    pub sensitive: bool,
}

// ============================================================================
// SECTION: Phase Contracts
// ============================================================================

/// Boundary direction for a phase contract check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryDirection {
    /// Fields required before the phase executes.
    Entry,
    /// Fields required after the phase executes.
    Exit,
    /// Fields required after mid-phase enrichment steps.
    Enrichment,
}

/// Per-phase field requirements, immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseContract {
    /// Phase identifier.
    pub phase_id: PhaseId,
    /// Fields required at phase entry.
    #[serde(default)]
    pub entry: Vec<FieldSpec>,
    /// Fields required at phase exit.
    #[serde(default)]
    pub exit: Vec<FieldSpec>,
    /// Fields required after enrichment steps.
    #[serde(default)]
    pub enrichment: Vec<FieldSpec>,
}

impl PhaseContract {
    /// Returns the field specs bound to the given boundary direction.
    #[must_use]
    pub fn fields_for(&self, direction: BoundaryDirection) -> &[FieldSpec] {
        match direction {
            BoundaryDirection::Entry => &self.entry,
            BoundaryDirection::Exit => &self.exit,
            BoundaryDirection::Enrichment => &self.enrichment,
        }
    }

    /// Iterates all field specs declared by this phase contract.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.entry.iter().chain(self.exit.iter()).chain(self.enrichment.iter())
    }
}

// ============================================================================
// SECTION: Propagation Chains
// ============================================================================

/// Declares a source-to-destination field-flow assertion.
///
/// # Invariants
/// - Waypoint phases must observe the field with a non-null value; they do
///   not constrain the field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropagationChainSpec {
    /// Chain identifier.
    pub chain_id: ChainId,
    /// Phase that produces the source field.
    pub source_phase: PhaseId,
    /// Dot-path of the source field.
    pub source_field: FieldPath,
    /// Phase that consumes the destination field.
    pub destination_phase: PhaseId,
    /// Dot-path of the destination field.
    pub destination_field: FieldPath,
    /// Intermediate phases that must observe the field in order.
    #[serde(default)]
    pub waypoints: Vec<PhaseId>,
    /// Optional sandboxed verification expression over `context`, `source`, `dest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,
}

// ============================================================================
// SECTION: Contract Document
// ============================================================================

/// Root contract aggregate, loaded once per pipeline run and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDocument {
    /// Contract schema version.
    pub schema_version: SchemaVersion,
    /// Pipeline the contract governs.
    pub pipeline_id: PipelineId,
    /// Contract domain for multi-domain aggregation.
    pub domain: DomainId,
    /// Per-phase field requirements.
    pub phases: Vec<PhaseContract>,
    /// Declared propagation chains.
    #[serde(default)]
    pub chains: Vec<PropagationChainSpec>,
}

impl ContractDocument {
    /// Computes the canonical hash of the contract document.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn canonical_hash(&self) -> Result<HashDigest, HashError> {
        crate::core::hashing::hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }

    /// Returns the phase contract for the given phase, when declared.
    #[must_use]
    pub fn phase(&self, phase_id: &PhaseId) -> Option<&PhaseContract> {
        self.phases.iter().find(|phase| &phase.phase_id == phase_id)
    }

    /// Returns the declared defaults for a field in the given phase contract.
    #[must_use]
    pub fn declared_default(&self, phase_id: &PhaseId, field: &FieldPath) -> Option<&Value> {
        self.phase(phase_id)?
            .all_fields()
            .find(|spec| &spec.name == field)
            .and_then(|spec| spec.default.as_ref())
    }

    /// Returns true when the field is marked sensitive anywhere in the document.
    #[must_use]
    pub fn is_sensitive(&self, field: &FieldPath) -> bool {
        self.phases.iter().flat_map(PhaseContract::all_fields).any(|spec| {
            &spec.name == field && spec.sensitive
        })
    }

    /// Validates the contract document invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when validation fails.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.phases.is_empty() {
            return Err(DocumentError::MissingPhases);
        }

        ensure_unique_phase_ids(&self.phases)?;
        ensure_unique_chain_ids(&self.chains)?;
        ensure_field_paths_well_formed(&self.phases)?;
        ensure_chain_endpoints_resolve(&self.phases, &self.chains)?;

        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Contract document validation errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document contains no phase contracts.
    #[error("contract document must declare at least one phase")]
    MissingPhases,
    /// Duplicate phase identifiers detected.
    #[error("duplicate phase identifier: {0}")]
    DuplicatePhaseId(String),
    /// Duplicate chain identifiers detected.
    #[error("duplicate chain identifier: {0}")]
    DuplicateChainId(String),
    /// A field spec declares an empty or malformed dot-path.
    #[error("malformed field path in phase {phase}: {path:?}")]
    MalformedFieldPath {
        /// Phase declaring the field.
        phase: String,
        /// Offending dot-path.
        path: String,
    },
    /// Chain references a phase that is not declared.
    #[error("chain {chain} references undeclared phase: {phase}")]
    UnknownChainPhase {
        /// Chain identifier.
        chain: String,
        /// Missing phase identifier.
        phase: String,
    },
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures phase identifiers are unique within the document.
fn ensure_unique_phase_ids(phases: &[PhaseContract]) -> Result<(), DocumentError> {
    for (index, phase) in phases.iter().enumerate() {
        if phases.iter().skip(index + 1).any(|other| other.phase_id == phase.phase_id) {
            return Err(DocumentError::DuplicatePhaseId(phase.phase_id.to_string()));
        }
    }
    Ok(())
}

/// Ensures chain identifiers are unique within the document.
fn ensure_unique_chain_ids(chains: &[PropagationChainSpec]) -> Result<(), DocumentError> {
    for (index, chain) in chains.iter().enumerate() {
        if chains.iter().skip(index + 1).any(|other| other.chain_id == chain.chain_id) {
            return Err(DocumentError::DuplicateChainId(chain.chain_id.to_string()));
        }
    }
    Ok(())
}

/// Ensures every declared field path is a non-empty dot-path.
fn ensure_field_paths_well_formed(phases: &[PhaseContract]) -> Result<(), DocumentError> {
    for phase in phases {
        for spec in phase.all_fields() {
            if !spec.name.is_well_formed() {
                return Err(DocumentError::MalformedFieldPath {
                    phase: phase.phase_id.to_string(),
                    path: spec.name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Ensures chain endpoints and waypoints reference declared phases.
fn ensure_chain_endpoints_resolve(
    phases: &[PhaseContract],
    chains: &[PropagationChainSpec],
) -> Result<(), DocumentError> {
    let declared = |phase_id: &PhaseId| phases.iter().any(|phase| &phase.phase_id == phase_id);
    for chain in chains {
        for phase_id in [&chain.source_phase, &chain.destination_phase]
            .into_iter()
            .chain(chain.waypoints.iter())
        {
            if !declared(phase_id) {
                return Err(DocumentError::UnknownChainPhase {
                    chain: chain.chain_id.to_string(),
                    phase: phase_id.to_string(),
                });
            }
        }
    }
    Ok(())
}
