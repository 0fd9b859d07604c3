// flowgate-core/src/core/gate.rs
// ============================================================================
// Module: Flowgate Gate Model
// Description: Gate specifications, check dispositions, results, and evidence.
// Purpose: Define the staged integrity checks run at the handoff boundary.
// Dependencies: crate::core::{contract, identifiers}, serde
// ============================================================================

//! ## Overview
//! A gate is a fixed ordered list of integrity checks executed at the
//! cross-process handoff boundary. Each check is independently
//! pass/fail/warn; the blocking flag derives from the shared severity
//! mapping, and every failing result carries a concrete, executable
//! `next_action`. Results are immutable observations appended to an audit
//! trail, never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::contract::Severity;
use crate::core::identifiers::CheckId;
use crate::core::identifiers::GateId;
use crate::core::identifiers::PhaseId;

// ============================================================================
// SECTION: Check Kinds
// ============================================================================

/// Staged integrity check kinds, in required execution order.
///
/// # Invariants
/// - `Structural` must pass before `ChecksumChain` is attempted; later checks
///   short-circuit to failures when the structural stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Presence and shape of the enumerated handoff artifact set.
    Structural,
    /// Recomputation of every artifact checksum from bytes on disk.
    ChecksumChain,
    /// Cross-reference consistency between manifest, artifacts, and audit trail.
    CrossReference,
    /// Chain completeness threshold over the aggregated summary.
    Completeness,
}

impl CheckKind {
    /// Returns the stable check identifier for this kind.
    #[must_use]
    pub fn check_id(self) -> CheckId {
        match self {
            Self::Structural => CheckId::new("structural"),
            Self::ChecksumChain => CheckId::new("checksum_chain"),
            Self::CrossReference => CheckId::new("cross_reference"),
            Self::Completeness => CheckId::new("completeness"),
        }
    }
}

// ============================================================================
// SECTION: Gate Specifications
// ============================================================================

/// One check inside a gate specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateCheckSpec {
    /// Check kind to execute.
    pub kind: CheckKind,
    /// Severity applied to failures of this check.
    pub severity: Severity,
    /// Minimum chain completeness for `Completeness` checks; ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness_threshold: Option<f64>,
}

/// Gate specification: a fixed ordered list of checks at one handoff boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSpec {
    /// Gate identifier.
    pub gate_id: GateId,
    /// Phase boundary the gate guards.
    pub phase: PhaseId,
    /// Checks in execution order.
    pub checks: Vec<GateCheckSpec>,
}

impl GateSpec {
    /// Returns the standard handoff gate: all four checks, structural and
    /// checksum blocking, cross-reference and completeness warning.
    #[must_use]
    pub fn standard(gate_id: GateId, phase: PhaseId, completeness_threshold: f64) -> Self {
        Self {
            gate_id,
            phase,
            checks: vec![
                GateCheckSpec {
                    kind: CheckKind::Structural,
                    severity: Severity::Blocking,
                    completeness_threshold: None,
                },
                GateCheckSpec {
                    kind: CheckKind::ChecksumChain,
                    severity: Severity::Blocking,
                    completeness_threshold: None,
                },
                GateCheckSpec {
                    kind: CheckKind::CrossReference,
                    severity: Severity::Blocking,
                    completeness_threshold: None,
                },
                GateCheckSpec {
                    kind: CheckKind::Completeness,
                    severity: Severity::Warning,
                    completeness_threshold: Some(completeness_threshold),
                },
            ],
        }
    }
}

// ============================================================================
// SECTION: Check Dispositions
// ============================================================================

/// Disposition of one executed gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDisposition {
    /// Check passed.
    Pass,
    /// Check failed.
    Fail,
    /// Check failed but its severity does not block consumption.
    Warn,
}

// ============================================================================
// SECTION: Evidence
// ============================================================================

/// Reference to a concrete artifact or field justifying a gate result.
///
/// # Invariants
/// - Never includes raw sensitive values, only paths, types, and digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Evidence kind (`artifact`, `field`, `manifest`).
    pub kind: String,
    /// Artifact path or field dot-path the evidence refers to.
    pub reference: String,
    /// Human-readable description of what the evidence shows.
    pub description: String,
}

impl EvidenceItem {
    /// Creates artifact evidence for a handoff-relative path.
    #[must_use]
    pub fn artifact(reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: "artifact".to_string(),
            reference: reference.into(),
            description: description.into(),
        }
    }

    /// Creates field evidence for a context dot-path.
    #[must_use]
    pub fn field(reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: "field".to_string(),
            reference: reference.into(),
            description: description.into(),
        }
    }

    /// Creates manifest evidence.
    #[must_use]
    pub fn manifest(reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: "manifest".to_string(),
            reference: reference.into(),
            description: description.into(),
        }
    }
}

// ============================================================================
// SECTION: Gate Results
// ============================================================================

/// Immutable result of one gate check invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    /// Gate that ran the check.
    pub gate_id: GateId,
    /// Phase boundary the gate guards.
    pub phase: PhaseId,
    /// Executed check identifier.
    pub check: CheckId,
    /// Check disposition.
    pub result: CheckDisposition,
    /// Severity declared for the check.
    pub severity: Severity,
    /// True when a failure of this check halts downstream consumption.
    /// Derived from the severity mapping table, never inferred ad hoc.
    pub blocking: bool,
    /// Evidence justifying the disposition.
    pub evidence: Vec<EvidenceItem>,
    /// Human-readable reason for the disposition.
    pub reason: String,
    /// Concrete, executable remediation instruction for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}
