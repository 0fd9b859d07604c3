// flowgate-core/src/core/outcome.rs
// ============================================================================
// Module: Flowgate Boundary and Chain Outcomes
// Description: Structured outcomes for boundary validation and chain evaluation.
// Purpose: Provide stable, serializable verdict types with worst-of aggregation.
// Dependencies: crate::core::{contract, identifiers}, serde
// ============================================================================

//! ## Overview
//! Boundary outcomes report per-field check states and an aggregate pass
//! signal; composite outcomes resolve simultaneously-active contract domains
//! worst-of-all-domains while always carrying the per-domain breakdown.
//! Chain reports classify propagation failures without conflating failed
//! assertions with evaluation errors. All outcomes are computed values,
//! re-derived fresh at every call and never carried as "already passed".

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::contract::BoundaryDirection;
use crate::core::contract::Severity;
use crate::core::identifiers::ChainId;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::FieldPath;
use crate::core::identifiers::PhaseId;

// ============================================================================
// SECTION: Field Check States
// ============================================================================

/// Terminal state of a single field check at one boundary call.
///
/// The state machine is `UNCHECKED -> {PRESENT, BLOCKED, DEFAULTED, PARTIAL}`;
/// every variant is terminal for the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// Field present and well-typed.
    Present,
    /// Blocking field absent; the phase must not execute.
    Blocked,
    /// Warning field absent; a declared default was or was not applied.
    Defaulted,
    /// Advisory field absent; recorded with minimal detail.
    Partial,
}

/// Result of checking one field spec at one boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Checked dot-path.
    pub field: FieldPath,
    /// Severity declared for the field.
    pub severity: Severity,
    /// Terminal check state.
    pub state: FieldState,
    /// True when a declared default was injected during this check.
    pub default_applied: bool,
    /// True when the field was present but failed its declared type.
    pub type_mismatch: bool,
}

// ============================================================================
// SECTION: Boundary Outcomes
// ============================================================================

/// Outcome of validating one phase boundary against one contract domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryOutcome {
    /// Validated phase.
    pub phase_id: PhaseId,
    /// Boundary direction that was validated.
    pub direction: BoundaryDirection,
    /// False when any blocking field was absent; the phase must not execute.
    pub passed: bool,
    /// Count of blocking failures.
    pub blocking_count: usize,
    /// Per-field check records in contract declaration order.
    pub checks: Vec<FieldCheck>,
    /// Concrete remediation instruction when `passed` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

impl BoundaryOutcome {
    /// Returns the checks that ended in the given state.
    #[must_use]
    pub fn checks_in(&self, state: FieldState) -> Vec<&FieldCheck> {
        self.checks.iter().filter(|check| check.state == state).collect()
    }
}

/// Per-domain entry inside a composite boundary outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOutcome {
    /// Contract domain that produced the outcome.
    pub domain: DomainId,
    /// The domain's boundary outcome.
    pub outcome: BoundaryOutcome,
}

/// Composite outcome across simultaneously-active contract domains.
///
/// # Invariants
/// - `passed` is the worst-of-all-domains resolution: any blocking failure
///   from any domain fails the composite.
/// - `domains` always carries the full per-domain breakdown for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeBoundaryOutcome {
    /// Validated phase.
    pub phase_id: PhaseId,
    /// Boundary direction that was validated.
    pub direction: BoundaryDirection,
    /// Worst-of-all-domains pass signal.
    pub passed: bool,
    /// Total blocking failures across all domains.
    pub blocking_count: usize,
    /// Per-domain breakdown.
    pub domains: Vec<DomainOutcome>,
}

impl CompositeBoundaryOutcome {
    /// Aggregates per-domain outcomes worst-of-all-domains.
    #[must_use]
    pub fn aggregate(
        phase_id: PhaseId,
        direction: BoundaryDirection,
        domains: Vec<DomainOutcome>,
    ) -> Self {
        let passed = domains.iter().all(|entry| entry.outcome.passed);
        let blocking_count = domains.iter().map(|entry| entry.outcome.blocking_count).sum();
        Self {
            phase_id,
            direction,
            passed,
            blocking_count,
            domains,
        }
    }
}

// ============================================================================
// SECTION: Chain Status
// ============================================================================

/// Propagation chain status, re-derived on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainStatus {
    /// Field flowed source to destination as declared.
    Intact,
    /// Destination holds a default or empty sentinel, not a propagated value.
    Degraded,
    /// Propagation failed; see the failure class.
    Broken,
}

/// Failure class distinguishing why a chain is not intact.
///
/// Failed assertions and evaluation errors are different failure classes and
/// are never conflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainFailure {
    /// Source field absent from the context.
    SourceAbsent,
    /// Destination field absent from the context.
    DestinationAbsent,
    /// A declared waypoint phase has no provenance record for the field.
    WaypointSkipped {
        /// Waypoint phase with no observation record.
        phase: PhaseId,
    },
    /// The verification expression evaluated to boolean false.
    AssertionFailed,
    /// The verification expression raised an evaluation error or timed out.
    EvaluationError {
        /// Diagnostic detail from the evaluator.
        detail: String,
    },
    /// Destination equals a known default or empty sentinel.
    DefaultedDestination,
}

/// Per-chain evaluation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    /// Evaluated chain.
    pub chain_id: ChainId,
    /// Destination field the chain asserts about.
    pub destination_field: FieldPath,
    /// Derived status.
    pub status: ChainStatus,
    /// Failure class when the status is not `Intact`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ChainFailure>,
}

// ============================================================================
// SECTION: Chain Summary
// ============================================================================

/// Aggregated chain evaluation summary with the completeness scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Count of intact chains.
    pub intact: usize,
    /// Count of degraded chains.
    pub degraded: usize,
    /// Count of broken chains.
    pub broken: usize,
    /// `intact / total`, rounded to one decimal place; 1.0 when no chains.
    pub completeness: f64,
    /// Per-chain reports in contract declaration order.
    pub reports: Vec<ChainReport>,
}

impl ChainSummary {
    /// Builds a summary from per-chain reports, computing completeness.
    #[must_use]
    pub fn from_reports(reports: Vec<ChainReport>) -> Self {
        let intact = reports.iter().filter(|report| report.status == ChainStatus::Intact).count();
        let degraded =
            reports.iter().filter(|report| report.status == ChainStatus::Degraded).count();
        let broken = reports.iter().filter(|report| report.status == ChainStatus::Broken).count();
        let completeness = completeness_ratio(intact, reports.len());
        Self {
            intact,
            degraded,
            broken,
            completeness,
            reports,
        }
    }

    /// Resolves multiple reports about the same destination field
    /// worst-status-wins, preserving the full breakdown in `reports`.
    #[must_use]
    pub fn worst_for_field(&self, field: &FieldPath) -> Option<ChainStatus> {
        self.reports
            .iter()
            .filter(|report| &report.destination_field == field)
            .map(|report| report.status)
            .max()
    }
}

/// Computes `intact / total` rounded to one decimal place.
#[must_use]
fn completeness_ratio(intact: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss, reason = "chain counts are far below 2^52")]
    let ratio = intact as f64 / total as f64;
    (ratio * 10.0).round() / 10.0
}
