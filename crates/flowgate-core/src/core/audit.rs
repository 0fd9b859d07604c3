// flowgate-core/src/core/audit.rs
// ============================================================================
// Module: Flowgate Audit Trail
// Description: Append-only audit records for boundary, chain, and gate events.
// Purpose: Provide the audit-trail artifact schema exchanged at the handoff.
// Dependencies: crate::core::{gate, outcome}, serde
// ============================================================================

//! ## Overview
//! The audit trail collects every validation verdict produced during a run.
//! Records are appended, never mutated, and travel in the handoff bundle so
//! the consuming half can cross-reference them against the chain summary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::gate::GateResult;
use crate::core::outcome::BoundaryOutcome;
use crate::core::outcome::ChainReport;

// ============================================================================
// SECTION: Audit Records
// ============================================================================

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// A boundary validation verdict.
    Boundary(BoundaryOutcome),
    /// A chain evaluation report.
    Chain(ChainReport),
    /// A gate check result.
    Gate(GateResult),
}

/// Append-only audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    /// Records in append order.
    pub records: Vec<AuditRecord>,
}

impl AuditTrail {
    /// Creates an empty audit trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    /// Returns the chain reports recorded in the trail.
    #[must_use]
    pub fn chain_reports(&self) -> Vec<&ChainReport> {
        self.records
            .iter()
            .filter_map(|record| match record {
                AuditRecord::Chain(report) => Some(report),
                AuditRecord::Boundary(_) | AuditRecord::Gate(_) => None,
            })
            .collect()
    }
}
