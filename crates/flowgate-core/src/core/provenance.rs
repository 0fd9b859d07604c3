// flowgate-core/src/core/provenance.rs
// ============================================================================
// Module: Flowgate Provenance Records
// Description: Per-field origin, timestamp, and fingerprint records.
// Purpose: Define the provenance schema embedded in execution contexts.
// Dependencies: crate::core::{hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Each tracked field carries a stamp history inside the reserved context
//! namespace: one [`FieldProvenance`] per explicit stamp, ordered oldest to
//! newest. The newest record is the current one; older records prove which
//! phases observed the field, which is what waypoint checks consult. Records
//! travel embedded in the context across the process handoff, never in a
//! side channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::PhaseId;
use crate::core::time::TimePair;

// ============================================================================
// SECTION: Provenance Records
// ============================================================================

/// One provenance stamp for a tracked field.
///
/// # Invariants
/// - `fingerprint` digests the RFC 8785 canonical serialization of the value
///   at stamp time, never a language-default textual representation.
/// - Records are created by explicit stamp operations only; an un-stamped
///   mutation is detected as a fingerprint mismatch at verify time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    /// Phase that recorded the stamp. System-injected defaults use the
    /// `default:<phase>` origin form.
    pub origin_phase: PhaseId,
    /// Paired wall-clock and monotonic timestamp at stamp time.
    pub recorded_at: TimePair,
    /// Canonical content fingerprint of the value at stamp time.
    pub fingerprint: HashDigest,
}

/// Stamp history for one tracked field, oldest first.
///
/// # Invariants
/// - Never empty once a field has been stamped; the last entry is current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampHistory {
    /// Stamps in recording order.
    pub stamps: Vec<FieldProvenance>,
}

impl StampHistory {
    /// Returns the current (most recent) stamp, when any exists.
    #[must_use]
    pub fn current(&self) -> Option<&FieldProvenance> {
        self.stamps.last()
    }

    /// Returns true when any stamp was recorded by the given phase.
    #[must_use]
    pub fn observed_by(&self, phase: &PhaseId) -> bool {
        self.stamps.iter().any(|stamp| &stamp.origin_phase == phase)
    }

    /// Returns the stamp recorded by the given phase, when any exists.
    #[must_use]
    pub fn stamp_by(&self, phase: &PhaseId) -> Option<&FieldProvenance> {
        self.stamps.iter().rev().find(|stamp| &stamp.origin_phase == phase)
    }
}

/// Builds the `default:<phase>` origin for system-injected defaults.
#[must_use]
pub fn default_origin(phase_id: &PhaseId) -> PhaseId {
    PhaseId::new(format!("default:{phase_id}"))
}
