// flowgate-core/src/runtime/tracker.rs
// ============================================================================
// Module: Flowgate Provenance Tracker
// Description: Stamp and verify operations over embedded provenance records.
// Purpose: Detect silent mutation of tracked fields between stamp and check time.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! The tracker stamps a provenance record for a field immediately after a
//! phase writes or mutates it, and verifies the field later by recomputing
//! the canonical fingerprint of the current value. Verification prefers
//! false alarms over silent corruption: a record whose fingerprint no longer
//! matches, or a tracked field that has vanished, both report `Mismatch`.
//! Records live inside the reserved context namespace and travel with the
//! context across the handoff.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::ExecutionContext;
use crate::core::FieldPath;
use crate::core::FieldProvenance;
use crate::core::PhaseId;
use crate::core::StampHistory;
use crate::core::hashing::HashError;
use crate::core::hashing::fingerprint_value;
use crate::interfaces::Clock;
use crate::interfaces::SystemClock;

// ============================================================================
// SECTION: Verify Outcome
// ============================================================================

/// Outcome of a provenance verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Current value fingerprints identically to the stored record.
    Match,
    /// Fingerprints differ, or the tracked field has vanished.
    Mismatch,
    /// No provenance record exists for the field.
    Absent,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provenance tracking errors.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// Stamp requested for a field with no value in the context.
    #[error("cannot stamp absent field: {0}")]
    FieldAbsent(String),
    /// Canonical fingerprinting failed.
    #[error(transparent)]
    Fingerprint(#[from] HashError),
    /// The embedded provenance namespace failed to deserialize.
    #[error("corrupt provenance namespace: {0}")]
    Corrupt(String),
}

// ============================================================================
// SECTION: Provenance Tracker
// ============================================================================

/// Stamps and verifies per-field provenance records.
#[derive(Debug)]
pub struct ProvenanceTracker<C: Clock = SystemClock> {
    /// Clock supplying stamp timestamps.
    clock: C,
}

impl ProvenanceTracker<SystemClock> {
    /// Creates a tracker backed by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: SystemClock::new(),
        }
    }
}

impl Default for ProvenanceTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ProvenanceTracker<C> {
    /// Creates a tracker with the provided clock.
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self {
            clock,
        }
    }

    /// Records a fresh provenance stamp for the field's current value.
    ///
    /// Re-stamping an already-tracked field appends to its history; nothing
    /// overwrites a record silently.
    ///
    /// # Errors
    ///
    /// Returns [`ProvenanceError`] when the field is absent, fingerprinting
    /// fails, or the namespace is corrupt.
    pub fn stamp(
        &self,
        context: &mut ExecutionContext,
        field: &FieldPath,
        origin_phase: &PhaseId,
    ) -> Result<(), ProvenanceError> {
        let value = context
            .get(field.as_str())
            .cloned()
            .ok_or_else(|| ProvenanceError::FieldAbsent(field.to_string()))?;
        let fingerprint = fingerprint_value(&value)?;

        let mut records = read_records(context)?;
        let history = records.entry(field.to_string()).or_default();
        history.stamps.push(FieldProvenance {
            origin_phase: origin_phase.clone(),
            recorded_at: self.clock.now(),
            fingerprint,
        });
        write_records(context, &records)?;

        tracing::debug!(field = %field, origin = %origin_phase, "provenance stamp recorded");
        Ok(())
    }

    /// Verifies the field's current value against its stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ProvenanceError`] when the namespace is corrupt or
    /// fingerprinting fails.
    pub fn verify(
        &self,
        context: &ExecutionContext,
        field: &FieldPath,
    ) -> Result<VerifyOutcome, ProvenanceError> {
        let records = read_records(context)?;
        let Some(current) = records.get(field.as_str()).and_then(|history| history.current())
        else {
            return Ok(VerifyOutcome::Absent);
        };

        let Some(value) = context.get(field.as_str()) else {
            return Ok(VerifyOutcome::Mismatch);
        };
        let fingerprint = fingerprint_value(value)?;
        if fingerprint == current.fingerprint {
            Ok(VerifyOutcome::Match)
        } else {
            Ok(VerifyOutcome::Mismatch)
        }
    }

    /// Returns the stamp history for a field, when any exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProvenanceError`] when the namespace is corrupt.
    pub fn history(
        &self,
        context: &ExecutionContext,
        field: &FieldPath,
    ) -> Result<Option<StampHistory>, ProvenanceError> {
        let records = read_records(context)?;
        Ok(records.get(field.as_str()).cloned())
    }
}

// ============================================================================
// SECTION: Namespace Codec
// ============================================================================

/// Reads the embedded provenance records from the reserved namespace.
fn read_records(
    context: &ExecutionContext,
) -> Result<BTreeMap<String, StampHistory>, ProvenanceError> {
    match context.provenance_root() {
        None => Ok(BTreeMap::new()),
        Some(root) => serde_json::from_value(root.clone())
            .map_err(|err| ProvenanceError::Corrupt(err.to_string())),
    }
}

/// Writes the embedded provenance records into the reserved namespace.
fn write_records(
    context: &mut ExecutionContext,
    records: &BTreeMap<String, StampHistory>,
) -> Result<(), ProvenanceError> {
    let value =
        serde_json::to_value(records).map_err(|err| ProvenanceError::Corrupt(err.to_string()))?;
    context.set_provenance_root(value);
    Ok(())
}
