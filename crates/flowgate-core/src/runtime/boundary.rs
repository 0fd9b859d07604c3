// flowgate-core/src/runtime/boundary.rs
// ============================================================================
// Module: Flowgate Boundary Validator
// Description: Phase entry/exit/enrichment validation with three-tier severity policy.
// Purpose: Enforce field contracts at every boundary, injecting declared defaults.
// Dependencies: crate::{core, runtime::tracker}, serde_json, tracing
// ============================================================================

//! ## Overview
//! The boundary validator runs at every phase entry, exit, and enrichment
//! checkpoint. Blocking absences fail the outcome and must halt the phase;
//! warning absences inject declared defaults (stamping provenance with a
//! `default:` origin so injected values are never provenance-orphaned);
//! advisory absences are recorded with minimal detail. Multi-domain
//! validation resolves worst-of-all-domains: any blocking failure from any
//! domain halts the phase, and the composite always carries the per-domain
//! breakdown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::BoundaryDirection;
use crate::core::BoundaryOutcome;
use crate::core::CompositeBoundaryOutcome;
use crate::core::ContextError;
use crate::core::ContractDocument;
use crate::core::DomainOutcome;
use crate::core::ExecutionContext;
use crate::core::FieldCheck;
use crate::core::FieldSpec;
use crate::core::FieldState;
use crate::core::PhaseId;
use crate::core::Severity;
use crate::core::default_origin;
use crate::interfaces::Clock;
use crate::runtime::tracker::ProvenanceError;
use crate::runtime::tracker::ProvenanceTracker;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Boundary validation errors.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Default injection failed to write the context.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Provenance stamping of an injected default failed.
    #[error(transparent)]
    Provenance(#[from] ProvenanceError),
}

// ============================================================================
// SECTION: Boundary Validator
// ============================================================================

/// Validates phase boundaries against contract field specifications.
#[derive(Debug, Default)]
pub struct BoundaryValidator;

impl BoundaryValidator {
    /// Creates a boundary validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates one phase boundary against one contract domain.
    ///
    /// Warning-severity defaults are injected into the context and stamped
    /// through the provided tracker; this is the only mutation the validator
    /// performs.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when default injection or its provenance
    /// stamp fails.
    pub fn validate_boundary<C: Clock>(
        &self,
        context: &mut ExecutionContext,
        phase_id: &PhaseId,
        direction: BoundaryDirection,
        contract: &ContractDocument,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<BoundaryOutcome, BoundaryError> {
        let specs = contract
            .phase(phase_id)
            .map(|phase| phase.fields_for(direction))
            .unwrap_or_default();

        let mut checks = Vec::with_capacity(specs.len());
        let mut blocking_count = 0usize;
        let mut blocked_fields: Vec<String> = Vec::new();

        for spec in specs {
            let check = self.check_field(context, phase_id, spec, tracker)?;
            if check.state == FieldState::Blocked {
                blocking_count += 1;
                blocked_fields.push(check.field.to_string());
            }
            checks.push(check);
        }

        let passed = blocking_count == 0;
        let next_action = if passed {
            None
        } else {
            Some(format!(
                "populate required field(s) [{}] before phase {phase_id}, then re-run the boundary",
                blocked_fields.join(", ")
            ))
        };

        tracing::info!(
            phase = %phase_id,
            direction = ?direction,
            domain = %contract.domain,
            passed,
            blocking_count,
            checked = checks.len(),
            "boundary validated"
        );

        Ok(BoundaryOutcome {
            phase_id: phase_id.clone(),
            direction,
            passed,
            blocking_count,
            checks,
            next_action,
        })
    }

    /// Validates one boundary against every simultaneously-active contract
    /// domain, aggregating worst-of-all-domains.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when default injection or its provenance
    /// stamp fails.
    pub fn validate_all_domains<C: Clock>(
        &self,
        context: &mut ExecutionContext,
        phase_id: &PhaseId,
        direction: BoundaryDirection,
        contracts: &[ContractDocument],
        tracker: &ProvenanceTracker<C>,
    ) -> Result<CompositeBoundaryOutcome, BoundaryError> {
        let mut domains = Vec::with_capacity(contracts.len());
        for contract in contracts {
            let outcome =
                self.validate_boundary(context, phase_id, direction, contract, tracker)?;
            domains.push(DomainOutcome {
                domain: contract.domain.clone(),
                outcome,
            });
        }
        Ok(CompositeBoundaryOutcome::aggregate(phase_id.clone(), direction, domains))
    }

    /// Checks a single field spec, applying the severity policy.
    fn check_field<C: Clock>(
        &self,
        context: &mut ExecutionContext,
        phase_id: &PhaseId,
        spec: &FieldSpec,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<FieldCheck, BoundaryError> {
        let value = context.get(spec.name.as_str()).filter(|value| !value.is_null()).cloned();

        if let Some(value) = value {
            let type_ok = spec
                .value_type
                .as_deref()
                .is_none_or(|expected| json_type_matches(expected, &value));
            if type_ok {
                return Ok(FieldCheck {
                    field: spec.name.clone(),
                    severity: spec.severity,
                    state: FieldState::Present,
                    default_applied: false,
                    type_mismatch: false,
                });
            }
            // Mistyped values follow the same severity policy as absences.
            let mut check = self.handle_absence(context, phase_id, spec, tracker)?;
            check.type_mismatch = true;
            return Ok(check);
        }

        self.handle_absence(context, phase_id, spec, tracker)
    }

    /// Applies the severity policy for an absent (or mistyped) field.
    fn handle_absence<C: Clock>(
        &self,
        context: &mut ExecutionContext,
        phase_id: &PhaseId,
        spec: &FieldSpec,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<FieldCheck, BoundaryError> {
        let (state, default_applied) = match spec.severity {
            Severity::Blocking => (FieldState::Blocked, false),
            Severity::Warning => match &spec.default {
                Some(default) => {
                    self.inject_default(context, phase_id, spec, default.clone(), tracker)?;
                    (FieldState::Defaulted, true)
                }
                None => (FieldState::Defaulted, false),
            },
            Severity::Advisory => {
                tracing::debug!(field = %spec.name, phase = %phase_id, "advisory field absent");
                (FieldState::Partial, false)
            }
        };

        Ok(FieldCheck {
            field: spec.name.clone(),
            severity: spec.severity,
            state,
            default_applied,
            type_mismatch: false,
        })
    }

    /// Injects a declared default and stamps its provenance immediately, so
    /// the injected value is never provenance-orphaned.
    fn inject_default<C: Clock>(
        &self,
        context: &mut ExecutionContext,
        phase_id: &PhaseId,
        spec: &FieldSpec,
        default: Value,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<(), BoundaryError> {
        context.set(spec.name.as_str(), default)?;
        tracker.stamp(context, &spec.name, &default_origin(phase_id))?;
        tracing::info!(field = %spec.name, phase = %phase_id, "default injected");
        Ok(())
    }
}

// ============================================================================
// SECTION: Type Matching
// ============================================================================

/// Returns true when the value matches the declared JSON type name.
fn json_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}
