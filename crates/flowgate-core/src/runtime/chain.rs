// flowgate-core/src/runtime/chain.rs
// ============================================================================
// Module: Flowgate Chain Validator
// Description: Propagation chain evaluation consulting provenance and expressions.
// Purpose: Derive chain status from the current context, never from cached verdicts.
// Dependencies: crate::{core, runtime::{expr, tracker}}, tracing
// ============================================================================

//! ## Overview
//! Chain validation runs post-execution, once per declared chain. Status is
//! always re-derived from the current context plus embedded provenance:
//! absent endpoints and skipped waypoints are broken, verification failures
//! distinguish failed assertions from evaluation errors, and destinations
//! holding a default or empty sentinel are degraded rather than intact.
//! Completeness is `intact / total` rounded to one decimal place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::ChainFailure;
use crate::core::ChainReport;
use crate::core::ChainStatus;
use crate::core::ChainSummary;
use crate::core::ContractDocument;
use crate::core::ExecutionContext;
use crate::core::PhaseId;
use crate::core::PropagationChainSpec;
use crate::core::default_origin;
use crate::core::hashing::null_fingerprint;
use crate::interfaces::Clock;
use crate::runtime::expr::Bindings;
use crate::runtime::expr::EvalError;
use crate::runtime::expr::Evaluator;
use crate::runtime::tracker::ProvenanceError;
use crate::runtime::tracker::ProvenanceTracker;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Chain validation errors (infrastructure only; chain failures are data).
#[derive(Debug, Error)]
pub enum ChainError {
    /// The embedded provenance namespace failed to deserialize.
    #[error(transparent)]
    Provenance(#[from] ProvenanceError),
}

// ============================================================================
// SECTION: Chain Validator
// ============================================================================

/// Evaluates declared propagation chains against the current context.
#[derive(Debug, Default)]
pub struct ChainValidator {
    /// Sandboxed evaluator for verification expressions.
    evaluator: Evaluator,
}

impl ChainValidator {
    /// Creates a chain validator with default evaluator limits.
    #[must_use]
    pub const fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
        }
    }

    /// Evaluates a single chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when embedded provenance is unreadable.
    pub fn validate_chain<C: Clock>(
        &self,
        context: &ExecutionContext,
        chain: &PropagationChainSpec,
        contract: &ContractDocument,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<ChainReport, ChainError> {
        let report = self.derive_report(context, chain, contract, tracker)?;
        tracing::info!(
            chain = %report.chain_id,
            status = ?report.status,
            "chain evaluated"
        );
        Ok(report)
    }

    /// Evaluates every chain in the contract and aggregates the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when embedded provenance is unreadable.
    pub fn validate_chains<C: Clock>(
        &self,
        context: &ExecutionContext,
        contract: &ContractDocument,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<ChainSummary, ChainError> {
        let mut reports = Vec::with_capacity(contract.chains.len());
        for chain in &contract.chains {
            reports.push(self.validate_chain(context, chain, contract, tracker)?);
        }
        let summary = ChainSummary::from_reports(reports);
        tracing::info!(
            intact = summary.intact,
            degraded = summary.degraded,
            broken = summary.broken,
            completeness = summary.completeness,
            "chain summary computed"
        );
        Ok(summary)
    }

    /// Derives one chain report using the decision order of the contract.
    fn derive_report<C: Clock>(
        &self,
        context: &ExecutionContext,
        chain: &PropagationChainSpec,
        contract: &ContractDocument,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<ChainReport, ChainError> {
        let broken = |failure: ChainFailure| ChainReport {
            chain_id: chain.chain_id.clone(),
            destination_field: chain.destination_field.clone(),
            status: ChainStatus::Broken,
            failure: Some(failure),
        };

        let Some(source) = context.get(chain.source_field.as_str()).cloned() else {
            return Ok(broken(ChainFailure::SourceAbsent));
        };
        let Some(dest) = context.get(chain.destination_field.as_str()).cloned() else {
            return Ok(broken(ChainFailure::DestinationAbsent));
        };

        if let Some(skipped) = self.missing_waypoint(context, chain, tracker)? {
            return Ok(broken(ChainFailure::WaypointSkipped {
                phase: skipped,
            }));
        }

        if let Some(expression) = &chain.verification {
            let bindings = Bindings {
                context: context.snapshot(),
                source,
                dest: dest.clone(),
            };
            match self.evaluator.evaluate(expression, &bindings) {
                Ok(true) => {}
                Ok(false) => return Ok(broken(ChainFailure::AssertionFailed)),
                Err(err) => {
                    tracing::warn!(chain = %chain.chain_id, error = %err, "verification error");
                    return Ok(broken(ChainFailure::EvaluationError {
                        detail: eval_error_detail(&err),
                    }));
                }
            }
        }

        if is_sentinel_destination(&dest, chain, contract) {
            return Ok(ChainReport {
                chain_id: chain.chain_id.clone(),
                destination_field: chain.destination_field.clone(),
                status: ChainStatus::Degraded,
                failure: Some(ChainFailure::DefaultedDestination),
            });
        }

        Ok(ChainReport {
            chain_id: chain.chain_id.clone(),
            destination_field: chain.destination_field.clone(),
            status: ChainStatus::Intact,
            failure: None,
        })
    }

    /// Returns the first declared waypoint with no non-null observation record.
    fn missing_waypoint<C: Clock>(
        &self,
        context: &ExecutionContext,
        chain: &PropagationChainSpec,
        tracker: &ProvenanceTracker<C>,
    ) -> Result<Option<PhaseId>, ChainError> {
        let history = tracker.history(context, &chain.source_field)?;
        for waypoint in &chain.waypoints {
            let observed = history.as_ref().is_some_and(|history| {
                // A stamp taken while the field held null does not count as
                // an observation; waypoints must observe a non-null value.
                let direct = history.stamp_by(waypoint);
                let via_default = history.stamp_by(&default_origin(waypoint));
                direct
                    .or(via_default)
                    .is_some_and(|stamp| stamp.fingerprint != null_fingerprint())
            });
            if !observed {
                return Ok(Some(waypoint.clone()));
            }
        }
        Ok(None)
    }
}

// ============================================================================
// SECTION: Sentinel Detection
// ============================================================================

/// Returns true when the destination holds a default or empty sentinel
/// rather than a genuinely propagated value.
fn is_sentinel_destination(
    dest: &Value,
    chain: &PropagationChainSpec,
    contract: &ContractDocument,
) -> bool {
    if let Some(declared) = contract.declared_default(&chain.destination_phase, &chain.destination_field)
        && declared == dest
    {
        return true;
    }
    match dest {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Formats an evaluation error for the chain failure detail, tagging the
/// timeout class explicitly so operators can tell it apart from type errors.
fn eval_error_detail(err: &EvalError) -> String {
    match err {
        EvalError::Timeout {
            limit_ms,
        } => format!("evaluation timed out after {limit_ms} ms"),
        other => format!("evaluation error: {other}"),
    }
}
