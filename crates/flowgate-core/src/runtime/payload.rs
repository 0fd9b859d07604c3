// flowgate-core/src/runtime/payload.rs
// ============================================================================
// Module: Flowgate Payload Validation
// Description: Outbound and inbound payload checks at the process boundary.
// Purpose: Validate handoff payloads against registered contracts with safe rejections.
// Dependencies: crate::core, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! The payload validator checks a payload leaving one pipeline half
//! (`validate_outbound`, against the final phase's exit contract) or
//! entering the other (`validate_inbound`, against the first phase's entry
//! contract). Rejections carry a stable error code, a payload-relative
//! failed path, a message that never echoes values of sensitive fields, and
//! a concrete next action. Both calls are synchronous and side-effect free.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::ContractDocument;
use crate::core::FieldSpec;
use crate::core::PhaseContract;

// ============================================================================
// SECTION: Rejection Type
// ============================================================================

/// Structured rejection returned by payload validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRejection {
    /// Stable machine-readable error code.
    pub error_code: String,
    /// Payload-relative dot-path of the failing field; never a filesystem path.
    pub failed_path: String,
    /// Human message; sensitive field values are never echoed.
    pub message: String,
    /// Concrete remediation instruction.
    pub next_action: String,
}

// ============================================================================
// SECTION: Payload Validator
// ============================================================================

/// Validates payloads crossing the process boundary against named contracts.
#[derive(Debug, Default)]
pub struct PayloadValidator {
    /// Registered contracts keyed by contract name.
    contracts: BTreeMap<String, ContractDocument>,
}

impl PayloadValidator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contract under a name.
    pub fn register(&mut self, name: impl Into<String>, contract: ContractDocument) {
        self.contracts.insert(name.into(), contract);
    }

    /// Validates a payload leaving this half against the final phase's exit
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadRejection`] describing the first failing field.
    pub fn validate_outbound(
        &self,
        contract_name: &str,
        payload: &Value,
    ) -> Result<(), PayloadRejection> {
        self.validate(contract_name, payload, Direction::Outbound)
    }

    /// Validates a payload entering this half against the first phase's
    /// entry contract.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadRejection`] describing the first failing field.
    pub fn validate_inbound(
        &self,
        contract_name: &str,
        payload: &Value,
    ) -> Result<(), PayloadRejection> {
        self.validate(contract_name, payload, Direction::Inbound)
    }

    /// Shared validation path for both directions.
    fn validate(
        &self,
        contract_name: &str,
        payload: &Value,
        direction: Direction,
    ) -> Result<(), PayloadRejection> {
        let Some(contract) = self.contracts.get(contract_name) else {
            return Err(PayloadRejection {
                error_code: "unknown_contract".to_string(),
                failed_path: String::new(),
                message: format!("no contract registered under name: {contract_name}"),
                next_action: format!(
                    "register contract {contract_name} with the payload validator before validating"
                ),
            });
        };

        let Some(phase) = direction.phase(contract) else {
            return Ok(());
        };
        let specs = direction.specs(phase);

        for spec in specs {
            check_payload_field(payload, spec, contract_name)?;
        }

        tracing::debug!(
            contract = contract_name,
            direction = ?direction,
            "payload validated"
        );
        Ok(())
    }
}

// ============================================================================
// SECTION: Direction
// ============================================================================

/// Validation direction relative to this pipeline half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Payload leaving this half; final phase exit contract applies.
    Outbound,
    /// Payload entering this half; first phase entry contract applies.
    Inbound,
}

impl Direction {
    /// Selects the governing phase contract.
    fn phase(self, contract: &ContractDocument) -> Option<&PhaseContract> {
        match self {
            Self::Outbound => contract.phases.last(),
            Self::Inbound => contract.phases.first(),
        }
    }

    /// Selects the governing field specs within the phase.
    fn specs(self, phase: &PhaseContract) -> &[FieldSpec] {
        match self {
            Self::Outbound => &phase.exit,
            Self::Inbound => &phase.entry,
        }
    }
}

// ============================================================================
// SECTION: Field Checks
// ============================================================================

/// Checks one field spec against the payload, rejecting on blocking absence
/// or type mismatch.
fn check_payload_field(
    payload: &Value,
    spec: &FieldSpec,
    contract_name: &str,
) -> Result<(), PayloadRejection> {
    let value = lookup(payload, spec.name.as_str());

    match value {
        None | Some(Value::Null) => {
            if spec.severity.blocks() {
                return Err(PayloadRejection {
                    error_code: "missing_required_field".to_string(),
                    failed_path: spec.name.to_string(),
                    message: format!("required field {} is absent", spec.name),
                    next_action: format!(
                        "populate {} in the payload for contract {contract_name}, then revalidate",
                        spec.name
                    ),
                });
            }
            Ok(())
        }
        Some(value) => {
            let type_ok = spec
                .value_type
                .as_deref()
                .is_none_or(|expected| type_matches(expected, value));
            if type_ok {
                return Ok(());
            }
            let message = if spec.sensitive {
                format!(
                    "field {} has the wrong type (expected {})",
                    spec.name,
                    spec.value_type.as_deref().unwrap_or("unknown")
                )
            } else {
                format!(
                    "field {} has the wrong type (expected {}, got {})",
                    spec.name,
                    spec.value_type.as_deref().unwrap_or("unknown"),
                    json_type(value)
                )
            };
            Err(PayloadRejection {
                error_code: "type_mismatch".to_string(),
                failed_path: spec.name.to_string(),
                message,
                next_action: format!(
                    "correct the type of {} in the payload for contract {contract_name}, then revalidate",
                    spec.name
                ),
            })
        }
    }
}

/// Looks up a dot-path inside a payload value.
fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Returns true when the value matches the declared JSON type name.
fn type_matches(expected: &str, value: &Value) -> bool {
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

/// Returns a short JSON type name for diagnostics.
const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
