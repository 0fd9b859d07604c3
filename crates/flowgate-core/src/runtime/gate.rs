// flowgate-core/src/runtime/gate.rs
// ============================================================================
// Module: Flowgate Gate Engine
// Description: Staged integrity verification at the cross-process handoff boundary.
// Purpose: Aggregate structural, checksum, cross-reference, and completeness checks.
// Dependencies: crate::{core, interfaces, runtime::handoff}, serde_json, tracing
// ============================================================================

//! ## Overview
//! A gate executes its checks in declaration order against the handoff
//! artifact set. Checksums are recomputed from the bytes the reader returns
//! at verification time, never trusted from stored values, so stale or
//! tampered artifacts are caught regardless of what the producing half
//! claims. Checks with an ordering dependency short-circuit: when the
//! structural stage fails, later stages report failures pointing at it
//! rather than attempting work on an invalid bundle. Gate runs are pure
//! observations; the same gate over unchanged artifacts yields an identical
//! result sequence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AuditTrail;
use crate::core::ChainStatus;
use crate::core::ChainSummary;
use crate::core::CheckDisposition;
use crate::core::CheckKind;
use crate::core::EvidenceItem;
use crate::core::ExecutionContext;
use crate::core::GateCheckSpec;
use crate::core::GateId;
use crate::core::GateResult;
use crate::core::GateSpec;
use crate::core::HandoffManifest;
use crate::core::HandoffMetadata;
use crate::core::MANIFEST_PATH;
use crate::core::REQUIRED_ARTIFACT_PATHS;
use crate::core::hashing::hash_bytes;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::ArtifactReader;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default minimum chain completeness when a gate declares none.
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 1.0;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate engine errors (individual check failures are results, not errors).
#[derive(Debug, Error)]
pub enum GateError {
    /// No gate is registered under the identifier.
    #[error("unknown gate: {0}")]
    UnknownGate(String),
}

// ============================================================================
// SECTION: Gate Engine
// ============================================================================

/// Runs registered gates against handoff artifact sets.
#[derive(Debug, Default)]
pub struct GateEngine {
    /// Registered gate specifications.
    gates: Vec<GateSpec>,
}

impl GateEngine {
    /// Creates an engine with the provided gates.
    #[must_use]
    pub const fn new(gates: Vec<GateSpec>) -> Self {
        Self {
            gates,
        }
    }

    /// Registers an additional gate.
    pub fn register(&mut self, gate: GateSpec) {
        self.gates.push(gate);
    }

    /// Runs the identified gate against the artifact set behind the reader.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::UnknownGate`] when the gate is not registered.
    pub fn run_gate<R: ArtifactReader>(
        &self,
        gate_id: &GateId,
        reader: &R,
    ) -> Result<Vec<GateResult>, GateError> {
        let gate = self
            .gates
            .iter()
            .find(|gate| &gate.gate_id == gate_id)
            .ok_or_else(|| GateError::UnknownGate(gate_id.to_string()))?;

        let mut bundle = LoadedBundle::default();
        let mut structural_failed = false;
        let mut results = Vec::with_capacity(gate.checks.len());

        for check in &gate.checks {
            let outcome = if structural_failed && check.kind != CheckKind::Structural {
                CheckOutcome::fail(
                    "structural integrity failed; check not attempted".to_string(),
                    format!(
                        "fix the structural failure reported by gate {gate_id}, then re-run it"
                    ),
                    Vec::new(),
                )
            } else {
                match check.kind {
                    CheckKind::Structural => {
                        let outcome = run_structural(reader, &mut bundle, gate_id);
                        structural_failed = !outcome.passed;
                        outcome
                    }
                    CheckKind::ChecksumChain => run_checksum_chain(reader, &bundle, gate_id),
                    CheckKind::CrossReference => run_cross_reference(&bundle, gate_id),
                    CheckKind::Completeness => run_completeness(check, &bundle),
                }
            };

            let result = outcome.into_result(gate, check);
            tracing::info!(
                gate = %result.gate_id,
                check = %result.check,
                result = ?result.result,
                blocking = result.blocking,
                "gate check evaluated"
            );
            results.push(result);
        }

        Ok(results)
    }
}

// ============================================================================
// SECTION: Check Outcomes
// ============================================================================

/// Intermediate outcome before severity mapping.
struct CheckOutcome {
    /// True when the check passed.
    passed: bool,
    /// Reason for the disposition.
    reason: String,
    /// Remediation instruction for failures.
    next_action: Option<String>,
    /// Evidence collected by the check.
    evidence: Vec<EvidenceItem>,
}

impl CheckOutcome {
    /// Builds a passing outcome.
    fn pass(reason: String, evidence: Vec<EvidenceItem>) -> Self {
        Self {
            passed: true,
            reason,
            next_action: None,
            evidence,
        }
    }

    /// Builds a failing outcome with a concrete remediation instruction.
    fn fail(reason: String, next_action: String, evidence: Vec<EvidenceItem>) -> Self {
        Self {
            passed: false,
            reason,
            next_action: Some(next_action),
            evidence,
        }
    }

    /// Maps the outcome onto a gate result using the severity mapping table.
    fn into_result(self, gate: &GateSpec, check: &GateCheckSpec) -> GateResult {
        let result = if self.passed {
            CheckDisposition::Pass
        } else if check.severity.blocks() {
            CheckDisposition::Fail
        } else {
            CheckDisposition::Warn
        };
        GateResult {
            gate_id: gate.gate_id.clone(),
            phase: gate.phase.clone(),
            check: check.kind.check_id(),
            result,
            severity: check.severity,
            blocking: result == CheckDisposition::Fail,
            evidence: self.evidence,
            reason: self.reason,
            next_action: self.next_action,
        }
    }
}

// ============================================================================
// SECTION: Loaded Bundle
// ============================================================================

/// Artifacts parsed by the structural check for downstream stages.
#[derive(Default)]
struct LoadedBundle {
    /// Parsed handoff manifest.
    manifest: Option<HandoffManifest>,
    /// Parsed metadata artifact.
    metadata: Option<HandoffMetadata>,
    /// Parsed audit trail artifact.
    audit: Option<AuditTrail>,
    /// Parsed chain summary artifact.
    chains: Option<ChainSummary>,
}

// ============================================================================
// SECTION: Structural Check
// ============================================================================

/// Validates presence and shape of exactly the enumerated artifact set.
fn run_structural<R: ArtifactReader>(
    reader: &R,
    bundle: &mut LoadedBundle,
    gate_id: &GateId,
) -> CheckOutcome {
    let manifest_bytes = match reader.read(MANIFEST_PATH) {
        Ok(bytes) => bytes,
        Err(_) => {
            return CheckOutcome::fail(
                format!("handoff manifest missing at {MANIFEST_PATH}"),
                format!("re-export the handoff bundle to restore {MANIFEST_PATH}, then re-run gate {gate_id}"),
                vec![EvidenceItem::manifest(MANIFEST_PATH, "manifest not readable")],
            );
        }
    };
    let manifest: HandoffManifest = match serde_json::from_slice(&manifest_bytes) {
        Ok(manifest) => manifest,
        Err(err) => {
            return CheckOutcome::fail(
                format!("handoff manifest failed to parse: {err}"),
                format!("re-export the handoff bundle to regenerate {MANIFEST_PATH}, then re-run gate {gate_id}"),
                vec![EvidenceItem::manifest(MANIFEST_PATH, "manifest malformed")],
            );
        }
    };

    let mut evidence = vec![EvidenceItem::manifest(MANIFEST_PATH, "manifest parsed")];
    for path in REQUIRED_ARTIFACT_PATHS {
        let indexed = manifest.artifacts.iter().any(|record| record.path == path);
        if !indexed {
            return CheckOutcome::fail(
                format!("required artifact not indexed by manifest: {path}"),
                format!("re-export the handoff bundle so the manifest indexes {path}, then re-run gate {gate_id}"),
                evidence,
            );
        }
        let bytes = match reader.read(path) {
            Ok(bytes) => bytes,
            Err(_) => {
                return CheckOutcome::fail(
                    format!("required artifact missing: {path}"),
                    format!("re-export the handoff bundle to restore {path}, then re-run gate {gate_id}"),
                    evidence,
                );
            }
        };
        if let Err(detail) = parse_artifact_shape(path, &bytes, bundle) {
            return CheckOutcome::fail(
                format!("artifact failed shape validation: {path}: {detail}"),
                format!("re-export the handoff bundle to regenerate {path}, then re-run gate {gate_id}"),
                evidence,
            );
        }
        evidence.push(EvidenceItem::artifact(path, "present with valid shape"));
    }

    bundle.manifest = Some(manifest);
    CheckOutcome::pass("all required handoff artifacts present with valid shape".to_string(), evidence)
}

/// Parses one required artifact into its expected shape.
fn parse_artifact_shape(path: &str, bytes: &[u8], bundle: &mut LoadedBundle) -> Result<(), String> {
    match path {
        crate::core::CONTEXT_SNAPSHOT_PATH => {
            let _context: ExecutionContext =
                serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
            Ok(())
        }
        crate::core::METADATA_PATH => {
            bundle.metadata =
                Some(serde_json::from_slice(bytes).map_err(|err| err.to_string())?);
            Ok(())
        }
        crate::core::AUDIT_TRAIL_PATH => {
            bundle.audit = Some(serde_json::from_slice(bytes).map_err(|err| err.to_string())?);
            Ok(())
        }
        crate::core::CHAIN_SUMMARY_PATH => {
            bundle.chains = Some(serde_json::from_slice(bytes).map_err(|err| err.to_string())?);
            Ok(())
        }
        other => Err(format!("unexpected artifact path: {other}")),
    }
}

// ============================================================================
// SECTION: Checksum Chain Check
// ============================================================================

/// Recomputes every artifact checksum and the manifest root hash from bytes.
fn run_checksum_chain<R: ArtifactReader>(
    reader: &R,
    bundle: &LoadedBundle,
    gate_id: &GateId,
) -> CheckOutcome {
    let Some(manifest) = &bundle.manifest else {
        return CheckOutcome::fail(
            "manifest unavailable for checksum verification".to_string(),
            format!("fix the structural failure reported by gate {gate_id}, then re-run it"),
            Vec::new(),
        );
    };

    let mut evidence = Vec::new();
    for entry in &manifest.integrity.file_hashes {
        let bytes = match reader.read(&entry.path) {
            Ok(bytes) => bytes,
            Err(_) => {
                return CheckOutcome::fail(
                    format!("artifact vanished before checksum verification: {}", entry.path),
                    format!("re-export the handoff bundle to restore {}, then re-run gate {gate_id}", entry.path),
                    evidence,
                );
            }
        };
        let actual = hash_bytes(manifest.hash_algorithm, &bytes);
        if actual != entry.hash {
            return CheckOutcome::fail(
                format!("checksum mismatch for {}", entry.path),
                format!(
                    "recompute the checksum for {} by re-exporting the handoff bundle, then re-run gate {gate_id}",
                    entry.path
                ),
                vec![EvidenceItem::artifact(&entry.path, "recomputed digest differs from manifest")],
            );
        }
        evidence.push(EvidenceItem::artifact(&entry.path, "recomputed digest matches manifest"));
    }

    match hash_canonical_json(manifest.hash_algorithm, &manifest.integrity.file_hashes) {
        Ok(root) if root == manifest.integrity.root_hash => {
            evidence.push(EvidenceItem::manifest(MANIFEST_PATH, "root hash matches file hash list"));
            CheckOutcome::pass("all checksums recomputed and matching".to_string(), evidence)
        }
        Ok(_) => CheckOutcome::fail(
            "manifest root hash does not match the file hash list".to_string(),
            format!("re-export the handoff bundle to regenerate the manifest root hash, then re-run gate {gate_id}"),
            evidence,
        ),
        Err(err) => CheckOutcome::fail(
            format!("failed to recompute root hash: {err}"),
            format!("re-export the handoff bundle to regenerate {MANIFEST_PATH}, then re-run gate {gate_id}"),
            evidence,
        ),
    }
}

// ============================================================================
// SECTION: Cross-Reference Check
// ============================================================================

/// Verifies manifest, metadata, audit trail, and chain summary agree.
fn run_cross_reference(bundle: &LoadedBundle, gate_id: &GateId) -> CheckOutcome {
    let (Some(manifest), Some(metadata), Some(audit), Some(chains)) =
        (&bundle.manifest, &bundle.metadata, &bundle.audit, &bundle.chains)
    else {
        return CheckOutcome::fail(
            "bundle unavailable for cross-reference verification".to_string(),
            format!("fix the structural failure reported by gate {gate_id}, then re-run it"),
            Vec::new(),
        );
    };

    for record in &manifest.artifacts {
        if !manifest.integrity.file_hashes.iter().any(|entry| entry.path == record.path) {
            return CheckOutcome::fail(
                format!("artifact record has no file hash entry: {}", record.path),
                format!("regenerate the handoff manifest so artifact records and file hashes agree, then re-run gate {gate_id}"),
                vec![EvidenceItem::manifest(MANIFEST_PATH, "artifact index and hash list disagree")],
            );
        }
    }
    for entry in &manifest.integrity.file_hashes {
        if !manifest.artifacts.iter().any(|record| record.path == entry.path) {
            return CheckOutcome::fail(
                format!("file hash entry has no artifact record: {}", entry.path),
                format!("regenerate the handoff manifest so artifact records and file hashes agree, then re-run gate {gate_id}"),
                vec![EvidenceItem::manifest(MANIFEST_PATH, "artifact index and hash list disagree")],
            );
        }
    }

    if metadata.pipeline_id != manifest.pipeline_id {
        return CheckOutcome::fail(
            format!(
                "metadata pipeline {} does not match manifest pipeline {}",
                metadata.pipeline_id, manifest.pipeline_id
            ),
            format!("re-export the handoff bundle from a single pipeline run, then re-run gate {gate_id}"),
            vec![EvidenceItem::artifact(crate::core::METADATA_PATH, "pipeline identifiers disagree")],
        );
    }
    if metadata.handoff_version != manifest.handoff_version {
        return CheckOutcome::fail(
            "metadata handoff version does not match manifest".to_string(),
            format!("re-export the handoff bundle with a consistent handoff version, then re-run gate {gate_id}"),
            vec![EvidenceItem::artifact(crate::core::METADATA_PATH, "handoff versions disagree")],
        );
    }

    let total = chains.reports.len();
    if chains.intact + chains.degraded + chains.broken != total {
        return CheckOutcome::fail(
            "chain summary counts do not sum to the report count".to_string(),
            format!("re-run chain validation and re-export the chain summary, then re-run gate {gate_id}"),
            vec![EvidenceItem::artifact(crate::core::CHAIN_SUMMARY_PATH, "summary counts inconsistent")],
        );
    }
    for report in audit.chain_reports() {
        if !chains.reports.iter().any(|known| known.chain_id == report.chain_id) {
            return CheckOutcome::fail(
                format!("audit trail references unknown chain: {}", report.chain_id),
                format!("re-export the audit trail and chain summary from the same run, then re-run gate {gate_id}"),
                vec![EvidenceItem::artifact(crate::core::AUDIT_TRAIL_PATH, "dangling chain reference")],
            );
        }
    }

    CheckOutcome::pass(
        "manifest, metadata, audit trail, and chain summary are consistent".to_string(),
        vec![EvidenceItem::manifest(MANIFEST_PATH, "cross-references resolve")],
    )
}

// ============================================================================
// SECTION: Completeness Check
// ============================================================================

/// Verifies chain completeness meets the declared threshold.
fn run_completeness(check: &GateCheckSpec, bundle: &LoadedBundle) -> CheckOutcome {
    let Some(chains) = &bundle.chains else {
        return CheckOutcome::fail(
            "chain summary unavailable for completeness verification".to_string(),
            "fix the structural failure reported by this gate, then re-run it".to_string(),
            Vec::new(),
        );
    };

    let threshold = check.completeness_threshold.unwrap_or(DEFAULT_COMPLETENESS_THRESHOLD);
    let evidence = vec![EvidenceItem::artifact(
        crate::core::CHAIN_SUMMARY_PATH,
        format!("completeness {} against threshold {threshold}", chains.completeness),
    )];

    if chains.completeness >= threshold {
        return CheckOutcome::pass(
            format!("chain completeness {} meets threshold {threshold}", chains.completeness),
            evidence,
        );
    }

    let failing: Vec<String> = chains
        .reports
        .iter()
        .filter(|report| report.status != ChainStatus::Intact)
        .map(|report| report.chain_id.to_string())
        .collect();
    CheckOutcome::fail(
        format!("chain completeness {} is below threshold {threshold}", chains.completeness),
        format!(
            "repair non-intact chain(s) [{}] and re-run chain validation before re-exporting the handoff",
            failing.join(", ")
        ),
        evidence,
    )
}
