// flowgate-core/src/core/handoff.rs
// ============================================================================
// Module: Flowgate Handoff Manifest
// Description: Handoff artifact manifest schemas and integrity metadata.
// Purpose: Provide the canonical, versioned index of cross-process handoff artifacts.
// Dependencies: crate::core::{hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! The context handoff between the two pipeline halves is an explicit
//! serialize/deserialize step with its own versioned schema, so version skew
//! is a detectable, typed error rather than a silent structural mismatch.
//! The manifest indexes a small, explicitly enumerated artifact set; the
//! gate engine's structural check validates exactly this set, never an
//! open-ended directory scan. Handoff artifacts are untrusted inputs:
//! checksums are always recomputed at verification time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::identifiers::PipelineId;
use crate::core::identifiers::SchemaVersion;
use crate::core::time::TimePair;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Handoff path for the manifest itself.
pub const MANIFEST_PATH: &str = "manifest.json";
/// Handoff path for the serialized execution context snapshot.
pub const CONTEXT_SNAPSHOT_PATH: &str = "artifacts/context_snapshot.json";
/// Handoff path for the metadata/schema artifact.
pub const METADATA_PATH: &str = "artifacts/handoff_metadata.json";
/// Handoff path for the audit trail artifact.
pub const AUDIT_TRAIL_PATH: &str = "artifacts/audit_trail.json";
/// Handoff path for the aggregated chain summary artifact.
pub const CHAIN_SUMMARY_PATH: &str = "artifacts/chain_summary.json";

/// The enumerated required artifact set, in manifest order.
pub const REQUIRED_ARTIFACT_PATHS: [&str; 4] =
    [CONTEXT_SNAPSHOT_PATH, METADATA_PATH, AUDIT_TRAIL_PATH, CHAIN_SUMMARY_PATH];

/// Current handoff schema version.
pub const CURRENT_HANDOFF_VERSION: &str = "handoff-v1";

// ============================================================================
// SECTION: Manifest Types
// ============================================================================

/// Handoff schema version tag.
///
/// # Invariants
/// - Opaque UTF-8 string; import compares it exactly against the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandoffVersion(pub String);

impl HandoffVersion {
    /// Returns the current handoff schema version.
    #[must_use]
    pub fn current() -> Self {
        Self(CURRENT_HANDOFF_VERSION.to_string())
    }
}

/// Handoff artifact kinds in the enumerated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffArtifactKind {
    /// Serialized execution context snapshot.
    ContextSnapshot,
    /// Metadata/schema artifact.
    Metadata,
    /// Audit trail of boundary, chain, and gate records.
    AuditTrail,
    /// Aggregated chain summary.
    ChainSummary,
}

/// Artifact record indexed by the handoff manifest.
///
/// # Invariants
/// - `hash` matches the artifact bytes at `path` at export time; verifiers
///   recompute it rather than trusting the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffArtifactRecord {
    /// Artifact kind.
    pub kind: HandoffArtifactKind,
    /// Handoff-relative path to the artifact.
    pub path: String,
    /// Content type for the artifact.
    pub content_type: String,
    /// Hash digest for the artifact content at export time.
    pub hash: HashDigest,
}

/// Hash entry for a file within the handoff bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashEntry {
    /// Handoff-relative path.
    pub path: String,
    /// Hash digest of the file contents.
    pub hash: HashDigest,
}

/// Handoff integrity metadata.
///
/// # Invariants
/// - `root_hash` is computed over the ordered `file_hashes` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffIntegrity {
    /// File hash entries for handoff artifacts.
    pub file_hashes: Vec<FileHashEntry>,
    /// Root hash computed over the file hash list.
    pub root_hash: HashDigest,
}

/// Handoff manifest indexing the enumerated artifact set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffManifest {
    /// Handoff schema version.
    pub handoff_version: HandoffVersion,
    /// Pipeline that produced the handoff.
    pub pipeline_id: PipelineId,
    /// Timestamp when the handoff was exported.
    pub exported_at: TimePair,
    /// Hash algorithm used for handoff artifacts.
    pub hash_algorithm: HashAlgorithm,
    /// Integrity metadata for the bundle.
    pub integrity: HandoffIntegrity,
    /// Artifact index entries.
    pub artifacts: Vec<HandoffArtifactRecord>,
}

// ============================================================================
// SECTION: Metadata Artifact
// ============================================================================

/// Metadata/schema artifact describing the exported context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffMetadata {
    /// Handoff schema version, repeated for standalone consumption.
    pub handoff_version: HandoffVersion,
    /// Pipeline that produced the handoff.
    pub pipeline_id: PipelineId,
    /// Contract schema version active for the run.
    pub contract_schema_version: SchemaVersion,
    /// Canonical hash of the governing contract document.
    pub contract_hash: HashDigest,
    /// Top-level context keys exported in the snapshot, sorted.
    pub context_keys: Vec<String>,
}
