// flowgate-core/src/runtime/handoff.rs
// ============================================================================
// Module: Flowgate Handoff Runtime
// Description: Versioned export and import of the cross-process handoff bundle.
// Purpose: Serialize the context and companion artifacts with canonical hashing.
// Dependencies: crate::{core, interfaces}, serde_jcs, std
// ============================================================================

//! ## Overview
//! Export writes the enumerated artifact set (context snapshot, metadata,
//! audit trail, chain summary) as canonical JSON bytes plus a manifest with
//! per-file hashes and a root hash. Import verifies the handoff version tag
//! first, so version skew between the two pipeline halves is a typed error,
//! then deserializes the context. Import performs no checksum validation;
//! that is the gate engine's job at the same boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::AUDIT_TRAIL_PATH;
use crate::core::AuditTrail;
use crate::core::CHAIN_SUMMARY_PATH;
use crate::core::CONTEXT_SNAPSHOT_PATH;
use crate::core::CURRENT_HANDOFF_VERSION;
use crate::core::ChainSummary;
use crate::core::ContractDocument;
use crate::core::ExecutionContext;
use crate::core::FileHashEntry;
use crate::core::HandoffArtifactKind;
use crate::core::HandoffArtifactRecord;
use crate::core::HandoffIntegrity;
use crate::core::HandoffManifest;
use crate::core::HandoffMetadata;
use crate::core::HandoffVersion;
use crate::core::MANIFEST_PATH;
use crate::core::METADATA_PATH;
use crate::core::TimePair;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::hash_bytes;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::ArtifactError;
use crate::interfaces::ArtifactReader;
use crate::interfaces::ArtifactSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Handoff export and import errors.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Handoff version tag differs from the supported set.
    #[error("handoff version mismatch: produced {found}, supported {supported}")]
    VersionMismatch {
        /// Version found in the bundle.
        found: String,
        /// Version supported by this half.
        supported: String,
    },
    /// A required artifact is missing from the bundle.
    #[error("missing required handoff artifact: {0}")]
    MissingArtifact(String),
    /// Canonical serialization or deserialization failed.
    #[error("handoff serialization error: {0}")]
    Serialization(String),
    /// Artifact access failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

// ============================================================================
// SECTION: Export
// ============================================================================

/// Exports the handoff bundle through the provided sink.
///
/// Artifacts are serialized as RFC 8785 canonical JSON so logically identical
/// exports are byte-identical regardless of key order in the host maps.
///
/// # Errors
///
/// Returns [`HandoffError`] when serialization or writing fails.
pub fn export_handoff<S: ArtifactSink>(
    sink: &mut S,
    context: &ExecutionContext,
    contract: &ContractDocument,
    audit: &AuditTrail,
    chains: &ChainSummary,
    exported_at: TimePair,
) -> Result<HandoffManifest, HandoffError> {
    let contract_hash = contract
        .canonical_hash()
        .map_err(|err| HandoffError::Serialization(err.to_string()))?;
    let metadata = HandoffMetadata {
        handoff_version: HandoffVersion::current(),
        pipeline_id: contract.pipeline_id.clone(),
        contract_schema_version: contract.schema_version.clone(),
        contract_hash,
        context_keys: context_keys(context),
    };

    let mut artifacts = Vec::new();
    let mut file_hashes = Vec::new();

    write_artifact(
        sink,
        context,
        CONTEXT_SNAPSHOT_PATH,
        HandoffArtifactKind::ContextSnapshot,
        &mut artifacts,
        &mut file_hashes,
    )?;
    write_artifact(
        sink,
        &metadata,
        METADATA_PATH,
        HandoffArtifactKind::Metadata,
        &mut artifacts,
        &mut file_hashes,
    )?;
    write_artifact(
        sink,
        audit,
        AUDIT_TRAIL_PATH,
        HandoffArtifactKind::AuditTrail,
        &mut artifacts,
        &mut file_hashes,
    )?;
    write_artifact(
        sink,
        chains,
        CHAIN_SUMMARY_PATH,
        HandoffArtifactKind::ChainSummary,
        &mut artifacts,
        &mut file_hashes,
    )?;

    let root_hash = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &file_hashes)
        .map_err(|err| HandoffError::Serialization(err.to_string()))?;
    let manifest = HandoffManifest {
        handoff_version: HandoffVersion::current(),
        pipeline_id: contract.pipeline_id.clone(),
        exported_at,
        hash_algorithm: DEFAULT_HASH_ALGORITHM,
        integrity: HandoffIntegrity {
            file_hashes,
            root_hash,
        },
        artifacts,
    };
    sink.finalize(&manifest)?;

    tracing::info!(pipeline = %manifest.pipeline_id, artifacts = manifest.artifacts.len(), "handoff exported");
    Ok(manifest)
}

/// Writes one artifact as canonical JSON and records its hashes.
fn write_artifact<S: ArtifactSink, T: serde::Serialize>(
    sink: &mut S,
    value: &T,
    path: &str,
    kind: HandoffArtifactKind,
    artifacts: &mut Vec<HandoffArtifactRecord>,
    file_hashes: &mut Vec<FileHashEntry>,
) -> Result<(), HandoffError> {
    let bytes =
        serde_jcs::to_vec(value).map_err(|err| HandoffError::Serialization(err.to_string()))?;
    let hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
    sink.write(path, &bytes)?;
    artifacts.push(HandoffArtifactRecord {
        kind,
        path: path.to_string(),
        content_type: "application/json".to_string(),
        hash: hash.clone(),
    });
    file_hashes.push(FileHashEntry {
        path: path.to_string(),
        hash,
    });
    Ok(())
}

/// Returns the sorted top-level context keys for the metadata artifact.
fn context_keys(context: &ExecutionContext) -> Vec<String> {
    context
        .snapshot()
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Import
// ============================================================================

/// Imports the handoff bundle from a reader.
///
/// The version tag is checked before anything else; checksum verification is
/// deliberately left to the gate engine.
///
/// # Errors
///
/// Returns [`HandoffError`] on version skew, missing artifacts, or
/// deserialization failures.
pub fn import_handoff<R: ArtifactReader>(
    reader: &R,
) -> Result<(ExecutionContext, HandoffManifest), HandoffError> {
    let manifest_bytes = reader
        .read(MANIFEST_PATH)
        .map_err(|_| HandoffError::MissingArtifact(MANIFEST_PATH.to_string()))?;
    let manifest: HandoffManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|err| HandoffError::Serialization(err.to_string()))?;

    if manifest.handoff_version.0 != CURRENT_HANDOFF_VERSION {
        return Err(HandoffError::VersionMismatch {
            found: manifest.handoff_version.0.clone(),
            supported: CURRENT_HANDOFF_VERSION.to_string(),
        });
    }

    let snapshot_bytes = reader
        .read(CONTEXT_SNAPSHOT_PATH)
        .map_err(|_| HandoffError::MissingArtifact(CONTEXT_SNAPSHOT_PATH.to_string()))?;
    let context: ExecutionContext = serde_json::from_slice(&snapshot_bytes)
        .map_err(|err| HandoffError::Serialization(err.to_string()))?;

    tracing::info!(pipeline = %manifest.pipeline_id, "handoff imported");
    Ok((context, manifest))
}

// ============================================================================
// SECTION: Filesystem Backend
// ============================================================================

/// Artifact sink writing a handoff bundle under a directory root.
#[derive(Debug)]
pub struct FsArtifactSink {
    /// Bundle root directory.
    root: PathBuf,
}

impl FsArtifactSink {
    /// Creates a sink rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl ArtifactSink for FsArtifactSink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|err| ArtifactError::Io {
                path: path.to_string(),
                detail: err.to_string(),
            })?;
        }
        fs::write(&full, bytes).map_err(|err| ArtifactError::Io {
            path: path.to_string(),
            detail: err.to_string(),
        })
    }

    fn finalize(&mut self, manifest: &HandoffManifest) -> Result<(), ArtifactError> {
        let bytes = serde_jcs::to_vec(manifest).map_err(|err| ArtifactError::Io {
            path: MANIFEST_PATH.to_string(),
            detail: err.to_string(),
        })?;
        self.write(MANIFEST_PATH, &bytes)
    }
}

/// Artifact reader over a handoff bundle directory.
///
/// Reads return the bytes currently on disk; gate checks recompute checksums
/// from these bytes at verification time.
#[derive(Debug)]
pub struct FsArtifactReader {
    /// Bundle root directory.
    root: PathBuf,
}

impl FsArtifactReader {
    /// Creates a reader rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the bundle root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactReader for FsArtifactReader {
    fn read(&self, path: &str) -> Result<Vec<u8>, ArtifactError> {
        let full = self.root.join(path);
        if !full.is_file() {
            return Err(ArtifactError::Missing(path.to_string()));
        }
        fs::read(&full).map_err(|err| ArtifactError::Io {
            path: path.to_string(),
            detail: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// In-memory artifact store for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactStore {
    /// Artifact bytes keyed by handoff-relative path.
    entries: std::collections::BTreeMap<String, Vec<u8>>,
}

impl MemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts artifact bytes at a path, replacing any existing entry.
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(path.into(), bytes);
    }

    /// Removes the artifact at a path.
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }
}

impl ArtifactSink for MemoryArtifactStore {
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        self.entries.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn finalize(&mut self, manifest: &HandoffManifest) -> Result<(), ArtifactError> {
        let bytes = serde_jcs::to_vec(manifest).map_err(|err| ArtifactError::Io {
            path: MANIFEST_PATH.to_string(),
            detail: err.to_string(),
        })?;
        self.entries.insert(MANIFEST_PATH.to_string(), bytes);
        Ok(())
    }
}

impl ArtifactReader for MemoryArtifactStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, ArtifactError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| ArtifactError::Missing(path.to_string()))
    }
}
