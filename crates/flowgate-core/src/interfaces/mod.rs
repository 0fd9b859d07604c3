// flowgate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Flowgate Interfaces
// Description: Backend-agnostic interfaces for clocks and handoff artifacts.
// Purpose: Define the contract surfaces used by the Flowgate runtime.
// Dependencies: crate::core, std, time
// ============================================================================

//! ## Overview
//! Interfaces define how Flowgate integrates with its host without embedding
//! backend-specific details. Implementations must be deterministic where the
//! engine's guarantees require it: artifact readers return the bytes
//! currently on disk (never cached hashes), and clocks supply both wall and
//! monotonic components so provenance stamps order correctly within a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use thiserror::Error;

use crate::core::HandoffManifest;
use crate::core::TimePair;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Clock supplying paired wall and monotonic timestamps.
pub trait Clock {
    /// Returns the current timestamp pair.
    fn now(&self) -> TimePair;
}

/// System clock backed by the OS wall clock and a process-local monotonic origin.
#[derive(Debug)]
pub struct SystemClock {
    /// Monotonic origin captured at construction.
    origin: Instant,
}

impl SystemClock {
    /// Creates a system clock with a fresh monotonic origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimePair {
        let wall_ms =
            i64::try_from(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000)
                .unwrap_or(i64::MAX);
        let monotonic = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        TimePair::new(wall_ms, monotonic)
    }
}

// ============================================================================
// SECTION: Artifact Reader / Sink
// ============================================================================

/// Artifact access errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact is missing at the requested path.
    #[error("missing artifact: {0}")]
    Missing(String),
    /// Artifact reader or sink reported an I/O error.
    #[error("artifact io error at {path}: {detail}")]
    Io {
        /// Handoff-relative path.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
}

/// Artifact reader for gate verification and handoff import.
///
/// Readers must return the bytes currently stored at the path; gate checks
/// recompute checksums from these bytes and never trust stored digests.
pub trait ArtifactReader {
    /// Reads artifact bytes at a handoff-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the artifact is missing or unreadable.
    fn read(&self, path: &str) -> Result<Vec<u8>, ArtifactError>;
}

/// Artifact sink for handoff export.
pub trait ArtifactSink {
    /// Writes artifact bytes at a handoff-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when writing fails.
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), ArtifactError>;

    /// Finalizes the bundle by writing the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when writing the manifest fails.
    fn finalize(&mut self, manifest: &HandoffManifest) -> Result<(), ArtifactError>;
}
