// flowgate-core/src/core/time.rs
// ============================================================================
// Module: Flowgate Time Model
// Description: Paired wall-clock and monotonic timestamps for provenance records.
// Purpose: Provide replayable time values that order stamps without trusting wall time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Provenance records carry a paired timestamp: wall-clock milliseconds for
//! human-facing audit trails and a monotonic counter for ordering stamps
//! within one run. The core engine never reads clocks directly; the
//! [`Clock`](crate::interfaces::Clock) interface supplies both values at the
//! driver seam so replays stay deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Paired wall-clock and monotonic timestamp.
///
/// # Invariants
/// - `wall_ms` is Unix epoch milliseconds as reported by the supplying clock.
/// - `monotonic` only orders events recorded by the same clock instance;
///   values from different runs are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePair {
    /// Unix epoch milliseconds at record time.
    pub wall_ms: i64,
    /// Monotonic milliseconds since the supplying clock's origin.
    pub monotonic: u64,
}

impl TimePair {
    /// Creates a new timestamp pair.
    #[must_use]
    pub const fn new(wall_ms: i64, monotonic: u64) -> Self {
        Self {
            wall_ms,
            monotonic,
        }
    }
}
