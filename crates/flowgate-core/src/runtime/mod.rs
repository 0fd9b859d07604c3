// flowgate-core/src/runtime/mod.rs
// ============================================================================
// Module: Flowgate Runtime
// Description: Validators, tracker, evaluator, gate engine, and handoff runtime.
// Purpose: Provide the pure operational surface driven by the external pipeline driver.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components implement the engine's operations: boundary
//! validation, provenance stamping and verification, chain evaluation,
//! sandboxed expression evaluation, gate execution, payload validation, and
//! the versioned handoff. The engine owns no scheduling; the external driver
//! decides when and in what order these run.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod boundary;
pub mod chain;
pub mod expr;
pub mod gate;
pub mod handoff;
pub mod payload;
pub mod tracker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use boundary::BoundaryError;
pub use boundary::BoundaryValidator;
pub use chain::ChainError;
pub use chain::ChainValidator;
pub use expr::Bindings;
pub use expr::EvalError;
pub use expr::EvalLimits;
pub use expr::Evaluator;
pub use expr::DEFAULT_TIMEOUT;
pub use expr::MAX_DEPTH;
pub use expr::MAX_SOURCE_LEN;
pub use gate::DEFAULT_COMPLETENESS_THRESHOLD;
pub use gate::GateEngine;
pub use gate::GateError;
pub use handoff::FsArtifactReader;
pub use handoff::FsArtifactSink;
pub use handoff::HandoffError;
pub use handoff::MemoryArtifactStore;
pub use handoff::export_handoff;
pub use handoff::import_handoff;
pub use payload::PayloadRejection;
pub use payload::PayloadValidator;
pub use tracker::ProvenanceError;
pub use tracker::ProvenanceTracker;
pub use tracker::VerifyOutcome;
