// flowgate-core/src/core/identifiers.rs
// ============================================================================
// Module: Flowgate Identifiers
// Description: Canonical opaque identifiers for contracts, phases, chains, and gates.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Flowgate. Identifiers are opaque and serialize as strings. Validation is
//! handled at document or runtime boundaries rather than within these simple
//! wrappers, with one exception: [`FieldPath`] understands dot-path structure
//! because boundary and chain validation navigate context values by segment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro Expansion
// ============================================================================

/// Declares an opaque string identifier newtype with the standard surface.
macro_rules! string_identifier {
    ($(#[doc = $doc:expr] $name:ident),+ $(,)?) => {
        $(
            #[doc = $doc]
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                /// Creates a new identifier.
                #[must_use]
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                /// Returns the identifier as a string slice.
                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self::new(value)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self::new(value)
                }
            }
        )+
    };
}

string_identifier! {
    #[doc = "Pipeline identifier naming the pipeline a contract governs."]
    PipelineId,
    #[doc = "Phase identifier for one discrete execution stage."]
    PhaseId,
    #[doc = "Propagation chain identifier."]
    ChainId,
    #[doc = "Gate identifier for a handoff-boundary check bundle."]
    GateId,
    #[doc = "Contract domain identifier used for multi-domain aggregation."]
    DomainId,
    #[doc = "Gate check identifier (structural, checksum_chain, and so on)."]
    CheckId,
    #[doc = "Contract document schema version identifier."]
    SchemaVersion,
}

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// Dot-path naming a field inside the execution context.
///
/// # Invariants
/// - Serialized form is the joined dot-path (`user.scopes`).
/// - Structural validity (non-empty, no empty segments) is checked by
///   [`FieldPath::is_well_formed`]; document validation rejects malformed paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a new field path from a dot-path string.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the dot-path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the dot-separated path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns true when the path is non-empty with no empty segments.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|segment| !segment.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
