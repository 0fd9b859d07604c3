// flowgate-core/src/core/context.rs
// ============================================================================
// Module: Flowgate Execution Context
// Description: Mutable key-value context threaded through pipeline phases.
// Purpose: Provide dot-path access with a guarded provenance namespace.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The execution context is the single mutable state object a pipeline run
//! threads through its phases. The engine receives exclusive, synchronous
//! access during each boundary call, may inject declared defaults, and
//! retains no reference across calls. Provenance records travel embedded in
//! a reserved root key so they can never go stale relative to the data they
//! describe; ordinary writes through [`ExecutionContext::set`] are refused
//! inside that namespace.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved root key holding embedded provenance records.
pub const PROVENANCE_NAMESPACE: &str = "__flowgate_provenance__";

/// Reserved namespace prefix used for nested-path write guards.
const PROVENANCE_NAMESPACE_PREFIX: &str = "__flowgate_provenance__.";

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Mutable key-value mapping threaded through all pipeline phases.
///
/// # Invariants
/// - Top-level keys are ordered (BTreeMap) so serialized snapshots are
///   deterministic independent of insertion order.
/// - The [`PROVENANCE_NAMESPACE`] root key is writable only through the
///   provenance tracker, never through [`ExecutionContext::set`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    /// Root entries keyed by top-level name.
    entries: BTreeMap<String, Value>,
}

impl ExecutionContext {
    /// Creates an empty execution context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at a dot-path, when present.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let mut current = self.entries.get(root)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns true when a non-null value exists at the dot-path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some_and(|value| !value.is_null())
    }

    /// Sets the value at a dot-path, creating intermediate objects as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ReservedNamespace`] for writes under the
    /// provenance namespace and [`ContextError::NotAnObject`] when an
    /// intermediate segment resolves to a non-object value.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), ContextError> {
        if path == PROVENANCE_NAMESPACE || path.starts_with(PROVENANCE_NAMESPACE_PREFIX) {
            return Err(ContextError::ReservedNamespace(path.to_string()));
        }
        self.set_unchecked(path, value)
    }

    /// Removes and returns the value at a dot-path.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parent, leaf) = path.rsplit_once('.').map_or((None, path), |(parent, leaf)| {
            (Some(parent), leaf)
        });
        match parent {
            None => self.entries.remove(leaf),
            Some(parent_path) => {
                let parent_value = self.get_mut_path(parent_path)?;
                parent_value.as_object_mut()?.remove(leaf)
            }
        }
    }

    /// Returns a serializable snapshot of the context as a JSON object.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let map: Map<String, Value> =
            self.entries.iter().map(|(key, value)| (key.clone(), value.clone())).collect();
        Value::Object(map)
    }

    /// Returns the raw provenance namespace object, when present.
    #[must_use]
    pub(crate) fn provenance_root(&self) -> Option<&Value> {
        self.entries.get(PROVENANCE_NAMESPACE)
    }

    /// Writes the provenance namespace object. Tracker use only.
    pub(crate) fn set_provenance_root(&mut self, value: Value) {
        self.entries.insert(PROVENANCE_NAMESPACE.to_string(), value);
    }

    /// Sets a dot-path without the reserved-namespace guard. Internal use.
    pub(crate) fn set_unchecked(&mut self, path: &str, value: Value) -> Result<(), ContextError> {
        let mut segments = path.split('.').peekable();
        let Some(root) = segments.next() else {
            return Err(ContextError::EmptyPath);
        };
        if root.is_empty() {
            return Err(ContextError::EmptyPath);
        }

        if segments.peek().is_none() {
            self.entries.insert(root.to_string(), value);
            return Ok(());
        }

        let mut current = self
            .entries
            .entry(root.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        loop {
            let Some(segment) = segments.next() else {
                return Err(ContextError::EmptyPath);
            };
            if segment.is_empty() {
                return Err(ContextError::EmptyPath);
            }
            let object = match current {
                Value::Object(object) => object,
                _ => return Err(ContextError::NotAnObject(path.to_string())),
            };
            if segments.peek().is_none() {
                object.insert(segment.to_string(), value);
                return Ok(());
            }
            current = object
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    /// Returns a mutable reference to the value at a dot-path.
    fn get_mut_path(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let mut current = self.entries.get_mut(root)?;
        for segment in segments {
            current = match current {
                Value::Object(object) => object.get_mut(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Execution context mutation errors.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Write attempted inside the reserved provenance namespace.
    #[error("reserved provenance namespace is not writable: {0}")]
    ReservedNamespace(String),
    /// Dot-path contained an empty segment.
    #[error("dot-path must not contain empty segments")]
    EmptyPath,
    /// An intermediate path segment resolved to a non-object value.
    #[error("intermediate segment is not an object on path: {0}")]
    NotAnObject(String),
}
