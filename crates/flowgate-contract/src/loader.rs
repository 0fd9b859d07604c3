// flowgate-contract/src/loader.rs
// ============================================================================
// Module: Flowgate Contract Loader
// Description: Strict, fail-closed loading of declarative contract documents.
// Purpose: Parse TOML/JSON contract sources into validated, immutable documents.
// Dependencies: flowgate-core, serde_json, toml, std
// ============================================================================

//! ## Overview
//! Contract documents are loaded from a TOML or JSON source with strict size
//! limits and a closed-world schema: any unrecognized key is a schema
//! violation, never a warning. The loader pre-validates every verification
//! expression through the sandbox parser before the document is accepted, so
//! a malformed or unsafe expression is a load-time rejection rather than a
//! runtime surprise. Any error aborts the load entirely; there are no
//! partial contracts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use flowgate_core::ContractDocument;
use flowgate_core::DocumentError;
use flowgate_core::Evaluator;
use flowgate_core::SchemaVersion;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum contract source size in bytes.
pub const MAX_CONTRACT_FILE_SIZE: usize = 1024 * 1024;
/// Contract schema versions accepted as-is.
pub const SUPPORTED_SCHEMA_VERSIONS: [&str; 1] = ["1"];
/// Legacy schema version upgraded in memory on load.
pub const LEGACY_SCHEMA_VERSION: &str = "0";

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Supported contract source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// JSON contract source.
    Json,
    /// TOML contract source.
    Toml,
}

impl ContractFormat {
    /// Detects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ContractError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Contract loading errors. All variants abort the load entirely.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Source file could not be read.
    #[error("failed to read contract source {path}: {detail}")]
    Io {
        /// Source path.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// Source exceeds the maximum size.
    #[error("contract source is {size} bytes, exceeding the {max} byte limit")]
    TooLarge {
        /// Actual source size in bytes.
        size: usize,
        /// Maximum permitted size in bytes.
        max: usize,
    },
    /// Source file extension is not a supported format.
    #[error("unsupported contract format: {0}")]
    UnsupportedFormat(String),
    /// Source is empty.
    #[error("contract source is empty")]
    Empty,
    /// Source failed to parse as its declared format.
    #[error("contract source failed to parse: {0}")]
    Parse(String),
    /// Source violates the closed-world schema (unknown key, wrong shape).
    #[error("contract schema violation: {0}")]
    SchemaViolation(String),
    /// Schema version is neither supported nor migratable.
    #[error("unsupported contract schema version: {0}")]
    UnsupportedVersion(String),
    /// A verification expression failed sandbox pre-validation.
    #[error("unsafe verification expression on chain {chain}: {detail}")]
    UnsafeExpression {
        /// Chain declaring the expression.
        chain: String,
        /// Rejection detail from the sandbox parser.
        detail: String,
    },
    /// Document-level invariant validation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a contract document from a file path.
///
/// # Errors
///
/// Returns [`ContractError`] when reading, parsing, or validation fails.
pub fn load_from_path(path: &Path) -> Result<ContractDocument, ContractError> {
    let format = ContractFormat::from_path(path)?;
    let source = fs::read_to_string(path).map_err(|err| ContractError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    load_from_str(&source, format)
}

/// Loads and validates a contract document from a source string.
///
/// # Errors
///
/// Returns [`ContractError`] when parsing or validation fails.
pub fn load_from_str(
    source: &str,
    format: ContractFormat,
) -> Result<ContractDocument, ContractError> {
    if source.len() > MAX_CONTRACT_FILE_SIZE {
        return Err(ContractError::TooLarge {
            size: source.len(),
            max: MAX_CONTRACT_FILE_SIZE,
        });
    }
    if source.trim().is_empty() {
        return Err(ContractError::Empty);
    }

    let mut document = deserialize_document(source, format)?;
    check_schema_version(&mut document)?;
    document.validate()?;
    prevalidate_expressions(&document)?;

    tracing::debug!(
        pipeline = %document.pipeline_id,
        phases = document.phases.len(),
        chains = document.chains.len(),
        "contract loaded"
    );
    Ok(document)
}

/// Deserializes the source, separating syntax errors from schema violations.
fn deserialize_document(
    source: &str,
    format: ContractFormat,
) -> Result<ContractDocument, ContractError> {
    match format {
        ContractFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(source)
                .map_err(|err| ContractError::Parse(err.to_string()))?;
            serde_json::from_value(value)
                .map_err(|err| ContractError::SchemaViolation(err.to_string()))
        }
        ContractFormat::Toml => {
            // Syntax pass first so malformed TOML is a parse error, not a
            // schema violation.
            let _syntax: toml::Value =
                toml::from_str(source).map_err(|err| ContractError::Parse(err.to_string()))?;
            toml::from_str(source)
                .map_err(|err| ContractError::SchemaViolation(err.to_string()))
        }
    }
}

/// Gates the schema version, upgrading the legacy version in memory.
fn check_schema_version(document: &mut ContractDocument) -> Result<(), ContractError> {
    let version = document.schema_version.as_str();
    if SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
        return Ok(());
    }
    if version == LEGACY_SCHEMA_VERSION {
        tracing::warn!(
            pipeline = %document.pipeline_id,
            from = LEGACY_SCHEMA_VERSION,
            "migrating legacy contract schema version in memory"
        );
        document.schema_version = SchemaVersion::new(SUPPORTED_SCHEMA_VERSIONS[0]);
        return Ok(());
    }
    Err(ContractError::UnsupportedVersion(version.to_string()))
}

/// Pre-validates every verification expression through the sandbox parser.
fn prevalidate_expressions(document: &ContractDocument) -> Result<(), ContractError> {
    let evaluator = Evaluator::default();
    for chain in &document.chains {
        if let Some(expression) = &chain.verification
            && let Err(err) = evaluator.pre_validate(expression)
        {
            return Err(ContractError::UnsafeExpression {
                chain: chain.chain_id.to_string(),
                detail: err.to_string(),
            });
        }
    }
    Ok(())
}
