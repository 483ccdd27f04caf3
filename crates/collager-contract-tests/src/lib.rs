//! Loaders for the frozen JSON contracts under `contracts/`.

use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

/// Returns the workspace `contracts/` directory.
pub fn contracts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../contracts")
}

/// Reads and parses one JSON document.
///
/// # Errors
/// Returns [`ContractError`] when the file is unreadable or not JSON.
pub fn load_json(path: &Path) -> Result<Value, ContractError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContractError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Compiles the schema stored at `contracts/<name>`.
///
/// # Errors
/// Returns [`ContractError`] when the schema cannot be loaded or compiled.
pub fn compile_validator(name: &str) -> Result<JSONSchema, ContractError> {
    let schema = load_json(&contracts_dir().join(name))?;
    JSONSchema::compile(&schema).map_err(|error| ContractError::Schema(error.to_string()))
}

/// Collects every validation message for `instance`.
pub fn violations(validator: &JSONSchema, instance: &Value) -> Vec<String> {
    match validator.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|error| format!("{}: {error}", error.instance_path))
            .collect(),
    }
}

/// Contract loading error type.
#[derive(Debug, Error)]
pub enum ContractError {
    /// File could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// File is not valid JSON.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Schema failed to compile.
    #[error("invalid schema: {0}")]
    Schema(String),
}
