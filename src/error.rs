use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::document::DocKey;

/// Crate-wide error type.
///
/// Query misses are not errors: [`crate::DocBase::get`] and
/// [`crate::DocBase::find`] return `None` / an empty iterator instead.
/// Malformed reference entries encountered during ingestion are skipped with
/// a diagnostic rather than surfaced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DocBaseError {
    /// Raw document is missing its type tag or id, or carries one in an
    /// unusable form. Raised before any store mutation.
    #[error("Invalid document: {0}")]
    Validation(String),
    /// Type tag has no registered [`crate::TypeConfig`].
    #[error("No configuration registered for type: {0}")]
    UnknownType(String),
    /// Canonical id already present in the store. Carries the id and the key
    /// of the previously stored document.
    #[error("Duplicate document for id '{id}'")]
    Duplicate { id: String, existing: DocKey },
    #[error("File system error: {0}")]
    Io(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for DocBaseError {
    fn from(src: io::Error) -> DocBaseError {
        DocBaseError::Io(format!("IOError: {src}"))
    }
}

impl From<JsonError> for DocBaseError {
    fn from(src: JsonError) -> DocBaseError {
        DocBaseError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for DocBaseError {
    fn from(src: toml::de::Error) -> DocBaseError {
        DocBaseError::Serialization(format!("Toml deserialization error: {src}"))
    }
}
