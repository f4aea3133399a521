//! Error types for the job-tracker library.
//!
//! This module provides custom error types using `thiserror` so that callers can
//! tell a rejected input apart from a storage fault.

use thiserror::Error;

use crate::models::EntityKind;

/// Errors that can occur in the job-tracker library.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A required field is missing or a value is malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An entity with this id already exists in its collection
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Collection the id collided in
        kind: EntityKind,
        /// The colliding id
        id: String,
    },

    /// Another company already uses this name (compared case-insensitively)
    #[error("Company already exists: {0}")]
    DuplicateCompany(String),

    /// No entity with this id exists in its collection
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Collection that was searched
        kind: EntityKind,
        /// The missing id
        id: String,
    },

    /// The document offered for import does not have the export shape
    #[error("Invalid import document: {0}")]
    InvalidImport(String),

    /// The persistence transport failed to read or write a slot
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with `TrackerError`
pub type Result<T> = std::result::Result<T, TrackerError>;

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<sled::Error> for TrackerError {
    fn from(err: sled::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_kind() {
        let err = TrackerError::NotFound {
            kind: EntityKind::Job,
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "job not found: 42");
    }

    #[test]
    fn test_anyhow_conversion_keeps_message() {
        let err: TrackerError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TrackerError::Other(ref m) if m == "boom"));
    }
}
