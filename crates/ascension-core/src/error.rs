//! Core error types for ascension-core.
//!
//! Ledger operations are total for any user id: missing users are healed and
//! unreadable documents load as empty. What remains are failures to write the
//! document back, configuration I/O, and caller-supplied values that make no
//! sense for the ledger.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ascension-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document store errors.
///
/// Reads never fail (see [`crate::storage::DocumentStore::load`]), so every
/// variant here describes the write path.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to write or rename the document file
    #[error("Failed to write document to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to take the advisory lock guarding the document
    #[error("Failed to lock document at {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be serialized
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// In-process transaction guard was poisoned by a panicking writer
    #[error("Document transaction guard poisoned")]
    Poisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Unknown badge name
    #[error("Unknown badge: {0}")]
    UnknownBadge(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
