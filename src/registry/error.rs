//! Error types for the agent and index registries.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or querying a registry.
///
/// These are the only failures that cross the core boundary: everything
/// that happens after an agent handle is resolved degrades to a value.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The key/value file could not be read.
    #[error("Registry file not found or unreadable: {path}")]
    ConfigMissing {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A key required by the registry layout is absent.
    #[error("Missing required key '{key}' in {path}")]
    MissingKey {
        /// The absent key.
        key: String,
        /// File that was searched.
        path: PathBuf,
    },

    /// The requested agent name is not registered.
    #[error("unknown agent '{name}' (available: {available})")]
    UnknownAgent {
        /// Name that was requested.
        name: String,
        /// Comma-separated list of valid names.
        available: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
