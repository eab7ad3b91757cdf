//! Error types for document ingestion.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::registry::RegistryError;

/// Why a single document could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File extension not in the allow-list.
    #[error("unsupported file type '{extension}' for {path} (allowed: {allowed})")]
    UnsupportedExtension {
        /// Rejected file.
        path: PathBuf,
        /// Its extension, lowercased with the leading dot.
        extension: String,
        /// Allowed extensions, comma separated.
        allowed: String,
    },

    /// The agent has no document index configured.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The local file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The remote service rejected the upload or the attach call.
    #[error("{stage} failed for {filename}: {reason}")]
    Remote {
        /// `upload` or `attach`.
        stage: &'static str,
        /// Name of the document.
        filename: String,
        /// Error reported by the backend.
        reason: String,
    },
}

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;
