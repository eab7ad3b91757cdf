//! Error types for CLI operations

use thiserror::Error;

#[cfg(feature = "ingest")]
use crate::ingest::IngestError;
use crate::registry::RegistryError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur during CLI command execution
#[derive(Error, Debug)]
pub enum CliError {
    /// The requested agent is not registered
    #[error("Invalid agent '{name}'. Use: {valid}")]
    InvalidAgent {
        /// Requested name
        name: String,
        /// Valid names joined with ` | `
        valid: String,
    },

    /// Registry file could not be loaded
    #[error("Registry error: {0}")]
    RegistryError(RegistryError),

    /// Document ingestion failed
    #[cfg(feature = "ingest")]
    #[error("Upload error: {0}")]
    IngestError(#[from] IngestError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error executing a command or operation
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownAgent { name, available } => CliError::InvalidAgent {
                name,
                valid: available.replace(", ", " | "),
            },
            other => CliError::RegistryError(other),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ExecutionError(format!("{:#}", err))
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::ConfigError(_) => 2,
            CliError::RegistryError(
                RegistryError::ConfigMissing { .. } | RegistryError::MissingKey { .. },
            ) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_lists_valid_names() {
        let err: CliError = RegistryError::UnknownAgent {
            name: "ventas".to_string(),
            available: "comercial, documental, soporte".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid agent 'ventas'. Use: comercial | documental | soporte"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_anyhow_context_is_kept() {
        let err: CliError = anyhow::anyhow!("OPENAI_API_KEY is not set")
            .context("Failed to build backend")
            .into();
        assert!(err.to_string().contains("Failed to build backend: OPENAI_API_KEY is not set"));
    }
}
