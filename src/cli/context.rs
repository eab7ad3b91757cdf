//! Shared state for CLI commands: configuration, environment, logging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::observability::Logger;
use crate::registry::AgentRegistry;
use crate::remote::AssistantBackend;
use crate::service;

const LOCAL_CONFIG: &str = "config/ragents.toml";

/// Everything a command needs before it talks to the remote service.
pub struct CommandContext {
    /// Loaded configuration, with environment overrides applied.
    pub loader: ConfigurationLoader,
    /// Process environment (API key, base URL).
    pub env: EnvironmentLoader,
    agents_file: Option<PathBuf>,
}

impl CommandContext {
    /// Load configuration and environment for `cli`.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let env = EnvironmentLoader::new(cli.env_file.as_deref());
        let config_path = cli.config.clone().or_else(default_config_path);
        let mut loader = ConfigurationLoader::new(config_path.as_deref())
            .map_err(|e| CliError::ConfigError(format!("{:#}", e)))?;
        env.apply_overrides(&mut loader.config);

        Ok(Self {
            loader,
            env,
            agents_file: cli.agents_file.clone(),
        })
    }

    /// Agent registry from the configured (or overridden) file.
    pub fn registry(&self) -> CliResult<AgentRegistry> {
        Ok(service::load_registry(
            &self.loader,
            self.agents_file.as_deref(),
        )?)
    }

    /// HTTP backend, requiring the API key.
    pub fn backend(&self) -> CliResult<Arc<dyn AssistantBackend>> {
        service::build_backend(&self.loader, &self.env)
            .map_err(|e| CliError::ConfigError(format!("{:#}", e)))
    }

    /// Interaction logger, if a log file is requested on the command line
    /// or in the configuration.
    pub fn logger(&self, log_file: Option<&Path>) -> Option<Logger> {
        let logging = &self.loader.config.logging;
        let path = match log_file {
            Some(path) => path.to_path_buf(),
            None => self.loader.resolve_path(logging.log_file.as_deref()?),
        };
        match Logger::new(Some(&path), Some(&logging.log_level)) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!(error = %e, "interaction log disabled");
                None
            }
        }
    }
}

/// `config/ragents.toml` when present, else the per-user config file.
fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("ragents").join("config.toml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryError;
    use clap::Parser;
    use tempfile::tempdir;

    fn context(agents_file: &Path) -> CommandContext {
        let dir = agents_file.parent().unwrap_or(Path::new("."));
        let cli = Cli::parse_from([
            "ragents".to_string(),
            "--config".to_string(),
            dir.join("absent.toml").display().to_string(),
            "--agents-file".to_string(),
            agents_file.display().to_string(),
            "agents".to_string(),
        ]);
        CommandContext::from_cli(&cli).unwrap()
    }

    #[test]
    fn test_missing_registry_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let err = context(&dir.path().join("agent_ids.env"))
            .registry()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CliError::RegistryError(RegistryError::ConfigMissing { .. })
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_incomplete_registry_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent_ids.env");
        std::fs::write(&path, "AGENTE_COMERCIAL=asst_com\n").unwrap();

        let err = context(&path).registry().err().unwrap();
        assert!(err.to_string().contains("AGENTE_SOPORTE"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_registry_loads_configured_agents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent_ids.env");
        std::fs::write(
            &path,
            "AGENTE_COMERCIAL=asst_com\nAGENTE_SOPORTE=asst_sup\nAGENTE_DOCUMENTAL=asst_doc\n",
        )
        .unwrap();

        let registry = context(&path).registry().unwrap();
        assert_eq!(registry.names(), vec!["comercial", "documental", "soporte"]);
    }
}
