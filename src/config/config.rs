//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Remote service settings.
    pub remote: RemoteConfig,
    /// Run polling settings.
    pub polling: PollingConfig,
    /// Agent registry settings.
    pub agents: AgentsConfig,
    /// Document upload settings.
    pub ingest: IngestConfig,
    /// Interaction log settings.
    pub logging: LoggingConfig,
}

/// Remote assistant service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API root
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Timeout for non-streaming requests (seconds)
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Run polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// First poll interval (seconds)
    pub interval_secs: f64,
    /// Multiplier applied to the interval after every poll
    pub backoff_factor: f64,
    /// Upper bound for the interval (seconds)
    pub max_interval_secs: f64,
    /// Give up waiting after this many seconds and report the last status
    pub timeout_secs: u64,
    /// How many recent messages to scan for the assistant reply
    pub message_page_size: u32,
    /// Append the retrieval chunk count to answers
    pub retrieval_trace: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0.8,
            backoff_factor: 1.15,
            max_interval_secs: 2.0,
            timeout_secs: 120,
            message_page_size: 10,
            retrieval_trace: true,
        }
    }
}

/// Agent registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// `KEY=VALUE` file with assistant ids
    pub registry_file: String,
    /// Key prefix, e.g. `AGENTE_`
    pub key_prefix: String,
    /// Required agent names. Empty means every prefixed key is an agent.
    pub names: Vec<String>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            registry_file: "agent_ids.env".to_string(),
            key_prefix: "AGENTE_".to_string(),
            names: vec![
                "comercial".to_string(),
                "soporte".to_string(),
                "documental".to_string(),
            ],
        }
    }
}

/// Document ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// `KEY=VALUE` file with document index ids
    pub index_file: String,
    /// Key prefix, e.g. `VS_`
    pub index_prefix: String,
    /// Accepted file extensions (with leading dot, case-insensitive)
    pub allowed_extensions: Vec<String>,
    /// Folder name to agent name
    pub folders: BTreeMap<String, String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let folders = [
            ("doc_comercial", "comercial"),
            ("doc_soporte", "soporte"),
            ("doc_documentos", "documental"),
        ]
        .into_iter()
        .map(|(folder, agent)| (folder.to_string(), agent.to_string()))
        .collect();

        Self {
            index_file: "vector_store_ids.env".to_string(),
            index_prefix: "VS_".to_string(),
            allowed_extensions: [".pdf", ".docx", ".txt", ".md", ".csv"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            folders,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Markdown interaction log. None disables the file log.
    pub log_file: Option<String>,
    /// Minimum level written to the log.
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "INFO".to_string(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// File the configuration was read from, or would be.
    pub config_path: PathBuf,
    /// Loaded configuration.
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None or missing, uses default config.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/ragents.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Configuration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from("config/ragents.toml"),
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Resolve a path from the config relative to the config file's directory.
    ///
    /// Absolute paths and paths of a default (missing) config file are
    /// returned unchanged.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() || !self.config_path.exists() {
            return path;
        }
        match self.config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
            _ => path,
        }
    }
}
