//! Configuration management.
//!
//! This module provides configuration loading through TOML files and
//! environment variable management via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use ragents::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let mut loader = ConfigurationLoader::new(Some(Path::new("config/ragents.toml"))).unwrap();
//! env.apply_overrides(&mut loader.config);
//!
//! println!("Poll timeout: {}s", loader.config.polling.timeout_secs);
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    AgentsConfig, Configuration, ConfigurationLoader, IngestConfig, LoggingConfig, PollingConfig,
    RemoteConfig,
};
pub use self::environment::{apply_overrides_with, EnvironmentLoader};
