//! Environment variable loading and management.
//!
//! Secrets (the API key) only ever come from the environment. The poll
//! tuning knobs can be overridden from the environment as well, on top of
//! whatever the TOML configuration says.

use std::env;
use std::path::Path;

use super::config::Configuration;

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Only loaded when given explicitly.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only load a .env file if an explicit path was provided. This avoids
        // picking up repository or system .env files during unit tests which
        // expect default values.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    eprintln!("Warning: Failed to load .env file: {}", e);
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file this loader was created with.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// API key read from `var` (normally `OPENAI_API_KEY`).
    pub fn api_key(&self, var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Base URL override from `OPENAI_BASE_URL`.
    pub fn base_url(&self) -> Option<String> {
        env::var("OPENAI_BASE_URL").ok().filter(|v| !v.trim().is_empty())
    }

    /// Apply `OPENAI_BASE_URL`, `POLL_INTERVAL`, `POLL_TIMEOUT_S` and
    /// `BACKOFF_FACTOR` overrides from the process environment.
    pub fn apply_overrides(&self, config: &mut Configuration) {
        apply_overrides_with(config, |key| env::var(key).ok());
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Apply overrides from an arbitrary variable source.
pub fn apply_overrides_with<F>(config: &mut Configuration, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.remote.base_url = url;
    }
    if let Some(v) = parse_var::<f64, _>(&lookup, "POLL_INTERVAL") {
        config.polling.interval_secs = v;
    }
    if let Some(v) = parse_var::<u64, _>(&lookup, "POLL_TIMEOUT_S") {
        config.polling.timeout_secs = v;
    }
    if let Some(v) = parse_var::<f64, _>(&lookup, "BACKOFF_FACTOR") {
        config.polling.backoff_factor = v;
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("Warning: Ignoring invalid {}={}", key, raw);
            None
        }
    }
}
