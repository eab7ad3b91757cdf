//! Agent registry: short agent names mapped to remote assistant handles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::store::{key_for, read_key_values};
use super::{RegistryError, RegistryResult};

/// Agent names exposed by the reference deployment.
pub const DEFAULT_AGENT_NAMES: [&str; 3] = ["comercial", "soporte", "documental"];

/// Key prefix used in `agent_ids.env`.
pub const DEFAULT_AGENT_PREFIX: &str = "AGENTE_";

/// A named role bound to one remote assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentHandle {
    /// Short agent name (lowercase).
    pub name: String,
    /// Opaque remote assistant identifier.
    pub remote_id: String,
}

/// Describes which keys of the file define agents.
#[derive(Debug, Clone)]
pub struct RegistryLayout {
    /// Prefix prepended to the uppercased agent name.
    pub key_prefix: String,
    /// Names that must be present. When empty, every key carrying the
    /// prefix defines an agent.
    pub required: Vec<String>,
}

impl RegistryLayout {
    /// Layout that discovers every `prefix*` key instead of requiring a fixed set.
    pub fn discover(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            required: Vec::new(),
        }
    }
}

impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_AGENT_PREFIX.to_string(),
            required: DEFAULT_AGENT_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Read-only map of agent name to [`AgentHandle`], loaded once at startup.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentHandle>,
    source: PathBuf,
}

impl AgentRegistry {
    /// Load the registry from a `KEY=VALUE` file.
    ///
    /// # Errors
    /// `ConfigMissing` if the file cannot be read, `MissingKey` if a
    /// required agent key is absent.
    pub fn load(path: &Path, layout: &RegistryLayout) -> RegistryResult<Self> {
        let entries = read_key_values(path)?;
        let mut agents = BTreeMap::new();

        if layout.required.is_empty() {
            for (key, value) in &entries {
                if let Some(suffix) = key.strip_prefix(&layout.key_prefix) {
                    if suffix.is_empty() {
                        continue;
                    }
                    let name = suffix.to_lowercase();
                    agents.insert(name.clone(), AgentHandle { name, remote_id: value.clone() });
                }
            }
        } else {
            for name in &layout.required {
                let key = key_for(&layout.key_prefix, name);
                let remote_id = entries.get(&key).ok_or_else(|| RegistryError::MissingKey {
                    key: key.clone(),
                    path: path.to_path_buf(),
                })?;
                let name = name.to_lowercase();
                agents.insert(
                    name.clone(),
                    AgentHandle { name, remote_id: remote_id.clone() },
                );
            }
        }

        Ok(Self {
            agents,
            source: path.to_path_buf(),
        })
    }

    /// Build a registry from handles already in memory.
    pub fn from_handles(handles: impl IntoIterator<Item = AgentHandle>) -> Self {
        Self {
            agents: handles
                .into_iter()
                .map(|h| (h.name.to_lowercase(), h))
                .collect(),
            source: PathBuf::new(),
        }
    }

    /// Resolve an agent name (case-insensitive).
    pub fn resolve(&self, name: &str) -> RegistryResult<&AgentHandle> {
        self.agents
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| RegistryError::UnknownAgent {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Registered agent names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// File the registry was loaded from (empty for in-memory registries).
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent_ids.env");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_and_resolve_default_layout() {
        let (_dir, path) = write_file(
            "AGENTE_COMERCIAL=abc123\nAGENTE_SOPORTE=def456\nAGENTE_DOCUMENTAL=ghi789\n",
        );
        let registry = AgentRegistry::load(&path, &RegistryLayout::default()).unwrap();

        let handle = registry.resolve("comercial").unwrap();
        assert_eq!(handle.remote_id, "abc123");
        assert_eq!(handle.name, "comercial");
        assert_eq!(registry.resolve("SOPORTE").unwrap().remote_id, "def456");
        assert_eq!(registry.names(), vec!["comercial", "documental", "soporte"]);
        assert_eq!(registry.source(), path.as_path());
    }

    #[test]
    fn test_unknown_agent() {
        let (_dir, path) = write_file("AGENTE_COMERCIAL=abc123\n");
        let layout = RegistryLayout {
            key_prefix: "AGENTE_".to_string(),
            required: vec!["comercial".to_string()],
        };
        let registry = AgentRegistry::load(&path, &layout).unwrap();

        let err = registry.resolve("ventas").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAgent { .. }));
        assert!(err.to_string().contains("unknown agent"));
    }

    #[test]
    fn test_missing_required_key() {
        let (_dir, path) = write_file("AGENTE_COMERCIAL=abc123\n");
        let err = AgentRegistry::load(&path, &RegistryLayout::default()).unwrap_err();
        match err {
            RegistryError::MissingKey { key, .. } => assert_eq!(key, "AGENTE_SOPORTE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = AgentRegistry::load(
            Path::new("/definitely/not/here.env"),
            &RegistryLayout::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::ConfigMissing { .. }));
    }

    #[test]
    fn test_discover_arbitrary_agents() {
        let (_dir, path) = write_file(
            "AGENTE_LEGAL=asst_l\nAGENTE_FINANZAS=asst_f\nOTHER=ignored\nAGENTE_=empty\nmalformed\n",
        );
        let registry = AgentRegistry::load(&path, &RegistryLayout::discover("AGENTE_")).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("legal").unwrap().remote_id, "asst_l");
        assert_eq!(registry.resolve("finanzas").unwrap().remote_id, "asst_f");
    }

    #[test]
    fn test_from_handles() {
        let registry = AgentRegistry::from_handles(vec![AgentHandle {
            name: "Soporte".to_string(),
            remote_id: "asst_s".to_string(),
        }]);
        assert!(!registry.is_empty());
        assert_eq!(registry.resolve("soporte").unwrap().remote_id, "asst_s");
    }
}
