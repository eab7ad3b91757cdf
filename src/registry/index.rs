//! Per-agent document index identifiers (`vector_store_ids.env`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::store::{key_for, read_key_values};
use super::{RegistryError, RegistryResult};

/// Key prefix used in `vector_store_ids.env`.
pub const DEFAULT_INDEX_PREFIX: &str = "VS_";

/// Map from agent name to the remote document index it searches.
#[derive(Debug, Clone)]
pub struct IndexRegistry {
    entries: BTreeMap<String, String>,
    prefix: String,
    source: PathBuf,
}

impl IndexRegistry {
    /// Load index ids from a `KEY=VALUE` file.
    pub fn load(path: &Path, prefix: &str) -> RegistryResult<Self> {
        Ok(Self {
            entries: read_key_values(path)?,
            prefix: prefix.to_string(),
            source: path.to_path_buf(),
        })
    }

    /// Storage key for an agent, e.g. `VS_SOPORTE`.
    pub fn key_for(&self, agent: &str) -> String {
        key_for(&self.prefix, agent)
    }

    /// Resolve the index id bound to an agent.
    pub fn index_for(&self, agent: &str) -> RegistryResult<&str> {
        let key = self.key_for(agent);
        self.entries
            .get(&key)
            .filter(|id| !id.is_empty())
            .map(String::as_str)
            .ok_or_else(|| RegistryError::MissingKey {
                key,
                path: self.source.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_index_lookup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vector_store_ids.env");
        fs::write(&path, "VS_COMERCIAL=vs_1\nVS_SOPORTE=\n").unwrap();

        let registry = IndexRegistry::load(&path, DEFAULT_INDEX_PREFIX).unwrap();
        assert_eq!(registry.index_for("comercial").unwrap(), "vs_1");
        assert_eq!(registry.key_for("documental"), "VS_DOCUMENTAL");

        // Empty values count as missing.
        assert!(matches!(
            registry.index_for("soporte"),
            Err(RegistryError::MissingKey { .. })
        ));
        assert!(registry.index_for("documental").is_err());
    }
}
