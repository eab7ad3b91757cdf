//! Flat `KEY=VALUE` file parsing shared by the registries.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{RegistryError, RegistryResult};

/// Parse `KEY=VALUE` lines.
///
/// Lines are trimmed; blank lines, `#` comments and lines without `=` are
/// skipped. The first `=` is the delimiter, so values may contain `=`.
/// A later duplicate key overrides an earlier one.
pub fn parse_key_values(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }

    entries
}

/// Read and parse a key/value file.
pub fn read_key_values(path: &Path) -> RegistryResult<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|source| RegistryError::ConfigMissing {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_key_values(&content))
}

/// Build the storage key for an agent name, e.g. `AGENTE_` + `comercial`
/// becomes `AGENTE_COMERCIAL`.
pub fn key_for(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name.to_uppercase())
}
