//! Upload documents into the per-agent document indexes.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::error::{IngestError, IngestResult};
use crate::config::IngestConfig;
use crate::registry::IndexRegistry;
use crate::remote::AssistantBackend;

/// Record of one uploaded and attached document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Agent whose index received the document.
    pub agent: String,
    /// File name sent to the remote store.
    pub filename: String,
    /// Registry key of the index, e.g. `VS_SOPORTE`.
    pub index_key: String,
    /// Remote index id.
    pub index_id: String,
    /// Remote id of the uploaded file.
    pub file_id: String,
}

/// Counts from a bulk upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Files found with an allowed extension.
    pub total: usize,
    /// Uploaded and attached.
    pub ok: usize,
    /// Byte-identical duplicates of a file already uploaded to the same
    /// agent in this pass.
    pub skipped: usize,
    /// Unreadable, rejected or failed remotely.
    pub failed: usize,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | OK: {} | Skipped (duplicates): {} | Failed: {}",
            self.total, self.ok, self.skipped, self.failed
        )
    }
}

/// Uploads files and attaches them to the index of their agent.
pub struct Ingestor {
    backend: Arc<dyn AssistantBackend>,
    indexes: IndexRegistry,
    allowed_extensions: Vec<String>,
    folders: BTreeMap<String, String>,
}

impl Ingestor {
    /// Create an ingestor with the extension allow-list and folder map
    /// from `config`.
    pub fn new(backend: Arc<dyn AssistantBackend>, indexes: IndexRegistry, config: &IngestConfig) -> Self {
        Self {
            backend,
            indexes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            folders: config.folders.clone(),
        }
    }

    /// Whether `path` has an allowed extension (case-insensitive).
    pub fn is_allowed(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Upload one file for `agent`.
    pub async fn upload_one(&self, agent: &str, path: &Path) -> IngestResult<UploadReceipt> {
        if !self.is_allowed(path) {
            return Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension: extension_of(path).unwrap_or_default(),
                allowed: self.allowed_extensions.join(", "),
            });
        }
        // Fail on a missing index before reading the file.
        self.indexes.index_for(agent)?;

        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.upload_bytes(agent, &file_name(path), bytes).await
    }

    /// Upload in-memory document bytes for `agent`.
    pub async fn upload_bytes(
        &self,
        agent: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> IngestResult<UploadReceipt> {
        let index_id = self.indexes.index_for(agent)?.to_string();

        let file = self
            .backend
            .upload_file(filename, bytes)
            .await
            .map_err(|e| IngestError::Remote {
                stage: "upload",
                filename: filename.to_string(),
                reason: format!("{:#}", e),
            })?;

        self.backend
            .attach_file_to_index(&index_id, &file.id)
            .await
            .map_err(|e| IngestError::Remote {
                stage: "attach",
                filename: filename.to_string(),
                reason: format!("{:#}", e),
            })?;

        let receipt = UploadReceipt {
            agent: agent.to_string(),
            filename: filename.to_string(),
            index_key: self.indexes.key_for(agent),
            index_id,
            file_id: file.id,
        };
        info!(
            agent = %receipt.agent,
            file = %receipt.filename,
            index = %receipt.index_key,
            "document uploaded"
        );
        Ok(receipt)
    }

    /// Walk every mapped folder under `root` and upload what it holds.
    ///
    /// Missing folders are skipped with a warning. Per-file failures are
    /// counted and never abort the pass. Content already uploaded to the
    /// same agent during this pass is skipped; a failed upload does not
    /// count as seen.
    pub async fn upload_folders(&self, root: &Path) -> IngestSummary {
        let mut summary = IngestSummary::default();
        let mut uploaded: HashSet<(&str, [u8; 32])> = HashSet::new();

        for (folder, agent) in &self.folders {
            let dir = root.join(folder);
            if !dir.is_dir() {
                warn!(folder = %dir.display(), "folder not found, skipping");
                continue;
            }
            info!(folder = %folder, agent = %agent, "uploading folder");

            for path in collect_files(&dir) {
                if !self.is_allowed(&path) {
                    continue;
                }
                summary.total += 1;

                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "could not read file");
                        summary.failed += 1;
                        continue;
                    }
                };

                let digest: [u8; 32] = Sha256::digest(&bytes).into();
                let key = (agent.as_str(), digest);
                if uploaded.contains(&key) {
                    info!(file = %path.display(), agent = %agent, "duplicate content, skipping");
                    summary.skipped += 1;
                    continue;
                }

                match self.upload_bytes(agent, &file_name(&path), bytes).await {
                    Ok(_) => {
                        uploaded.insert(key);
                        summary.ok += 1;
                    }
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "upload failed");
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }
}

/// Files under `dir`, recursively, in sorted order. Unreadable
/// directories are skipped.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %current.display(), error = %e, "could not list directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extension_helpers() {
        assert_eq!(normalize_extension("PDF"), ".pdf");
        assert_eq!(normalize_extension(" .Md "), ".md");
        assert_eq!(extension_of(Path::new("a/B.DOCX")), Some(".docx".to_string()));
        assert_eq!(extension_of(Path::new("README")), None);
        assert_eq!(file_name(Path::new("dir/manual.pdf")), "manual.pdf");
    }

    #[test]
    fn test_collect_files_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("sub/a.txt"), "a").unwrap();
        fs::write(dir.path().join("sub/deeper/c.md"), "c").unwrap();

        let files = collect_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.txt", "sub/a.txt", "sub/deeper/c.md"]);
    }

    #[test]
    fn test_summary_display() {
        let summary = IngestSummary {
            total: 4,
            ok: 2,
            skipped: 1,
            failed: 1,
        };
        assert_eq!(
            summary.to_string(),
            "Total: 4 | OK: 2 | Skipped (duplicates): 1 | Failed: 1"
        );
    }
}
