//! Integration tests for document ingestion.

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::MockBackend;
use ragents::config::IngestConfig;
use ragents::ingest::{IngestError, IngestSummary, Ingestor};
use ragents::registry::{IndexRegistry, RegistryError};
use tempfile::{tempdir, TempDir};

fn index_registry(dir: &Path) -> IndexRegistry {
    let path = dir.join("vector_store_ids.env");
    fs::write(
        &path,
        "# document indexes\nVS_COMERCIAL=vs_com\nVS_SOPORTE=vs_sup\nVS_DOCUMENTAL=\n",
    )
    .unwrap();
    IndexRegistry::load(&path, "VS_").unwrap()
}

fn ingestor(dir: &Path, backend: Arc<MockBackend>) -> Ingestor {
    Ingestor::new(backend, index_registry(dir), &IngestConfig::default())
}

fn write(root: &TempDir, relative: &str, content: &str) {
    let path = root.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_upload_folders_counts() {
    let root = tempdir().unwrap();
    write(&root, "doc_comercial/prices.pdf", "price list");
    write(&root, "doc_comercial/old/prices_copy.PDF", "price list");
    write(&root, "doc_comercial/photo.png", "not a document");
    write(&root, "doc_soporte/router.md", "reset instructions");
    write(&root, "doc_soporte/too_big.txt", "rejected upstream");
    write(&root, "doc_documentos/policy.docx", "policy");
    // doc_documentos maps to documental, whose index id is empty.

    let backend = Arc::new(MockBackend::new().failing_upload("too_big.txt"));
    let summary = ingestor(root.path(), backend.clone())
        .upload_folders(root.path())
        .await;

    assert_eq!(
        summary,
        IngestSummary {
            total: 5,
            ok: 2,
            skipped: 1,
            failed: 2,
        }
    );

    let attachments = backend.attachments.lock().unwrap();
    let indexes: Vec<&str> = attachments.iter().map(|(index, _)| index.as_str()).collect();
    assert_eq!(indexes, vec!["vs_com", "vs_sup"]);
}

#[tokio::test]
async fn test_shared_document_reaches_every_agent() {
    let root = tempdir().unwrap();
    write(&root, "doc_comercial/faq.md", "opening hours");
    write(&root, "doc_soporte/faq.md", "opening hours");

    let backend = Arc::new(MockBackend::new());
    let summary = ingestor(root.path(), backend.clone())
        .upload_folders(root.path())
        .await;

    assert_eq!(
        summary,
        IngestSummary {
            total: 2,
            ok: 2,
            skipped: 0,
            failed: 0,
        }
    );
    let attachments = backend.attachments.lock().unwrap();
    let indexes: Vec<&str> = attachments.iter().map(|(index, _)| index.as_str()).collect();
    assert_eq!(indexes, vec!["vs_com", "vs_sup"]);
}

#[tokio::test]
async fn test_failed_upload_does_not_mark_content_seen() {
    let root = tempdir().unwrap();
    write(&root, "doc_soporte/a_manual.txt", "reset steps");
    write(&root, "doc_soporte/b_manual_copy.txt", "reset steps");

    let backend = Arc::new(MockBackend::new().failing_upload("a_manual.txt"));
    let summary = ingestor(root.path(), backend.clone())
        .upload_folders(root.path())
        .await;

    assert_eq!(summary.ok, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        backend.uploads.lock().unwrap()[0],
        ("b_manual_copy.txt".to_string(), 11)
    );
}

#[tokio::test]
async fn test_missing_folders_are_skipped() {
    let root = tempdir().unwrap();
    write(&root, "doc_soporte/faq.txt", "faq");

    let backend = Arc::new(MockBackend::new());
    let summary = ingestor(root.path(), backend.clone())
        .upload_folders(root.path())
        .await;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.ok, 1);
    assert_eq!(backend.uploads.lock().unwrap()[0], ("faq.txt".to_string(), 3));
}

#[tokio::test]
async fn test_upload_one_validates_extension() {
    let root = tempdir().unwrap();
    write(&root, "notes.exe", "binary");

    let backend = Arc::new(MockBackend::new());
    let err = ingestor(root.path(), backend.clone())
        .upload_one("soporte", &root.path().join("notes.exe"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::UnsupportedExtension { ref extension, .. } if extension == ".exe"));
    assert!(backend.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_one_requires_index() {
    let root = tempdir().unwrap();
    write(&root, "policy.txt", "policy");

    let err = ingestor(root.path(), Arc::new(MockBackend::new()))
        .upload_one("documental", &root.path().join("policy.txt"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Registry(RegistryError::MissingKey { ref key, .. }) if key == "VS_DOCUMENTAL"
    ));
}

#[tokio::test]
async fn test_upload_one_success() {
    let root = tempdir().unwrap();
    write(&root, "Manual.PDF", "manual");

    let backend = Arc::new(MockBackend::new());
    let receipt = ingestor(root.path(), backend.clone())
        .upload_one("soporte", &root.path().join("Manual.PDF"))
        .await
        .unwrap();

    assert_eq!(receipt.filename, "Manual.PDF");
    assert_eq!(receipt.index_key, "VS_SOPORTE");
    assert_eq!(receipt.index_id, "vs_sup");
    assert_eq!(
        backend.attachments.lock().unwrap()[0],
        ("vs_sup".to_string(), receipt.file_id.clone())
    );
}

#[tokio::test]
async fn test_upload_one_missing_file() {
    let root = tempdir().unwrap();
    let err = ingestor(root.path(), Arc::new(MockBackend::new()))
        .upload_one("soporte", &root.path().join("ghost.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Read { .. }));
}
