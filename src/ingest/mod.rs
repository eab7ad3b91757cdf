//! Document ingestion.
//!
//! Uploads local documents to the remote file store and attaches them to the
//! document index of the agent that should search them. Folder layout on
//! disk decides the agent (`doc_soporte/` feeds `soporte`, and so on).
//!
//! # Example
//!
//! ```ignore
//! use ragents::ingest::Ingestor;
//! use std::path::Path;
//!
//! async fn run(ingestor: &Ingestor) {
//!     let summary = ingestor.upload_folders(Path::new(".")).await;
//!     println!("{}", summary);
//! }
//! ```

pub mod error;
pub mod ingestor;

pub use error::{IngestError, IngestResult};
pub use ingestor::{collect_files, IngestSummary, Ingestor, UploadReceipt};
