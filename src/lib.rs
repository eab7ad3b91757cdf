//! ragents - drive hosted assistant runs to completion and extract cited answers
//!
//! A deployment defines a small set of named agents (`comercial`, `soporte`,
//! `documental`, ...), each bound to a remote assistant that searches its
//! own document index. ragents asks such an agent a question, drives the
//! remote run until it stops, and returns the answer text with inline `[n]`
//! citation markers plus the list of cited documents.
//!
//! The crate is split into feature-gated modules:
//!
//! - **`config`** - TOML configuration and environment overrides
//! - **`observability`** - Markdown interaction log
//! - **`registry`** - Agent and document-index registries from `KEY=VALUE` files
//! - **`remote`** - Wire types, the [`AssistantBackend`](remote::AssistantBackend) seam and its HTTP client
//! - **`orchestration`** - Polling and streaming run drivers, citation extraction, and the service facade
//! - **`ingest`** - Document upload into per-agent indexes
//! - **`cli`** - The `ragents` command-line interface
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! ragents = { version = "0.3", default-features = false, features = ["orchestration"] }
//! # Or everything, including the CLI:
//! ragents = { version = "0.3", features = ["all"] }
//! ```
//!
//! # Example: asking an agent
//!
//! ```ignore
//! use ragents::config::{ConfigurationLoader, EnvironmentLoader};
//! use ragents::service::{AgentService, AskOptions};
//! use std::path::Path;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let env = EnvironmentLoader::new(Some(Path::new(".env")));
//!     let mut loader = ConfigurationLoader::new(None)?;
//!     env.apply_overrides(&mut loader.config);
//!
//!     let service = AgentService::from_config(&loader, &env)?;
//!     let answer = service
//!         .ask("soporte", "How do I reset the router?", &AskOptions::default())
//!         .await?;
//!
//!     println!("{}", answer.text);
//!     for citation in &answer.citations {
//!         println!("- {}", citation);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Example: resolving annotations without a remote service
//!
//! ```ignore
//! use ragents::orchestration::{resolve_message, DocumentLabels};
//! use ragents::remote::{Annotation, Message};
//!
//! let message = Message::assistant_text(
//!     "Plan B costs 20 EUR【4:0†source】.",
//!     vec![Annotation::citation("【4:0†source】", "file-abc")],
//! );
//! let mut labels = DocumentLabels::new();
//! labels.insert("file-abc".to_string(), "prices.pdf".to_string());
//!
//! let answer = resolve_message(&message, &labels);
//! assert_eq!(answer.text, "Plan B costs 20 EUR[0].");
//! assert_eq!(answer.citation_lines(), vec!["[0] prices.pdf"]);
//! ```

#![warn(missing_docs)]

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Agent and index registries (enabled with the `registry` feature)
#[cfg(feature = "registry")]
pub mod registry;

/// Remote assistant service (enabled with the `remote` feature)
#[cfg(feature = "remote")]
pub mod remote;

/// Run orchestration (enabled with the `orchestration` feature)
#[cfg(feature = "orchestration")]
pub mod orchestration;

/// Caller-facing facade (enabled with the `orchestration` feature)
#[cfg(feature = "orchestration")]
pub mod service;

/// Document ingestion (enabled with the `ingest` feature)
#[cfg(feature = "ingest")]
pub mod ingest;

/// Command-line interface (enabled with the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "observability")]
    pub use crate::observability::Logger;

    #[cfg(feature = "registry")]
    pub use crate::registry::{AgentHandle, AgentRegistry, RegistryError, RegistryLayout};

    #[cfg(feature = "remote")]
    pub use crate::remote::{AssistantBackend, Lookup, Message, OpenAiBackend, Run, RunStatus};

    #[cfg(feature = "orchestration")]
    pub use crate::orchestration::{
        Answer, CitationRecord, RunDriver, RunDriverConfig, RunOutcome, StreamHandler,
        StreamingDriver,
    };

    #[cfg(feature = "orchestration")]
    pub use crate::service::{AgentService, AskOptions};

    #[cfg(feature = "ingest")]
    pub use crate::ingest::{IngestError, IngestSummary, Ingestor};
}
