//! Observability utilities.
//!
//! Diagnostic events go through `tracing`; this module adds a markdown
//! interaction log recording each question, its answer and citations.
//!
//! # Example
//!
//! ```no_run
//! use ragents::observability::Logger;
//!
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//! logger.log_question("comercial", "What does plan B cost?", None, false).unwrap();
//! logger.log_answer("comercial", "Plan B costs 20 EUR [0].", &["[0] prices.pdf".to_string()]).unwrap();
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::Logger;
