//! Run orchestration and citation extraction.
//!
//! This module turns a question for a named agent into an [`Answer`]:
//! - [`RunDriver`] starts a run and polls it with backoff ([`PollSchedule`])
//!   until it stops or the local timeout elapses
//! - [`StreamingDriver`] starts the run with an event stream and reports
//!   progress to a [`StreamHandler`]
//! - [`resolve_message`] replaces annotation spans with `[n]` markers and
//!   collects the citation list; both drivers share it
//! - [`RetrievalTrace`] counts the retrieval chunks a run used
//!
//! Remote failures never escape this module. Every path ends in an
//! [`Answer`], possibly carrying an `[INFO]` or `[ERROR]` placeholder text.

pub mod backoff;
pub mod citations;
pub mod driver;
pub mod outcome;
pub mod streaming;
pub mod trace;

// Re-export main types
pub use backoff::{PollIntervals, PollSchedule};
pub use citations::{resolve_message, resolve_text, AnnotationError, CitationResolver, DocumentLabels};
pub use driver::{seed_messages, PollReport, RunDriver, RunDriverConfig};
pub use outcome::{
    Answer, CitationRecord, RunOutcome, ACTION_REQUIRED_TEXT, NO_RESPONSE_TEXT,
    NO_TEXT_PLACEHOLDER,
};
pub use streaming::{ConsoleHandler, StreamHandler, StreamingDriver};
pub use trace::{collect_chunks, RetrievalTrace};
