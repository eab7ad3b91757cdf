//! Retrieval trace: which document chunks a run actually used.

use std::sync::Arc;

use crate::remote::{AssistantBackend, Lookup, RunStep, ToolCall};

/// Fetches the retrieval chunks of a finished run.
///
/// Purely diagnostic. Any failure yields zero chunks.
#[derive(Clone)]
pub struct RetrievalTrace {
    backend: Arc<dyn AssistantBackend>,
}

impl RetrievalTrace {
    /// Create a fetcher over `backend`.
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self { backend }
    }

    /// Chunk texts used by `run_id`, in step order.
    pub async fn fetch(&self, thread_id: &str, run_id: &str) -> Vec<String> {
        Lookup::attempt("retrieval trace", self.backend.list_run_steps(thread_id, run_id))
            .await
            .map(|steps| collect_chunks(&steps))
            .unwrap_or_default()
    }
}

/// Non-empty text chunks of every file search result across `steps`.
pub fn collect_chunks(steps: &[RunStep]) -> Vec<String> {
    steps
        .iter()
        .flat_map(RunStep::tool_calls)
        .filter_map(|call| match call {
            ToolCall::FileSearch { file_search, .. } => Some(file_search),
            _ => None,
        })
        .flat_map(|search| search.results.iter())
        .flat_map(|result| result.content.iter())
        .filter(|content| content.kind == "text")
        .filter_map(|content| content.text.as_ref())
        .map(|text| text.as_str())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}
