//! The seam between the orchestration engine and the hosted service.

use std::pin::Pin;

use anyhow::Result;
use futures_util::Stream;

use super::events::StreamEvent;
use super::types::{FileObject, Message, MessageQuery, Run, RunStep, SeedMessage, Thread};

/// Stream of decoded run events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Operations consumed from the remote assistant and document-index service.
///
/// Every call may be slow, may fail, and observes eventually consistent
/// state. Implementations report failures as errors; deciding which of them
/// are fatal is the caller's job.
///
/// # Example
///
/// ```ignore
/// use ragents::remote::{AssistantBackend, SeedMessage};
///
/// async fn start(backend: &dyn AssistantBackend, assistant: &str) -> anyhow::Result<()> {
///     let thread = backend.create_thread(vec![SeedMessage::user("Hi")]).await?;
///     let run = backend.create_run(&thread.id, assistant).await?;
///     println!("run {} is {}", run.id, run.status);
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a conversation seeded with `messages` (in order).
    async fn create_thread(&self, messages: Vec<SeedMessage>) -> Result<Thread>;

    /// Append a message to an existing conversation.
    async fn add_message(&self, thread_id: &str, message: SeedMessage) -> Result<Message>;

    /// Start a run of `assistant_id` over the conversation.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current run snapshot.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// List one page of messages.
    async fn list_messages(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<Message>>;

    /// List the execution steps of a run, with retrieval result content.
    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> Result<Vec<RunStep>>;

    /// Fetch document metadata.
    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject>;

    /// Upload document bytes for use by assistants.
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<FileObject>;

    /// Attach an uploaded document to a document index.
    async fn attach_file_to_index(&self, index_id: &str, file_id: &str) -> Result<()>;

    /// Start a run and stream its events.
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<EventStream>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}
