//! Wire types for the hosted assistant service.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! remote payloads is ignored. Open vocabularies (run status, content part
//! kinds, tool call kinds) keep an escape variant so new values never fail
//! deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a remote run.
///
/// The remote vocabulary is open-ended: values this crate does not know are
/// kept verbatim in [`RunStatus::Other`] and treated as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// Waiting for capacity.
    Queued,
    /// Executing.
    InProgress,
    /// Waiting for tool outputs from the caller.
    RequiresAction,
    /// Cancellation requested.
    Cancelling,
    /// Cancelled.
    Cancelled,
    /// Failed.
    Failed,
    /// Completed successfully.
    Completed,
    /// Ended early (token limits and similar).
    Incomplete,
    /// Ran out of time on the remote side.
    Expired,
    /// Any status this crate does not know about.
    Other(String),
}

impl RunStatus {
    /// Statuses that keep the poll loop running. Anything else is terminal.
    const NON_TERMINAL: [RunStatus; 3] = [
        RunStatus::Queued,
        RunStatus::InProgress,
        RunStatus::RequiresAction,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
            Self::Other(s) => s,
        }
    }

    /// Whether polling should stop. Implemented as an allow-list of
    /// non-terminal values so unknown statuses stop the loop.
    pub fn is_terminal(&self) -> bool {
        !Self::NON_TERMINAL.contains(self)
    }

    /// Whether the run is blocked on a tool response.
    pub fn needs_action(&self) -> bool {
        matches!(self, Self::RequiresAction)
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "expired" => Self::Expired,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details attached to a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    /// Machine-readable code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Snapshot of a remote run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run id.
    pub id: String,
    /// Conversation the run belongs to.
    #[serde(default)]
    pub thread_id: String,
    /// Assistant executing the run.
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Current status.
    pub status: RunStatus,
    /// Error details for failed runs.
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Build a snapshot (mostly useful for tests and mocks).
    pub fn new(id: impl Into<String>, thread_id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            assistant_id: None,
            status,
            last_error: None,
        }
    }
}

/// A remote conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Conversation id.
    pub id: String,
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user.
    User,
    /// Assistant.
    Assistant,
    /// Role not known to this crate.
    #[serde(other)]
    Unknown,
}

/// A message sent when creating a thread or appended to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedMessage {
    /// Author role.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl SeedMessage {
    /// User-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Assistant-authored message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Reference to a document in the remote store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileReference {
    /// Document id.
    #[serde(default)]
    pub file_id: String,
}

/// Annotation linking a span of message text to a source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation kind (`file_citation`, `file_path`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Literal span of the message text this annotation replaces.
    #[serde(default)]
    pub text: Option<String>,
    /// Cited document.
    #[serde(default)]
    pub file_citation: Option<FileReference>,
    /// Generated file referenced by path.
    #[serde(default)]
    pub file_path: Option<FileReference>,
    /// Start offset reported by the remote side (not trusted).
    #[serde(default)]
    pub start_index: Option<usize>,
    /// End offset reported by the remote side (not trusted).
    #[serde(default)]
    pub end_index: Option<usize>,
}

impl Annotation {
    /// Citation annotation replacing `span` and pointing at `file_id`.
    pub fn citation(span: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            kind: "file_citation".to_string(),
            text: Some(span.into()),
            file_citation: Some(FileReference { file_id: file_id.into() }),
            ..Self::default()
        }
    }

    /// Annotation that only carries a span.
    pub fn span(span: impl Into<String>) -> Self {
        Self {
            kind: "file_path".to_string(),
            text: Some(span.into()),
            ..Self::default()
        }
    }

    /// Cited document reference, if this annotation is a citation.
    pub fn cited_document(&self) -> Option<&FileReference> {
        self.file_citation.as_ref()
    }
}

/// Text content of a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    /// Raw text.
    #[serde(default)]
    pub value: String,
    /// Annotations in arrival order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// One part of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text with annotations.
    Text {
        /// Text payload.
        text: TextContent,
    },
    /// Image stored in the remote file store.
    ImageFile {
        /// Raw payload.
        #[serde(default)]
        image_file: serde_json::Value,
    },
    /// Image by URL.
    ImageUrl {
        /// Raw payload.
        #[serde(default)]
        image_url: serde_json::Value,
    },
    /// Model refusal.
    Refusal {
        /// Refusal text.
        #[serde(default)]
        refusal: String,
    },
    /// Content kind not known to this crate.
    #[serde(other)]
    Unknown,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    #[serde(default)]
    pub id: String,
    /// Author role.
    pub role: Role,
    /// Ordered content parts.
    #[serde(default)]
    pub content: Vec<ContentPart>,
    /// Run that produced the message.
    #[serde(default)]
    pub run_id: Option<String>,
}

impl Message {
    /// Assistant message with a single text part.
    pub fn assistant_text(value: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            id: String::new(),
            role: Role::Assistant,
            content: vec![ContentPart::Text {
                text: TextContent { value: value.into(), annotations },
            }],
            run_id: None,
        }
    }

    /// User message with a single text part.
    pub fn user_text(value: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            ..Self::assistant_text(value, Vec::new())
        }
    }

    /// Whether the assistant authored this message.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Text parts, in order.
    pub fn text_parts(&self) -> impl Iterator<Item = &TextContent> {
        self.content.iter().filter_map(|part| match part {
            ContentPart::Text { text } => Some(text),
            _ => None,
        })
    }
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters for listing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    /// Sort order.
    pub order: SortOrder,
    /// Page size.
    pub limit: u32,
}

impl MessageQuery {
    /// Newest-first page of `limit` messages.
    pub fn newest(limit: u32) -> Self {
        Self { order: SortOrder::Desc, limit }
    }
}

/// Paged list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage<T> {
    /// Items of this page.
    pub data: Vec<T>,
    /// Whether more pages exist.
    #[serde(default)]
    pub has_more: bool,
}

/// Text of a retrieval result chunk. Older payloads wrap it in `{ "value": .. }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChunkText {
    /// Plain string.
    Plain(String),
    /// Wrapped value.
    Wrapped {
        /// Chunk text.
        value: String,
    },
}

impl ChunkText {
    /// Borrow the chunk text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(s) => s,
            Self::Wrapped { value } => value,
        }
    }
}

/// One content item of a retrieval result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultContent {
    /// Content kind, `text` for chunks.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Chunk text.
    #[serde(default)]
    pub text: Option<ChunkText>,
}

/// One document hit of a file search call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSearchResult {
    /// Document id.
    #[serde(default)]
    pub file_id: String,
    /// Document name.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Relevance score.
    #[serde(default)]
    pub score: Option<f64>,
    /// Embedded chunks (present only when requested).
    #[serde(default)]
    pub content: Vec<ResultContent>,
}

/// Payload of a file search tool call.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FileSearchCall {
    /// Ranked results.
    #[serde(default)]
    pub results: Vec<FileSearchResult>,
}

/// Tool invocation recorded in a run step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolCall {
    /// Retrieval over the agent's document index.
    FileSearch {
        /// Call id.
        #[serde(default)]
        id: String,
        /// Retrieval payload.
        #[serde(default)]
        file_search: FileSearchCall,
    },
    /// Code execution.
    CodeInterpreter {
        /// Call id.
        #[serde(default)]
        id: String,
    },
    /// Caller-implemented function.
    Function {
        /// Call id.
        #[serde(default)]
        id: String,
    },
    /// Tool kind not known to this crate.
    #[serde(other)]
    Unknown,
}

impl ToolCall {
    /// Wire name of the tool kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileSearch { .. } => "file_search",
            Self::CodeInterpreter { .. } => "code_interpreter",
            Self::Function { .. } => "function",
            Self::Unknown => "unknown",
        }
    }

    /// Call id, when the payload carried one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::FileSearch { id, .. } | Self::CodeInterpreter { id } | Self::Function { id } => {
                Some(id.as_str()).filter(|id| !id.is_empty())
            }
            Self::Unknown => None,
        }
    }
}

/// What a run step did.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    /// The step produced a message.
    MessageCreation {
        /// Raw payload.
        #[serde(default)]
        message_creation: serde_json::Value,
    },
    /// The step invoked tools.
    ToolCalls {
        /// Invocations in order.
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    /// Step kind not known to this crate.
    #[serde(other)]
    Unknown,
}

/// One execution step of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunStep {
    /// Step id.
    #[serde(default)]
    pub id: String,
    /// Step details.
    #[serde(default)]
    pub step_details: Option<StepDetails>,
}

impl RunStep {
    /// Tool calls of this step (empty for message-creation steps).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match &self.step_details {
            Some(StepDetails::ToolCalls { tool_calls }) => tool_calls,
            _ => &[],
        }
    }
}

/// Document metadata from the remote file store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileObject {
    /// Document id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: Option<u64>,
}
