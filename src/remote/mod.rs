//! Remote assistant service abstraction.
//!
//! This module provides the wire types, the [`AssistantBackend`] trait that
//! the orchestration engine drives, an HTTP implementation for OpenAI
//! Assistants v2 compatible services, and the [`Lookup`] wrapper used for
//! best-effort side calls.

pub mod backend;
pub mod events;
pub mod lookup;
pub mod openai;
pub mod types;

// Re-export main types
pub use backend::{AssistantBackend, EventStream};
pub use events::{decode_frame, SseDecoder, SseFrame, StreamEvent};
pub use lookup::Lookup;
pub use openai::{OpenAiBackend, OpenAiConfig, DEFAULT_BASE_URL};
pub use types::{
    Annotation, ChunkText, ContentPart, FileObject, FileReference, FileSearchCall,
    FileSearchResult, ListPage, Message, MessageQuery, ResultContent, Role, Run, RunError,
    RunStatus, RunStep, SeedMessage, SortOrder, StepDetails, TextContent, Thread, ToolCall,
};
