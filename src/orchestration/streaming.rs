//! Streaming run driver.
//!
//! Instead of polling, the run is started with an event stream and progress
//! is reported to a [`StreamHandler`] as it happens. The final message goes
//! through the same [`CitationResolver`] as the polling path, so both paths
//! produce the same text and citations for the same message.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, warn};

use super::citations::CitationResolver;
use super::driver::seed_messages;
use super::outcome::{Answer, RunOutcome};
use crate::registry::AgentHandle;
use crate::remote::{AssistantBackend, EventStream, StreamEvent};

/// Receives progress of a streamed run.
///
/// Callbacks run on the driver's task, in event order.
pub trait StreamHandler: Send {
    /// The assistant started a message.
    fn on_text_created(&mut self);

    /// The assistant invoked a tool. Called once per tool call.
    fn on_tool_call_created(&mut self, kind: &str);

    /// The final answer, or an explanatory message when there is none.
    /// Called at most once per run.
    fn on_message_done(&mut self, answer: &Answer);
}

/// Writes streamed progress and the final answer to a writer.
pub struct ConsoleHandler<W: Write + Send> {
    out: W,
}

impl ConsoleHandler<io::Stdout> {
    /// Handler printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleHandler<W> {
    /// Write progress and answers to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> StreamHandler for ConsoleHandler<W> {
    fn on_text_created(&mut self) {
        let _ = write!(self.out, "\nassistant > ");
        let _ = self.out.flush();
    }

    fn on_tool_call_created(&mut self, kind: &str) {
        let _ = writeln!(self.out, "\nassistant > {}", kind);
        let _ = self.out.flush();
    }

    fn on_message_done(&mut self, answer: &Answer) {
        let _ = writeln!(self.out, "{}", answer.text);
        if !answer.citations.is_empty() {
            let _ = writeln!(self.out, "\n=== Citations ===");
            for citation in &answer.citations {
                let _ = writeln!(self.out, "- {}", citation);
            }
        }
        let _ = self.out.flush();
    }
}

/// Drives a question through a streamed run.
pub struct StreamingDriver {
    backend: Arc<dyn AssistantBackend>,
    resolver: CitationResolver,
}

impl StreamingDriver {
    /// Create a streaming driver over `backend`.
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self {
            resolver: CitationResolver::new(backend.clone()),
            backend,
        }
    }

    /// Ask `agent` a question in a fresh conversation, reporting to
    /// `handler`. Always returns [`Answer::already_emitted`]; the answer
    /// (or the reason there is none) has been delivered to the handler.
    pub async fn ask<H: StreamHandler + ?Sized>(
        &self,
        agent: &AgentHandle,
        question: &str,
        extra_instructions: Option<&str>,
        handler: &mut H,
    ) -> Answer {
        let seed = seed_messages(question, extra_instructions);
        let thread = match self.backend.create_thread(seed).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(agent = %agent.name, error = %e, "could not create conversation");
                handler.on_message_done(&RunOutcome::NotStarted(format!("{:#}", e)).into_answer());
                return Answer::already_emitted();
            }
        };

        let events = match self.backend.stream_run(&thread.id, &agent.remote_id).await {
            Ok(events) => events,
            Err(e) => {
                warn!(agent = %agent.name, thread_id = %thread.id, error = %e, "could not start run");
                handler.on_message_done(&RunOutcome::NotStarted(format!("{:#}", e)).into_answer());
                return Answer::already_emitted();
            }
        };

        self.dispatch(events, handler).await;
        Answer::already_emitted()
    }

    /// Feed `events` to `handler` until the stream ends.
    ///
    /// Tool calls are reported once per call id, however many deltas the
    /// step receives. If the stream ends without a final message, the
    /// handler receives an explanatory one.
    pub async fn dispatch<H: StreamHandler + ?Sized>(&self, mut events: EventStream, handler: &mut H) {
        let mut seen_calls: HashSet<String> = HashSet::new();
        let mut delivered = false;
        let mut interruption: Option<String> = None;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "bad stream event");
                    interruption = Some(format!("{:#}", e));
                    continue;
                }
            };

            match event {
                StreamEvent::MessageCreated(message) if message.is_assistant() => {
                    handler.on_text_created();
                }
                StreamEvent::StepUpdated(step) => {
                    for call in step.tool_calls() {
                        if let Some(id) = call.id() {
                            if seen_calls.insert(id.to_string()) {
                                handler.on_tool_call_created(call.kind());
                            }
                        }
                    }
                }
                StreamEvent::MessageCompleted(message) if message.is_assistant() => {
                    if delivered {
                        debug!(message_id = %message.id, "ignoring additional message");
                        continue;
                    }
                    let answer = self.resolver.resolve(&message).await;
                    handler.on_message_done(&answer);
                    delivered = true;
                }
                StreamEvent::RunUpdated(run) => {
                    if let Some(outcome) = RunOutcome::for_ended_run(&run) {
                        if !delivered {
                            handler.on_message_done(&outcome.into_answer());
                            delivered = true;
                        }
                        if run.status.needs_action() {
                            break;
                        }
                    }
                }
                StreamEvent::Error(reason) => {
                    warn!(%reason, "stream reported an error");
                    interruption = Some(reason);
                    break;
                }
                StreamEvent::Done => break,
                other => debug!(?other, "ignoring stream event"),
            }
        }

        if !delivered {
            let answer = match interruption {
                Some(reason) => Answer::message(format!("[ERROR] Stream interrupted: {}", reason)),
                None => RunOutcome::NoResponse.into_answer(),
            };
            handler.on_message_done(&answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::CitationRecord;

    #[test]
    fn test_console_handler_output() {
        let mut handler = ConsoleHandler::new(Vec::new());
        handler.on_text_created();
        handler.on_tool_call_created("file_search");
        handler.on_message_done(&Answer {
            text: "Plan B costs 20 [0]".to_string(),
            citations: vec![CitationRecord {
                ordinal: 0,
                label: "prices.pdf".to_string(),
            }],
        });

        let out = String::from_utf8(handler.into_inner()).unwrap();
        assert!(out.starts_with("\nassistant > "));
        assert!(out.contains("assistant > file_search\n"));
        assert!(out.contains("Plan B costs 20 [0]\n"));
        assert!(out.contains("=== Citations ===\n- [0] prices.pdf\n"));
    }

    #[test]
    fn test_console_handler_without_citations() {
        let mut handler = ConsoleHandler::new(Vec::new());
        handler.on_message_done(&Answer::message("[No response from the assistant]"));
        let out = String::from_utf8(handler.into_inner()).unwrap();
        assert_eq!(out, "[No response from the assistant]\n");
    }
}
