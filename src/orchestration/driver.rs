//! Polling run driver.
//!
//! One question is one conversation: the driver seeds a thread, starts a run
//! of the agent's assistant, polls the run with backoff until it stops or the
//! local timeout elapses, then turns the result into an [`Answer`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::backoff::PollSchedule;
use super::citations::CitationResolver;
use super::outcome::{Answer, RunOutcome, NO_TEXT_PLACEHOLDER};
use super::trace::RetrievalTrace;
use crate::config::PollingConfig;
use crate::registry::AgentHandle;
use crate::remote::{AssistantBackend, MessageQuery, Run, RunStatus, SeedMessage};

/// Tuning of the poll loop.
#[derive(Debug, Clone)]
pub struct RunDriverConfig {
    /// Interval schedule between status checks.
    pub schedule: PollSchedule,
    /// Local deadline for a run to stop.
    pub timeout: Duration,
    /// Messages fetched (newest first) when looking for the answer.
    pub message_page_size: u32,
    /// Append the retrieval chunk count to answers.
    pub retrieval_trace: bool,
}

impl Default for RunDriverConfig {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for RunDriverConfig {
    fn from(polling: &PollingConfig) -> Self {
        Self {
            schedule: PollSchedule::from_secs_f64(
                polling.interval_secs,
                polling.backoff_factor,
                polling.max_interval_secs,
            ),
            timeout: Duration::from_secs(polling.timeout_secs),
            message_page_size: polling.message_page_size.max(1),
            retrieval_trace: polling.retrieval_trace,
        }
    }
}

/// Result of the poll loop.
#[derive(Debug, Clone)]
pub struct PollReport {
    /// Last-seen run snapshot.
    pub run: Run,
    /// Time spent polling.
    pub elapsed: Duration,
    /// Number of status checks made.
    pub checks: u32,
}

/// Seed messages for a new conversation: optional extra instructions as an
/// assistant-authored message, then the question.
pub fn seed_messages(question: &str, extra_instructions: Option<&str>) -> Vec<SeedMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(extra) = extra_instructions.filter(|e| !e.trim().is_empty()) {
        messages.push(SeedMessage::assistant(extra));
    }
    messages.push(SeedMessage::user(question));
    messages
}

/// Drives a question through a run by polling.
pub struct RunDriver {
    backend: Arc<dyn AssistantBackend>,
    config: RunDriverConfig,
    resolver: CitationResolver,
    trace: RetrievalTrace,
}

impl RunDriver {
    /// Create a driver over `backend`.
    pub fn new(backend: Arc<dyn AssistantBackend>, config: RunDriverConfig) -> Self {
        Self {
            resolver: CitationResolver::new(backend.clone()),
            trace: RetrievalTrace::new(backend.clone()),
            backend,
            config,
        }
    }

    /// Polling settings in use.
    pub fn config(&self) -> &RunDriverConfig {
        &self.config
    }

    /// Ask `agent` a question in a fresh conversation.
    pub async fn ask(
        &self,
        agent: &AgentHandle,
        question: &str,
        extra_instructions: Option<&str>,
    ) -> Answer {
        self.run(agent, question, extra_instructions)
            .await
            .into_answer()
    }

    /// Like [`RunDriver::ask`], but returns the classified outcome.
    pub async fn run(
        &self,
        agent: &AgentHandle,
        question: &str,
        extra_instructions: Option<&str>,
    ) -> RunOutcome {
        let seed = seed_messages(question, extra_instructions);
        let thread = match self.backend.create_thread(seed).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(agent = %agent.name, error = %e, "could not create conversation");
                return RunOutcome::NotStarted(format!("{:#}", e));
            }
        };
        debug!(agent = %agent.name, thread_id = %thread.id, "conversation created");

        self.run_in_thread(agent, &thread.id).await
    }

    /// Append `question` to an existing conversation and run `agent` on it.
    pub async fn follow_up(&self, agent: &AgentHandle, thread_id: &str, question: &str) -> RunOutcome {
        if let Err(e) = self
            .backend
            .add_message(thread_id, SeedMessage::user(question))
            .await
        {
            warn!(agent = %agent.name, thread_id, error = %e, "could not add message");
            return RunOutcome::NotStarted(format!("{:#}", e));
        }

        self.run_in_thread(agent, thread_id).await
    }

    async fn run_in_thread(&self, agent: &AgentHandle, thread_id: &str) -> RunOutcome {
        let run = match self.backend.create_run(thread_id, &agent.remote_id).await {
            Ok(run) => run,
            Err(e) => {
                warn!(agent = %agent.name, thread_id, error = %e, "could not start run");
                return RunOutcome::NotStarted(format!("{:#}", e));
            }
        };
        info!(agent = %agent.name, run_id = %run.id, "run started");

        let report = self.poll(thread_id, run).await;
        self.finish(thread_id, report).await
    }

    /// Poll `run` until it is terminal, needs action, or the timeout elapses.
    ///
    /// A failed status check keeps the last-seen snapshot and counts as a
    /// check; only the timeout bounds the loop.
    pub async fn poll(&self, thread_id: &str, run: Run) -> PollReport {
        let started = Instant::now();
        let mut intervals = self.config.schedule.intervals();
        let mut last = run;
        let mut checks = 0u32;

        loop {
            match self.backend.retrieve_run(thread_id, &last.id).await {
                Ok(run) => {
                    if run.status != last.status {
                        debug!(run_id = %run.id, status = %run.status, "run status changed");
                    }
                    last = run;
                }
                Err(e) => warn!(run_id = %last.id, error = %e, "status check failed"),
            }
            checks += 1;

            if last.status.is_terminal() || last.status.needs_action() {
                break;
            }
            if started.elapsed() >= self.config.timeout {
                warn!(
                    run_id = %last.id,
                    status = %last.status,
                    timeout_secs = self.config.timeout.as_secs(),
                    "run did not finish before the local timeout"
                );
                break;
            }

            sleep(intervals.next_interval()).await;
        }

        PollReport {
            run: last,
            elapsed: started.elapsed(),
            checks,
        }
    }

    async fn finish(&self, thread_id: &str, report: PollReport) -> RunOutcome {
        let run = report.run;
        if let Some(outcome) = RunOutcome::for_ended_run(&run) {
            return outcome;
        }
        if run.status != RunStatus::Completed {
            return RunOutcome::StillRunning {
                status: run.status,
                waited: report.elapsed,
            };
        }

        let query = MessageQuery::newest(self.config.message_page_size);
        let messages = match self.backend.list_messages(thread_id, query).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(thread_id, error = %e, "could not list messages");
                return RunOutcome::NoResponse;
            }
        };
        let Some(message) = messages.iter().find(|m| m.is_assistant()) else {
            return RunOutcome::NoResponse;
        };

        let mut answer = self.resolver.resolve(message).await;
        if answer.text.is_empty() {
            answer.text = NO_TEXT_PLACEHOLDER.to_string();
        }

        if self.config.retrieval_trace {
            let chunks = self.trace.fetch(thread_id, &run.id).await;
            if !chunks.is_empty() {
                answer
                    .text
                    .push_str(&format!("\n\n[debug] Retrieval chunks used: {}", chunks.len()));
            }
        }

        info!(run_id = %run.id, citations = answer.citations.len(), "answer resolved");
        RunOutcome::Answered(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::Role;

    #[test]
    fn test_seed_messages_order() {
        let seed = seed_messages("What does plan B cost?", Some("Answer in one line"));
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].role, Role::Assistant);
        assert_eq!(seed[1].content, "What does plan B cost?");

        assert_eq!(seed_messages("q", None).len(), 1);
        assert_eq!(seed_messages("q", Some("  ")).len(), 1);
    }

    #[test]
    fn test_config_from_polling() {
        let polling = PollingConfig {
            interval_secs: 0.5,
            backoff_factor: 2.0,
            max_interval_secs: 1.0,
            timeout_secs: 30,
            message_page_size: 0,
            retrieval_trace: false,
        };
        let config = RunDriverConfig::from(&polling);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.message_page_size, 1);
        assert_eq!(config.schedule.base(), Duration::from_millis(500));
        assert_eq!(config.schedule.cap(), Duration::from_secs(1));
        assert!(!config.retrieval_trace);
    }
}
