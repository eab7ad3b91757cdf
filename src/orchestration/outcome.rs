//! Answers and classified run outcomes.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::remote::{Run, RunStatus};

/// Placeholder returned when the run asks for a tool response.
pub const ACTION_REQUIRED_TEXT: &str =
    "[INFO] The assistant requested an action (tool call). Not implemented in this runner.";

/// Placeholder returned when no assistant message was found.
pub const NO_RESPONSE_TEXT: &str = "[No response from the assistant]";

/// Placeholder for an assistant message without text.
pub const NO_TEXT_PLACEHOLDER: &str = "[No text]";

/// A cited document, numbered by its annotation's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationRecord {
    /// Position of the annotation in its text part (0-based).
    pub ordinal: usize,
    /// Document display name, or the raw document id when unknown.
    pub label: String,
}

impl fmt::Display for CitationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.ordinal, self.label)
    }
}

/// The `(text, citations)` pair handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Answer {
    /// Answer text with inline `[n]` markers, or an explanatory placeholder.
    #[serde(rename = "answer")]
    pub text: String,
    /// Citations in annotation order.
    pub citations: Vec<CitationRecord>,
}

impl Answer {
    /// Text-only answer.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    /// The empty pair returned by the streaming path, where the answer has
    /// already been emitted to the handler.
    pub fn already_emitted() -> Self {
        Self::default()
    }

    /// Whether both text and citations are empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.citations.is_empty()
    }

    /// Citations rendered as `[n] label` lines.
    pub fn citation_lines(&self) -> Vec<String> {
        self.citations.iter().map(ToString::to_string).collect()
    }
}

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run completed and an assistant message was resolved.
    Answered(Answer),
    /// The run is waiting for a tool response this runner does not provide.
    ActionRequired,
    /// The run reached a terminal status other than `completed`.
    Failed {
        /// Terminal status.
        status: RunStatus,
        /// Remote error message, if any.
        detail: Option<String>,
    },
    /// The local timeout elapsed while the run was still non-terminal.
    StillRunning {
        /// Last-seen status.
        status: RunStatus,
        /// Time spent polling.
        waited: Duration,
    },
    /// The run completed but no assistant message was found.
    NoResponse,
    /// The conversation or run could not be created.
    NotStarted(String),
}

impl RunOutcome {
    /// Classify a run that stopped without completing, as seen in a run
    /// snapshot or a streamed run event. Returns `None` for `completed` and
    /// for statuses that are still in progress.
    pub fn for_ended_run(run: &Run) -> Option<Self> {
        if run.status.needs_action() {
            return Some(Self::ActionRequired);
        }
        if !run.status.is_terminal() || run.status == RunStatus::Completed {
            return None;
        }
        Some(Self::Failed {
            status: run.status.clone(),
            detail: run
                .last_error
                .as_ref()
                .map(|e| e.message.clone())
                .filter(|m| !m.is_empty()),
        })
    }

    /// Convert into the caller-facing pair.
    pub fn into_answer(self) -> Answer {
        match self {
            Self::Answered(answer) => answer,
            Self::ActionRequired => Answer::message(ACTION_REQUIRED_TEXT),
            Self::Failed { status, detail } => match detail {
                Some(detail) => Answer::message(format!(
                    "[ERROR] Run ended with status: {} ({})",
                    status, detail
                )),
                None => Answer::message(format!("[ERROR] Run ended with status: {}", status)),
            },
            Self::StillRunning { status, waited } => Answer::message(format!(
                "[INFO] Run still {} after {}s; no final answer yet.",
                status,
                waited.as_secs()
            )),
            Self::NoResponse => Answer::message(NO_RESPONSE_TEXT),
            Self::NotStarted(reason) => {
                Answer::message(format!("[ERROR] Could not start run: {}", reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RunError;

    #[test]
    fn test_failed_outcome_mentions_status() {
        let run = Run::new("run_1", "thread_1", RunStatus::Expired);
        let answer = RunOutcome::for_ended_run(&run).unwrap().into_answer();
        assert_eq!(answer.text, "[ERROR] Run ended with status: expired");
        assert!(answer.citations.is_empty());
    }

    #[test]
    fn test_failed_outcome_includes_remote_error() {
        let mut run = Run::new("run_1", "thread_1", RunStatus::Failed);
        run.last_error = Some(RunError {
            code: "rate_limit_exceeded".to_string(),
            message: "Quota exceeded".to_string(),
        });
        let answer = RunOutcome::for_ended_run(&run).unwrap().into_answer();
        assert!(answer.text.contains("failed"));
        assert!(answer.text.contains("Quota exceeded"));
    }

    #[test]
    fn test_non_failures_are_not_classified() {
        for status in [RunStatus::Completed, RunStatus::Queued, RunStatus::InProgress] {
            assert_eq!(RunOutcome::for_ended_run(&Run::new("r", "t", status)), None);
        }
        assert_eq!(
            RunOutcome::for_ended_run(&Run::new("r", "t", RunStatus::RequiresAction)),
            Some(RunOutcome::ActionRequired)
        );
    }

    #[test]
    fn test_still_running_text() {
        let answer = RunOutcome::StillRunning {
            status: RunStatus::InProgress,
            waited: Duration::from_secs(121),
        }
        .into_answer();
        assert_eq!(answer.text, "[INFO] Run still in_progress after 121s; no final answer yet.");
    }

    #[test]
    fn test_answer_serialization_and_display() {
        let answer = Answer {
            text: "Plan B [0]".to_string(),
            citations: vec![CitationRecord {
                ordinal: 0,
                label: "prices.pdf".to_string(),
            }],
        };
        assert_eq!(answer.citation_lines(), vec!["[0] prices.pdf"]);
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            serde_json::json!({
                "answer": "Plan B [0]",
                "citations": [{"ordinal": 0, "label": "prices.pdf"}]
            })
        );
        assert!(Answer::already_emitted().is_empty());
    }
}
