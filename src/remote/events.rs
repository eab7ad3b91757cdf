//! Server-sent event decoding for streamed runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::types::{Message, Run, RunStep, StepDetails};

/// A decoded run event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A message was created (content still empty).
    MessageCreated(Message),
    /// A message finished with its final content and annotations.
    MessageCompleted(Message),
    /// A run step was created, updated, or received a delta.
    StepUpdated(RunStep),
    /// The run changed status.
    RunUpdated(Run),
    /// The server reported an error inside the stream.
    Error(String),
    /// End of stream.
    Done,
    /// Any other event, by name.
    Other(String),
}

/// One raw SSE frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseFrame {
    /// `event:` field.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
}

/// Incremental SSE framer. Bytes arrive in arbitrary chunks; frames are
/// emitted once their terminating blank line has been seen.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    pending: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(&chunk.replace('\r', ""));

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..end + 2).collect();
            if let Some(frame) = parse_frame(&raw) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Feed raw bytes. A UTF-8 sequence split across chunks is held back
    /// until the rest of it arrives.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return self.push(&text);
            }
        };
        let rest = self.pending.split_off(valid);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = rest;
        self.push(&text)
    }

    /// Flush a trailing frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let pending = std::mem::take(&mut self.pending);
        self.buffer.push_str(&String::from_utf8_lossy(&pending));
        let rest = std::mem::take(&mut self.buffer);
        parse_frame(&rest)
    }
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut frame = SseFrame::default();
    let mut data_lines = Vec::new();

    for line in raw.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => frame.event = Some(value.to_string()),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if frame.event.is_none() && data_lines.is_empty() {
        return None;
    }
    frame.data = data_lines.join("\n");
    Some(frame)
}

#[derive(Deserialize)]
struct StepDelta {
    #[serde(default)]
    id: String,
    #[serde(default)]
    delta: StepDeltaBody,
}

#[derive(Deserialize, Default)]
struct StepDeltaBody {
    #[serde(default)]
    step_details: Option<StepDetails>,
}

/// Decode a frame into a [`StreamEvent`].
pub fn decode_frame(frame: &SseFrame) -> Result<StreamEvent> {
    if frame.data.trim() == "[DONE]" {
        return Ok(StreamEvent::Done);
    }
    let name = frame.event.as_deref().unwrap_or("message");

    let event = match name {
        "done" => StreamEvent::Done,
        "error" => {
            let message = serde_json::from_str::<Value>(&frame.data)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error").and_then(|e| e.get("message")))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| frame.data.clone());
            StreamEvent::Error(message)
        }
        "thread.message.created" => StreamEvent::MessageCreated(parse(name, &frame.data)?),
        "thread.message.completed" => StreamEvent::MessageCompleted(parse(name, &frame.data)?),
        "thread.run.step.delta" => {
            let delta: StepDelta = parse(name, &frame.data)?;
            StreamEvent::StepUpdated(RunStep {
                id: delta.id,
                step_details: delta.delta.step_details,
            })
        }
        _ if name.starts_with("thread.run.step.") => {
            StreamEvent::StepUpdated(parse(name, &frame.data)?)
        }
        _ if name.starts_with("thread.run.") => StreamEvent::RunUpdated(parse(name, &frame.data)?),
        other => StreamEvent::Other(other.to_string()),
    };
    Ok(event)
}

fn parse<T: for<'de> Deserialize<'de>>(event: &str, data: &str) -> Result<T> {
    serde_json::from_str(data).with_context(|| format!("Failed to parse '{}' event payload", event))
}
