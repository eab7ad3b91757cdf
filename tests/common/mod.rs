//! Scripted in-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::stream;

use ragents::remote::{
    AssistantBackend, EventStream, FileObject, Message, MessageQuery, Run, RunStatus, RunStep,
    SeedMessage, StreamEvent, Thread,
};

pub const THREAD_ID: &str = "thread_1";
pub const RUN_ID: &str = "run_1";

/// Backend whose answers are fixed up front.
///
/// `retrieve_run` pops scripted snapshots; once the script is exhausted the
/// last snapshot is repeated forever.
pub struct MockBackend {
    script: Mutex<VecDeque<Result<Run, String>>>,
    last_run: Mutex<Run>,
    messages: Vec<Message>,
    files: HashMap<String, String>,
    steps: Option<Vec<RunStep>>,
    events: Mutex<Option<Vec<Result<StreamEvent>>>>,
    fail_thread: Option<String>,
    fail_run: Option<String>,
    fail_messages: bool,
    fail_upload: Option<String>,
    pub retrieve_calls: AtomicUsize,
    pub list_message_calls: AtomicUsize,
    pub seeded: Mutex<Vec<SeedMessage>>,
    pub appended: Mutex<Vec<(String, SeedMessage)>>,
    pub uploads: Mutex<Vec<(String, usize)>>,
    pub attachments: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last_run: Mutex::new(Run::new(RUN_ID, THREAD_ID, RunStatus::Queued)),
            messages: Vec::new(),
            files: HashMap::new(),
            steps: None,
            events: Mutex::new(None),
            fail_thread: None,
            fail_run: None,
            fail_messages: false,
            fail_upload: None,
            retrieve_calls: AtomicUsize::new(0),
            list_message_calls: AtomicUsize::new(0),
            seeded: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            attachments: Mutex::new(Vec::new()),
        }
    }

    /// Statuses returned by successive `retrieve_run` calls.
    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        let runs = statuses
            .iter()
            .map(|s| Run::new(RUN_ID, THREAD_ID, RunStatus::from(*s)));
        self.with_runs(runs)
    }

    pub fn with_runs(self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.script
            .lock()
            .unwrap()
            .extend(runs.into_iter().map(Ok));
        self
    }

    /// A failing status check at this point of the script.
    pub fn with_status_error(self, reason: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    /// Messages returned (newest first) by `list_messages`.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_file(mut self, id: &str, name: &str) -> Self {
        self.files.insert(id.to_string(), name.to_string());
        self
    }

    /// Run steps returned by `list_run_steps`. Without them the call fails.
    pub fn with_steps(mut self, steps: Vec<RunStep>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_events(self, events: Vec<Result<StreamEvent>>) -> Self {
        *self.events.lock().unwrap() = Some(events);
        self
    }

    pub fn failing_thread(mut self, reason: &str) -> Self {
        self.fail_thread = Some(reason.to_string());
        self
    }

    pub fn failing_run(mut self, reason: &str) -> Self {
        self.fail_run = Some(reason.to_string());
        self
    }

    pub fn failing_messages(mut self) -> Self {
        self.fail_messages = true;
        self
    }

    /// Uploads of `filename` fail.
    pub fn failing_upload(mut self, filename: &str) -> Self {
        self.fail_upload = Some(filename.to_string());
        self
    }

    pub fn retrieve_count(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn create_thread(&self, messages: Vec<SeedMessage>) -> Result<Thread> {
        if let Some(reason) = &self.fail_thread {
            return Err(anyhow!(reason.clone()));
        }
        self.seeded.lock().unwrap().extend(messages);
        Ok(Thread {
            id: THREAD_ID.to_string(),
        })
    }

    async fn add_message(&self, thread_id: &str, message: SeedMessage) -> Result<Message> {
        let reply = Message::user_text(message.content.clone());
        self.appended
            .lock()
            .unwrap()
            .push((thread_id.to_string(), message));
        Ok(reply)
    }

    async fn create_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run> {
        if let Some(reason) = &self.fail_run {
            return Err(anyhow!(reason.clone()));
        }
        Ok(Run::new(RUN_ID, thread_id, RunStatus::Queued))
    }

    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(run)) => {
                *self.last_run.lock().unwrap() = run.clone();
                Ok(run)
            }
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Ok(self.last_run.lock().unwrap().clone()),
        }
    }

    async fn list_messages(&self, _thread_id: &str, query: MessageQuery) -> Result<Vec<Message>> {
        self.list_message_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_messages {
            return Err(anyhow!("list messages failed: API error 500"));
        }
        Ok(self.messages.iter().take(query.limit as usize).cloned().collect())
    }

    async fn list_run_steps(&self, _thread_id: &str, _run_id: &str) -> Result<Vec<RunStep>> {
        self.steps
            .clone()
            .ok_or_else(|| anyhow!("list run steps failed: API error 404"))
    }

    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject> {
        match self.files.get(file_id) {
            Some(name) => Ok(FileObject {
                id: file_id.to_string(),
                filename: name.clone(),
                bytes: None,
            }),
            None => Err(anyhow!("retrieve file failed: API error 404")),
        }
    }

    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<FileObject> {
        if self.fail_upload.as_deref() == Some(filename) {
            return Err(anyhow!("upload file failed: API error 413"));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((filename.to_string(), bytes.len()));
        Ok(FileObject {
            id: format!("file-{}", uploads.len()),
            filename: filename.to_string(),
            bytes: Some(bytes.len() as u64),
        })
    }

    async fn attach_file_to_index(&self, index_id: &str, file_id: &str) -> Result<()> {
        self.attachments
            .lock()
            .unwrap()
            .push((index_id.to_string(), file_id.to_string()));
        Ok(())
    }

    async fn stream_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<EventStream> {
        if let Some(reason) = &self.fail_run {
            return Err(anyhow!(reason.clone()));
        }
        let events = self.events.lock().unwrap().take().unwrap_or_default();
        Ok(Box::pin(stream::iter(events)))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
