//! HTTP client for an OpenAI Assistants v2 compatible service.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::backend::{AssistantBackend, EventStream};
use super::events::{decode_frame, SseDecoder, StreamEvent};
use super::types::{
    FileObject, ListPage, Message, MessageQuery, Run, RunStep, SeedMessage, Thread,
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Query parameter asking the service to embed retrieval chunk text in run steps.
const FILE_SEARCH_CONTENT_INCLUDE: &str =
    "step_details.tool_calls[*].file_search.results[*].content";

/// Connection settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Timeout for non-streaming requests.
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    /// Settings for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Override the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// [`AssistantBackend`] over HTTP.
pub struct OpenAiBackend {
    http_client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Build a client.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http_client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn check_status(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed: API error {}: {}", what, status, body);
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .timeout(self.config.request_timeout)
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;
        let response = Self::check_status(response, what).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait::async_trait]
impl AssistantBackend for OpenAiBackend {
    async fn create_thread(&self, messages: Vec<SeedMessage>) -> Result<Thread> {
        let request = self
            .request(Method::POST, "threads")
            .json(&json!({ "messages": messages }));
        self.send_json(request, "create thread").await
    }

    async fn add_message(&self, thread_id: &str, message: SeedMessage) -> Result<Message> {
        let request = self
            .request(Method::POST, &format!("threads/{}/messages", thread_id))
            .json(&message);
        self.send_json(request, "add message").await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let request = self
            .request(Method::POST, &format!("threads/{}/runs", thread_id))
            .json(&json!({ "assistant_id": assistant_id }));
        self.send_json(request, "create run").await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let request = self.request(Method::GET, &format!("threads/{}/runs/{}", thread_id, run_id));
        self.send_json(request, "retrieve run").await
    }

    async fn list_messages(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<Message>> {
        let request = self
            .request(Method::GET, &format!("threads/{}/messages", thread_id))
            .query(&[
                ("order", query.order.as_str().to_string()),
                ("limit", query.limit.to_string()),
            ]);
        let page: ListPage<Message> = self.send_json(request, "list messages").await?;
        Ok(page.data)
    }

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> Result<Vec<RunStep>> {
        let request = self
            .request(Method::GET, &format!("threads/{}/runs/{}/steps", thread_id, run_id))
            .query(&[("include[]", FILE_SEARCH_CONTENT_INCLUDE)]);
        let page: ListPage<RunStep> = self.send_json(request, "list run steps").await?;
        Ok(page.data)
    }

    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject> {
        let request = self.request(Method::GET, &format!("files/{}", file_id));
        self.send_json(request, "retrieve file").await
    }

    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<FileObject> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);
        let request = self.request(Method::POST, "files").multipart(form);
        self.send_json(request, "upload file").await
    }

    async fn attach_file_to_index(&self, index_id: &str, file_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &format!("vector_stores/{}/files", index_id))
            .json(&json!({ "file_id": file_id }));
        let _: Value = self.send_json(request, "attach file").await?;
        Ok(())
    }

    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<EventStream> {
        let response = self
            .request(Method::POST, &format!("threads/{}/runs", thread_id))
            .header("Accept", "text/event-stream")
            .json(&json!({ "assistant_id": assistant_id, "stream": true }))
            .send()
            .await
            .context("Failed to send streaming run request")?;
        let response = Self::check_status(response, "stream run").await?;

        let byte_stream = response.bytes_stream();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Result<StreamEvent>>();

        tokio::spawn(async move {
            use futures_util::StreamExt;
            let mut byte_stream = byte_stream;
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = byte_stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "event stream interrupted");
                        let _ = tx.send(Err(anyhow::Error::new(e).context("Event stream interrupted")));
                        return;
                    }
                };
                for frame in decoder.push_bytes(&bytes) {
                    let event = decode_frame(&frame);
                    let done = matches!(event, Ok(StreamEvent::Done));
                    if tx.send(event).is_err() || done {
                        return;
                    }
                }
            }

            if let Some(frame) = decoder.finish() {
                let _ = tx.send(decode_frame(&frame));
            }
            debug!("event stream closed by server");
        });

        Ok(Box::pin(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }

    fn backend_name(&self) -> &str {
        "openai"
    }
}
