//! Caller-facing facade: ask a named agent, list agents, upload documents.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::orchestration::{
    Answer, ConsoleHandler, RunDriver, RunDriverConfig, StreamHandler, StreamingDriver,
};
use crate::registry::{AgentRegistry, RegistryLayout, RegistryResult};
use crate::remote::{AssistantBackend, OpenAiBackend, OpenAiConfig};

#[cfg(feature = "ingest")]
use crate::ingest::{IngestError, Ingestor, UploadReceipt};
#[cfg(feature = "ingest")]
use crate::registry::IndexRegistry;

/// Per-call options for [`AgentService::ask`].
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Stream progress and the answer to stdout instead of polling.
    pub stream: bool,
    /// Extra instructions seeded before the question.
    pub extra_instructions: Option<String>,
    /// Continue an existing conversation (polling path only).
    pub thread_id: Option<String>,
}

/// Ask agents by name.
///
/// The service is immutable after construction and can be shared between
/// concurrent callers.
pub struct AgentService {
    registry: AgentRegistry,
    driver: RunDriver,
    streaming: StreamingDriver,
    #[cfg(feature = "ingest")]
    ingestor: Option<Ingestor>,
}

impl AgentService {
    /// Build a service from a loaded registry, a backend and polling settings.
    pub fn new(
        registry: AgentRegistry,
        backend: Arc<dyn AssistantBackend>,
        config: RunDriverConfig,
    ) -> Self {
        Self {
            registry,
            driver: RunDriver::new(backend.clone(), config),
            streaming: StreamingDriver::new(backend),
            #[cfg(feature = "ingest")]
            ingestor: None,
        }
    }

    /// Build a service from configuration: registry file, API key and
    /// poll tuning.
    pub fn from_config(loader: &ConfigurationLoader, env: &EnvironmentLoader) -> Result<Self> {
        let registry = load_registry(loader, None)?;
        let backend = build_backend(loader, env)?;
        Ok(Self::new(
            registry,
            backend,
            RunDriverConfig::from(&loader.config.polling),
        ))
    }

    /// Enable [`AgentService::upload`].
    #[cfg(feature = "ingest")]
    pub fn with_ingestor(mut self, ingestor: Ingestor) -> Self {
        self.ingestor = Some(ingestor);
        self
    }

    /// Registered agents.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Registered agent names.
    pub fn list_agents(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Ask `agent_name` a question.
    ///
    /// Only an unknown agent name is an error. With `options.stream` the
    /// answer is printed as it arrives and the returned pair is empty.
    pub async fn ask(
        &self,
        agent_name: &str,
        question: &str,
        options: &AskOptions,
    ) -> RegistryResult<Answer> {
        let agent = self.registry.resolve(agent_name)?;
        let extra = options.extra_instructions.as_deref();

        if options.stream {
            let mut handler = ConsoleHandler::stdout();
            return Ok(self.streaming.ask(agent, question, extra, &mut handler).await);
        }

        let outcome = match options.thread_id.as_deref() {
            Some(thread_id) => self.driver.follow_up(agent, thread_id, question).await,
            None => self.driver.run(agent, question, extra).await,
        };
        Ok(outcome.into_answer())
    }

    /// Ask `agent_name` a question over the streaming path, reporting to
    /// `handler`.
    pub async fn ask_streaming<H: StreamHandler + ?Sized>(
        &self,
        agent_name: &str,
        question: &str,
        extra_instructions: Option<&str>,
        handler: &mut H,
    ) -> RegistryResult<Answer> {
        let agent = self.registry.resolve(agent_name)?;
        Ok(self
            .streaming
            .ask(agent, question, extra_instructions, handler)
            .await)
    }

    /// Upload a document into the index of `agent_name`.
    #[cfg(feature = "ingest")]
    pub async fn upload(&self, agent_name: &str, file: &Path) -> Result<UploadReceipt, IngestError> {
        let agent = self.registry.resolve(agent_name)?;
        match &self.ingestor {
            Some(ingestor) => ingestor.upload_one(&agent.name, file).await,
            None => Err(IngestError::Remote {
                stage: "upload",
                filename: file.display().to_string(),
                reason: "document ingestion is not configured".to_string(),
            }),
        }
    }
}

/// Load the agent registry named by the configuration, or `agents_file`
/// when given.
pub fn load_registry(
    loader: &ConfigurationLoader,
    agents_file: Option<&Path>,
) -> RegistryResult<AgentRegistry> {
    let agents = &loader.config.agents;
    let path = match agents_file {
        Some(path) => path.to_path_buf(),
        None => loader.resolve_path(&agents.registry_file),
    };
    let layout = RegistryLayout {
        key_prefix: agents.key_prefix.clone(),
        required: agents.names.clone(),
    };
    AgentRegistry::load(&path, &layout)
}

/// Load the document-index registry named by the configuration.
#[cfg(feature = "ingest")]
pub fn load_index_registry(loader: &ConfigurationLoader) -> RegistryResult<IndexRegistry> {
    let ingest = &loader.config.ingest;
    let path = loader.resolve_path(&ingest.index_file);
    IndexRegistry::load(&path, &ingest.index_prefix)
}

/// Build the HTTP backend from configuration and the API key in the
/// environment.
pub fn build_backend(
    loader: &ConfigurationLoader,
    env: &EnvironmentLoader,
) -> Result<Arc<dyn AssistantBackend>> {
    let remote = &loader.config.remote;
    let api_key = env
        .api_key(&remote.api_key_env)
        .ok_or_else(|| anyhow!("{} is not set", remote.api_key_env))?;
    let base_url = env.base_url().unwrap_or_else(|| remote.base_url.clone());

    let config = OpenAiConfig::new(api_key)
        .with_base_url(base_url)
        .with_request_timeout(Duration::from_secs(remote.request_timeout_secs));
    let backend = OpenAiBackend::new(config).context("Failed to build HTTP client")?;
    Ok(Arc::new(backend))
}
