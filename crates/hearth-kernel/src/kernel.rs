//! The Hearth session context: memory store, tool dispatcher, LLM driver, and
//! the orchestrator that ties them together.

use crate::error::{KernelError, KernelResult};
use hearth_memory::MemoryStore;
use hearth_runtime::agent_loop::{AgentSession, ExchangeOutcome};
use hearth_runtime::drivers::create_driver;
use hearth_runtime::llm_driver::LlmDriver;
use hearth_runtime::memory_tools::MemoryToolProvider;
use hearth_runtime::tool_catalog::Collaborator;
use hearth_runtime::tool_runner::{ToolDispatcher, ToolProvider};
use hearth_types::config::HearthConfig;
use hearth_types::tool::ToolDefinition;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// A running assistant session.
///
/// Built once at start-up and passed by reference to whoever needs it.
/// Messages sent concurrently are queued on the session lock and handled one
/// at a time.
pub struct Hearth {
    config: HearthConfig,
    memory: MemoryStore,
    dispatcher: Arc<ToolDispatcher>,
    session: Mutex<AgentSession>,
}

impl Hearth {
    /// Boot with no external collaborators (memory tools only).
    pub fn boot(config: HearthConfig) -> KernelResult<Self> {
        Self::boot_with_collaborators(config, Vec::new())
    }

    /// Boot with the given collaborators registered on the dispatcher.
    ///
    /// Opens the store under `data_dir` and builds the driver from `[llm]`.
    pub fn boot_with_collaborators(
        config: HearthConfig,
        collaborators: Vec<(Collaborator, Arc<dyn ToolProvider>)>,
    ) -> KernelResult<Self> {
        let memory = open_store(&config)?;
        let driver =
            create_driver(&config.llm).map_err(|e| KernelError::BootFailed(e.to_string()))?;
        let hearth = Self::with_parts(config, memory, driver, collaborators);
        info!(
            model = %hearth.config.llm.model,
            tools = hearth.dispatcher.len(),
            "Hearth booted"
        );
        Ok(hearth)
    }

    /// Assemble a session from already-built parts.
    pub fn with_parts(
        config: HearthConfig,
        memory: MemoryStore,
        driver: Arc<dyn LlmDriver>,
        collaborators: Vec<(Collaborator, Arc<dyn ToolProvider>)>,
    ) -> Self {
        let mut dispatcher = ToolDispatcher::new();
        for (collaborator, provider) in collaborators {
            dispatcher.register(collaborator.tools(), provider);
        }
        MemoryToolProvider::new(memory.clone(), config.memory.transcript_search_limit)
            .register(&mut dispatcher);
        let dispatcher = Arc::new(dispatcher);

        let session = AgentSession::new(
            driver,
            Arc::clone(&dispatcher),
            memory.clone(),
            &config.llm,
            config.agent.clone(),
        );
        Self {
            config,
            memory,
            dispatcher,
            session: Mutex::new(session),
        }
    }

    /// Send one user message and return the assistant's answer.
    ///
    /// Never fails: errors come back as `"Error: ..."` text.
    pub async fn send_message(&self, text: &str) -> String {
        match self.try_send_message(text).await {
            Ok(outcome) => outcome.text,
            Err(e) => {
                error!(error = %e, "Message failed");
                format!("Error: {e}")
            }
        }
    }

    /// Send one user message, reporting failures to the caller.
    pub async fn try_send_message(&self, text: &str) -> KernelResult<ExchangeOutcome> {
        let mut session = self.session.lock().await;
        Ok(session.send_message(text).await?)
    }

    /// Clear the session window; the next message starts a new conversation.
    pub async fn reset_session(&self) {
        self.session.lock().await.reset();
    }

    /// The memory store, for inspection.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// The configuration this session was booted with.
    pub fn config(&self) -> &HearthConfig {
        &self.config
    }

    /// Tools advertised to the backend.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.dispatcher.definitions()
    }
}

/// Open the memory store configured by `config`, without booting a session.
pub fn open_store(config: &HearthConfig) -> KernelResult<MemoryStore> {
    Ok(MemoryStore::open(&config.db_path())?)
}
