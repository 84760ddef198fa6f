//! Conversation orchestrator.
//!
//! One [`AgentSession`] conducts exchanges for one logical session: it sends
//! the window to the backend, runs any requested tools through the
//! dispatcher, and loops until the backend produces a final text answer.
//!
//! Window invariants:
//! - a tool request is always followed by one result message covering every
//!   invocation in it, before the next backend call;
//! - trimming happens only at the start of a user turn, and the window always
//!   starts at a plain user text message afterwards;
//! - a failed or cancelled exchange leaves the window exactly as it was
//!   before the turn.

use crate::llm_driver::{CompletionRequest, LlmDriver, StopReason};
use crate::prompt_builder::build_system_prompt;
use crate::tool_runner::ToolDispatcher;
use chrono::Local;
use hearth_memory::MemoryStore;
use hearth_types::config::{AgentConfig, LlmConfig};
use hearth_types::error::{HearthError, HearthResult};
use hearth_types::memory::{ConversationId, TranscriptRole};
use hearth_types::message::Message;
use hearth_types::tool::ToolResult;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Characters of the first user message used as a conversation title.
const TITLE_MAX_CHARS: usize = 60;

/// Result of one completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOutcome {
    /// Final assistant text.
    pub text: String,
    /// Tool round-trips taken.
    pub tool_rounds: u32,
    /// Individual tool invocations executed.
    pub tool_calls: usize,
    /// Conversation the exchange was persisted to.
    pub conversation_id: ConversationId,
}

/// State of one conversation with the backend.
pub struct AgentSession {
    driver: Arc<dyn LlmDriver>,
    dispatcher: Arc<ToolDispatcher>,
    memory: MemoryStore,
    model: String,
    max_tokens: u32,
    agent: AgentConfig,
    window: Vec<Message>,
    conversation: Option<ConversationId>,
}

impl AgentSession {
    /// Create an empty session.
    pub fn new(
        driver: Arc<dyn LlmDriver>,
        dispatcher: Arc<ToolDispatcher>,
        memory: MemoryStore,
        llm: &LlmConfig,
        agent: AgentConfig,
    ) -> Self {
        Self {
            driver,
            dispatcher,
            memory,
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            agent,
            window: Vec::new(),
            conversation: None,
        }
    }

    /// The in-memory window, oldest first.
    pub fn window(&self) -> &[Message] {
        &self.window
    }

    /// The conversation new messages are persisted to, once one exists.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation
    }

    /// Forget the window and detach from the current conversation.
    pub fn reset(&mut self) {
        info!(
            conversation_id = ?self.conversation,
            dropped = self.window.len(),
            "Session reset"
        );
        self.window.clear();
        self.conversation = None;
    }

    /// Run one user turn to completion.
    ///
    /// The turn's messages are staged outside the window and committed only
    /// when the exchange succeeds, so a failed or cancelled turn leaves the
    /// window untouched. Transcript rows already written are kept.
    pub async fn send_message(&mut self, text: &str) -> HearthResult<ExchangeOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HearthError::InvalidInput("Message is empty".to_string()));
        }

        trim_window(&mut self.window, self.agent.max_history_messages);

        match self.run_exchange(text).await {
            Ok((outcome, turn)) => {
                self.window.extend(turn);
                info!(
                    conversation_id = %outcome.conversation_id,
                    rounds = outcome.tool_rounds,
                    tool_calls = outcome.tool_calls,
                    "Exchange complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "Exchange failed, session window unchanged");
                Err(e)
            }
        }
    }

    async fn run_exchange(
        &mut self,
        text: &str,
    ) -> HearthResult<(ExchangeOutcome, Vec<Message>)> {
        let conversation_id = self.ensure_conversation(text)?;

        let mut turn = vec![Message::user(text)];
        self.persist(conversation_id, TranscriptRole::User, text)?;

        let mut tool_rounds = 0u32;
        let mut tool_calls = 0usize;
        loop {
            let request = CompletionRequest {
                model: self.model.clone(),
                system: self.system_prompt()?,
                messages: self.window.iter().chain(&turn).cloned().collect(),
                tools: self.dispatcher.definitions(),
                max_tokens: self.max_tokens,
            };
            let response = self.driver.complete(request).await.map_err(|e| {
                if e.is_auth() {
                    HearthError::AuthFailed(e.to_string())
                } else {
                    HearthError::LlmDriver(e.to_string())
                }
            })?;

            let calls = response.tool_calls();
            if response.stop_reason == StopReason::ToolUse && !calls.is_empty() {
                if tool_rounds >= self.agent.max_tool_rounds {
                    warn!(rounds = tool_rounds, "Tool round limit reached");
                    return Err(HearthError::MaxIterationsExceeded(self.agent.max_tool_rounds));
                }
                tool_rounds += 1;

                let said = response.text();
                let note = if said.trim().is_empty() {
                    let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
                    format!("[Used tools: {}]", names.join(", "))
                } else {
                    said
                };
                self.persist(conversation_id, TranscriptRole::Assistant, &note)?;

                let mut results = Vec::with_capacity(calls.len());
                for call in &calls {
                    debug!(tool = %call.name, id = %call.id, round = tool_rounds, "Executing tool");
                    let output = self.dispatcher.execute(&call.name, &call.input).await;
                    results.push(ToolResult::from_output(&call.id, output));
                }
                tool_calls += calls.len();
                // Request and results enter the turn together, once the batch is complete.
                turn.push(Message::assistant_blocks(response.content));
                turn.push(Message::tool_results(results));
                continue;
            }

            let answer = response.text();
            if answer.trim().is_empty() {
                return Err(HearthError::LlmDriver(format!(
                    "Invalid response: no text content (stop_reason {:?})",
                    response.stop_reason
                )));
            }
            if response.stop_reason == StopReason::MaxTokens {
                warn!("Response truncated at max_tokens");
            }

            turn.push(Message::assistant(answer.clone()));
            self.persist(conversation_id, TranscriptRole::Assistant, &answer)?;
            let outcome = ExchangeOutcome {
                text: answer,
                tool_rounds,
                tool_calls,
                conversation_id,
            };
            return Ok((outcome, turn));
        }
    }

    fn ensure_conversation(&mut self, first_message: &str) -> HearthResult<ConversationId> {
        if let Some(id) = self.conversation {
            return Ok(id);
        }
        let title: String = first_message.chars().take(TITLE_MAX_CHARS).collect();
        let id = self.memory.transcripts().create_conversation(Some(&title))?;
        info!(conversation_id = %id, "Started conversation");
        self.conversation = Some(id);
        Ok(id)
    }

    fn persist(&self, id: ConversationId, role: TranscriptRole, content: &str) -> HearthResult<()> {
        self.memory.transcripts().add_message(id, role, content)?;
        Ok(())
    }

    fn system_prompt(&self) -> HearthResult<String> {
        let memories = self.memory.facts().render_for_prompt()?;
        Ok(build_system_prompt(&self.agent, Local::now(), &memories))
    }
}

/// Make room for one new user message under `cap`, then drop leading
/// messages until the window starts at a plain user text message.
pub fn trim_window(window: &mut Vec<Message>, cap: usize) {
    let keep = cap.saturating_sub(1);
    let before = window.len();
    if window.len() > keep {
        let excess = window.len() - keep;
        window.drain(..excess);
    }
    let misaligned = window
        .iter()
        .position(Message::is_user_text)
        .unwrap_or(window.len());
    window.drain(..misaligned);
    if window.len() != before {
        debug!(before, after = window.len(), "Trimmed session window");
    }
}
