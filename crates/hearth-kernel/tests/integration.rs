//! End-to-end tests of the session facade with a scripted backend.

use async_trait::async_trait;
use hearth_kernel::Hearth;
use hearth_memory::MemoryStore;
use hearth_runtime::llm_driver::{
    CompletionRequest, CompletionResponse, LlmDriver, LlmError, StopReason, TokenUsage,
};
use hearth_runtime::tool_catalog::Collaborator;
use hearth_runtime::tool_runner::ToolProvider;
use hearth_types::config::HearthConfig;
use hearth_types::error::ToolError;
use hearth_types::memory::{MemoryCategory, MemoryId};
use hearth_types::message::ContentBlock;
use hearth_types::tool::ToolInput;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct ScriptedDriver {
    script: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedDriver {
    fn new(script: Vec<Result<CompletionResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmDriver for ScriptedDriver {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Parse("script exhausted".into())))
    }
}

struct FakeCalendar;

#[async_trait]
impl ToolProvider for FakeCalendar {
    async fn execute(&self, tool_name: &str, input: &ToolInput) -> Result<String, ToolError> {
        match tool_name {
            "calendar_get_events" => Ok(format!(
                "1 event on {}: 14:00 Dentist (id evt-7)",
                input.str("date").unwrap_or("today")
            )),
            "calendar_delete_event" => Err(ToolError::NotFound(format!(
                "Event {}",
                input.str("event_id").unwrap_or_default()
            ))),
            other => Err(ToolError::InvalidInput(format!("unsupported {other}"))),
        }
    }
}

fn text(t: &str) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse {
        content: vec![ContentBlock::Text { text: t.into() }],
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    })
}

fn tool_use(
    id: &str,
    name: &str,
    input: serde_json::Value,
) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage::default(),
    })
}

fn boot(script: Vec<Result<CompletionResponse, LlmError>>) -> (Hearth, Arc<ScriptedDriver>) {
    let driver = ScriptedDriver::new(script);
    let hearth = Hearth::with_parts(
        HearthConfig::default(),
        MemoryStore::open_in_memory().unwrap(),
        driver.clone(),
        vec![(Collaborator::Calendar, Arc::new(FakeCalendar) as Arc<dyn ToolProvider>)],
    );
    (hearth, driver)
}

#[tokio::test]
async fn calendar_question_uses_tool_and_answers_in_text() {
    let (hearth, driver) = boot(vec![
        tool_use("toolu_1", "calendar_get_events", json!({"date": "today"})),
        text("You have the dentist at 2pm."),
    ]);

    let reply = hearth.send_message("what's on my calendar today").await;
    assert_eq!(reply, "You have the dentist at 2pm.");

    let requests = driver.requests.lock().unwrap();
    let continuation = requests[1].messages.last().unwrap();
    match &continuation.content[..] {
        [ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        }] => {
            assert_eq!(tool_use_id, "toolu_1");
            assert_eq!(content, "1 event on today: 14:00 Dentist (id evt-7)");
            assert!(!is_error);
        }
        other => panic!("expected one tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_collaborators_are_not_advertised() {
    let (hearth, _driver) = boot(vec![]);
    let names: Vec<String> = hearth.tools().into_iter().map(|t| t.name).collect();
    assert!(names.contains(&"calendar_get_events".to_string()));
    assert!(names.contains(&"memory_correct".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("mail_") || n.starts_with("reminders_")));
}

#[tokio::test]
async fn collaborator_errors_reach_the_model_not_the_user() {
    let (hearth, driver) = boot(vec![
        tool_use("t", "calendar_delete_event", json!({"event_id": "evt-404"})),
        text("I couldn't find that event."),
    ]);
    let reply = hearth.send_message("cancel my 3pm").await;
    assert_eq!(reply, "I couldn't find that event.");

    let requests = driver.requests.lock().unwrap();
    let result = &requests[1].messages.last().unwrap().content[0];
    assert!(matches!(
        result,
        ContentBlock::ToolResult { content, is_error: true, .. } if content == "Error: Event evt-404 not found"
    ));
}

#[tokio::test]
async fn correction_through_tools_keeps_history() {
    let (hearth, driver) = boot(vec![
        tool_use(
            "s",
            "memory_save",
            json!({"content": "Levi likes Minecraft", "category": "preference", "subject": "levi"}),
        ),
        text("Got it."),
        tool_use(
            "c",
            "memory_correct",
            json!({"memory_id": 1, "new_content": "Levi likes chess now"}),
        ),
        text("Updated."),
    ]);

    assert_eq!(hearth.send_message("Levi likes Minecraft").await, "Got it.");
    assert_eq!(
        hearth.send_message("actually Levi is into chess now").await,
        "Updated."
    );

    let facts = hearth.memory().facts();
    let old = facts.get_memory(MemoryId(1)).unwrap().unwrap();
    let new = facts.get_memory(MemoryId(2)).unwrap().unwrap();
    assert_eq!(old.confidence, 0.0);
    assert_eq!(new.supersedes, Some(MemoryId(1)));
    assert_eq!(new.subject.as_deref(), Some("levi"));
    assert_eq!(new.category, MemoryCategory::Preference);

    let live = facts.get_memories_by_subject("levi").unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].content, "Levi likes chess now");

    let requests = driver.requests.lock().unwrap();
    let last_system = &requests.last().unwrap().system;
    assert!(last_system.contains("Levi likes chess now [#2]"));
    assert!(!last_system.contains("Levi likes Minecraft"));
}

#[tokio::test]
async fn backend_failure_is_reported_as_text_and_session_recovers() {
    let (hearth, _driver) = boot(vec![
        Err(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        }),
        text("Back online."),
    ]);

    let reply = hearth.send_message("hello").await;
    assert!(reply.starts_with("Error: "), "{reply}");
    assert!(reply.contains("401"), "{reply}");

    assert_eq!(hearth.send_message("hello again").await, "Back online.");
}

#[tokio::test]
async fn transcripts_are_searchable_after_exchange() {
    let (hearth, _driver) = boot(vec![text("Sure, the dentist is on Tuesday.")]);
    hearth.send_message("when is my dentist appointment").await;

    let hits = hearth
        .memory()
        .transcripts()
        .search_transcripts("dentist", 10)
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(
        hits[0].conversation_title.as_deref(),
        Some("when is my dentist appointment")
    );
}

#[tokio::test]
async fn concurrent_messages_are_serialized() {
    let (hearth, driver) = boot(vec![text("one"), text("two")]);
    let hearth = Arc::new(hearth);

    let a = tokio::spawn({
        let hearth = Arc::clone(&hearth);
        async move { hearth.send_message("first").await }
    });
    let b = tokio::spawn({
        let hearth = Arc::clone(&hearth);
        async move { hearth.send_message("second").await }
    });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    let mut replies = vec![a, b];
    replies.sort();
    assert_eq!(replies, vec!["one", "two"]);

    // The second request saw the complete first exchange: user, assistant, user.
    let requests = driver.requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 3);
    assert!(requests[1].messages[0].is_user_text());
    assert!(!requests[1].messages[1].is_user_text());
    assert!(requests[1].messages[2].is_user_text());
}
