//! Tools served directly from the memory store.
//!
//! These let the model save, correct, confirm, forget and look up what it
//! knows about the user, and search past conversations.

use crate::tool_catalog;
use crate::tool_runner::{ToolDispatcher, ToolProvider};
use async_trait::async_trait;
use hearth_memory::MemoryStore;
use hearth_types::error::{HearthError, ToolError};
use hearth_types::memory::{Memory, MemoryCategory, MemoryId, MemorySource};
use hearth_types::tool::ToolInput;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

/// Serves the `memory_*` and `conversation_search` tools.
pub struct MemoryToolProvider {
    store: MemoryStore,
    transcript_limit: usize,
}

impl MemoryToolProvider {
    /// Create a provider over `store`; `transcript_limit` caps `conversation_search` hits.
    pub fn new(store: MemoryStore, transcript_limit: usize) -> Self {
        Self {
            store,
            transcript_limit,
        }
    }

    /// Register the memory tools on `dispatcher`, served by this provider.
    pub fn register(self, dispatcher: &mut ToolDispatcher) {
        dispatcher.register(tool_catalog::memory_tools(), Arc::new(self));
    }

    fn save(&self, input: &ToolInput) -> Result<String, ToolError> {
        let content = required_str(input, "content")?;
        let category = category(input)?.unwrap_or(MemoryCategory::Fact);
        let subject = input.str("subject");

        // Look up near-duplicates first so the new row is not reported against itself.
        let similar = self
            .store
            .facts()
            .find_similar_memories(content, subject)
            .map_err(store_error)?;
        if let Some(known) = similar
            .iter()
            .find(|m| m.is_live() && m.content.trim().eq_ignore_ascii_case(content.trim()))
        {
            self.store
                .facts()
                .confirm_memory(known.id)
                .map_err(store_error)?;
            info!(memory_id = %known.id, "Restated memory confirmed via tool");
            return Ok(format!("Already remembered as memory #{}; confirmed.", known.id));
        }
        let id = self
            .store
            .facts()
            .add_memory(content, category, MemorySource::Explicit, subject, 1.0)
            .map_err(store_error)?;
        info!(memory_id = %id, %category, "Memory saved via tool");

        let mut out = format!("Saved memory #{id} [{category}].");
        if !similar.is_empty() {
            out.push_str(
                "\nSimilar memories already stored (use memory_correct if the new one replaces one of these):",
            );
            for memory in &similar {
                let _ = write!(out, "\n{}", memory_line(memory));
            }
        }
        Ok(out)
    }

    fn correct(&self, input: &ToolInput) -> Result<String, ToolError> {
        let id = memory_id(input)?;
        let new_content = required_str(input, "new_content")?;

        let facts = self.store.facts();
        let old = facts
            .get_memory(id)
            .map_err(store_error)?
            .ok_or_else(|| ToolError::NotFound(format!("Memory #{id}")))?;
        if !old.is_live() {
            return Err(ToolError::InvalidInput(format!(
                "Memory #{id} was already corrected; correct the newest version instead"
            )));
        }

        let category = category(input)?.unwrap_or(old.category);
        let new_id = facts
            .supersede_memory(id, new_content, category, input.str("subject"))
            .map_err(store_error)?
            .ok_or_else(|| ToolError::NotFound(format!("Memory #{id}")))?;
        Ok(format!("Corrected memory #{id}; the new version is #{new_id}."))
    }

    fn confirm(&self, input: &ToolInput) -> Result<String, ToolError> {
        let id = memory_id(input)?;
        if self.store.facts().confirm_memory(id).map_err(store_error)? {
            Ok(format!("Confirmed memory #{id}."))
        } else {
            Err(ToolError::NotFound(format!("Live memory #{id}")))
        }
    }

    fn forget(&self, input: &ToolInput) -> Result<String, ToolError> {
        let id = memory_id(input)?;
        if self.store.facts().delete_memory(id).map_err(store_error)? {
            info!(memory_id = %id, "Memory forgotten via tool");
            Ok(format!("Forgot memory #{id}."))
        } else {
            Err(ToolError::NotFound(format!("Memory #{id}")))
        }
    }

    fn search(&self, input: &ToolInput) -> Result<String, ToolError> {
        let query = required_str(input, "query")?;
        let hits = self
            .store
            .facts()
            .search_memories(query)
            .map_err(store_error)?;
        if hits.is_empty() {
            return Ok(format!("No memories match '{query}'."));
        }
        Ok(hits.iter().map(memory_line).collect::<Vec<_>>().join("\n"))
    }

    fn subjects(&self) -> Result<String, ToolError> {
        let subjects = self.store.facts().get_all_subjects().map_err(store_error)?;
        if subjects.is_empty() {
            Ok("No subjects have memories yet.".to_string())
        } else {
            Ok(format!("Subjects: {}", subjects.join(", ")))
        }
    }

    fn search_conversations(&self, input: &ToolInput) -> Result<String, ToolError> {
        let query = required_str(input, "query")?;
        let hits = self
            .store
            .transcripts()
            .search_transcripts(query, self.transcript_limit)
            .map_err(store_error)?;
        if hits.is_empty() {
            return Ok(format!("No past conversations mention '{query}'."));
        }

        let mut out = format!("{} matching message(s):", hits.len());
        for hit in &hits {
            let title = hit.conversation_title.as_deref().unwrap_or("Untitled");
            let _ = write!(
                out,
                "\n- {} in \"{}\" ({}): {}",
                hit.message.created_at.format("%Y-%m-%d"),
                title,
                hit.message.role,
                hit.snippet
            );
        }
        Ok(out)
    }
}

#[async_trait]
impl ToolProvider for MemoryToolProvider {
    async fn execute(&self, tool_name: &str, input: &ToolInput) -> Result<String, ToolError> {
        match tool_name {
            "memory_save" => self.save(input),
            "memory_correct" => self.correct(input),
            "memory_confirm" => self.confirm(input),
            "memory_forget" => self.forget(input),
            "memory_search" => self.search(input),
            "memory_subjects" => self.subjects(),
            "conversation_search" => self.search_conversations(input),
            other => Err(ToolError::NotFound(format!("Tool '{other}'"))),
        }
    }
}

/// `#id [category] content`, flagged when held with less than full confidence.
fn memory_line(memory: &Memory) -> String {
    let mut line = format!("#{} [{}] {}", memory.id, memory.category, memory.content);
    if memory.is_uncertain() {
        line.push_str(" (uncertain)");
    }
    line
}

fn required_str<'a>(input: &'a ToolInput, name: &str) -> Result<&'a str, ToolError> {
    input
        .str(name)
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing {name} parameter")))
}

fn memory_id(input: &ToolInput) -> Result<MemoryId, ToolError> {
    input
        .int("memory_id")
        .map(MemoryId)
        .ok_or_else(|| ToolError::InvalidInput("Missing memory_id parameter".to_string()))
}

fn category(input: &ToolInput) -> Result<Option<MemoryCategory>, ToolError> {
    input
        .str("category")
        .map(|c| {
            c.parse::<MemoryCategory>()
                .map_err(|e| ToolError::InvalidInput(format!("Invalid category parameter: {e}")))
        })
        .transpose()
}

fn store_error(e: HearthError) -> ToolError {
    ToolError::Api {
        code: 500,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_types::memory::TranscriptRole;
    use serde_json::json;

    fn setup() -> (MemoryStore, ToolDispatcher) {
        let store = MemoryStore::open_in_memory().unwrap();
        let mut dispatcher = ToolDispatcher::new();
        MemoryToolProvider::new(store.clone(), 50).register(&mut dispatcher);
        (store, dispatcher)
    }

    #[tokio::test]
    async fn test_save_then_search() {
        let (store, d) = setup();
        let out = d
            .execute(
                "memory_save",
                &json!({"content": "Levi likes Minecraft", "category": "preference", "subject": "Levi"}),
            )
            .await;
        assert_eq!(out, "Saved memory #1 [preference].");

        let saved = store.facts().get_memory(MemoryId(1)).unwrap().unwrap();
        assert_eq!(saved.subject.as_deref(), Some("levi"));
        assert_eq!(saved.source, MemorySource::Explicit);

        let out = d.execute("memory_search", &json!({"query": "minecraft"})).await;
        assert_eq!(out, "#1 [preference] Levi likes Minecraft");
    }

    #[tokio::test]
    async fn test_save_reports_similar() {
        let (_store, d) = setup();
        d.execute(
            "memory_save",
            &json!({"content": "Levi likes Minecraft", "category": "preference", "subject": "levi"}),
        )
        .await;
        let out = d
            .execute(
                "memory_save",
                &json!({"content": "Levi plays chess", "category": "preference", "subject": "levi"}),
            )
            .await;
        assert!(out.starts_with("Saved memory #2"), "{out}");
        assert!(out.contains("#1 [preference] Levi likes Minecraft"), "{out}");
        assert!(!out.contains("#2 [preference]"), "{out}");
    }

    #[tokio::test]
    async fn test_correct_supersedes() {
        let (store, d) = setup();
        d.execute(
            "memory_save",
            &json!({"content": "Levi likes Minecraft", "category": "preference", "subject": "levi"}),
        )
        .await;
        let out = d
            .execute(
                "memory_correct",
                &json!({"memory_id": "1", "new_content": "Levi likes chess now"}),
            )
            .await;
        assert_eq!(out, "Corrected memory #1; the new version is #2.");

        let new = store.facts().get_memory(MemoryId(2)).unwrap().unwrap();
        assert_eq!(new.supersedes, Some(MemoryId(1)));
        assert_eq!(new.category, MemoryCategory::Preference);
        assert_eq!(new.subject.as_deref(), Some("levi"));

        let again = d
            .execute(
                "memory_correct",
                &json!({"memory_id": 1, "new_content": "Levi likes go"}),
            )
            .await;
        assert!(again.starts_with("Error: Memory #1 was already corrected"), "{again}");
    }

    #[tokio::test]
    async fn test_restated_fact_confirms_instead_of_duplicating() {
        let (store, d) = setup();
        d.execute(
            "memory_save",
            &json!({"content": "Levi likes Minecraft", "category": "preference", "subject": "levi"}),
        )
        .await;
        let before = store.facts().get_memory(MemoryId(1)).unwrap().unwrap();

        let out = d
            .execute(
                "memory_save",
                &json!({"content": "levi likes minecraft", "category": "preference", "subject": "levi"}),
            )
            .await;
        assert_eq!(out, "Already remembered as memory #1; confirmed.");
        assert_eq!(store.facts().get_all_memories().unwrap().len(), 1);
        let after = store.facts().get_memory(MemoryId(1)).unwrap().unwrap();
        assert!(after.last_confirmed >= before.last_confirmed);
    }

    #[tokio::test]
    async fn test_confirm_tool() {
        let (store, d) = setup();
        d.execute("memory_save", &json!({"content": "Owns a bike", "category": "fact"}))
            .await;
        assert_eq!(
            d.execute("memory_confirm", &json!({"memory_id": 1})).await,
            "Confirmed memory #1."
        );
        store
            .facts()
            .supersede_memory(MemoryId(1), "Owns two bikes", MemoryCategory::Fact, None)
            .unwrap();
        assert_eq!(
            d.execute("memory_confirm", &json!({"memory_id": 1})).await,
            "Error: Live memory #1 not found"
        );
    }

    #[tokio::test]
    async fn test_correct_missing_memory() {
        let (_store, d) = setup();
        let out = d
            .execute(
                "memory_correct",
                &json!({"memory_id": 42, "new_content": "anything"}),
            )
            .await;
        assert_eq!(out, "Error: Memory #42 not found");
    }

    #[tokio::test]
    async fn test_forget() {
        let (store, d) = setup();
        d.execute("memory_save", &json!({"content": "Owns a bike", "category": "fact"}))
            .await;
        assert_eq!(
            d.execute("memory_forget", &json!({"memory_id": 1})).await,
            "Forgot memory #1."
        );
        assert!(store.facts().get_memory(MemoryId(1)).unwrap().is_none());
        assert_eq!(
            d.execute("memory_forget", &json!({"memory_id": 1})).await,
            "Error: Memory #1 not found"
        );
    }

    #[tokio::test]
    async fn test_subjects_listing() {
        let (_store, d) = setup();
        assert_eq!(
            d.execute("memory_subjects", &json!({})).await,
            "No subjects have memories yet."
        );
        d.execute(
            "memory_save",
            &json!({"content": "Adam and Gabby are twins", "category": "relationship", "subject": "gabby, adam"}),
        )
        .await;
        assert_eq!(
            d.execute("memory_subjects", &json!({})).await,
            "Subjects: adam, gabby"
        );
    }

    #[tokio::test]
    async fn test_conversation_search() {
        let (store, d) = setup();
        let conv = store
            .transcripts()
            .create_conversation(Some("Dentist plans"))
            .unwrap();
        store
            .transcripts()
            .add_message(conv, TranscriptRole::User, "book the dentist for Tuesday")
            .unwrap();

        let out = d.execute("conversation_search", &json!({"query": "dentist"})).await;
        assert!(out.starts_with("1 matching message(s):"), "{out}");
        assert!(out.contains("in \"Dentist plans\" (user): "), "{out}");
        assert!(out.contains("[dentist]"), "{out}");

        let none = d.execute("conversation_search", &json!({"query": "orthodontist"})).await;
        assert_eq!(none, "No past conversations mention 'orthodontist'.");
    }

    #[tokio::test]
    async fn test_invalid_category_rejected_before_store() {
        let (store, d) = setup();
        let out = d
            .execute("memory_save", &json!({"content": "x", "category": "gossip"}))
            .await;
        assert!(out.starts_with("Error: Invalid category parameter"), "{out}");
        assert!(store.facts().get_all_memories().unwrap().is_empty());
    }
}
