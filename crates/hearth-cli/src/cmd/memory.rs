//! Store inspection: memories, subjects, correction history, transcript search.

use super::open_store;
use crate::table::{Align, Table};
use crate::ui;
use hearth_types::memory::{Memory, MemoryId};
use std::path::Path;

const CONTENT_WIDTH: usize = 60;

pub fn cmd_memories(
    config: Option<&Path>,
    all: bool,
    subject: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let facts = store.facts();
    let memories = match (subject, all) {
        (Some(subject), _) => facts.get_memories_by_subject(subject)?,
        (None, true) => facts.get_all_memories_including_retired()?,
        (None, false) => facts.get_all_memories()?,
    };
    if memories.is_empty() {
        ui::hint("Nothing remembered yet. Tell Hearth something in `hearth chat`.");
        return Ok(());
    }
    memory_table(&memories).print();
    Ok(())
}

pub fn cmd_history(config: Option<&Path>, id: i64) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let chain = store.facts().get_supersession_chain(MemoryId(id))?;
    if chain.is_empty() {
        anyhow::bail!("Memory #{id} not found");
    }
    ui::section(&format!("History of memory #{id} (newest first)"));
    memory_table(&chain).print();
    Ok(())
}

pub fn cmd_subjects(config: Option<&Path>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let subjects = store.facts().get_all_subjects()?;
    if subjects.is_empty() {
        ui::hint("No memories are filed under a subject yet.");
    }
    for subject in subjects {
        println!("  {subject}");
    }
    Ok(())
}

pub fn cmd_forget(config: Option<&Path>, id: i64) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.facts().delete_memory(MemoryId(id))? {
        ui::success(&format!("Forgot memory #{id}."));
        Ok(())
    } else {
        anyhow::bail!("Memory #{id} not found")
    }
}

pub fn cmd_search(config: Option<&Path>, query: &str, limit: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let hits = store.transcripts().search_transcripts(query, limit)?;
    if hits.is_empty() {
        ui::hint(&format!("No past conversations mention '{query}'."));
        return Ok(());
    }
    let mut table = Table::new(&["Date", "Conversation", "Who", "Excerpt"])
        .max_width(1, 30)
        .max_width(3, CONTENT_WIDTH);
    for hit in &hits {
        let date = hit.message.created_at.format("%Y-%m-%d %H:%M").to_string();
        table.add_row(&[
            date.as_str(),
            hit.conversation_title.as_deref().unwrap_or("Untitled"),
            hit.message.role.as_str(),
            hit.snippet.as_str(),
        ]);
    }
    table.print();
    Ok(())
}

pub fn cmd_conversations(config: Option<&Path>, limit: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let conversations = store.transcripts().list_conversations(limit)?;
    if conversations.is_empty() {
        ui::hint("No conversations yet.");
        return Ok(());
    }
    let mut table = Table::new(&["Id", "Title", "Last active"])
        .align(0, Align::Right)
        .max_width(1, CONTENT_WIDTH);
    for conv in &conversations {
        let id = conv.id.to_string();
        let updated = conv.updated_at.format("%Y-%m-%d %H:%M").to_string();
        table.add_row(&[
            id.as_str(),
            conv.title.as_deref().unwrap_or("Untitled"),
            updated.as_str(),
        ]);
    }
    table.print();
    Ok(())
}

fn memory_table(memories: &[Memory]) -> Table {
    let mut table = Table::new(&["Id", "Category", "Subject", "Confidence", "Memory"])
        .align(0, Align::Right)
        .align(3, Align::Right)
        .max_width(4, CONTENT_WIDTH);
    for memory in memories {
        let confidence = if memory.is_live() {
            format!("{:.2}", memory.confidence)
        } else {
            "retired".to_string()
        };
        let id = memory.id.to_string();
        table.add_row(&[
            id.as_str(),
            memory.category.as_str(),
            memory.subject.as_deref().unwrap_or(""),
            confidence.as_str(),
            memory.content.as_str(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_memory::MemoryStore;
    use hearth_types::memory::{MemoryCategory, MemorySource};

    #[test]
    fn test_memory_table_marks_retired_rows() {
        let store = MemoryStore::open_in_memory().unwrap();
        let facts = store.facts();
        let id = facts
            .add_memory(
                "Levi likes Minecraft",
                MemoryCategory::Preference,
                MemorySource::Explicit,
                Some("levi"),
                1.0,
            )
            .unwrap();
        facts
            .supersede_memory(id, "Levi likes chess now", MemoryCategory::Preference, None)
            .unwrap();

        let all = facts.get_all_memories_including_retired().unwrap();
        let rendered = memory_table(&all).render();
        assert!(rendered.contains("retired"));
        assert!(rendered.contains("1.00"));
        assert!(rendered.contains("Levi likes chess now"));
    }
}
