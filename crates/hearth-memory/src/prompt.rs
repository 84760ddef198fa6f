//! Rendering of stored memories into a system-prompt block.

use hearth_types::memory::{Memory, MemoryCategory};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Format live memories for the system prompt.
///
/// Memories with a subject are grouped under that subject (alphabetical);
/// the rest are grouped by category. Anything held with less than full
/// confidence is marked "(uncertain)". Returns an empty string when there
/// is nothing to render.
pub fn render_memories(memories: &[Memory]) -> String {
    let live: Vec<&Memory> = memories.iter().filter(|m| m.is_live()).collect();
    if live.is_empty() {
        return String::new();
    }

    let mut by_subject: BTreeMap<String, Vec<&Memory>> = BTreeMap::new();
    let mut by_category: BTreeMap<MemoryCategory, Vec<&Memory>> = BTreeMap::new();
    for memory in live {
        match memory.subject.as_deref().filter(|s| !s.is_empty()) {
            Some(_) => by_subject
                .entry(memory.subjects().join(", "))
                .or_default()
                .push(memory),
            None => by_category.entry(memory.category).or_default().push(memory),
        }
    }

    let mut out = String::from("## What you remember about the user\n");
    for (subject, group) in &by_subject {
        let _ = write!(out, "\n### About {subject}\n");
        for memory in group {
            push_line(&mut out, memory);
        }
    }
    for category in MemoryCategory::ALL {
        if let Some(group) = by_category.get(&category) {
            let _ = write!(out, "\n### {}\n", category.heading());
            for memory in group {
                push_line(&mut out, memory);
            }
        }
    }
    out
}

fn push_line(out: &mut String, memory: &Memory) {
    let _ = write!(out, "- {} [#{}]", memory.content, memory.id);
    if memory.is_uncertain() {
        out.push_str(" (uncertain)");
    }
    out.push('\n');
}
