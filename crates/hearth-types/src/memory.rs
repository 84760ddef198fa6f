//! Memory store types: facts, conversations, and transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a stored memory (fact). Monotonic, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemoryId(pub i64);

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of fact a memory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// Facts about the user themselves.
    Personal,
    /// Likes, dislikes, and habits.
    Preference,
    /// General facts worth keeping.
    Fact,
    /// Things the user wants done.
    Task,
    /// People in the user's life and how they relate.
    Relationship,
}

impl MemoryCategory {
    /// Every category, in display order.
    pub const ALL: [MemoryCategory; 5] = [
        MemoryCategory::Personal,
        MemoryCategory::Preference,
        MemoryCategory::Fact,
        MemoryCategory::Task,
        MemoryCategory::Relationship,
    ];

    /// The persisted (lowercase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Personal => "personal",
            MemoryCategory::Preference => "preference",
            MemoryCategory::Fact => "fact",
            MemoryCategory::Task => "task",
            MemoryCategory::Relationship => "relationship",
        }
    }

    /// Heading used when rendering memories into the system prompt.
    pub fn heading(&self) -> &'static str {
        match self {
            MemoryCategory::Personal => "Personal",
            MemoryCategory::Preference => "Preferences",
            MemoryCategory::Fact => "Facts",
            MemoryCategory::Task => "Tasks",
            MemoryCategory::Relationship => "Relationships",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(MemoryCategory::Personal),
            "preference" => Ok(MemoryCategory::Preference),
            "fact" => Ok(MemoryCategory::Fact),
            "task" => Ok(MemoryCategory::Task),
            "relationship" => Ok(MemoryCategory::Relationship),
            other => Err(format!("unknown memory category '{other}'")),
        }
    }
}

/// How a memory came to be known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    /// The user said it outright.
    Explicit,
    /// The assistant inferred it from context.
    Inferred,
}

impl MemorySource {
    /// The persisted (lowercase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemorySource::Explicit => "explicit",
            MemorySource::Inferred => "inferred",
        }
    }
}

impl fmt::Display for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explicit" => Ok(MemorySource::Explicit),
            "inferred" => Ok(MemorySource::Inferred),
            other => Err(format!("unknown memory source '{other}'")),
        }
    }
}

/// A stored fact about the user.
///
/// A memory with `confidence == 0.0` has been retired (superseded by a
/// correction) and is excluded from normal reads, but the row is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique, monotonic id.
    pub id: MemoryId,
    /// The fact itself.
    pub content: String,
    /// What kind of fact this is.
    pub category: MemoryCategory,
    /// Whether the user stated it or it was inferred.
    pub source: MemorySource,
    /// Comma-joined lowercase subject tokens, e.g. `"adam,gabby"`.
    pub subject: Option<String>,
    /// Confidence in [0, 1]. Zero means retired.
    pub confidence: f64,
    /// The earlier memory this one corrects.
    pub supersedes: Option<MemoryId>,
    /// When this row was written.
    pub created_at: DateTime<Utc>,
    /// When this row last changed.
    pub updated_at: DateTime<Utc>,
    /// When the user last confirmed this fact.
    pub last_confirmed: DateTime<Utc>,
}

impl Memory {
    /// Whether this memory is still live (not retired by a correction).
    pub fn is_live(&self) -> bool {
        self.confidence > 0.0
    }

    /// Whether this memory is held with less than full confidence.
    pub fn is_uncertain(&self) -> bool {
        self.confidence < 1.0
    }

    /// The individual subject tokens of this memory.
    pub fn subjects(&self) -> Vec<&str> {
        self.subject
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Speaker of a persisted transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    /// The human.
    User,
    /// The assistant.
    Assistant,
}

impl TranscriptRole {
    /// The persisted (lowercase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for TranscriptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranscriptRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TranscriptRole::User),
            "assistant" => Ok(TranscriptRole::Assistant),
            other => Err(format!("unknown transcript role '{other}'")),
        }
    }
}

/// A stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique id.
    pub id: ConversationId,
    /// Short human-readable title.
    pub title: Option<String>,
    /// Optional summary of the conversation so far.
    pub summary: Option<String>,
    /// When the conversation started.
    pub created_at: DateTime<Utc>,
    /// Bumped on every new message.
    pub updated_at: DateTime<Utc>,
}

/// A single persisted transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique id.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Who said it.
    pub role: TranscriptRole,
    /// What was said.
    pub content: String,
    /// When it was written.
    pub created_at: DateTime<Utc>,
}

/// A full-text search hit over the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptHit {
    /// The matching message.
    pub message: ConversationMessage,
    /// Title of the owning conversation.
    pub conversation_title: Option<String>,
    /// Excerpt around the match with `[` `]` around matched terms.
    pub snippet: String,
}
