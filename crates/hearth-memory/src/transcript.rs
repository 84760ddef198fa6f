//! Transcript store: conversations, their messages, and full-text search.
//!
//! The `messages_fts` index is maintained by triggers on `messages`, so every
//! insert, update, and delete of a row updates the index in the same statement.

use crate::{now_timestamp, parse_timestamp};
use hearth_types::error::{HearthError, HearthResult};
use hearth_types::memory::{
    Conversation, ConversationId, ConversationMessage, TranscriptHit, TranscriptRole,
};
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Transcript store backed by SQLite + FTS5.
#[derive(Clone)]
pub struct TranscriptStore {
    conn: Arc<Mutex<Connection>>,
}

impl TranscriptStore {
    /// Create a new transcript store wrapping the given connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> HearthResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HearthError::Internal(e.to_string()))
    }

    /// Start a new conversation.
    pub fn create_conversation(&self, title: Option<&str>) -> HearthResult<ConversationId> {
        let conn = self.lock()?;
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO conversations (title, created_at, updated_at) VALUES (?1, ?2, ?2)",
            rusqlite::params![title, now],
        )
        .map_err(|e| HearthError::Memory(e.to_string()))?;
        let id = ConversationId(conn.last_insert_rowid());
        debug!(conversation_id = %id, "Created conversation");
        Ok(id)
    }

    /// Fetch one conversation.
    pub fn get_conversation(&self, id: ConversationId) -> HearthResult<Option<Conversation>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, title, summary, created_at, updated_at FROM conversations WHERE id = ?1",
            [id.0],
            row_to_conversation,
        )
        .optional()
        .map_err(|e| HearthError::Memory(e.to_string()))
    }

    /// Most recently active conversations first.
    pub fn list_conversations(&self, limit: usize) -> HearthResult<Vec<Conversation>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, summary, created_at, updated_at FROM conversations
                 ORDER BY updated_at DESC, id DESC LIMIT ?1",
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map([limit as i64], row_to_conversation)
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let mut conversations = Vec::new();
        for row in rows {
            conversations.push(row.map_err(|e| HearthError::Memory(e.to_string()))?);
        }
        Ok(conversations)
    }

    /// Set a conversation's title.
    pub fn update_conversation_title(&self, id: ConversationId, title: &str) -> HearthResult<bool> {
        self.update_conversation_field(id, "title", title)
    }

    /// Set a conversation's summary.
    pub fn update_conversation_summary(
        &self,
        id: ConversationId,
        summary: &str,
    ) -> HearthResult<bool> {
        self.update_conversation_field(id, "summary", summary)
    }

    fn update_conversation_field(
        &self,
        id: ConversationId,
        column: &str,
        value: &str,
    ) -> HearthResult<bool> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                &format!("UPDATE conversations SET {column} = ?2, updated_at = ?3 WHERE id = ?1"),
                rusqlite::params![id.0, value, now_timestamp()],
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        Ok(updated > 0)
    }

    /// Append a message and bump the conversation's `updated_at`.
    pub fn add_message(
        &self,
        conversation_id: ConversationId,
        role: TranscriptRole,
        content: &str,
    ) -> HearthResult<i64> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let now = now_timestamp();

        let touched = tx
            .execute(
                "UPDATE conversations SET updated_at = ?2 WHERE id = ?1",
                rusqlite::params![conversation_id.0, now],
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        if touched == 0 {
            return Err(HearthError::Memory(format!(
                "Conversation not found: {conversation_id}"
            )));
        }

        tx.execute(
            "INSERT INTO messages (conversation_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![conversation_id.0, role.as_str(), content, now],
        )
        .map_err(|e| HearthError::Memory(e.to_string()))?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        Ok(id)
    }

    /// All messages of a conversation, oldest first.
    pub fn get_messages(
        &self,
        conversation_id: ConversationId,
    ) -> HearthResult<Vec<ConversationMessage>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, created_at FROM messages
                 WHERE conversation_id = ?1 ORDER BY created_at, id",
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map([conversation_id.0], row_to_message)
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row.map_err(|e| HearthError::Memory(e.to_string()))?);
        }
        Ok(messages)
    }

    /// Full-text search across every conversation, best matches first.
    pub fn search_transcripts(
        &self,
        query: &str,
        limit: usize,
    ) -> HearthResult<Vec<TranscriptHit>> {
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT m.id, m.conversation_id, m.role, m.content, m.created_at,
                        c.title,
                        snippet(messages_fts, 0, '[', ']', '…', 12)
                 FROM messages_fts
                 JOIN messages m ON m.id = messages_fts.rowid
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE messages_fts MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params![fts_query, limit as i64], |row| {
                Ok(TranscriptHit {
                    message: row_to_message(row)?,
                    conversation_title: row.get(5)?,
                    snippet: row.get(6)?,
                })
            })
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let mut hits = Vec::new();
        for row in rows {
            hits.push(row.map_err(|e| HearthError::Memory(e.to_string()))?);
        }
        debug!(query, hits = hits.len(), "Transcript search");
        Ok(hits)
    }

    /// Delete a conversation with all its messages and their index entries.
    pub fn delete_conversation(&self, id: ConversationId) -> HearthResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        // Explicit delete so the FTS trigger fires for every row.
        tx.execute("DELETE FROM messages WHERE conversation_id = ?1", [id.0])
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM conversations WHERE id = ?1", [id.0])
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        tx.commit()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        if deleted > 0 {
            debug!(conversation_id = %id, "Deleted conversation");
        }
        Ok(deleted > 0)
    }
}

/// Turn free text into an FTS5 query of quoted terms (implicit AND).
///
/// Quoting every term keeps user punctuation (`-`, `:`, `*`, quotes) from
/// being parsed as FTS syntax. Returns `None` when no terms remain.
pub fn build_fts_query(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    let created: String = row.get(3)?;
    let updated: String = row.get(4)?;
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        title: row.get(1)?,
        summary: row.get(2)?,
        created_at: parse_timestamp(&created),
        updated_at: parse_timestamp(&updated),
    })
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationMessage> {
    let role: String = row.get(2)?;
    let created: String = row.get(4)?;
    Ok(ConversationMessage {
        id: row.get(0)?,
        conversation_id: ConversationId(row.get(1)?),
        role: role.parse().unwrap_or(TranscriptRole::User),
        content: row.get(3)?,
        created_at: parse_timestamp(&created),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::run_migrations;

    fn setup() -> (TranscriptStore, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        run_migrations(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (TranscriptStore::new(conn.clone()), conn)
    }

    fn fts_count(conn: &Arc<Mutex<Connection>>, term: &str) -> i64 {
        conn.lock()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM messages_fts WHERE messages_fts MATCH ?1",
                [term],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_messages_in_order_and_updated_at_bumped() {
        let (store, _) = setup();
        let conv = store.create_conversation(Some("Morning")).unwrap();
        let before = store.get_conversation(conv).unwrap().unwrap().updated_at;

        store
            .add_message(conv, TranscriptRole::User, "what's on my calendar today")
            .unwrap();
        store
            .add_message(conv, TranscriptRole::Assistant, "Two meetings.")
            .unwrap();

        let messages = store.get_messages(conv).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, TranscriptRole::User);
        assert_eq!(messages[1].content, "Two meetings.");
        let after = store.get_conversation(conv).unwrap().unwrap().updated_at;
        assert!(after >= before);
    }

    #[test]
    fn test_add_message_to_missing_conversation_fails() {
        let (store, _) = setup();
        assert!(store
            .add_message(ConversationId(42), TranscriptRole::User, "hi")
            .is_err());
    }

    #[test]
    fn test_search_joins_conversation_metadata() {
        let (store, _) = setup();
        let trip = store.create_conversation(Some("Trip planning")).unwrap();
        let other = store.create_conversation(None).unwrap();
        store
            .add_message(trip, TranscriptRole::User, "Book the lighthouse cabin in Mendocino")
            .unwrap();
        store
            .add_message(other, TranscriptRole::User, "Groceries: eggs, milk")
            .unwrap();

        let hits = store.search_transcripts("lighthouse", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message.conversation_id, trip);
        assert_eq!(hits[0].conversation_title.as_deref(), Some("Trip planning"));
        assert!(hits[0].snippet.contains("[lighthouse]"));
    }

    #[test]
    fn test_search_ranks_stronger_match_first() {
        let (store, _) = setup();
        let weak = store.create_conversation(Some("Errands")).unwrap();
        let strong = store.create_conversation(Some("Teeth")).unwrap();
        store
            .add_message(
                weak,
                TranscriptRole::User,
                "Pick up the dry cleaning, buy stamps, water the garden, call the plumber \
                 about the leaking sink, and maybe ask about the dentist sometime next month",
            )
            .unwrap();
        store
            .add_message(strong, TranscriptRole::User, "Dentist Tuesday: dentist said floss")
            .unwrap();

        let hits = store.search_transcripts("dentist", 50).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].message.conversation_id, strong);
        assert_eq!(hits[1].message.conversation_id, weak);
    }

    #[test]
    fn test_search_respects_limit_and_odd_input() {
        let (store, _) = setup();
        let conv = store.create_conversation(None).unwrap();
        for i in 0..5 {
            store
                .add_message(conv, TranscriptRole::User, &format!("dentist note {i}"))
                .unwrap();
        }
        assert_eq!(store.search_transcripts("dentist", 3).unwrap().len(), 3);
        assert_eq!(store.search_transcripts("\"dentist\" -note:", 50).unwrap().len(), 5);
        assert!(store.search_transcripts("  ?! ", 50).unwrap().is_empty());
    }

    #[test]
    fn test_delete_conversation_cascades_to_index() {
        let (store, conn) = setup();
        let conv = store.create_conversation(None).unwrap();
        store
            .add_message(conv, TranscriptRole::User, "zeppelin tickets")
            .unwrap();
        assert_eq!(fts_count(&conn, "zeppelin"), 1);

        assert!(store.delete_conversation(conv).unwrap());
        assert_eq!(fts_count(&conn, "zeppelin"), 0);
        assert!(store.get_messages(conv).unwrap().is_empty());
        assert!(store.get_conversation(conv).unwrap().is_none());
        assert!(!store.delete_conversation(conv).unwrap());
    }

    #[test]
    fn test_index_follows_row_updates() {
        let (store, conn) = setup();
        let conv = store.create_conversation(None).unwrap();
        let id = store
            .add_message(conv, TranscriptRole::User, "original walrus")
            .unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "UPDATE messages SET content = 'edited narwhal' WHERE id = ?1",
                [id],
            )
            .unwrap();
        assert_eq!(fts_count(&conn, "walrus"), 0);
        assert_eq!(fts_count(&conn, "narwhal"), 1);
    }

    #[test]
    fn test_list_and_update_conversations() {
        let (store, _) = setup();
        let a = store.create_conversation(Some("a")).unwrap();
        let b = store.create_conversation(Some("b")).unwrap();
        store.add_message(a, TranscriptRole::User, "bump").unwrap();
        assert!(store.update_conversation_summary(b, "short chat").unwrap());
        assert!(store.update_conversation_title(a, "renamed").unwrap());

        let listed = store.list_conversations(10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a);
        assert_eq!(listed[0].title.as_deref(), Some("renamed"));
        assert_eq!(
            store.get_conversation(b).unwrap().unwrap().summary.as_deref(),
            Some("short chat")
        );
        assert!(!store
            .update_conversation_title(ConversationId(99), "x")
            .unwrap());
    }

    #[test]
    fn test_build_fts_query() {
        assert_eq!(build_fts_query("lighthouse cabin"), Some("\"lighthouse\" \"cabin\"".into()));
        assert_eq!(build_fts_query("it's"), Some("\"it's\"".into()));
        assert_eq!(build_fts_query("***"), None);
    }
}
