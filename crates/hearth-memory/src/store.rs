//! The memory store: one SQLite connection shared by the fact and transcript stores.

use crate::facts::FactStore;
use crate::migration::run_migrations;
use crate::transcript::TranscriptStore;
use hearth_types::error::{HearthError, HearthResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Single-writer memory store.
///
/// Every read and write goes through one connection behind a mutex, so
/// clones of this handle can be shared freely across tasks.
#[derive(Clone)]
pub struct MemoryStore {
    facts: FactStore,
    transcripts: TranscriptStore,
}

impl MemoryStore {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> HearthResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| HearthError::Memory(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Opened memory store");
        Ok(store)
    }

    /// An in-memory store, used by tests and ephemeral sessions.
    pub fn open_in_memory() -> HearthResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| HearthError::Memory(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> HearthResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        run_migrations(&conn).map_err(|e| HearthError::Memory(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self {
            facts: FactStore::new(Arc::clone(&conn)),
            transcripts: TranscriptStore::new(conn),
        })
    }

    /// Versioned facts about the user.
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Conversations and full-text transcript search.
    pub fn transcripts(&self) -> &TranscriptStore {
        &self.transcripts
    }
}
