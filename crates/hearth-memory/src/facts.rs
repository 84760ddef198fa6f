//! Fact store: versioned memories about the user.
//!
//! A correction never destroys history. `supersede_memory` inserts the new
//! fact with a back-reference to the old one and then retires the old row by
//! zeroing its confidence, both inside one transaction. Retired rows stay
//! readable by id but are excluded from every other read.

use crate::{now_timestamp, parse_timestamp, prompt};
use hearth_types::error::{HearthError, HearthResult};
use hearth_types::memory::{Memory, MemoryCategory, MemoryId, MemorySource};
use rusqlite::{Connection, OptionalExtension};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const MEMORY_COLUMNS: &str = "id, content, category, source, subject, confidence, supersedes, \
                              created_at, updated_at, last_confirmed";

/// How many leading content words `find_similar_memories` searches on.
const SIMILARITY_KEYWORDS: usize = 3;

/// Fact store backed by SQLite.
#[derive(Clone)]
pub struct FactStore {
    conn: Arc<Mutex<Connection>>,
}

impl FactStore {
    /// Create a new fact store wrapping the given connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> HearthResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HearthError::Internal(e.to_string()))
    }

    /// Store a new memory. Always inserts a fresh row.
    pub fn add_memory(
        &self,
        content: &str,
        category: MemoryCategory,
        source: MemorySource,
        subject: Option<&str>,
        confidence: f64,
    ) -> HearthResult<MemoryId> {
        let conn = self.lock()?;
        let now = now_timestamp();
        let subject = subject.and_then(normalize_subject);
        conn.execute(
            "INSERT INTO memories (content, category, source, subject, confidence, created_at, updated_at, last_confirmed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?6)",
            rusqlite::params![
                content,
                category.as_str(),
                source.as_str(),
                subject,
                confidence.clamp(0.0, 1.0),
                now,
            ],
        )
        .map_err(|e| HearthError::Memory(e.to_string()))?;
        let id = MemoryId(conn.last_insert_rowid());
        debug!(memory_id = %id, category = %category, "Stored memory");
        Ok(id)
    }

    /// Correct an existing memory.
    ///
    /// Returns `Ok(None)` when `old_id` does not exist. Otherwise inserts the
    /// corrected fact (inheriting the old subject unless one is given) and
    /// retires the old row, atomically.
    pub fn supersede_memory(
        &self,
        old_id: MemoryId,
        new_content: &str,
        category: MemoryCategory,
        subject: Option<&str>,
    ) -> HearthResult<Option<MemoryId>> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| HearthError::Memory(e.to_string()))?;

        let old_subject: Option<Option<String>> = tx
            .query_row(
                "SELECT subject FROM memories WHERE id = ?1",
                [old_id.0],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let Some(old_subject) = old_subject else {
            debug!(memory_id = %old_id, "Supersede target not found");
            return Ok(None);
        };

        let subject = subject.and_then(normalize_subject).or(old_subject);
        let now = now_timestamp();

        // Insert before tombstoning: the new fact must exist before the old one is retired.
        tx.execute(
            "INSERT INTO memories (content, category, source, subject, confidence, supersedes, created_at, updated_at, last_confirmed)
             VALUES (?1, ?2, ?3, ?4, 1.0, ?5, ?6, ?6, ?6)",
            rusqlite::params![
                new_content,
                category.as_str(),
                MemorySource::Explicit.as_str(),
                subject,
                old_id.0,
                now,
            ],
        )
        .map_err(|e| HearthError::Memory(e.to_string()))?;
        let new_id = MemoryId(tx.last_insert_rowid());

        tx.execute(
            "UPDATE memories SET confidence = 0.0, updated_at = ?2 WHERE id = ?1",
            rusqlite::params![old_id.0, now],
        )
        .map_err(|e| HearthError::Memory(e.to_string()))?;

        tx.commit()
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        info!(old = %old_id, new = %new_id, "Memory superseded");
        Ok(Some(new_id))
    }

    /// Hard-delete a memory. Used only when the user asks to forget something.
    pub fn delete_memory(&self, id: MemoryId) -> HearthResult<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM memories WHERE id = ?1", [id.0])
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        if deleted > 0 {
            info!(memory_id = %id, "Memory deleted");
        }
        Ok(deleted > 0)
    }

    /// Fetch a memory by id, retired or not.
    pub fn get_memory(&self, id: MemoryId) -> HearthResult<Option<Memory>> {
        let conn = self.lock()?;
        get_memory_on(&conn, id)
    }

    /// Mark a live memory as re-confirmed by the user.
    pub fn confirm_memory(&self, id: MemoryId) -> HearthResult<bool> {
        let conn = self.lock()?;
        let now = now_timestamp();
        let updated = conn
            .execute(
                "UPDATE memories SET last_confirmed = ?2, updated_at = ?2
                 WHERE id = ?1 AND confidence > 0",
                rusqlite::params![id.0, now],
            )
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        Ok(updated > 0)
    }

    /// All live memories, most confident then most recent first.
    pub fn get_all_memories(&self) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        query_memories(
            &conn,
            &format!(
                "SELECT {MEMORY_COLUMNS} FROM memories WHERE confidence > 0
                 ORDER BY confidence DESC, created_at DESC, id DESC"
            ),
            rusqlite::params![],
        )
    }

    /// Every memory including retired rows, oldest first.
    pub fn get_all_memories_including_retired(&self) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        query_memories(
            &conn,
            &format!("SELECT {MEMORY_COLUMNS} FROM memories ORDER BY id"),
            rusqlite::params![],
        )
    }

    /// Substring search over live memories.
    pub fn search_memories(&self, keyword: &str) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        search_on(&conn, keyword)
    }

    /// Live memories tagged with `subject`.
    ///
    /// The stored field is a comma-joined token list, so a match is the whole
    /// field, or the token at the start, in the middle, or at the end.
    pub fn get_memories_by_subject(&self, subject: &str) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        by_subject_on(&conn, subject)
    }

    /// Every distinct subject token across live memories, sorted.
    pub fn get_all_subjects(&self) -> HearthResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT subject FROM memories WHERE confidence > 0 AND subject IS NOT NULL")
            .map_err(|e| HearthError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| HearthError::Memory(e.to_string()))?;

        let mut subjects = BTreeSet::new();
        for row in rows {
            let field = row.map_err(|e| HearthError::Memory(e.to_string()))?;
            for token in field.split(',') {
                let token = token.trim().to_lowercase();
                if !token.is_empty() {
                    subjects.insert(token);
                }
            }
        }
        Ok(subjects.into_iter().collect())
    }

    /// Lexical near-duplicates of `content`: everything filed under `subject`,
    /// then keyword hits on the first few words longer than three characters.
    pub fn find_similar_memories(
        &self,
        content: &str,
        subject: Option<&str>,
    ) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        let mut seen = HashSet::new();
        let mut similar = Vec::new();

        if let Some(subject) = subject.and_then(normalize_subject) {
            for token in subject.split(',') {
                for memory in by_subject_on(&conn, token)? {
                    if seen.insert(memory.id) {
                        similar.push(memory);
                    }
                }
            }
        }

        let keywords = content
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 3)
            .take(SIMILARITY_KEYWORDS);
        for keyword in keywords {
            for memory in search_on(&conn, keyword)? {
                if seen.insert(memory.id) {
                    similar.push(memory);
                }
            }
        }
        Ok(similar)
    }

    /// The correction history ending at `id`: the row itself, then each row it
    /// superseded, back to the original. Missing ancestors end the chain.
    pub fn get_supersession_chain(&self, id: MemoryId) -> HearthResult<Vec<Memory>> {
        let conn = self.lock()?;
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if !seen.insert(current) {
                break;
            }
            match get_memory_on(&conn, current)? {
                Some(memory) => {
                    next = memory.supersedes;
                    chain.push(memory);
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// All live memories formatted for insertion into the system prompt.
    pub fn render_for_prompt(&self) -> HearthResult<String> {
        let memories = self.get_all_memories()?;
        Ok(prompt::render_memories(&memories))
    }
}

/// Trim, lowercase, and de-duplicate a comma-separated subject list.
/// Returns `None` when no tokens remain.
pub fn normalize_subject(raw: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let tokens: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(","))
    }
}

/// Escape LIKE wildcards so user text matches literally (used with `ESCAPE '\'`).
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn get_memory_on(conn: &Connection, id: MemoryId) -> HearthResult<Option<Memory>> {
    conn.query_row(
        &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"),
        [id.0],
        row_to_memory,
    )
    .optional()
    .map_err(|e| HearthError::Memory(e.to_string()))
}

fn search_on(conn: &Connection, keyword: &str) -> HearthResult<Vec<Memory>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(keyword));
    query_memories(
        conn,
        &format!(
            "SELECT {MEMORY_COLUMNS} FROM memories
             WHERE confidence > 0 AND content LIKE ?1 ESCAPE '\\'
             ORDER BY confidence DESC, created_at DESC, id DESC"
        ),
        rusqlite::params![pattern],
    )
}

fn by_subject_on(conn: &Connection, subject: &str) -> HearthResult<Vec<Memory>> {
    let subject = subject.trim().to_lowercase();
    if subject.is_empty() {
        return Ok(Vec::new());
    }
    let escaped = escape_like(&subject);
    let prefix = format!("{escaped},%");
    let suffix = format!("%,{escaped}");
    let middle = format!("%,{escaped},%");
    query_memories(
        conn,
        &format!(
            "SELECT {MEMORY_COLUMNS} FROM memories
             WHERE confidence > 0
               AND (subject = ?1
                    OR subject LIKE ?2 ESCAPE '\\'
                    OR subject LIKE ?3 ESCAPE '\\'
                    OR subject LIKE ?4 ESCAPE '\\')
             ORDER BY confidence DESC, created_at DESC, id DESC"
        ),
        rusqlite::params![subject, prefix, suffix, middle],
    )
}

fn query_memories(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> HearthResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| HearthError::Memory(e.to_string()))?;
    let rows = stmt
        .query_map(params, row_to_memory)
        .map_err(|e| HearthError::Memory(e.to_string()))?;
    let mut memories = Vec::new();
    for row in rows {
        memories.push(row.map_err(|e| HearthError::Memory(e.to_string()))?);
    }
    Ok(memories)
}

fn row_to_memory(row: &rusqlite::Row<'_>) -> rusqlite::Result<Memory> {
    let category: String = row.get(2)?;
    let source: String = row.get(3)?;
    let created: String = row.get(7)?;
    let updated: String = row.get(8)?;
    let confirmed: String = row.get(9)?;
    Ok(Memory {
        id: MemoryId(row.get(0)?),
        content: row.get(1)?,
        category: category.parse().unwrap_or(MemoryCategory::Fact),
        source: source.parse().unwrap_or(MemorySource::Inferred),
        subject: row.get(4)?,
        confidence: row.get(5)?,
        supersedes: row.get::<_, Option<i64>>(6)?.map(MemoryId),
        created_at: parse_timestamp(&created),
        updated_at: parse_timestamp(&updated),
        last_confirmed: parse_timestamp(&confirmed),
    })
}
