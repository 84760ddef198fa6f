//! Memory store for the Hearth personal assistant.
//!
//! One SQLite database holds two stores that share a single connection:
//! - **Fact store**: versioned memories about the user. Corrections never
//!   delete history; they insert a new row and retire the old one.
//! - **Transcript store**: conversations and their messages, with an FTS5
//!   index over message content kept in sync by triggers.
//!
//! Callers normally go through [`MemoryStore`], which owns the connection.

pub mod facts;
pub mod migration;
pub mod prompt;
pub mod transcript;

mod store;
pub use store::MemoryStore;

/// Timestamp format used for every stored date (fixed width, so text order is time order).
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, falling back to now for malformed rows.
pub(crate) fn parse_timestamp(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now())
}
