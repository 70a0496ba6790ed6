//! Session persistence for the photobooth: a SQLite primary backend with a
//! JSON-file fallback.
//!
//! Callers go through [`SessionStore`], which never returns errors. Backend
//! failures are logged and reported as `false` / `None`.

pub mod file;
pub mod record;
pub mod sqlite;
pub mod store;

pub use file::FileBackend;
pub use record::{SessionPatch, SessionRecord, TimerSetting, is_valid_id};
pub use sqlite::SqliteBackend;
pub use store::SessionStore;

/// A key-value backend addressed by session id.
pub trait SessionBackend {
    /// Insert or replace a record.
    fn put(&self, record: &SessionRecord) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Remove records created before `cutoff_ms` (Unix millis). Returns the
    /// number removed.
    fn prune_older_than(&self, cutoff_ms: i64) -> Result<usize, StoreError>;
}

/// Session storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Invalid session id: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests;
