//! SQLite session backend.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};

use crate::{SessionBackend, SessionRecord, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON sessions(created_at);
"#;

/// Thread-safe handle wrapping a single SQLite connection.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.with_conn(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA busy_timeout=5000;",
            )?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })?;
        Ok(db)
    }

    /// Access the underlying connection with a closure.
    pub fn with_conn<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Connection) -> Result<R, StoreError>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

}

impl SessionBackend for SqliteBackend {
    fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, payload, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET payload = ?2",
                rusqlite::params![record.id, payload, record.created_at],
            )?;
            Ok(())
        })
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let payload = self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT payload FROM sessions WHERE id = ?1", [id], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(value)
        })?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn prune_older_than(&self, cutoff_ms: i64) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM sessions WHERE created_at < ?1", [cutoff_ms])?;
            Ok(n)
        })
    }
}
