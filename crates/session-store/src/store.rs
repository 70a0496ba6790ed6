//! Primary/fallback session store with boolean results.

use tracing::{debug, info, warn};

use crate::{
    FileBackend, SessionBackend, SessionPatch, SessionRecord, SqliteBackend, TimerSetting,
};

/// Session store that tries SQLite first and falls back to JSON files.
#[derive(Clone)]
pub struct SessionStore {
    primary: Option<SqliteBackend>,
    fallback: FileBackend,
}

impl SessionStore {
    pub fn new(primary: Option<SqliteBackend>, fallback: FileBackend) -> Self {
        if primary.is_none() {
            warn!(dir = %fallback.dir().display(), "No primary session backend, using files only");
        }
        Self { primary, fallback }
    }

    /// Persist `record`. Returns `false` only when both backends fail.
    pub fn save(&self, record: &SessionRecord) -> bool {
        if let Some(db) = &self.primary {
            match db.put(record) {
                Ok(()) => return true,
                Err(e) => warn!(id = %record.id, "Primary session save failed: {e}"),
            }
        }
        match self.fallback.put(record) {
            Ok(()) => true,
            Err(e) => {
                warn!(id = %record.id, "Fallback session save failed: {e}");
                false
            }
        }
    }

    /// Load a session from the primary backend, else the fallback.
    pub fn load(&self, id: &str) -> Option<SessionRecord> {
        if let Some(db) = &self.primary {
            match db.get(id) {
                Ok(Some(record)) => return Some(record),
                Ok(None) => debug!(id, "Session not in primary backend"),
                Err(e) => warn!(id, "Primary session load failed: {e}"),
            }
        }
        match self.fallback.get(id) {
            Ok(found) => found,
            Err(e) => {
                warn!(id, "Fallback session load failed: {e}");
                None
            }
        }
    }

    /// Merge `patch` into an existing session. Returns `false` when the
    /// session does not exist or cannot be saved.
    pub fn update(&self, id: &str, patch: SessionPatch) -> bool {
        let Some(mut record) = self.load(id) else {
            debug!(id, "Update for unknown session");
            return false;
        };
        record.merge(patch);
        self.save(&record)
    }

    /// Remove sessions created before `cutoff_ms` from both backends.
    /// Returns the total number removed; backend failures are logged.
    pub fn prune_older_than(&self, cutoff_ms: i64) -> usize {
        let mut removed = 0;
        if let Some(db) = &self.primary {
            match db.prune_older_than(cutoff_ms) {
                Ok(n) => removed += n,
                Err(e) => warn!("Primary session prune failed: {e}"),
            }
        }
        match self.fallback.prune_older_than(cutoff_ms) {
            Ok(n) => removed += n,
            Err(e) => warn!("Fallback session prune failed: {e}"),
        }
        if removed > 0 {
            info!(removed, cutoff_ms, "Pruned expired sessions");
        }
        removed
    }

    /// Create and persist a new session with a fresh id.
    pub fn create(
        &self,
        layout: &str,
        photos: Vec<String>,
        timer: TimerSetting,
    ) -> Option<SessionRecord> {
        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            layout: layout.to_string(),
            photos,
            timer,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.save(&record).then_some(record)
    }
}
