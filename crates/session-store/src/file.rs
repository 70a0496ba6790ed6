//! JSON-file session backend, one file per session.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::record::is_valid_id;
use crate::{SessionBackend, SessionRecord, StoreError};

const FILE_PREFIX: &str = "photobooth-session-";

#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Use `dir` for session files. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a session id. Ids outside `[A-Za-z0-9_-]` are rejected.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{FILE_PREFIX}{id}.json")))
    }
}

impl SessionBackend for FileBackend {
    fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(record)?;
        // Replace atomically.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let path = self.path_for(id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Scans the session directory. Files that are not session records, or
    /// that fail to parse, are left alone.
    fn prune_older_than(&self, cutoff_ms: i64) -> Result<usize, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_session = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(".json"));
            if !is_session {
                continue;
            }
            let record = match fs::read(&path)
                .map_err(StoreError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<SessionRecord>(&bytes)?))
            {
                Ok(record) => record,
                Err(e) => {
                    debug!(path = %path.display(), "Skipping unreadable session file: {e}");
                    continue;
                }
            };
            if record.created_at < cutoff_ms {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
