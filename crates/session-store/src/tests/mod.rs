use tempfile::TempDir;

use crate::{FileBackend, SessionRecord, SessionStore, SqliteBackend, TimerSetting};

fn test_db() -> SqliteBackend {
    SqliteBackend::open_in_memory().expect("Failed to create test DB")
}

fn test_record(id: &str) -> SessionRecord {
    SessionRecord {
        id: id.into(),
        layout: "template-phone".into(),
        photos: vec!["data:image/png;base64,AAAA".into()],
        timer: TimerSetting::Three,
        created_at: 1_700_000_000_000,
    }
}

fn test_store(dir: &TempDir) -> SessionStore {
    SessionStore::new(Some(test_db()), FileBackend::new(dir.path()))
}

mod record;
