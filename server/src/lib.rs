//! Photobooth server: session storage, print rendering and sharing over HTTP.

pub mod app;
pub mod background;
pub mod config;
pub mod server;
pub mod services;

use std::path::PathBuf;

use session_store::{FileBackend, SessionStore, SqliteBackend};

use config::AppConfig;

/// Determine the data directory for the application.
/// Priority: PHOTOBOOTH_DATA_DIR env var > ~/.photobooth
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PHOTOBOOTH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".photobooth")
}

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Open the session store under `dir`. A database that cannot be opened
/// leaves the store running on JSON files only.
pub fn open_store(dir: &std::path::Path) -> SessionStore {
    let db_path = dir.join("sessions.db");
    tracing::info!("Opening session database at {}", db_path.display());
    let primary = match SqliteBackend::open(&db_path) {
        Ok(db) => Some(db),
        Err(e) => {
            tracing::error!("Failed to open session database: {e}");
            None
        }
    };
    SessionStore::new(primary, FileBackend::new(dir.join("sessions")))
}

/// Load environment, create the data directory, open storage and config.
pub fn init_foundation() -> Result<(SessionStore, AppConfig), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let store = open_store(&dir);
    let config = AppConfig::load();

    tracing::info!(
        port = config.server_port,
        base_url = %config.public_base_url,
        uploads = config.cloudinary.is_configured(),
        retention_hours = config.session_retention_hours,
        "Settings loaded"
    );
    Ok((store, config))
}
