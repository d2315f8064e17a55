mod config;
mod kv;
mod persistence;
mod sqlite;

pub use config::{
    AlarmsConfig, Config, CountdownConfig, NotificationsConfig, StopwatchConfig, StorageConfig,
};
pub use kv::{KvStore, MemoryStore};
pub use persistence::Persistence;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

/// Record names in the key-value store.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const ALARMS: &str = "alarms";
    pub const STOPWATCH: &str = "stopwatch";
    pub const TIMER_LABELS: &str = "timerLabels";
}

/// Returns `~/.config/clockwork[-dev]/` based on CLOCKWORK_ENV.
///
/// Set CLOCKWORK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CLOCKWORK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("clockwork-dev")
    } else {
        base_dir.join("clockwork")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the store the configuration asks for.
///
/// An unopenable database is not fatal: the session runs memory-only.
pub fn open_configured(config: &StorageConfig) -> Persistence {
    if config.in_memory {
        return Persistence::memory();
    }
    let opened = match &config.path {
        Some(path) => SqliteStore::open_at(path),
        None => SqliteStore::open(),
    };
    match opened {
        Ok(store) => Persistence::new(Arc::new(store)),
        Err(e) => {
            tracing::warn!(error = %e, "cannot open store, running memory-only");
            Persistence::memory()
        }
    }
}
