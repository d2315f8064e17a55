//! Core error types for clockwork-core.
//!
//! The taxonomy is narrow: rejected input, an unreachable store, and audio
//! that could not be played. None of them is fatal; callers either show the
//! validation message or rely on the documented fallback.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for clockwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The command was rejected and nothing changed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistent store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio playback errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Input rejected by an engine. The operation is a no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duration must be at least 1 second")]
    NonPositiveDuration,

    #[error("cannot change the duration while the countdown is running")]
    CountdownRunning,

    #[error("alarm time is required")]
    EmptyAlarmTime,

    #[error("invalid alarm time '{0}': expected HH:MM (24-hour)")]
    InvalidAlarmTime(String),

    #[error("label name must not be empty")]
    EmptyLabel,

    #[error("label '{0}' already exists")]
    DuplicateLabel(String),

    #[error("this operation requires explicit confirmation")]
    ConfirmationRequired,
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write failed
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Store is locked")]
    Locked,

    /// The store refused the write (quota, read-only, disabled)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Playback failures. Always recovered by the fallback tone.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("no audio output device available: {0}")]
    NoDevice(String),

    #[error("sound file {path} could not be played: {message}")]
    Asset { path: PathBuf, message: String },

    #[error("playback blocked: {0}")]
    Blocked(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => match e.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StorageError::Locked
                }
                rusqlite::ErrorCode::DiskFull | rusqlite::ErrorCode::ReadOnly => {
                    StorageError::Unavailable(err.to_string())
                }
                _ => StorageError::QueryFailed(err.to_string()),
            },
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
