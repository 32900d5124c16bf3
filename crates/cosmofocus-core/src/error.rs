//! Core error types for cosmofocus-core.
//!
//! Only wiring defects are fatal. Everything in here is recoverable: the
//! timer keeps working when the store, the config file, or the sound
//! collaborator misbehaves.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`KvStore`](crate::storage::KvStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// Store rejected the write (quota exceeded, read-only medium, ...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {message}")]
    Serialize { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors reported by a [`SoundPlayer`](crate::controller::SoundPlayer).
#[derive(Error, Debug)]
pub enum SoundError {
    /// No audio output is available
    #[error("No audio output available")]
    Unavailable,

    /// Playback started but failed
    #[error("Failed to play sound: {0}")]
    Playback(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => match inner.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StoreError::Locked
                }
                rusqlite::ErrorCode::DiskFull | rusqlite::ErrorCode::ReadOnly => {
                    StoreError::Unavailable(err.to_string())
                }
                _ => StoreError::QueryFailed(err.to_string()),
            },
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<std::io::Error> for SoundError {
    fn from(err: std::io::Error) -> Self {
        SoundError::Playback(err.to_string())
    }
}
