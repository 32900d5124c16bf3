mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::SqliteStore;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::StoreError;

/// Key holding the JSON array of session records.
pub const SESSIONS_KEY: &str = "timer_sessions";
/// Key holding the JSON array of achievements.
pub const ACHIEVEMENTS_KEY: &str = "timer_achievements";

/// Durable key/value store holding JSON documents.
///
/// Writes must be visible to a reader as soon as `set` returns.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `COSMOFOCUS_DATA_DIR` wins when set. Otherwise `~/.config/cosmofocus`,
/// or `~/.config/cosmofocus-dev` with `COSMOFOCUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("COSMOFOCUS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("COSMOFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cosmofocus-dev")
            } else {
                base_dir.join("cosmofocus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
