//! Runtime settings read by the core at decision points.
//!
//! The core never persists or validates these; that is the job of whoever
//! provides them (see [`Config`](crate::storage::Config) for the file-backed
//! provider used by the CLI).

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub sound_enabled: bool,
    pub auto_start: bool,
    pub notifications_enabled: bool,
    pub auto_break_enabled: bool,
    pub break_duration_minutes: u32,
}

impl Settings {
    pub fn break_duration_secs(&self) -> u64 {
        u64::from(self.break_duration_minutes).saturating_mul(60)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            auto_start: false,
            notifications_enabled: true,
            auto_break_enabled: false,
            break_duration_minutes: 5,
        }
    }
}

/// Read-only access to the current settings.
pub trait SettingsProvider {
    fn settings(&self) -> Settings;
}

impl SettingsProvider for Settings {
    fn settings(&self) -> Settings {
        *self
    }
}

/// Settings that can be changed while the engines hold a handle to them.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Rc<Cell<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Rc::new(Cell::new(settings)),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut current = self.inner.get();
        f(&mut current);
        self.inner.set(current);
    }
}

impl SettingsProvider for SharedSettings {
    fn settings(&self) -> Settings {
        self.inner.get()
    }
}
