//! # Cosmofocus Core Library
//!
//! Core logic for the Cosmofocus focus timer. Every operation is available
//! to the standalone CLI binary, which is a thin terminal layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine for focus and break
//!   intervals. The caller invokes `tick()` once per second while running.
//! - **Session Recorder**: persisted history of finished and interrupted
//!   sessions plus the daily streak.
//! - **Achievements**: a seeded catalog and the rules that unlock it.
//! - **Storage**: a JSON key-value store backed by SQLite, and TOML
//!   configuration.
//!
//! Components never call each other directly. The timer returns [`Event`]s
//! and the [`FocusController`] routes them to the recorder, the achievement
//! rules and the presentation sink.
//!
//! The core is single-threaded: collaborators are shared with `Rc` and all
//! work for one tick completes before the next one is processed.

pub mod achievements;
pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

pub use achievements::{Achievement, AchievementEngine, AchievementTracker, UnlockNotification};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use controller::{Collaborators, FocusController, Silent, SoundPlayer};
pub use error::{ConfigError, SoundError, StoreError};
pub use events::{AlertLevel, Event, EventCategory, EventSink, RecordingSink};
pub use session::{SessionRecord, SessionRecorder, SessionSummary, TimeRange};
pub use settings::{Settings, SettingsProvider, SharedSettings};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use timer::{TimerEngine, TimerSnapshot, TimerState};
