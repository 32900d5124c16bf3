use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;

/// Every observable state change produces an Event.
/// The controller routes them to the recorder, the achievement tracker and
/// finally the [`EventSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The raw duration input differs from the last one seen.
    InputChanged {
        raw: String,
        requested_minutes: Option<i64>,
        at: DateTime<FixedOffset>,
    },
    SessionStarted {
        is_break: bool,
        duration_secs: u64,
        /// True when the run began through auto-start rather than the user.
        auto_started: bool,
        at: DateTime<FixedOffset>,
    },
    SessionPaused {
        remaining_secs: u64,
        at: DateTime<FixedOffset>,
    },
    SessionResumed {
        remaining_secs: u64,
        at: DateTime<FixedOffset>,
    },
    SessionReset {
        /// Configured duration of the run cut short, if one was in progress.
        interrupted_secs: Option<u64>,
        at: DateTime<FixedOffset>,
    },
    SessionCompleted {
        is_break: bool,
        duration_secs: u64,
        started_at: DateTime<FixedOffset>,
        /// Hint for the sound collaborator.
        play_sound: bool,
        at: DateTime<FixedOffset>,
    },
    AchievementUnlocked {
        achievement: Achievement,
        at: DateTime<FixedOffset>,
    },
    /// A collaborator failed; informational only.
    Alert {
        level: AlertLevel,
        message: String,
        at: DateTime<FixedOffset>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Error,
}

/// Broad grouping used by sinks to decide how to present an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Input,
    Session,
    Achievement,
    Alert,
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::InputChanged { .. } => EventCategory::Input,
            Event::SessionStarted { .. }
            | Event::SessionPaused { .. }
            | Event::SessionResumed { .. }
            | Event::SessionReset { .. }
            | Event::SessionCompleted { .. } => EventCategory::Session,
            Event::AchievementUnlocked { .. } => EventCategory::Achievement,
            Event::Alert { .. } => EventCategory::Alert,
        }
    }

    /// Human-readable notification text.
    pub fn message(&self) -> String {
        match self {
            Event::InputChanged { raw, .. } => format!("Duration set to \"{raw}\""),
            Event::SessionStarted { is_break: true, .. } => "Break started".into(),
            Event::SessionStarted { .. } => "Focus session started".into(),
            Event::SessionPaused { .. } => "Timer paused".into(),
            Event::SessionResumed { .. } => "Timer resumed".into(),
            Event::SessionReset { .. } => "Timer reset".into(),
            Event::SessionCompleted { is_break: true, .. } => "Break time over!".into(),
            Event::SessionCompleted { .. } => "Focus session complete!".into(),
            Event::AchievementUnlocked { achievement, .. } => format!(
                "Achievement unlocked: {} {}",
                achievement.icon, achievement.name
            ),
            Event::Alert { message, .. } => message.clone(),
        }
    }

    pub fn at(&self) -> DateTime<FixedOffset> {
        match self {
            Event::InputChanged { at, .. }
            | Event::SessionStarted { at, .. }
            | Event::SessionPaused { at, .. }
            | Event::SessionResumed { at, .. }
            | Event::SessionReset { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::AchievementUnlocked { at, .. }
            | Event::Alert { at, .. } => *at,
        }
    }
}

/// Consumer of emitted events (toasts, unlock banners, logs).
///
/// Delivery is at-most-once per occurrence; sinks must not block.
pub trait EventSink {
    fn deliver(&mut self, event: &Event);
}

/// Sink that keeps everything it receives. Handy in tests and for callers
/// that poll instead of subscribing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn unlocked_ids(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::AchievementUnlocked { achievement, .. } => Some(achievement.id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn deliver(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn deliver(&mut self, event: &Event) {
        (**self).deliver(event);
    }
}
