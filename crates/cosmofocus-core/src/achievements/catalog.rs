use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const FIRST_TIMER: &str = "first_timer";
pub const TIME_TRAVELER: &str = "time_traveler";
pub const SPACE_MARATHONER: &str = "space_marathoner";
pub const NIGHT_OWL: &str = "night_owl";
pub const EARLY_BIRD: &str = "early_bird";
pub const STREAK_MASTER: &str = "streak_master";
pub const NEGATIVE_TIME: &str = "negative_time";
pub const RAPID_CLICKER: &str = "rapid_clicker";
pub const MIDNIGHT_FOCUS: &str = "midnight_focus";
pub const PERFECT_TIMING: &str = "perfect_timing";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<FixedOffset>>,
    /// Hidden from listings until unlocked. Irrelevant to the rules.
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u32>,
}

impl Achievement {
    fn seed(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        is_secret: bool,
        max_progress: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            unlocked: false,
            unlocked_at: None,
            is_secret,
            progress: max_progress.map(|_| 0),
            max_progress,
        }
    }

    /// Whether a listing should show this entry.
    pub fn is_visible(&self) -> bool {
        !self.is_secret || self.unlocked
    }
}

/// The catalog every first run starts from.
pub fn seed_catalog() -> Vec<Achievement> {
    vec![
        Achievement::seed(
            FIRST_TIMER,
            "First Timer",
            "Start your first timer session",
            "🚀",
            false,
            None,
        ),
        Achievement::seed(
            TIME_TRAVELER,
            "Time Traveler",
            "Complete 10 timer sessions",
            "⏱️",
            false,
            Some(10),
        ),
        Achievement::seed(
            SPACE_MARATHONER,
            "Space Marathoner",
            "Complete a timer session of at least 60 minutes",
            "🏃",
            false,
            None,
        ),
        Achievement::seed(
            NIGHT_OWL,
            "Night Owl",
            "Start a timer session after midnight",
            "🦉",
            false,
            None,
        ),
        Achievement::seed(
            EARLY_BIRD,
            "Early Bird",
            "Start a timer session before 6 AM",
            "🐦",
            false,
            None,
        ),
        Achievement::seed(
            STREAK_MASTER,
            "Streak Master",
            "Achieve a 7-day streak",
            "🔥",
            false,
            Some(7),
        ),
        Achievement::seed(
            NEGATIVE_TIME,
            "Quantum Physicist",
            "Tried to bend the laws of physics with a negative timer",
            "⚛️",
            true,
            None,
        ),
        Achievement::seed(
            RAPID_CLICKER,
            "Rapid Clicker",
            "Click the start/pause button 5 times in 3 seconds",
            "👆",
            true,
            Some(5),
        ),
        Achievement::seed(
            MIDNIGHT_FOCUS,
            "Midnight Focus",
            "Complete a timer session that started before midnight and ended after",
            "🌙",
            true,
            None,
        ),
        Achievement::seed(
            PERFECT_TIMING,
            "Perfect Timing",
            "Set a timer to exactly 42 minutes",
            "✨",
            true,
            None,
        ),
    ]
}
