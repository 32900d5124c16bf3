//! Unlock rules.
//!
//! The tracker watches timer events and streak values and turns them into
//! calls on the [`AchievementEngine`]. Rules are evaluated independently:
//! the outcome of one never feeds another within the same event.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, FixedOffset, Timelike};

use super::catalog::{
    EARLY_BIRD, FIRST_TIMER, MIDNIGHT_FOCUS, NEGATIVE_TIME, NIGHT_OWL, PERFECT_TIMING,
    RAPID_CLICKER, SPACE_MARATHONER, STREAK_MASTER, TIME_TRAVELER,
};
use super::engine::AchievementEngine;
use crate::events::Event;

/// Start/pause toggles counted for `rapid_clicker` must fall inside this
/// trailing window.
const TOGGLE_WINDOW_MS: i64 = 3_000;
const MARATHON_SECS: u64 = 60 * 60;
const ANSWER_MINUTES: i64 = 42;

#[derive(Debug, Default)]
pub struct AchievementTracker {
    toggles: VecDeque<DateTime<FixedOffset>>,
    last_streak: u32,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every rule triggered by `event`. Returns the unlock events.
    pub fn observe(&mut self, event: &Event, achievements: &mut AchievementEngine) -> Vec<Event> {
        let mut unlocked = Vec::new();
        match event {
            Event::SessionStarted {
                auto_started, at, ..
            } => {
                unlocked.extend(achievements.unlock(FIRST_TIMER));
                match at.hour() {
                    0..=4 => unlocked.extend(achievements.unlock(NIGHT_OWL)),
                    5 => unlocked.extend(achievements.unlock(EARLY_BIRD)),
                    _ => {}
                }
                if !auto_started {
                    unlocked.extend(self.toggle(*at, achievements));
                }
            }
            Event::SessionPaused { at, .. } | Event::SessionResumed { at, .. } => {
                unlocked.extend(self.toggle(*at, achievements));
            }
            Event::InputChanged {
                requested_minutes: Some(minutes),
                ..
            } => {
                if *minutes < 0 {
                    unlocked.extend(achievements.unlock(NEGATIVE_TIME));
                }
                if *minutes == ANSWER_MINUTES {
                    unlocked.extend(achievements.unlock(PERFECT_TIMING));
                }
            }
            Event::SessionCompleted {
                duration_secs,
                started_at,
                at,
                ..
            } if *duration_secs > 0 => {
                if *duration_secs >= MARATHON_SECS {
                    unlocked.extend(achievements.unlock(SPACE_MARATHONER));
                }
                let done = achievements
                    .get(TIME_TRAVELER)
                    .and_then(|a| a.progress)
                    .unwrap_or(0);
                unlocked.extend(achievements.update_progress(TIME_TRAVELER, i64::from(done) + 1));
                if started_at.date_naive() != at.date_naive() {
                    unlocked.extend(achievements.unlock(MIDNIGHT_FOCUS));
                }
            }
            other => {
                tracing::trace!(category = ?other.category(), "no achievement rule for event");
            }
        }
        unlocked
    }

    /// Feed a freshly computed streak. Only changes to a positive value count.
    pub fn observe_streak(
        &mut self,
        streak: u32,
        achievements: &mut AchievementEngine,
    ) -> Option<Event> {
        let changed = streak != self.last_streak;
        self.last_streak = streak;
        if !changed || streak == 0 {
            return None;
        }
        achievements.update_progress(STREAK_MASTER, i64::from(streak))
    }

    fn toggle(
        &mut self,
        at: DateTime<FixedOffset>,
        achievements: &mut AchievementEngine,
    ) -> Option<Event> {
        self.toggles.push_back(at);
        let window = Duration::milliseconds(TOGGLE_WINDOW_MS);
        while self.toggles.front().is_some_and(|t| at - *t >= window) {
            self.toggles.pop_front();
        }

        let count = self.toggles.len() as i64;
        let best = achievements
            .get(RAPID_CLICKER)
            .and_then(|a| a.progress)
            .map_or(0, i64::from);
        if count <= best {
            return None;
        }
        achievements.update_progress(RAPID_CLICKER, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    fn setup(at: &str) -> (AchievementTracker, AchievementEngine, ManualClock) {
        let clock = ManualClock::at(at);
        let engine = AchievementEngine::new(Rc::new(MemoryStore::new()), clock.shared());
        (AchievementTracker::new(), engine, clock)
    }

    fn started(clock: &ManualClock, auto_started: bool) -> Event {
        Event::SessionStarted {
            is_break: false,
            duration_secs: 60,
            auto_started,
            at: clock.now(),
        }
    }

    fn paused(clock: &ManualClock) -> Event {
        Event::SessionPaused {
            remaining_secs: 30,
            at: clock.now(),
        }
    }

    fn completed(started_at: &str, at: &str, duration_secs: u64) -> Event {
        Event::SessionCompleted {
            is_break: false,
            duration_secs,
            started_at: DateTime::parse_from_rfc3339(started_at).unwrap(),
            play_sound: false,
            at: DateTime::parse_from_rfc3339(at).unwrap(),
        }
    }

    fn input(minutes: Option<i64>, clock: &ManualClock) -> Event {
        Event::InputChanged {
            raw: String::new(),
            requested_minutes: minutes,
            at: clock.now(),
        }
    }

    #[test]
    fn first_start_unlocks_first_timer() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        let events = tracker.observe(&started(&clock, false), &mut engine);
        assert_eq!(events.len(), 1);
        assert!(engine.is_unlocked(FIRST_TIMER));
        assert!(tracker.observe(&started(&clock, false), &mut engine).is_empty());
    }

    #[test]
    fn hour_rules_use_local_time() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T04:59:00+09:00");
        tracker.observe(&started(&clock, false), &mut engine);
        assert!(engine.is_unlocked(NIGHT_OWL));
        assert!(!engine.is_unlocked(EARLY_BIRD));

        let (mut tracker, mut engine, clock) = setup("2024-03-01T05:30:00-03:00");
        tracker.observe(&started(&clock, false), &mut engine);
        assert!(engine.is_unlocked(EARLY_BIRD));
        assert!(!engine.is_unlocked(NIGHT_OWL));

        let (mut tracker, mut engine, clock) = setup("2024-03-01T06:00:00+00:00");
        tracker.observe(&started(&clock, false), &mut engine);
        assert!(!engine.is_unlocked(EARLY_BIRD));
        assert!(!engine.is_unlocked(NIGHT_OWL));
    }

    #[test]
    fn five_quick_toggles_unlock_rapid_clicker() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        tracker.observe(&started(&clock, false), &mut engine);
        for _ in 0..4 {
            clock.advance(Duration::milliseconds(500));
            tracker.observe(&paused(&clock), &mut engine);
        }
        assert!(engine.is_unlocked(RAPID_CLICKER));
        assert_eq!(engine.get(RAPID_CLICKER).unwrap().progress, Some(5));
    }

    #[test]
    fn slow_toggles_do_not_unlock_rapid_clicker() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        tracker.observe(&started(&clock, false), &mut engine);
        for _ in 0..4 {
            clock.advance(Duration::milliseconds(2_500));
            tracker.observe(&paused(&clock), &mut engine);
        }
        assert!(!engine.is_unlocked(RAPID_CLICKER));
        assert_eq!(engine.get(RAPID_CLICKER).unwrap().progress, Some(2));
    }

    #[test]
    fn auto_starts_are_not_clicks() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        for _ in 0..6 {
            tracker.observe(&started(&clock, true), &mut engine);
        }
        assert_eq!(engine.get(RAPID_CLICKER).unwrap().progress, Some(0));
    }

    #[test]
    fn input_rules() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        tracker.observe(&input(Some(41), &clock), &mut engine);
        tracker.observe(&input(None, &clock), &mut engine);
        assert_eq!(engine.total_unlocked(), 0);

        tracker.observe(&input(Some(-5), &clock), &mut engine);
        assert!(engine.is_unlocked(NEGATIVE_TIME));
        tracker.observe(&input(Some(42), &clock), &mut engine);
        assert!(engine.is_unlocked(PERFECT_TIMING));
    }

    #[test]
    fn completion_rules() {
        let (mut tracker, mut engine, _) = setup("2024-03-01T12:00:00+00:00");
        tracker.observe(
            &completed("2024-03-01T10:00:00+00:00", "2024-03-01T10:25:00+00:00", 1500),
            &mut engine,
        );
        assert_eq!(engine.get(TIME_TRAVELER).unwrap().progress, Some(1));
        assert!(!engine.is_unlocked(SPACE_MARATHONER));
        assert!(!engine.is_unlocked(MIDNIGHT_FOCUS));

        tracker.observe(
            &completed("2024-03-01T23:30:00+00:00", "2024-03-02T00:30:00+00:00", 3600),
            &mut engine,
        );
        assert!(engine.is_unlocked(SPACE_MARATHONER));
        assert!(engine.is_unlocked(MIDNIGHT_FOCUS));
        assert_eq!(engine.get(TIME_TRAVELER).unwrap().progress, Some(2));
    }

    #[test]
    fn zero_length_completion_does_not_count() {
        let (mut tracker, mut engine, _) = setup("2024-03-01T12:00:00+00:00");
        tracker.observe(
            &completed("2024-03-01T23:59:59+00:00", "2024-03-02T00:00:00+00:00", 0),
            &mut engine,
        );
        assert_eq!(engine.get(TIME_TRAVELER).unwrap().progress, Some(0));
        assert!(!engine.is_unlocked(MIDNIGHT_FOCUS));
    }

    #[test]
    fn ten_completions_unlock_time_traveler_once() {
        let (mut tracker, mut engine, _) = setup("2024-03-01T12:00:00+00:00");
        let mut unlocks = 0;
        for _ in 0..12 {
            unlocks += tracker
                .observe(
                    &completed("2024-03-01T10:00:00+00:00", "2024-03-01T10:01:00+00:00", 60),
                    &mut engine,
                )
                .len();
        }
        assert_eq!(unlocks, 1);
        assert_eq!(engine.get(TIME_TRAVELER).unwrap().progress, Some(10));
    }

    #[test]
    fn streak_updates_only_on_change() {
        let (mut tracker, mut engine, _) = setup("2024-03-01T12:00:00+00:00");
        assert!(tracker.observe_streak(0, &mut engine).is_none());
        assert!(tracker.observe_streak(3, &mut engine).is_none());
        assert_eq!(engine.get(STREAK_MASTER).unwrap().progress, Some(3));
        assert!(tracker.observe_streak(9, &mut engine).is_some());
        assert_eq!(engine.get(STREAK_MASTER).unwrap().progress, Some(7));
        assert!(tracker.observe_streak(9, &mut engine).is_none());
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let (mut tracker, mut engine, clock) = setup("2024-03-01T12:00:00+00:00");
        let reset = Event::SessionReset {
            interrupted_secs: Some(60),
            at: clock.now(),
        };
        assert!(tracker.observe(&reset, &mut engine).is_empty());
        assert_eq!(engine.total_unlocked(), 0);
    }
}
