//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Completed -> (Running | Idle)
//!   ^                  |
//!   +----- reset ------+
//! ```
//!
//! `Completed` is transient: the tick that reaches zero performs completion
//! handling and leaves the engine either running the next interval
//! (auto-start) or idle.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(clock, settings);
//! engine.start("25");
//! // Once per second:
//! let events = engine.tick(); // contains SessionCompleted when the run ends
//! ```

use std::rc::Rc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::input::{format_clock, parse_duration, requested_minutes};
use crate::clock::SharedClock;
use crate::events::Event;
use crate::settings::SettingsProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Only observable from inside completion handling.
    Completed,
}

/// Immutable view of the timer handed to other components and renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub is_running: bool,
    pub is_break: bool,
    pub progress_pct: f64,
}

/// Core timer engine.
///
/// Owns the countdown exclusively; everybody else sees [`TimerSnapshot`]s
/// and [`Event`]s.
pub struct TimerEngine {
    clock: SharedClock,
    settings: Rc<dyn SettingsProvider>,
    state: TimerState,
    remaining_secs: u64,
    total_secs: u64,
    is_break: bool,
    started_at: Option<DateTime<FixedOffset>>,
    /// Duration of the last focus run; reloaded when a break ends.
    focus_secs: u64,
    last_input: Option<String>,
}

impl TimerEngine {
    /// Create an idle engine with nothing loaded.
    pub fn new(clock: SharedClock, settings: Rc<dyn SettingsProvider>) -> Self {
        Self {
            clock,
            settings,
            state: TimerState::Idle,
            remaining_secs: 0,
            total_secs: 0,
            is_break: false,
            started_at: None,
            focus_secs: 0,
            last_input: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_break(&self) -> bool {
        self.is_break
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// 0.0 .. 100.0 progress within the current run.
    pub fn progress_pct(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.total_secs.saturating_sub(self.remaining_secs);
        elapsed as f64 / self.total_secs as f64 * 100.0
    }

    /// Remaining time as `M:SS`.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            is_running: self.is_running(),
            is_break: self.is_break,
            progress_pct: self.progress_pct(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record the raw duration text. Emits `InputChanged` only when it
    /// differs from what was seen last.
    pub fn set_input(&mut self, input: &str) -> Option<Event> {
        if self.last_input.as_deref() == Some(input) {
            return None;
        }
        self.last_input = Some(input.to_string());
        Some(Event::InputChanged {
            raw: input.to_string(),
            requested_minutes: requested_minutes(input),
            at: self.clock.now(),
        })
    }

    /// Start a run from duration text. Restarts if already running.
    pub fn start(&mut self, input: &str) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        events.extend(self.set_input(input));

        let secs = parse_duration(input);
        if !self.is_break {
            self.focus_secs = secs;
        }
        events.push(self.begin(secs, false));
        events
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                tracing::debug!(remaining = self.remaining_secs, "timer paused");
                Some(Event::SessionPaused {
                    remaining_secs: self.remaining_secs,
                    at: self.clock.now(),
                })
            }
            _ => None,
        }
    }

    /// Continue counting. Ignored when nothing is left to count.
    ///
    /// From `Idle` this begins an interval that completion handling loaded
    /// without auto-starting it, so it reports `SessionStarted`.
    pub fn resume(&mut self) -> Option<Event> {
        if self.remaining_secs == 0 {
            return None;
        }
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                tracing::debug!(remaining = self.remaining_secs, "timer resumed");
                Some(Event::SessionResumed {
                    remaining_secs: self.remaining_secs,
                    at: self.clock.now(),
                })
            }
            TimerState::Idle => Some(self.begin(self.remaining_secs, false)),
            TimerState::Running | TimerState::Completed => None,
        }
    }

    /// Start when idle or paused, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Clear the timer. A run with time left is reported as interrupted,
    /// carrying its configured duration.
    pub fn reset(&mut self) -> Option<Event> {
        let interrupted_secs = (self.remaining_secs > 0 && self.total_secs > 0)
            .then_some(self.total_secs);

        self.state = TimerState::Idle;
        self.remaining_secs = 0;
        self.total_secs = 0;
        self.is_break = false;
        self.started_at = None;
        tracing::debug!(?interrupted_secs, "timer reset");

        Some(Event::SessionReset {
            interrupted_secs,
            at: self.clock.now(),
        })
    }

    /// Call once per second. Returns `SessionCompleted` (and possibly the
    /// auto-started follow-up) on the tick that reaches zero.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.state != TimerState::Running {
            return Vec::new();
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Vec::new();
        }
        self.complete()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, secs: u64, auto_started: bool) -> Event {
        let now = self.clock.now();
        self.state = TimerState::Running;
        self.total_secs = secs;
        self.remaining_secs = secs;
        self.started_at = Some(now);
        tracing::debug!(secs, is_break = self.is_break, auto_started, "timer started");
        Event::SessionStarted {
            is_break: self.is_break,
            duration_secs: secs,
            auto_started,
            at: now,
        }
    }

    fn complete(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let settings = self.settings.settings();
        self.state = TimerState::Completed;

        let finished_break = self.is_break;
        let mut events = vec![Event::SessionCompleted {
            is_break: finished_break,
            duration_secs: self.total_secs,
            started_at: self.started_at.take().unwrap_or(now),
            play_sound: settings.sound_enabled,
            at: now,
        }];

        let next_secs = if settings.auto_break_enabled {
            self.is_break = !finished_break;
            if self.is_break {
                settings.break_duration_secs()
            } else {
                self.focus_secs
            }
        } else {
            self.is_break = false;
            if settings.auto_start {
                self.focus_secs
            } else {
                0
            }
        };

        self.total_secs = next_secs;
        self.remaining_secs = next_secs;

        if settings.auto_start && next_secs > 0 {
            events.push(self.begin(next_secs, true));
        } else {
            self.state = TimerState::Idle;
            tracing::debug!(next_secs, is_break = self.is_break, "timer idle after completion");
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::settings::{Settings, SharedSettings};

    fn engine_with(settings: Settings) -> (TimerEngine, ManualClock) {
        let clock = ManualClock::at("2024-03-01T09:00:00+00:00");
        let engine = TimerEngine::new(clock.shared(), Rc::new(settings));
        (engine, clock)
    }

    fn engine() -> (TimerEngine, ManualClock) {
        engine_with(Settings::default())
    }

    fn run_ticks(engine: &mut TimerEngine, clock: &ManualClock, n: u64) -> Vec<Event> {
        let mut out = Vec::new();
        for _ in 0..n {
            clock.advance_secs(1);
            out.extend(engine.tick());
        }
        out
    }

    fn completions(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::SessionCompleted { .. }))
            .count()
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, _) = engine();
        assert_eq!(engine.state(), TimerState::Idle);

        let events = engine.start("1");
        assert!(matches!(events.last(), Some(Event::SessionStarted { duration_secs: 60, .. })));
        assert_eq!(engine.state(), TimerState::Running);

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);

        assert!(engine.resume().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn start_emits_input_changed_only_for_new_input() {
        let (mut engine, _) = engine();
        let first = engine.start("42");
        assert!(matches!(
            first[0],
            Event::InputChanged { requested_minutes: Some(42), .. }
        ));
        engine.reset();
        let second = engine.start("42");
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn pause_twice_is_idempotent() {
        let (mut engine, _) = engine();
        engine.start("5");
        assert!(engine.pause().is_some());
        let before = engine.snapshot();
        assert!(engine.pause().is_none());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let (mut engine, clock) = engine();
        engine.start("1");
        run_ticks(&mut engine, &clock, 10);
        engine.pause();
        run_ticks(&mut engine, &clock, 10);
        assert_eq!(engine.remaining_secs(), 50);
    }

    #[test]
    fn resume_without_time_is_ignored() {
        let (mut engine, _) = engine();
        assert!(engine.resume().is_none());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn countdown_completes_on_last_tick() {
        let (mut engine, clock) = engine();
        engine.start("0:03");
        assert!(run_ticks(&mut engine, &clock, 2).is_empty());
        let events = run_ticks(&mut engine, &clock, 1);
        assert_eq!(completions(&events), 1);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 0);
        assert!(run_ticks(&mut engine, &clock, 5).is_empty());
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let (mut engine, clock) = engine();
        engine.start("-5");
        assert_eq!(engine.total_secs(), 0);
        assert!(engine.is_running());
        let events = run_ticks(&mut engine, &clock, 1);
        assert!(matches!(
            events[..],
            [Event::SessionCompleted { duration_secs: 0, .. }]
        ));
        assert!(!engine.is_running());
    }

    #[test]
    fn reset_reports_configured_duration() {
        let (mut engine, clock) = engine();
        engine.start("10");
        run_ticks(&mut engine, &clock, 300);
        match engine.reset() {
            Some(Event::SessionReset { interrupted_secs, .. }) => {
                assert_eq!(interrupted_secs, Some(600))
            }
            other => panic!("Expected SessionReset, got {other:?}"),
        }
        assert_eq!(engine.total_secs(), 0);
        assert_eq!(engine.remaining_secs(), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn reset_when_idle_is_not_an_interruption() {
        let (mut engine, _) = engine();
        assert!(matches!(
            engine.reset(),
            Some(Event::SessionReset { interrupted_secs: None, .. })
        ));
    }

    #[test]
    fn progress_is_derived() {
        let (mut engine, clock) = engine();
        assert_eq!(engine.progress_pct(), 0.0);
        engine.start("0:10");
        run_ticks(&mut engine, &clock, 5);
        assert!((engine.progress_pct() - 50.0).abs() < f64::EPSILON);
        assert_eq!(engine.format_remaining(), "0:05");
    }

    #[test]
    fn completion_carries_sound_hint_from_settings() {
        let (mut engine, clock) = engine_with(Settings {
            sound_enabled: false,
            ..Settings::default()
        });
        engine.start("0:01");
        let events = run_ticks(&mut engine, &clock, 1);
        assert!(matches!(events[0], Event::SessionCompleted { play_sound: false, .. }));
    }

    #[test]
    fn auto_break_loads_break_then_focus() {
        let settings = Settings {
            auto_break_enabled: true,
            break_duration_minutes: 1,
            ..Settings::default()
        };
        let (mut engine, clock) = engine_with(settings);
        engine.start("0:30");
        run_ticks(&mut engine, &clock, 30);
        assert!(engine.is_break());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 60);

        match engine.resume() {
            Some(Event::SessionStarted { is_break: true, duration_secs: 60, .. }) => {}
            other => panic!("Expected break SessionStarted, got {other:?}"),
        }
        let events = run_ticks(&mut engine, &clock, 60);
        assert!(matches!(events[0], Event::SessionCompleted { is_break: true, .. }));
        assert!(!engine.is_break());
        assert_eq!(engine.remaining_secs(), 30);
    }

    #[test]
    fn auto_start_chains_into_next_interval() {
        let settings = Settings {
            auto_break_enabled: true,
            auto_start: true,
            break_duration_minutes: 1,
            ..Settings::default()
        };
        let (mut engine, clock) = engine_with(settings);
        engine.start("0:02");
        let events = run_ticks(&mut engine, &clock, 2);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            Event::SessionStarted { is_break: true, auto_started: true, duration_secs: 60, .. }
        ));
        assert!(engine.is_running());
    }

    #[test]
    fn auto_start_without_cycling_repeats_focus() {
        let (mut engine, clock) = engine_with(Settings {
            auto_start: true,
            ..Settings::default()
        });
        engine.start("0:05");
        run_ticks(&mut engine, &clock, 5);
        assert!(engine.is_running());
        assert!(!engine.is_break());
        assert_eq!(engine.remaining_secs(), 5);
    }

    #[test]
    fn auto_start_never_loops_on_zero_duration() {
        let (mut engine, clock) = engine_with(Settings {
            auto_start: true,
            ..Settings::default()
        });
        engine.start("0");
        let events = run_ticks(&mut engine, &clock, 3);
        assert_eq!(completions(&events), 1);
        assert!(!engine.is_running());
    }

    #[test]
    fn reset_of_loaded_break_is_an_interruption() {
        let (mut engine, clock) = engine_with(Settings {
            auto_break_enabled: true,
            ..Settings::default()
        });
        engine.start("0:01");
        run_ticks(&mut engine, &clock, 1);
        assert_eq!(engine.remaining_secs(), 300);
        assert!(matches!(
            engine.reset(),
            Some(Event::SessionReset { interrupted_secs: Some(300), .. })
        ));
        assert!(!engine.is_break());
    }

    #[test]
    fn settings_are_read_at_completion_time() {
        let clock = ManualClock::at("2024-03-01T09:00:00+00:00");
        let settings = SharedSettings::default();
        let mut engine = TimerEngine::new(clock.shared(), Rc::new(settings.clone()));
        engine.start("0:02");
        clock.advance_secs(1);
        engine.tick();
        settings.update(|s| s.auto_start = true);
        clock.advance_secs(1);
        engine.tick();
        assert!(engine.is_running());
    }

    #[test]
    fn completion_reports_run_start_time() {
        let (mut engine, clock) = engine();
        engine.start("0:02");
        run_ticks(&mut engine, &clock, 1);
        let events = run_ticks(&mut engine, &clock, 1);
        match &events[0] {
            Event::SessionCompleted { started_at, at, .. } => {
                assert_eq!((*at - *started_at).num_seconds(), 2);
            }
            other => panic!("Expected SessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn toggle_flips_between_running_and_paused() {
        let (mut engine, _) = engine();
        engine.start("1");
        assert!(matches!(engine.toggle(), Some(Event::SessionPaused { .. })));
        assert!(matches!(engine.toggle(), Some(Event::SessionResumed { .. })));
    }
}
