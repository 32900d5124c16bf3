//! Composition root.
//!
//! [`FocusController`] owns the timer, the session recorder and the
//! achievement engine, and wires them together by passing events. It is
//! also the single place where collaborator side effects (sound, sink
//! delivery) happen, so a failing collaborator never touches timer state.

use std::rc::Rc;

use crate::achievements::{AchievementEngine, AchievementTracker};
use crate::clock::SharedClock;
use crate::error::SoundError;
use crate::events::{AlertLevel, Event, EventCategory, EventSink};
use crate::session::{SessionRecorder, SessionSummary, TimeRange};
use crate::settings::SettingsProvider;
use crate::storage::KvStore;
use crate::timer::{TimerEngine, TimerSnapshot};

/// Fire-and-forget completion sound.
pub trait SoundPlayer {
    fn play_completion(&mut self) -> Result<(), SoundError>;
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play_completion(&mut self) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Collaborators handed to [`FocusController::new`].
pub struct Collaborators<S> {
    pub clock: SharedClock,
    pub store: Rc<dyn KvStore>,
    pub settings: Rc<dyn SettingsProvider>,
    pub sink: S,
    pub sound: Box<dyn SoundPlayer>,
}

pub struct FocusController<S: EventSink> {
    clock: SharedClock,
    settings: Rc<dyn SettingsProvider>,
    timer: TimerEngine,
    recorder: SessionRecorder,
    achievements: AchievementEngine,
    tracker: AchievementTracker,
    sink: S,
    sound: Box<dyn SoundPlayer>,
}

impl<S: EventSink> FocusController<S> {
    pub fn new(collaborators: Collaborators<S>) -> Self {
        let Collaborators {
            clock,
            store,
            settings,
            sink,
            sound,
        } = collaborators;

        let timer = TimerEngine::new(clock.clone(), settings.clone());
        let recorder = SessionRecorder::new(store.clone(), clock.clone());
        let achievements = AchievementEngine::new(store, clock.clone());

        let mut controller = Self {
            clock,
            settings,
            timer,
            recorder,
            achievements,
            tracker: AchievementTracker::new(),
            sink,
            sound,
        };
        // Sync streak progress with whatever history was loaded.
        let streak = controller.recorder.streak();
        let unlocked = controller
            .tracker
            .observe_streak(streak, &mut controller.achievements);
        controller.deliver_all(unlocked);
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn streak(&self) -> u32 {
        self.recorder.streak()
    }

    pub fn summary(&self, range: TimeRange) -> SessionSummary {
        SessionSummary::from_history(self.recorder.history(), range, self.clock.now())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_input(&mut self, input: &str) {
        let events = self.timer.set_input(input).into_iter().collect();
        self.dispatch(events);
    }

    pub fn start(&mut self, input: &str) {
        let events = self.timer.start(input);
        self.dispatch(events);
    }

    pub fn pause(&mut self) {
        let events = self.timer.pause().into_iter().collect();
        self.dispatch(events);
    }

    pub fn resume(&mut self) {
        let events = self.timer.resume().into_iter().collect();
        self.dispatch(events);
    }

    pub fn toggle(&mut self) {
        let events = self.timer.toggle().into_iter().collect();
        self.dispatch(events);
    }

    pub fn reset(&mut self) {
        let events = self.timer.reset().into_iter().collect();
        self.dispatch(events);
    }

    /// One clock tick. Completion handling and all resulting deliveries
    /// finish before this returns.
    pub fn tick(&mut self) {
        let events = self.timer.tick();
        self.dispatch(events);
    }

    pub fn clear_history(&mut self) {
        self.recorder.clear_history();
        let unlocked = self.refresh_streak();
        self.deliver_all(unlocked);
    }

    pub fn reset_achievements(&mut self) {
        self.achievements.reset();
    }

    pub fn dismiss_recent_unlock(&mut self) {
        self.achievements.dismiss_recent_unlock();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, events: Vec<Event>) {
        for event in events {
            let mut follow_up = Vec::new();
            match &event {
                Event::SessionCompleted {
                    duration_secs,
                    play_sound,
                    ..
                } => {
                    if *play_sound {
                        follow_up.extend(self.play_sound());
                    }
                    self.recorder.record_session(*duration_secs, true);
                    follow_up.extend(self.refresh_streak());
                }
                Event::SessionReset {
                    interrupted_secs: Some(secs),
                    ..
                } => {
                    self.recorder.record_session(*secs, false);
                    follow_up.extend(self.refresh_streak());
                }
                _ => {}
            }
            follow_up.extend(self.tracker.observe(&event, &mut self.achievements));

            self.deliver(&event);
            self.deliver_all(follow_up);
        }
    }

    fn refresh_streak(&mut self) -> Option<Event> {
        let streak = self.recorder.streak();
        self.tracker.observe_streak(streak, &mut self.achievements)
    }

    fn play_sound(&mut self) -> Option<Event> {
        match self.sound.play_completion() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "completion sound failed");
                Some(Event::Alert {
                    level: AlertLevel::Error,
                    message: "Failed to play sound".into(),
                    at: self.clock.now(),
                })
            }
        }
    }

    fn deliver_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.deliver(&event);
        }
    }

    /// Toasts respect `notifications_enabled`; unlock banners always show.
    fn deliver(&mut self, event: &Event) {
        let notifications = self.settings.settings().notifications_enabled;
        let deliver = match event.category() {
            EventCategory::Achievement => true,
            EventCategory::Session | EventCategory::Alert | EventCategory::Input => notifications,
        };
        if deliver {
            self.sink.deliver(event);
        } else {
            tracing::trace!(message = %event.message(), "notification suppressed");
        }
    }
}
