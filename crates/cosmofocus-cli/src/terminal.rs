//! Terminal presentation: event lines and the completion bell.

use std::io::{self, Write};

use cosmofocus_core::{AlertLevel, Event, EventSink, SoundError, SoundPlayer};

/// Prints every delivered event as one line on stdout, clearing the status
/// line first.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl TerminalSink {
    pub fn render(event: &Event) -> String {
        match event {
            Event::AchievementUnlocked { achievement, .. } => format!(
                "🏆 {} {}: {}",
                achievement.icon, achievement.name, achievement.description
            ),
            Event::Alert {
                level: AlertLevel::Error,
                message,
                ..
            } => format!("! {message}"),
            other => other.message(),
        }
    }
}

impl EventSink for TerminalSink {
    fn deliver(&mut self, event: &Event) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "\r\x1b[2K{}", Self::render(event)) {
            tracing::debug!(error = %e, "stdout closed");
        }
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct Bell;

impl SoundPlayer for Bell {
    fn play_completion(&mut self) -> Result<(), SoundError> {
        let mut out = io::stdout().lock();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmofocus_core::achievements::seed_catalog;
    use cosmofocus_core::{Clock, ManualClock};

    #[test]
    fn renders_unlock_with_description() {
        let clock = ManualClock::at("2024-03-01T12:00:00+00:00");
        let achievement = seed_catalog().remove(0);
        let line = TerminalSink::render(&Event::AchievementUnlocked {
            achievement,
            at: clock.now(),
        });
        assert!(line.contains("First Timer"));
        assert!(line.contains("Start your first timer session"));
    }

    #[test]
    fn renders_error_alert() {
        let clock = ManualClock::at("2024-03-01T12:00:00+00:00");
        let line = TerminalSink::render(&Event::Alert {
            level: AlertLevel::Error,
            message: "Failed to play sound".into(),
            at: clock.now(),
        });
        assert_eq!(line, "! Failed to play sound");
    }
}
