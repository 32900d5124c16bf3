//! Interactive timer loop.
//!
//! One current-thread runtime multiplexes the 1 s ticker with stdin, so
//! every controller call happens on this thread and a tick is fully
//! handled before the next command is read.

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use cosmofocus_core::{Collaborators, Config, EventSink, FocusController, SharedSettings, TimerState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, MissedTickBehavior};

use crate::terminal::{Bell, TerminalSink};

const HELP: &str = "commands: s <duration> start, p pause, r resume, t toggle, x reset, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start(String),
    Pause,
    Resume,
    Toggle,
    Reset,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match head {
        "s" | "start" => Command::Start(rest.trim().to_string()),
        "p" | "pause" => Command::Pause,
        "r" | "resume" => Command::Resume,
        "t" | "toggle" => Command::Toggle,
        "x" | "reset" => Command::Reset,
        "q" | "quit" => Command::Quit,
        "?" | "h" | "help" => Command::Help,
        _ => return None,
    };
    Some(command)
}

pub fn run(duration: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let (store, clock) = super::open_backend()?;
    let settings = SharedSettings::new(config.to_settings());
    let mut controller = FocusController::new(Collaborators {
        clock,
        store,
        settings: Rc::new(settings),
        sink: TerminalSink,
        sound: Box::new(Bell),
    });
    let input = duration.unwrap_or(config.timer.focus_duration);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(&mut controller, &input))?;

    if !controller.recorder().is_persisted() {
        return Err("session history could not be saved".into());
    }
    Ok(())
}

async fn drive<S: EventSink>(
    controller: &mut FocusController<S>,
    input: &str,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("{HELP}");
    controller.start(input);
    ticker.reset();
    show_status(controller);

    loop {
        tokio::select! {
            _ = ticker.tick(), if controller.is_running() => {
                controller.tick();
                show_status(controller);
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed, finishing current interval");
                    stdin_open = false;
                    continue;
                };
                let was_running = controller.is_running();
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => apply(controller, command),
                    None if line.trim().is_empty() => {}
                    None => println!("unknown command '{}'. {HELP}", line.trim()),
                }
                if !was_running && controller.is_running() {
                    ticker.reset();
                }
                show_status(controller);
            }
            else => break,
        }
        if !stdin_open && !controller.is_running() {
            break;
        }
    }

    if matches!(
        controller.timer().state(),
        TimerState::Running | TimerState::Paused
    ) {
        controller.reset();
    }
    println!();
    Ok(())
}

fn apply<S: EventSink>(controller: &mut FocusController<S>, command: Command) {
    match command {
        Command::Start(duration) => controller.start(&duration),
        Command::Pause => controller.pause(),
        Command::Resume => controller.resume(),
        Command::Toggle => controller.toggle(),
        Command::Reset => controller.reset(),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn show_status<S: EventSink>(controller: &FocusController<S>) {
    let snapshot = controller.snapshot();
    let label = if snapshot.is_break { "break" } else { "focus" };
    let state = match snapshot.state {
        TimerState::Running => "",
        TimerState::Paused => " (paused)",
        TimerState::Idle | TimerState::Completed => " (idle)",
    };
    let mut out = std::io::stdout().lock();
    let _ = write!(
        out,
        "\r\x1b[2K{label} {}{state}",
        controller.timer().format_remaining()
    );
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_command("s 25"), Some(Command::Start("25".into())));
        assert_eq!(parse_command("start  1:30 "), Some(Command::Start("1:30".into())));
        assert_eq!(parse_command("p"), Some(Command::Pause));
        assert_eq!(parse_command(" resume"), Some(Command::Resume));
        assert_eq!(parse_command("t"), Some(Command::Toggle));
        assert_eq!(parse_command("x"), Some(Command::Reset));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn start_without_duration_is_empty_input() {
        assert_eq!(parse_command("s"), Some(Command::Start(String::new())));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(parse_command("launch"), None);
        assert_eq!(parse_command(""), None);
    }
}
