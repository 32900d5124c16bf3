use clap::Subcommand;
use cosmofocus_core::timer::format_clock;
use cosmofocus_core::SessionRecorder;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, oldest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every recorded session
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, clock) = super::open_backend()?;
    let mut recorder = SessionRecorder::new(store, clock);

    match action {
        HistoryAction::List { json: true } => {
            println!("{}", serde_json::to_string_pretty(recorder.history())?);
        }
        HistoryAction::List { json: false } => {
            if recorder.history().is_empty() {
                println!("no sessions recorded");
            }
            for record in recorder.history() {
                println!(
                    "{}  {:>7}  {}",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    format_clock(record.duration_secs),
                    if record.completed { "completed" } else { "interrupted" }
                );
            }
        }
        HistoryAction::Clear => {
            recorder.clear_history();
            if !recorder.is_persisted() {
                return Err("history cleared in memory but could not be saved".into());
            }
            println!("history cleared");
        }
    }
    Ok(())
}
