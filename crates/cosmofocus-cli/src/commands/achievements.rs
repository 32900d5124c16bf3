use clap::Subcommand;
use cosmofocus_core::{Achievement, AchievementEngine};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List achievements (locked secrets are hidden)
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Include locked secret achievements
        #[arg(long)]
        all: bool,
    },
    /// Lock every achievement again
    Reset,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, clock) = super::open_backend()?;
    let mut engine = AchievementEngine::new(store, clock);

    match action {
        AchievementsAction::List { json, all } => {
            let shown: Vec<&Achievement> = engine
                .achievements()
                .iter()
                .filter(|a| all || a.is_visible())
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
                return Ok(());
            }
            println!(
                "{}/{} unlocked",
                engine.total_unlocked(),
                engine.total_achievements()
            );
            for a in shown {
                println!("{}", line(a));
            }
        }
        AchievementsAction::Reset => {
            engine.reset();
            println!("achievements reset");
        }
    }
    Ok(())
}

fn line(a: &Achievement) -> String {
    let mark = if a.unlocked { "x" } else { " " };
    let progress = match (a.progress, a.max_progress) {
        (Some(p), Some(max)) if !a.unlocked => format!(" ({p}/{max})"),
        _ => String::new(),
    };
    format!("[{mark}] {} {}: {}{progress}", a.icon, a.name, a.description)
}
