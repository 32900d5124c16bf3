use clap::Args;
use cosmofocus_core::{Clock, SessionRecorder, SessionSummary, TimeRange};

#[derive(Args)]
pub struct StatsArgs {
    /// week, month, year or all
    #[arg(long, default_value = "week")]
    range: TimeRange,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (store, clock) = super::open_backend()?;
    let now = clock.now();
    let recorder = SessionRecorder::new(store, clock);
    let summary = SessionSummary::from_history(recorder.history(), args.range, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Sessions:        {}", summary.total_sessions);
    println!("Focus time:      {:.0} min", summary.total_focus_minutes);
    println!("Completion rate: {:.0}%", summary.completion_rate);
    println!("Current streak:  {}", summary.current_streak);
    if let Some(best) = &summary.best_weekday {
        println!("Best day:        {} ({:.0} min)", best.name, best.minutes);
    }
    println!();
    for bucket in &summary.length_buckets {
        println!("{:<10} {}", bucket.name, bucket.sessions);
    }
    if !summary.daily_trend.is_empty() {
        println!();
        for point in &summary.daily_trend {
            println!("{}  {} min", point.date, point.minutes);
        }
    }
    Ok(())
}
