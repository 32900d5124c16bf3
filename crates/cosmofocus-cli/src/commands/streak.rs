use cosmofocus_core::SessionRecorder;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (store, clock) = super::open_backend()?;
    let recorder = SessionRecorder::new(store, clock);
    let streak = recorder.streak();
    let unit = if streak == 1 { "day" } else { "days" };
    println!("{streak} {unit}");
    Ok(())
}
