mod engine;
mod input;

pub use engine::{TimerEngine, TimerSnapshot, TimerState};
pub use input::{format_clock, leading_int, parse_duration, requested_minutes};
