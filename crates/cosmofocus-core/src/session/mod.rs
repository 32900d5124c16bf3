mod analytics;
mod recorder;

pub use analytics::{DayTotals, LengthBucket, SessionSummary, TimeRange, TrendPoint};
pub use recorder::{streak_of, SessionRecord, SessionRecorder};
