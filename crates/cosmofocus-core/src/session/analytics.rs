//! Dashboard statistics derived from the session history.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use super::recorder::{streak_of, SessionRecord};

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Window applied to the per-period breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl TimeRange {
    /// Oldest instant included, or `None` for everything.
    pub fn cutoff(self, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        match self {
            TimeRange::Week => Some(now - Duration::days(7)),
            TimeRange::Month => now.checked_sub_months(Months::new(1)),
            TimeRange::Year => now.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            other => Err(format!("unknown time range '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub name: String,
    pub minutes: f64,
    pub sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthBucket {
    pub name: String,
    pub sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub range: TimeRange,
    pub total_sessions: usize,
    /// Minutes across completed sessions, all time.
    pub total_focus_minutes: f64,
    /// Percentage of sessions that ran to completion, all time.
    pub completion_rate: f64,
    pub current_streak: u32,
    /// Weekday with the most recorded minutes, all time.
    pub best_weekday: Option<DayTotals>,
    /// Sunday first.
    pub by_weekday: Vec<DayTotals>,
    /// Sessions recorded per local hour.
    pub by_hour: [u32; 24],
    pub length_buckets: Vec<LengthBucket>,
    pub daily_trend: Vec<TrendPoint>,
}

impl SessionSummary {
    pub fn from_history(
        records: &[SessionRecord],
        range: TimeRange,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let total_focus_minutes: f64 = records
            .iter()
            .filter(|r| r.completed)
            .map(minutes)
            .sum();
        let completion_rate = if records.is_empty() {
            0.0
        } else {
            records.iter().filter(|r| r.completed).count() as f64 / records.len() as f64 * 100.0
        };

        let best_weekday = weekday_totals(records.iter())
            .into_iter()
            .filter(|d| d.sessions > 0)
            .fold(None::<DayTotals>, |best, day| match best {
                Some(b) if b.minutes >= day.minutes => Some(b),
                _ => Some(day),
            });

        let cutoff = range.cutoff(now);
        let in_range: Vec<&SessionRecord> = records
            .iter()
            .filter(|r| cutoff.map_or(true, |c| r.timestamp >= c))
            .collect();

        let mut by_hour = [0u32; 24];
        let mut buckets = [0u32; 5];
        let mut trend: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in &in_range {
            by_hour[record.timestamp.hour() as usize] += 1;
            buckets[bucket_index(minutes(record))] += 1;
            *trend.entry(record.timestamp.date_naive()).or_default() += minutes(record);
        }

        Self {
            range,
            total_sessions: records.len(),
            total_focus_minutes,
            completion_rate,
            current_streak: streak_of(records),
            best_weekday,
            by_weekday: weekday_totals(in_range.iter().copied()),
            by_hour,
            length_buckets: ["<15 min", "15-30 min", "30-45 min", "45-60 min", ">60 min"]
                .into_iter()
                .zip(buckets)
                .map(|(name, sessions)| LengthBucket {
                    name: name.to_string(),
                    sessions,
                })
                .collect(),
            daily_trend: trend
                .into_iter()
                .map(|(date, minutes)| TrendPoint {
                    date,
                    minutes: minutes.round() as u64,
                })
                .collect(),
        }
    }
}

fn minutes(record: &SessionRecord) -> f64 {
    record.duration_secs as f64 / 60.0
}

fn bucket_index(minutes: f64) -> usize {
    match minutes {
        m if m < 15.0 => 0,
        m if m < 30.0 => 1,
        m if m < 45.0 => 2,
        m if m < 60.0 => 3,
        _ => 4,
    }
}

fn weekday_totals<'a>(records: impl Iterator<Item = &'a SessionRecord>) -> Vec<DayTotals> {
    let mut days: Vec<DayTotals> = WEEKDAYS
        .iter()
        .map(|name| DayTotals {
            name: (*name).to_string(),
            ..DayTotals::default()
        })
        .collect();
    for record in records {
        let day = &mut days[record.timestamp.weekday().num_days_from_sunday() as usize];
        day.minutes += minutes(record);
        day.sessions += 1;
    }
    days
}
