//! Append-only session history.
//!
//! Every terminal timer event (completion or interruption) becomes one
//! [`SessionRecord`]. The full history is written to the store right after
//! each append; if the store refuses, the record is kept in memory and the
//! next append writes everything again.

use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::storage::{KvStore, SESSIONS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    /// Configured duration of the run, in seconds.
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    /// True if the countdown reached zero on its own.
    pub completed: bool,
    #[serde(rename = "date")]
    pub timestamp: DateTime<FixedOffset>,
}

/// Owner of the session history.
pub struct SessionRecorder {
    store: Rc<dyn KvStore>,
    clock: SharedClock,
    history: Vec<SessionRecord>,
    persisted: bool,
}

impl SessionRecorder {
    /// Load history from the store. Missing or malformed data means an
    /// empty history.
    pub fn new(store: Rc<dyn KvStore>, clock: SharedClock) -> Self {
        let history = load_history(store.as_ref());
        Self {
            store,
            clock,
            history,
            persisted: true,
        }
    }

    /// Append a record and persist the whole history immediately.
    pub fn record_session(&mut self, duration_secs: u64, completed: bool) -> &SessionRecord {
        let record = SessionRecord {
            id: self.fresh_id(),
            duration_secs,
            completed,
            timestamp: self.clock.now(),
        };
        tracing::info!(id = %record.id, duration_secs, completed, "session recorded");
        self.history.push(record);
        self.persist();
        &self.history[self.history.len() - 1]
    }

    /// Read-only view in insertion order.
    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    /// Whether the last write reached the store.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Drop the whole history.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    /// Consecutive-day streak over completed sessions.
    pub fn streak(&self) -> u32 {
        streak_of(&self.history)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.history.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        let value = match serde_json::to_value(&self.history) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode session history");
                self.persisted = false;
                return;
            }
        };
        match self.store.set(SESSIONS_KEY, &value) {
            Ok(()) => {
                if !self.persisted {
                    tracing::info!(sessions = self.history.len(), "session history persisted again");
                }
                self.persisted = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session history kept in memory only");
                self.persisted = false;
            }
        }
    }
}

fn load_history(store: &dyn KvStore) -> Vec<SessionRecord> {
    let value = match store.get(SESSIONS_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read session history, starting empty");
            return Vec::new();
        }
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stored session history is malformed, starting empty");
        Vec::new()
    })
}

/// Number of calendar-adjacent local days, newest first, that hold at least
/// one completed session. Incomplete sessions neither count nor break the
/// chain.
pub fn streak_of(records: &[SessionRecord]) -> u32 {
    let days: BTreeSet<NaiveDate> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.timestamp.date_naive())
        .collect();

    let mut streak = 0;
    let mut last: Option<NaiveDate> = None;
    for day in days.into_iter().rev() {
        if let Some(prev) = last {
            if (prev - day).num_days() > 1 {
                break;
            }
        }
        streak += 1;
        last = Some(day);
    }
    streak
}
