//! Achievement catalog state.
//!
//! The engine is the only writer of the catalog. Every mutation is written
//! through to the store before the method returns; a failed write is logged
//! and retried with the next mutation.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{seed_catalog, Achievement};
use crate::clock::SharedClock;
use crate::events::Event;
use crate::storage::{KvStore, ACHIEVEMENTS_KEY};

/// Content of the "recently unlocked" slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockNotification {
    pub id: Uuid,
    pub achievement: Achievement,
}

pub struct AchievementEngine {
    store: Rc<dyn KvStore>,
    clock: SharedClock,
    catalog: Vec<Achievement>,
    recent_unlock: Option<UnlockNotification>,
}

impl AchievementEngine {
    /// Load the catalog, falling back to the seed for anything missing or
    /// unreadable.
    ///
    /// # Panics
    /// Panics if the resulting catalog is empty, which means the seed list
    /// was wired incorrectly.
    pub fn new(store: Rc<dyn KvStore>, clock: SharedClock) -> Self {
        let catalog = load_catalog(store.as_ref());
        assert!(!catalog.is_empty(), "achievement catalog must be seeded");
        Self {
            store,
            clock,
            catalog,
            recent_unlock: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn achievements(&self) -> &[Achievement] {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.catalog.iter().find(|a| a.id == id)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.get(id).is_some_and(|a| a.unlocked)
    }

    /// Entries a listing should show: everything except locked secrets.
    pub fn visible(&self) -> impl Iterator<Item = &Achievement> {
        self.catalog.iter().filter(|a| a.is_visible())
    }

    pub fn total_unlocked(&self) -> usize {
        self.catalog.iter().filter(|a| a.unlocked).count()
    }

    pub fn total_achievements(&self) -> usize {
        self.catalog.len()
    }

    pub fn recent_unlock(&self) -> Option<&UnlockNotification> {
        self.recent_unlock.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Unlock `id`. Unknown or already unlocked ids are ignored.
    pub fn unlock(&mut self, id: &str) -> Option<Event> {
        let index = self.catalog.iter().position(|a| a.id == id && !a.unlocked)?;
        let event = self.mark_unlocked(index);
        self.persist();
        Some(event)
    }

    /// Set progress, clamped to `[0, max_progress]`. Reaching the maximum
    /// unlocks in the same step. Ids without progress tracking are ignored.
    pub fn update_progress(&mut self, id: &str, value: i64) -> Option<Event> {
        let index = self.catalog.iter().position(|a| a.id == id)?;
        let max = self.catalog[index].max_progress?;
        let clamped = u32::try_from(value.clamp(0, i64::from(max))).unwrap_or(0);

        let achievement = &mut self.catalog[index];
        let changed = achievement.progress != Some(clamped);
        achievement.progress = Some(clamped);
        let crossed = clamped == max && !achievement.unlocked;

        let event = crossed.then(|| self.mark_unlocked(index));
        if changed || event.is_some() {
            self.persist();
        }
        event
    }

    /// Restore the seed catalog and clear the recent-unlock slot.
    pub fn reset(&mut self) {
        self.catalog = seed_catalog();
        self.recent_unlock = None;
        tracing::info!("achievements reset");
        self.persist();
    }

    pub fn dismiss_recent_unlock(&mut self) {
        self.recent_unlock = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mark_unlocked(&mut self, index: usize) -> Event {
        let now = self.clock.now();
        let achievement = &mut self.catalog[index];
        achievement.unlocked = true;
        achievement.unlocked_at = Some(now);
        tracing::info!(id = %achievement.id, "achievement unlocked");

        let achievement = achievement.clone();
        self.recent_unlock = Some(UnlockNotification {
            id: Uuid::new_v4(),
            achievement: achievement.clone(),
        });
        Event::AchievementUnlocked { achievement, at: now }
    }

    fn persist(&self) {
        let value = match serde_json::to_value(&self.catalog) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode achievements");
                return;
            }
        };
        if let Err(e) = self.store.set(ACHIEVEMENTS_KEY, &value) {
            tracing::warn!(error = %e, "achievements kept in memory only");
        }
    }
}

/// Stored entries overlay the seed by id; ids the seed no longer knows are
/// dropped and new seed entries appear locked.
fn load_catalog(store: &dyn KvStore) -> Vec<Achievement> {
    let mut catalog = seed_catalog();
    let stored: Vec<Achievement> = match store.get(ACHIEVEMENTS_KEY) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "stored achievements are malformed, using seed");
                return catalog;
            }
        },
        Ok(None) => return catalog,
        Err(e) => {
            tracing::warn!(error = %e, "could not read achievements, using seed");
            return catalog;
        }
    };

    for entry in &mut catalog {
        if let Some(saved) = stored.iter().find(|s| s.id == entry.id) {
            entry.unlocked = saved.unlocked;
            entry.unlocked_at = saved.unlocked_at;
            if let (Some(max), Some(progress)) = (entry.max_progress, saved.progress) {
                entry.progress = Some(progress.min(max));
            }
        }
    }
    catalog
}
