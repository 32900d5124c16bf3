//! Gamified achievement layer: the catalog, its owner, and the unlock rules.

pub mod catalog;
mod engine;
mod tracker;

pub use catalog::{seed_catalog, Achievement};
pub use engine::{AchievementEngine, UnlockNotification};
pub use tracker::AchievementTracker;
