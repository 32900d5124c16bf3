pub mod achievements;
pub mod config;
pub mod history;
pub mod run;
pub mod stats;
pub mod streak;

use std::rc::Rc;

use cosmofocus_core::{KvStore, SharedClock, SqliteStore, SystemClock};

/// Store and clock every command works against.
pub(crate) fn open_backend() -> Result<(Rc<dyn KvStore>, SharedClock), Box<dyn std::error::Error>> {
    let store: Rc<dyn KvStore> = Rc::new(SqliteStore::open()?);
    let clock: SharedClock = Rc::new(SystemClock);
    Ok((store, clock))
}
