//! Roster storage backends for Warband.

pub mod in_memory;
pub mod file_backend;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use file_backend::FileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;
use tracing::{debug, info};
use warband_config::AppConfig;
use warband_core::error::StoreError;
use warband_core::roster::Roster;
use warband_core::season::SeasonWeek;
use warband_core::store::RosterStore;

/// Open the backend named by `[store].backend`. Opening never modifies
/// the roster.
pub async fn open(config: &AppConfig) -> Result<Arc<dyn RosterStore>, StoreError> {
    let store: Arc<dyn RosterStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(InMemoryStore::new()),
        "file" => Arc::new(FileStore::new(config.roster_file())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Arc::new(SqliteStore::open(&config.sqlite_path()).await?),
        other => {
            return Err(StoreError::Storage(format!(
                "Storage backend '{other}' is not available in this build"
            )));
        }
    };

    info!(backend = store.name(), "Roster store ready");
    Ok(store)
}

/// Load the roster for display. A roster that has never been saved is
/// shown in `[season].default_week`; nothing is written back.
pub async fn load_roster(store: &dyn RosterStore, config: &AppConfig) -> Result<Roster, StoreError> {
    let mut roster = store.load().await?;
    apply_default_week(&mut roster, config.season.default_week);
    Ok(roster)
}

/// Persist `[season].default_week` into a roster that has never been
/// saved. Called by the server before it starts taking writes.
pub async fn seed_default_week(store: &dyn RosterStore, week: u8) -> Result<(), StoreError> {
    let mut roster = store.load().await?;
    if !apply_default_week(&mut roster, week) {
        return Ok(());
    }
    roster.touch();
    store.save(&roster).await?;
    debug!(week, "Default week seeded");
    Ok(())
}

fn apply_default_week(roster: &mut Roster, week: u8) -> bool {
    if roster.meta.last_updated.is_some() || !roster.characters.is_empty() {
        return false;
    }
    let week = SeasonWeek::clamped(week as i64);
    if roster.meta.current_week == week {
        return false;
    }
    roster.meta.current_week = week;
    true
}
