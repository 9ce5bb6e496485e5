//! `warband week` — Set the current season week.

use tracing::info;
use warband_config::AppConfig;
use warband_core::season::SeasonWeek;
use warband_core::store::RosterStore;

pub async fn run(week: i64) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = warband_store::open(&config).await?;

    let week = apply(store.as_ref(), week).await?;
    println!("✅ Current week set to {week}");
    Ok(())
}

/// Move the stored roster to `week`. Changing weeks clears daily tasks.
pub async fn apply(
    store: &dyn RosterStore,
    week: i64,
) -> Result<SeasonWeek, Box<dyn std::error::Error>> {
    let mut roster = store.load().await?;
    let week = roster.set_current_week(week)?;
    roster.touch();
    store.save(&roster).await?;
    info!(week = week.get(), backend = store.name(), "Current week changed");
    Ok(week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warband_store::InMemoryStore;

    #[tokio::test]
    async fn week_is_persisted() {
        let store = InMemoryStore::new();
        let week = apply(&store, 7).await.unwrap();
        assert_eq!(week.get(), 7);

        let roster = store.load().await.unwrap();
        assert_eq!(roster.current_week().get(), 7);
        assert!(roster.meta.last_updated.is_some());
    }

    #[tokio::test]
    async fn out_of_range_week_leaves_store_untouched() {
        let store = InMemoryStore::new();
        assert!(apply(&store, 13).await.is_err());
        assert!(apply(&store, -1).await.is_err());

        let roster = store.load().await.unwrap();
        assert_eq!(roster.current_week().get(), 0);
        assert!(roster.meta.last_updated.is_none());
    }
}
