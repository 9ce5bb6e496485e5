//! RosterStore trait: persistence for the roster document.
//!
//! Stores load and save whole documents; callers serialize the
//! load-modify-save cycle themselves.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::progress::WeeklyProgressRecord;
use crate::roster::Roster;
use crate::season::SeasonWeek;

/// The core RosterStore trait.
///
/// Implementations: JSON file, SQLite, in-memory (for testing).
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// The backend name (e.g., "file", "sqlite", "memory").
    fn name(&self) -> &str;

    /// Load the roster, normalized. A store with nothing saved yet
    /// returns an empty roster.
    async fn load(&self) -> std::result::Result<Roster, StoreError>;

    /// Replace the stored roster.
    async fn save(&self, roster: &Roster) -> std::result::Result<(), StoreError>;

    /// Look up one weekly progress record. `None` when the character or
    /// the record does not exist.
    async fn weekly_record(
        &self,
        character_id: u32,
        week: SeasonWeek,
    ) -> std::result::Result<Option<WeeklyProgressRecord>, StoreError> {
        let roster = self.load().await?;
        Ok(roster
            .character(character_id)
            .ok()
            .and_then(|c| c.weekly_progress.get(&week).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::NewCharacter;

    struct FixedStore(Roster);

    #[async_trait]
    impl RosterStore for FixedStore {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn load(&self) -> std::result::Result<Roster, StoreError> {
            Ok(self.0.clone())
        }

        async fn save(&self, _roster: &Roster) -> std::result::Result<(), StoreError> {
            Err(StoreError::Storage("read-only".into()))
        }
    }

    #[tokio::test]
    async fn default_weekly_record_lookup() {
        let mut roster = Roster::default();
        roster.add_character(NewCharacter::default());
        let store = FixedStore(roster);

        let record = store
            .weekly_record(1, SeasonWeek::PRE_SEASON)
            .await
            .unwrap();
        assert_eq!(record, Some(WeeklyProgressRecord::default()));
        assert_eq!(store.weekly_record(1, SeasonWeek::FINAL).await.unwrap(), None);
        assert_eq!(store.weekly_record(8, SeasonWeek::PRE_SEASON).await.unwrap(), None);
    }
}
