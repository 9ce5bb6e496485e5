//! In-memory store, useful for testing and throwaway sessions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use warband_core::error::StoreError;
use warband_core::roster::Roster;
use warband_core::store::RosterStore;

/// A store that keeps the roster in process memory.
pub struct InMemoryStore {
    roster: Arc<RwLock<Roster>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_roster(Roster::default())
    }

    /// Start from an existing roster.
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Arc::new(RwLock::new(roster)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for InMemoryStore {
    fn name(&self) -> &str { "memory" }

    async fn load(&self) -> Result<Roster, StoreError> {
        let mut roster = self.roster.read().await.clone();
        roster.normalize();
        Ok(roster)
    }

    async fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        *self.roster.write().await = roster.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warband_core::character::NewCharacter;

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryStore::new();
        let roster = store.load().await.unwrap();
        assert!(roster.characters.is_empty());
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryStore::new();
        let mut roster = store.load().await.unwrap();
        roster.add_character(NewCharacter::default());
        roster.set_current_week(3).unwrap();
        store.save(&roster).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.characters.len(), 1);
        assert_eq!(loaded.current_week().get(), 3);
    }
}
