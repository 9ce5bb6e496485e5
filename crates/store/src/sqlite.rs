//! SQLite store.
//!
//! Uses a single SQLite database file with three tables:
//! - `roster_meta`: one row holding the season metadata
//! - `characters`: one row per character, JSON body plus display position
//! - `weekly_progress`: one row per (character, week) progress record
//!
//! Saves rewrite all three tables inside one transaction.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use warband_core::character::Character;
use warband_core::error::StoreError;
use warband_core::progress::WeeklyProgressRecord;
use warband_core::roster::{Roster, RosterMeta};
use warband_core::season::SeasonWeek;
use warband_core::store::RosterStore;

/// A SQLite-backed roster store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a store from a connection string.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?;
        Self::connect(options, url).await
    }

    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect(options, &path.display().to_string()).await
    }

    async fn connect(options: SqliteConnectOptions, label: &str) -> Result<Self, StoreError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite roster store initialized at {label}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS roster_meta (
                id    INTEGER PRIMARY KEY CHECK (id = 1),
                body  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("roster_meta table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id        INTEGER PRIMARY KEY,
                position  INTEGER NOT NULL,
                body      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("characters table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weekly_progress (
                character_id  INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
                week          INTEGER NOT NULL,
                body          TEXT NOT NULL,
                PRIMARY KEY (character_id, week)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("weekly_progress table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn body<T: serde::de::DeserializeOwned>(
        row: &sqlx::sqlite::SqliteRow,
        what: &str,
    ) -> Result<T, StoreError> {
        let body: String = row
            .try_get("body")
            .map_err(|e| StoreError::QueryFailed(format!("{what} body column: {e}")))?;
        serde_json::from_str(&body).map_err(|e| StoreError::Corrupt(format!("{what}: {e}")))
    }

    async fn load_progress(&self) -> Result<Vec<(u32, SeasonWeek, WeeklyProgressRecord)>, StoreError> {
        let rows = sqlx::query("SELECT character_id, week, body FROM weekly_progress")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("weekly_progress scan: {e}")))?;

        rows.iter()
            .map(|row| -> Result<_, StoreError> {
                let character_id: i64 = row
                    .try_get("character_id")
                    .map_err(|e| StoreError::QueryFailed(format!("character_id column: {e}")))?;
                let week: i64 = row
                    .try_get("week")
                    .map_err(|e| StoreError::QueryFailed(format!("week column: {e}")))?;
                let week = SeasonWeek::new(week)
                    .ok_or_else(|| StoreError::Corrupt(format!("week {week} out of range")))?;
                let record: WeeklyProgressRecord = Self::body(row, "weekly progress")?;
                Ok((character_id as u32, week, record))
            })
            .collect()
    }
}

#[async_trait]
impl RosterStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> Result<Roster, StoreError> {
        let meta: RosterMeta = match sqlx::query("SELECT body FROM roster_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("roster_meta: {e}")))?
        {
            Some(row) => Self::body(&row, "roster meta")?,
            None => RosterMeta::default(),
        };

        let rows = sqlx::query("SELECT body FROM characters ORDER BY position, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("characters scan: {e}")))?;
        let mut characters = rows
            .iter()
            .map(|row| Self::body::<Character>(row, "character"))
            .collect::<Result<Vec<_>, _>>()?;

        for (character_id, week, record) in self.load_progress().await? {
            if let Some(c) = characters.iter_mut().find(|c| c.id == character_id) {
                c.weekly_progress.insert(week, record);
            }
        }

        let mut roster = Roster { meta, characters };
        roster.normalize();
        Ok(roster)
    }

    async fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Storage(format!("BEGIN failed: {e}")))?;

        let meta = serde_json::to_string(&roster.meta)
            .map_err(|e| StoreError::Storage(format!("Meta serialization: {e}")))?;
        sqlx::query(
            "INSERT INTO roster_meta (id, body) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body",
        )
        .bind(&meta)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Storage(format!("roster_meta upsert: {e}")))?;

        sqlx::query("DELETE FROM weekly_progress")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Storage(format!("weekly_progress clear: {e}")))?;
        sqlx::query("DELETE FROM characters")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Storage(format!("characters clear: {e}")))?;

        for (position, character) in roster.characters.iter().enumerate() {
            // Progress records live in their own table.
            let mut body = character.clone();
            let progress = std::mem::take(&mut body.weekly_progress);
            let body = serde_json::to_string(&body)
                .map_err(|e| StoreError::Storage(format!("Character serialization: {e}")))?;

            sqlx::query("INSERT INTO characters (id, position, body) VALUES (?1, ?2, ?3)")
                .bind(character.id as i64)
                .bind(position as i64)
                .bind(&body)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Storage(format!("character {} insert: {e}", character.id)))?;

            for (week, record) in &progress {
                let record = serde_json::to_string(record)
                    .map_err(|e| StoreError::Storage(format!("Progress serialization: {e}")))?;
                sqlx::query(
                    "INSERT INTO weekly_progress (character_id, week, body) VALUES (?1, ?2, ?3)",
                )
                .bind(character.id as i64)
                .bind(week.get() as i64)
                .bind(&record)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Storage(format!("weekly_progress insert: {e}")))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(format!("COMMIT failed: {e}")))?;
        debug!(characters = roster.characters.len(), "Roster saved to SQLite");
        Ok(())
    }

    async fn weekly_record(
        &self,
        character_id: u32,
        week: SeasonWeek,
    ) -> Result<Option<WeeklyProgressRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT body FROM weekly_progress WHERE character_id = ?1 AND week = ?2",
        )
        .bind(character_id as i64)
        .bind(week.get() as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("weekly_progress lookup: {e}")))?;

        row.map(|row| -> Result<_, StoreError> {
            let mut record: WeeklyProgressRecord = Self::body(&row, "weekly progress")?;
            record.normalize();
            Ok(record)
        })
        .transpose()
    }
}
