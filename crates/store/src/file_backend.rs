//! File-based store: the roster as one pretty-printed JSON document.
//!
//! Storage location: `~/.warband/data/roster.json` by default.
//!
//! Writes go to a sibling temp file that is then renamed over the
//! original, so a crash mid-write never leaves a truncated roster.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use warband_core::error::StoreError;
use warband_core::roster::Roster;
use warband_core::store::RosterStore;

/// A JSON-file-backed roster store.
///
/// Every load reads the file, so edits made by hand between requests are
/// picked up.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        debug!(path = %path.display(), "File roster store opened");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "roster.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RosterStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Roster, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No roster file yet, starting empty");
                return Ok(Roster::default());
            }
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            warn!(path = %self.path.display(), "Roster file is empty, starting fresh");
            return Ok(Roster::default());
        }

        let mut roster: Roster = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("{}: {e}", self.path.display()))
        })?;
        roster.normalize();
        Ok(roster)
    }

    async fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(roster)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize roster: {e}")))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content.as_bytes())
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to replace roster file: {e}")))?;

        debug!(path = %self.path.display(), characters = roster.characters.len(), "Roster saved");
        Ok(())
    }
}
