//! The roster document: season metadata plus every tracked character, and
//! the operations the dashboard and CLI perform on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::character::{
    Character, CharacterConfigUpdate, CrestKind, GearUpdate, NewCharacter, ProfessionUpdate,
};
use crate::error::RosterError;
use crate::progress::{WeeklyProgressRecord, WeeklyProgressUpdate};
use crate::season::SeasonWeek;
use crate::vault::{self, RewardSlotProjection};

/// Season-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMeta {
    #[serde(default)]
    pub current_week: SeasonWeek,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for RosterMeta {
    fn default() -> Self {
        Self {
            current_week: SeasonWeek::PRE_SEASON,
            last_updated: None,
        }
    }
}

/// Which checklist a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Weekly,
    Daily,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub meta: RosterMeta,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Roster {
    pub fn current_week(&self) -> SeasonWeek {
        self.meta.current_week
    }

    /// Fill in defaults missing from older documents and restore display
    /// order.
    pub fn normalize(&mut self) {
        for character in &mut self.characters {
            character.normalize();
        }
        self.characters.sort_by_key(Character::sort_key);
    }

    /// Stamp the document as modified.
    pub fn touch(&mut self) {
        self.meta.last_updated = Some(Utc::now());
    }

    pub fn character(&self, id: u32) -> Result<&Character, RosterError> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or(RosterError::CharacterNotFound(id))
    }

    pub fn character_mut(&mut self, id: u32) -> Result<&mut Character, RosterError> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RosterError::CharacterNotFound(id))
    }

    fn next_id(&self) -> u32 {
        self.characters.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn add_character(&mut self, new: NewCharacter) -> &Character {
        let id = self.next_id();
        let name = new
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Character {id}"));

        let mut character = Character::new(id, name);
        character.realm = new.realm;
        character.character_name = new.character_name;
        character.order = Some(self.characters.len() as u32 + 1);
        character.set_professions(new.professions);
        character
            .weekly_progress
            .insert(self.meta.current_week, WeeklyProgressRecord::default());

        info!(id, name = %character.name, "Character added");
        self.characters.push(character);
        &self.characters[self.characters.len() - 1]
    }

    pub fn delete_character(&mut self, id: u32) -> Result<(), RosterError> {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        if self.characters.len() == before {
            return Err(RosterError::CharacterNotFound(id));
        }
        info!(id, "Character deleted");
        Ok(())
    }

    /// Assign display positions from `ids`. Unknown ids are ignored and
    /// characters not listed are renumbered after the listed ones, keeping
    /// their relative order.
    pub fn reorder(&mut self, ids: &[u32]) {
        for (position, id) in ids.iter().enumerate() {
            if let Some(c) = self.characters.iter_mut().find(|c| c.id == *id) {
                c.order = Some(position as u32 + 1);
            }
        }

        let mut unlisted: Vec<usize> = (0..self.characters.len())
            .filter(|&i| !ids.contains(&self.characters[i].id))
            .collect();
        unlisted.sort_by_key(|&i| self.characters[i].sort_key());

        let listed = ids.len() as u32;
        for (rank, i) in unlisted.into_iter().enumerate() {
            self.characters[i].order = Some(listed.saturating_add(rank as u32 + 1));
        }
        self.characters.sort_by_key(Character::sort_key);
    }

    pub fn update_config(
        &mut self,
        id: u32,
        update: CharacterConfigUpdate,
    ) -> Result<&Character, RosterError> {
        let character = self.character_mut(id)?;
        if let Some(name) = update.name {
            character.name = name;
        }
        if let Some(realm) = update.realm {
            character.realm = realm;
        }
        if let Some(character_name) = update.character_name {
            character.character_name = character_name;
        }
        Ok(character)
    }

    pub fn update_gear(&mut self, id: u32, update: &GearUpdate) -> Result<f64, RosterError> {
        let character = self.character_mut(id)?;
        character.update_gear(update);
        Ok(character.average_ilvl())
    }

    pub fn set_professions(&mut self, id: u32, professions: Vec<String>) -> Result<(), RosterError> {
        self.character_mut(id)?.set_professions(professions);
        Ok(())
    }

    /// Update progress for one of the character's professions. Professions
    /// the character does not have are ignored.
    pub fn update_profession(&mut self, id: u32, update: &ProfessionUpdate) -> Result<(), RosterError> {
        let character = self.character_mut(id)?;
        if let Some(progress) = character.profession_progress.get_mut(&update.profession) {
            progress.apply(update);
        }
        Ok(())
    }

    /// Mark a task done or undone. Weekly tasks are filed under the current
    /// week.
    pub fn set_task(
        &mut self,
        id: u32,
        kind: TaskKind,
        task_id: &str,
        done: bool,
    ) -> Result<(), RosterError> {
        let week = self.meta.current_week;
        let character = self.character_mut(id)?;
        let tasks = match kind {
            TaskKind::Weekly => character.weekly_tasks.entry(week).or_default(),
            TaskKind::Daily => &mut character.daily_tasks,
        };
        tasks.insert(task_id.to_string(), done);
        Ok(())
    }

    pub fn reset_daily(&mut self) {
        for character in &mut self.characters {
            character.daily_tasks.clear();
        }
        info!("Daily tasks reset");
    }

    /// Record crests collected this week. Negative amounts store zero; there
    /// is no cap.
    pub fn record_crests(
        &mut self,
        id: u32,
        kind: CrestKind,
        amount: i64,
    ) -> Result<u32, RosterError> {
        let week = self.meta.current_week;
        let character = self.character_mut(id)?;
        let ledger = character.crests.entry(kind).or_default();
        ledger.record(week, amount);
        Ok(ledger.collected_in(week))
    }

    /// Move the season to `week`. Changing week clears daily tasks and
    /// seeds an empty progress record for every character.
    pub fn set_current_week(&mut self, week: i64) -> Result<SeasonWeek, RosterError> {
        let week = SeasonWeek::new(week).ok_or(RosterError::InvalidWeek(week))?;
        if week == self.meta.current_week {
            return Ok(week);
        }

        let previous = self.meta.current_week;
        self.meta.current_week = week;
        for character in &mut self.characters {
            character.daily_tasks.clear();
            character.weekly_progress.entry(week).or_default();
        }
        info!(from = previous.get(), to = week.get(), "Season week changed");
        Ok(week)
    }

    pub fn weekly_record(&self, id: u32, week: SeasonWeek) -> Result<Option<&WeeklyProgressRecord>, RosterError> {
        Ok(self.character(id)?.weekly_progress.get(&week))
    }

    /// Create-or-update the progress record for (character, week).
    pub fn upsert_weekly_progress(
        &mut self,
        id: u32,
        week: SeasonWeek,
        update: WeeklyProgressUpdate,
    ) -> Result<&WeeklyProgressRecord, RosterError> {
        let character = self.character_mut(id)?;
        let record = character.weekly_progress.entry(week).or_default();
        record.apply(update);
        debug!(id, week = week.get(), kills = record.total_kills(), "Weekly progress saved");
        Ok(record)
    }

    /// Project the vault for one character at `week` (the current week when
    /// `None`).
    pub fn project_vault(&self, id: u32, week: Option<SeasonWeek>) -> Result<RewardSlotProjection, RosterError> {
        let week = week.unwrap_or(self.meta.current_week);
        let record = self.weekly_record(id, week)?;
        Ok(vault::project(record, week.get() as i64))
    }
}
