//! Character records: gear snapshot, crest ledgers, professions, task
//! checklists, BiS wishlist and saved talent builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RosterError;
use crate::progress::WeeklyProgressRecord;
use crate::season::SeasonWeek;

/// Equipment slots, in paper-doll order.
pub const GEAR_SLOTS: [&str; 16] = [
    "head",
    "neck",
    "shoulder",
    "back",
    "chest",
    "wrist",
    "hands",
    "waist",
    "legs",
    "feet",
    "ring1",
    "ring2",
    "trinket1",
    "trinket2",
    "main_hand",
    "off_hand",
];

/// Concentration ceiling for a profession.
pub const MAX_CONCENTRATION: u32 = 1000;

/// One equipped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearItem {
    #[serde(default)]
    pub ilvl: u32,
    #[serde(default = "default_track")]
    pub track: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_id: u64,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default)]
    pub sockets: u32,
    #[serde(default)]
    pub enchanted: bool,
}

fn default_track() -> String {
    "Adventurer".into()
}

fn default_quality() -> String {
    "COMMON".into()
}

impl Default for GearItem {
    fn default() -> Self {
        Self {
            ilvl: 0,
            track: default_track(),
            item_name: String::new(),
            item_id: 0,
            quality: default_quality(),
            sockets: 0,
            enchanted: false,
        }
    }
}

/// Average equipped item level over all 16 slots, rounded to one decimal.
/// Empty slots count as zero.
pub fn average_ilvl(gear: &BTreeMap<String, GearItem>) -> f64 {
    let total: u64 = gear.values().map(|g| g.ilvl as u64).sum();
    (total as f64 / GEAR_SLOTS.len() as f64 * 10.0).round() / 10.0
}

/// Upgrade currency tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrestKind {
    Weathered,
    Carved,
    Runed,
    Gilded,
}

impl CrestKind {
    pub const ALL: [CrestKind; 4] = [
        CrestKind::Weathered,
        CrestKind::Carved,
        CrestKind::Runed,
        CrestKind::Gilded,
    ];

    pub fn parse(name: &str) -> Result<Self, RosterError> {
        match name {
            "weathered" => Ok(Self::Weathered),
            "carved" => Ok(Self::Carved),
            "runed" => Ok(Self::Runed),
            "gilded" => Ok(Self::Gilded),
            other => Err(RosterError::UnknownCrest(other.to_string())),
        }
    }
}

/// Crests collected per week for one tier. Totals are derived from the
/// history, never stored separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrestLedger {
    #[serde(default)]
    pub weekly_history: BTreeMap<SeasonWeek, u32>,
}

impl CrestLedger {
    pub fn record(&mut self, week: SeasonWeek, amount: i64) {
        let amount = amount.clamp(0, u32::MAX as i64) as u32;
        self.weekly_history.insert(week, amount);
    }

    pub fn collected_in(&self, week: SeasonWeek) -> u32 {
        self.weekly_history.get(&week).copied().unwrap_or(0)
    }

    pub fn total_collected(&self) -> u64 {
        self.weekly_history.values().map(|v| *v as u64).sum()
    }
}

/// Weekly profession chores and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionProgress {
    #[serde(default)]
    pub weekly_quest: bool,
    #[serde(default)]
    pub patron_orders: bool,
    #[serde(default)]
    pub treatise: bool,
    #[serde(default)]
    pub knowledge_points: u32,
    #[serde(default = "default_concentration")]
    pub concentration: u32,
}

fn default_concentration() -> u32 {
    MAX_CONCENTRATION
}

impl Default for ProfessionProgress {
    fn default() -> Self {
        Self {
            weekly_quest: false,
            patron_orders: false,
            treatise: false,
            knowledge_points: 0,
            concentration: MAX_CONCENTRATION,
        }
    }
}

/// Partial profession update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionUpdate {
    pub profession: String,
    #[serde(default)]
    pub weekly_quest: Option<bool>,
    #[serde(default)]
    pub patron_orders: Option<bool>,
    #[serde(default)]
    pub treatise: Option<bool>,
    #[serde(default)]
    pub knowledge_points: Option<i64>,
    #[serde(default)]
    pub concentration: Option<i64>,
}

impl ProfessionProgress {
    pub fn apply(&mut self, update: &ProfessionUpdate) {
        if let Some(v) = update.weekly_quest {
            self.weekly_quest = v;
        }
        if let Some(v) = update.patron_orders {
            self.patron_orders = v;
        }
        if let Some(v) = update.treatise {
            self.treatise = v;
        }
        if let Some(v) = update.knowledge_points {
            self.knowledge_points = v.clamp(0, u32::MAX as i64) as u32;
        }
        if let Some(v) = update.concentration {
            self.concentration = v.clamp(0, MAX_CONCENTRATION as i64) as u32;
        }
    }
}

/// A best-in-slot wishlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BisItem {
    pub id: u32,
    pub slot: String,
    pub item_name: String,
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub target_ilvl: Option<u32>,
    #[serde(default)]
    pub obtained: bool,
    #[serde(default)]
    pub synced: bool,
}

/// A saved talent loadout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentBuild {
    pub id: u32,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub talent_string: String,
}

/// One tracked character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub character_name: String,
    #[serde(default, rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub professions: Vec<String>,
    /// Display position; defaults to the id.
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub gear: BTreeMap<String, GearItem>,
    #[serde(default)]
    pub crests: BTreeMap<CrestKind, CrestLedger>,
    #[serde(default)]
    pub profession_progress: BTreeMap<String, ProfessionProgress>,
    #[serde(default)]
    pub weekly_tasks: BTreeMap<SeasonWeek, BTreeMap<String, bool>>,
    #[serde(default)]
    pub daily_tasks: BTreeMap<String, bool>,
    #[serde(default)]
    pub weekly_progress: BTreeMap<SeasonWeek, WeeklyProgressRecord>,
    #[serde(default)]
    pub bis_list: Vec<BisItem>,
    #[serde(default)]
    pub talent_builds: Vec<TalentBuild>,
}

impl Character {
    /// A blank character with every slot, crest tier and profession
    /// initialised.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        let mut character = Self {
            id,
            name: name.into(),
            realm: String::new(),
            character_name: String::new(),
            class_name: String::new(),
            level: 0,
            professions: Vec::new(),
            order: Some(id),
            gear: BTreeMap::new(),
            crests: BTreeMap::new(),
            profession_progress: BTreeMap::new(),
            weekly_tasks: BTreeMap::new(),
            daily_tasks: BTreeMap::new(),
            weekly_progress: BTreeMap::new(),
            bis_list: Vec::new(),
            talent_builds: Vec::new(),
        };
        character.normalize();
        character
    }

    pub fn sort_key(&self) -> u32 {
        self.order.unwrap_or(self.id)
    }

    pub fn average_ilvl(&self) -> f64 {
        average_ilvl(&self.gear)
    }

    /// Fill in anything older data files are missing.
    pub fn normalize(&mut self) {
        for slot in GEAR_SLOTS {
            self.gear.entry(slot.to_string()).or_default();
        }
        for kind in CrestKind::ALL {
            self.crests.entry(kind).or_default();
        }
        for prof in self.professions.iter().filter(|p| !p.is_empty()) {
            self.profession_progress.entry(prof.clone()).or_default();
        }
        if self.order.is_none() {
            self.order = Some(self.id);
        }
        for record in self.weekly_progress.values_mut() {
            record.normalize();
        }
    }

    /// Replace the profession list, keeping progress of professions that
    /// stay selected.
    pub fn set_professions(&mut self, professions: Vec<String>) {
        self.profession_progress
            .retain(|name, _| professions.contains(name));
        for prof in professions.iter().filter(|p| !p.is_empty()) {
            self.profession_progress.entry(prof.clone()).or_default();
        }
        self.professions = professions;
    }

    /// Manual gear override. Unknown slots are ignored.
    pub fn update_gear(&mut self, update: &GearUpdate) {
        let Some(item) = self.gear.get_mut(&update.slot) else {
            return;
        };
        if let Some(ilvl) = update.ilvl {
            item.ilvl = ilvl.clamp(0, u32::MAX as i64) as u32;
        }
        if let Some(track) = &update.track {
            item.track = track.clone();
        }
        if let Some(name) = &update.item_name {
            item.item_name = name.clone();
        }
    }

    pub fn crests_this_week(&self, kind: CrestKind, week: SeasonWeek) -> u32 {
        self.crests
            .get(&kind)
            .map(|l| l.collected_in(week))
            .unwrap_or(0)
    }

    fn next_bis_id(&self) -> u32 {
        self.bis_list.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    pub fn add_bis(&mut self, new: NewBisItem) -> Result<&BisItem, RosterError> {
        if new.slot.trim().is_empty() || new.item_name.trim().is_empty() {
            return Err(RosterError::MissingField("slot and item name"));
        }
        let item = BisItem {
            id: self.next_bis_id(),
            slot: new.slot,
            item_name: new.item_name,
            item_id: new.item_id.filter(|id| *id > 0),
            target_ilvl: new.target_ilvl.filter(|ilvl| *ilvl > 0),
            obtained: false,
            synced: false,
        };
        self.bis_list.push(item);
        Ok(&self.bis_list[self.bis_list.len() - 1])
    }

    pub fn update_bis(&mut self, bis_id: u32, update: BisUpdate) -> Result<&BisItem, RosterError> {
        let character_id = self.id;
        let item = self
            .bis_list
            .iter_mut()
            .find(|b| b.id == bis_id)
            .ok_or(RosterError::BisItemNotFound { character_id, bis_id })?;

        if let Some(obtained) = update.obtained {
            item.obtained = obtained;
            if !obtained {
                item.synced = false;
            }
        }
        if let Some(name) = update.item_name {
            item.item_name = name;
        }
        if let Some(item_id) = update.item_id {
            item.item_id = item_id.filter(|id| *id > 0);
        }
        if let Some(target) = update.target_ilvl {
            item.target_ilvl = target.filter(|ilvl| *ilvl > 0);
        }
        Ok(item)
    }

    /// Remove a BiS entry. Deleting an unknown id is not an error.
    pub fn delete_bis(&mut self, bis_id: u32) {
        self.bis_list.retain(|b| b.id != bis_id);
    }

    fn next_talent_id(&self) -> u32 {
        self.talent_builds.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn add_talent_build(&mut self, new: NewTalentBuild) -> Result<&TalentBuild, RosterError> {
        if new.category.trim().is_empty() || new.name.trim().is_empty() {
            return Err(RosterError::MissingField("category and name"));
        }
        let build = TalentBuild {
            id: self.next_talent_id(),
            category: new.category,
            name: new.name,
            description: new.description,
            talent_string: new.talent_string,
        };
        self.talent_builds.push(build);
        Ok(&self.talent_builds[self.talent_builds.len() - 1])
    }

    pub fn update_talent_build(
        &mut self,
        talent_id: u32,
        update: TalentBuildUpdate,
    ) -> Result<&TalentBuild, RosterError> {
        let character_id = self.id;
        let build = self
            .talent_builds
            .iter_mut()
            .find(|t| t.id == talent_id)
            .ok_or(RosterError::TalentBuildNotFound {
                character_id,
                talent_id,
            })?;

        if let Some(name) = update.name {
            build.name = name;
        }
        if let Some(description) = update.description {
            build.description = description;
        }
        if let Some(talent_string) = update.talent_string {
            build.talent_string = talent_string;
        }
        if let Some(category) = update.category {
            build.category = category;
        }
        Ok(build)
    }

    pub fn delete_talent_build(&mut self, talent_id: u32) {
        self.talent_builds.retain(|t| t.id != talent_id);
    }
}

// ── Requests ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCharacter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub character_name: String,
    #[serde(default)]
    pub professions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterConfigUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
    #[serde(default)]
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GearUpdate {
    pub slot: String,
    #[serde(default)]
    pub ilvl: Option<i64>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBisItem {
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub target_ilvl: Option<u32>,
}

/// BiS edit. The nested `Option`s distinguish "leave alone" (absent) from
/// "clear" (`null`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BisUpdate {
    #[serde(default)]
    pub obtained: Option<bool>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub item_id: Option<Option<u64>>,
    #[serde(default, deserialize_with = "present")]
    pub target_ilvl: Option<Option<u32>>,
}

/// Deserialize a field that is present (possibly `null`) as `Some(..)`.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTalentBuild {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub talent_string: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TalentBuildUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub talent_string: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_character_is_fully_initialised() {
        let c = Character::new(4, "Alt");
        assert_eq!(c.gear.len(), 16);
        assert_eq!(c.crests.len(), 4);
        assert_eq!(c.order, Some(4));
        assert_eq!(c.gear["head"].track, "Adventurer");
        assert_eq!(c.average_ilvl(), 0.0);
    }

    #[test]
    fn average_ilvl_divides_by_sixteen() {
        let mut c = Character::new(1, "Main");
        for (i, item) in c.gear.values_mut().enumerate() {
            item.ilvl = if i == 0 { 251 } else { 250 };
        }
        // (251 + 15 * 250) / 16 = 250.0625
        assert_eq!(c.average_ilvl(), 250.1);

        c.gear.get_mut("neck").unwrap().ilvl = 0;
        assert!(c.average_ilvl() < 250.0);
    }

    #[test]
    fn crest_ledger_tracks_weeks() {
        let mut ledger = CrestLedger::default();
        ledger.record(SeasonWeek::clamped(1), 90);
        ledger.record(SeasonWeek::clamped(2), -10);
        ledger.record(SeasonWeek::clamped(3), 200);
        assert_eq!(ledger.collected_in(SeasonWeek::clamped(2)), 0);
        assert_eq!(ledger.collected_in(SeasonWeek::clamped(3)), 200);
        assert_eq!(ledger.total_collected(), 290);
    }

    #[test]
    fn crest_kind_parsing() {
        assert_eq!(CrestKind::parse("runed"), Ok(CrestKind::Runed));
        assert!(matches!(
            CrestKind::parse("valorstone"),
            Err(RosterError::UnknownCrest(_))
        ));
    }

    #[test]
    fn profession_update_clamps() {
        let mut p = ProfessionProgress::default();
        p.apply(&ProfessionUpdate {
            profession: "Alchemy".into(),
            treatise: Some(true),
            knowledge_points: Some(-4),
            concentration: Some(4000),
            ..ProfessionUpdate::default()
        });
        assert!(p.treatise);
        assert!(!p.weekly_quest);
        assert_eq!(p.knowledge_points, 0);
        assert_eq!(p.concentration, MAX_CONCENTRATION);
    }

    #[test]
    fn set_professions_keeps_retained_progress() {
        let mut c = Character::new(1, "Main");
        c.set_professions(vec!["Alchemy".into(), "Herbalism".into()]);
        c.profession_progress.get_mut("Alchemy").unwrap().knowledge_points = 30;

        c.set_professions(vec!["Alchemy".into(), "Inscription".into(), String::new()]);
        assert_eq!(c.profession_progress["Alchemy"].knowledge_points, 30);
        assert!(c.profession_progress.contains_key("Inscription"));
        assert!(!c.profession_progress.contains_key("Herbalism"));
        assert_eq!(c.profession_progress.len(), 2);
    }

    #[test]
    fn gear_update_ignores_unknown_slot() {
        let mut c = Character::new(1, "Main");
        c.update_gear(&GearUpdate {
            slot: "tabard".into(),
            ilvl: Some(300),
            ..GearUpdate::default()
        });
        assert!(!c.gear.contains_key("tabard"));

        c.update_gear(&GearUpdate {
            slot: "chest".into(),
            ilvl: Some(259),
            track: Some("Hero".into()),
            item_name: None,
        });
        assert_eq!(c.gear["chest"].ilvl, 259);
        assert_eq!(c.gear["chest"].track, "Hero");
    }

    #[test]
    fn bis_lifecycle() {
        let mut c = Character::new(1, "Main");
        assert!(c.add_bis(NewBisItem::default()).is_err());

        let id = c
            .add_bis(NewBisItem {
                slot: "trinket1".into(),
                item_name: "Signet".into(),
                item_id: Some(0),
                target_ilvl: Some(289),
            })
            .unwrap()
            .id;
        assert_eq!(id, 1);
        assert_eq!(c.bis_list[0].item_id, None);

        c.bis_list[0].synced = true;
        let update: BisUpdate =
            serde_json::from_value(json!({"obtained": false, "target_ilvl": null})).unwrap();
        let item = c.update_bis(id, update).unwrap();
        assert!(!item.synced);
        assert_eq!(item.target_ilvl, None);

        assert!(matches!(
            c.update_bis(99, BisUpdate::default()),
            Err(RosterError::BisItemNotFound { bis_id: 99, .. })
        ));

        c.delete_bis(id);
        assert!(c.bis_list.is_empty());
    }

    #[test]
    fn bis_update_absent_fields_untouched() {
        let mut c = Character::new(1, "Main");
        let id = c
            .add_bis(NewBisItem {
                slot: "head".into(),
                item_name: "Crown".into(),
                item_id: Some(1234),
                target_ilvl: None,
            })
            .unwrap()
            .id;
        let update: BisUpdate = serde_json::from_value(json!({"item_name": "Helm"})).unwrap();
        let item = c.update_bis(id, update).unwrap();
        assert_eq!(item.item_id, Some(1234));
        assert_eq!(item.item_name, "Helm");
    }

    #[test]
    fn talent_build_ids_increment() {
        let mut c = Character::new(1, "Main");
        let new = |name: &str| NewTalentBuild {
            category: "Raid".into(),
            name: name.into(),
            ..NewTalentBuild::default()
        };
        c.add_talent_build(new("Single target")).unwrap();
        c.add_talent_build(new("Cleave")).unwrap();
        c.delete_talent_build(1);
        let third = c.add_talent_build(new("AoE")).unwrap();
        assert_eq!(third.id, 3);

        let updated = c
            .update_talent_build(
                2,
                TalentBuildUpdate {
                    talent_string: Some("BYGA".into()),
                    ..TalentBuildUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Cleave");
        assert_eq!(updated.talent_string, "BYGA");
    }

    #[test]
    fn legacy_json_loads_with_defaults() {
        let c: Character = serde_json::from_value(json!({
            "id": 7,
            "name": "Old",
            "class": "Druid",
            "gear": {"head": {"ilvl": 240}}
        }))
        .unwrap();
        assert_eq!(c.class_name, "Druid");
        assert_eq!(c.gear["head"].quality, "COMMON");
        assert!(c.crests.is_empty());
        assert_eq!(c.sort_key(), 7);
    }
}
