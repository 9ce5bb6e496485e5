//! Weekly progress: the raw activity counters one character logs for one
//! season week.
//!
//! Records are read by the vault projection engine and written by the
//! roster's create-or-update operation. Deserialization is lenient: the
//! dashboard submits hand-typed values, so numbers may arrive as strings,
//! negative counts clamp to zero and over-long lists are truncated.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::tables::Difficulty;

/// Most keystone runs tracked per week.
pub const MAX_DUNGEON_RUNS: usize = 8;

/// World vault slots per week; each holds one hand-entered item level.
pub const WORLD_VAULT_SLOTS: usize = 3;

/// A completed keystone dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonRun {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub key_level: u32,
}

impl DungeonRun {
    pub fn new(name: impl Into<String>, key_level: u32) -> Self {
        Self {
            name: name.into(),
            key_level,
        }
    }
}

/// Raw activity counters for one (character, week) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgressRecord {
    /// Boss kills by difficulty tag. Always carries the four known tags;
    /// unknown tags are preserved as entered.
    #[serde(default = "default_raid_bosses", deserialize_with = "deserialize_kill_counts")]
    pub raid_bosses: BTreeMap<String, u32>,

    /// Keystone runs in insertion order, at most [`MAX_DUNGEON_RUNS`].
    #[serde(default, deserialize_with = "deserialize_dungeons")]
    pub m_plus_dungeons: Vec<DungeonRun>,

    /// Highest delve tier cleared. Recorded only.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub highest_delve: u32,

    /// Hand-entered world vault item levels.
    #[serde(default, deserialize_with = "deserialize_world_vault")]
    pub world_vault: [Option<u32>; WORLD_VAULT_SLOTS],
}

impl Default for WeeklyProgressRecord {
    fn default() -> Self {
        Self {
            raid_bosses: default_raid_bosses(),
            m_plus_dungeons: Vec::new(),
            highest_delve: 0,
            world_vault: [None; WORLD_VAULT_SLOTS],
        }
    }
}

impl WeeklyProgressRecord {
    /// Kills logged for a difficulty tag (0 when absent).
    pub fn kills(&self, tag: &str) -> u32 {
        self.raid_bosses.get(tag).copied().unwrap_or(0)
    }

    pub fn set_kills(&mut self, difficulty: Difficulty, kills: u32) {
        self.raid_bosses.insert(difficulty.tag().to_string(), kills);
    }

    pub fn total_kills(&self) -> u32 {
        self.raid_bosses.values().fold(0u32, |acc, k| acc.saturating_add(*k))
    }

    /// Re-establish the record's limits after programmatic edits.
    pub fn normalize(&mut self) {
        for d in Difficulty::PRECEDENCE {
            self.raid_bosses.entry(d.tag().to_string()).or_insert(0);
        }
        self.m_plus_dungeons.truncate(MAX_DUNGEON_RUNS);
        for slot in &mut self.world_vault {
            if *slot == Some(0) {
                *slot = None;
            }
        }
    }

    /// Apply a save. Each field group present in the update replaces the
    /// stored group wholesale; absent groups are left untouched.
    pub fn apply(&mut self, update: WeeklyProgressUpdate) {
        if let Some(raid_bosses) = update.raid_bosses {
            self.raid_bosses = raid_bosses;
        }
        if let Some(dungeons) = update.m_plus_dungeons {
            self.m_plus_dungeons = dungeons;
        }
        if let Some(delve) = update.highest_delve {
            self.highest_delve = delve;
        }
        if let Some(world_vault) = update.world_vault {
            self.world_vault = world_vault;
        }
        self.normalize();
    }
}

/// A save request for the weekly progress store. Every field is one
/// replaceable group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WeeklyProgressUpdate {
    #[serde(default, deserialize_with = "deserialize_opt_kill_counts")]
    pub raid_bosses: Option<BTreeMap<String, u32>>,
    #[serde(default, deserialize_with = "deserialize_opt_dungeons")]
    pub m_plus_dungeons: Option<Vec<DungeonRun>>,
    #[serde(default, deserialize_with = "deserialize_opt_count")]
    pub highest_delve: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_world_vault")]
    pub world_vault: Option<[Option<u32>; WORLD_VAULT_SLOTS]>,
}

fn default_raid_bosses() -> BTreeMap<String, u32> {
    Difficulty::PRECEDENCE
        .iter()
        .map(|d| (d.tag().to_string(), 0))
        .collect()
}

// ── Lenient parsing ───────────────────────────────────────────────────────

/// Interpret a JSON value as an integer the way a form field would:
/// numbers (fractions truncated) and numeric strings.
fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

fn to_count(value: &Value) -> u32 {
    lenient_int(value)
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

fn parse_kill_counts(value: &Value) -> BTreeMap<String, u32> {
    let mut counts = default_raid_bosses();
    if let Value::Object(map) = value {
        for (tag, count) in map {
            counts.insert(tag.clone(), to_count(count));
        }
    }
    counts
}

fn parse_dungeons(value: &Value) -> Vec<DungeonRun> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let key_level = obj.get("key_level").map(to_count).unwrap_or(0);
            Some(DungeonRun { name, key_level })
        })
        .take(MAX_DUNGEON_RUNS)
        .collect()
}

fn parse_world_vault(value: &Value) -> [Option<u32>; WORLD_VAULT_SLOTS] {
    let mut slots = [None; WORLD_VAULT_SLOTS];
    if let Value::Array(items) = value {
        for (slot, item) in slots.iter_mut().zip(items) {
            *slot = lenient_int(item)
                .filter(|ilvl| *ilvl > 0)
                .map(|ilvl| ilvl.min(u32::MAX as i64) as u32);
        }
    }
    slots
}

fn deserialize_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Value::deserialize(d).map(|v| to_count(&v))
}

fn deserialize_kill_counts<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    Value::deserialize(d).map(|v| parse_kill_counts(&v))
}

fn deserialize_dungeons<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<DungeonRun>, D::Error> {
    Value::deserialize(d).map(|v| parse_dungeons(&v))
}

fn deserialize_world_vault<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<[Option<u32>; WORLD_VAULT_SLOTS], D::Error> {
    Value::deserialize(d).map(|v| parse_world_vault(&v))
}

fn deserialize_opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Option::<Value>::deserialize(d).map(|v| v.map(|v| to_count(&v)))
}

fn deserialize_opt_kill_counts<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, u32>>, D::Error> {
    Option::<Value>::deserialize(d).map(|v| v.map(|v| parse_kill_counts(&v)))
}

fn deserialize_opt_dungeons<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<DungeonRun>>, D::Error> {
    Option::<Value>::deserialize(d).map(|v| v.map(|v| parse_dungeons(&v)))
}

fn deserialize_opt_world_vault<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<[Option<u32>; WORLD_VAULT_SLOTS]>, D::Error> {
    Option::<Value>::deserialize(d).map(|v| v.map(|v| parse_world_vault(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_record_is_zeroed() {
        let record = WeeklyProgressRecord::default();
        assert_eq!(record.raid_bosses.len(), 4);
        assert_eq!(record.total_kills(), 0);
        assert!(record.m_plus_dungeons.is_empty());
        assert_eq!(record.world_vault, [None, None, None]);
    }

    #[test]
    fn empty_object_deserializes_to_default() {
        let record: WeeklyProgressRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record, WeeklyProgressRecord::default());
    }

    #[test]
    fn lenient_counts() {
        let record: WeeklyProgressRecord = serde_json::from_value(json!({
            "raid_bosses": {"heroic": "5", "mythic": -2, "normal": 3.9},
            "highest_delve": "11"
        }))
        .unwrap();
        assert_eq!(record.kills("heroic"), 5);
        assert_eq!(record.kills("mythic"), 0);
        assert_eq!(record.kills("normal"), 3);
        assert_eq!(record.kills("lfr"), 0);
        assert_eq!(record.highest_delve, 11);
    }

    #[test]
    fn unknown_difficulty_is_preserved() {
        let record: WeeklyProgressRecord =
            serde_json::from_value(json!({"raid_bosses": {"story": 2}})).unwrap();
        assert_eq!(record.kills("story"), 2);
        assert_eq!(record.raid_bosses.len(), 5);
    }

    #[test]
    fn dungeons_truncate_to_eight() {
        let runs: Vec<_> = (0..11)
            .map(|i| json!({"name": format!("Dungeon {i}"), "key_level": i}))
            .collect();
        let record: WeeklyProgressRecord =
            serde_json::from_value(json!({ "m_plus_dungeons": runs })).unwrap();
        assert_eq!(record.m_plus_dungeons.len(), MAX_DUNGEON_RUNS);
        assert_eq!(record.m_plus_dungeons[7].name, "Dungeon 7");
    }

    #[test]
    fn malformed_dungeon_entries_are_skipped() {
        let record: WeeklyProgressRecord = serde_json::from_value(json!({
            "m_plus_dungeons": ["junk", {"name": "Skyreach"}, {"key_level": "12"}]
        }))
        .unwrap();
        assert_eq!(
            record.m_plus_dungeons,
            vec![DungeonRun::new("Skyreach", 0), DungeonRun::new("", 12)]
        );
    }

    #[test]
    fn world_vault_pads_and_truncates() {
        let short: WeeklyProgressRecord =
            serde_json::from_value(json!({"world_vault": [240]})).unwrap();
        assert_eq!(short.world_vault, [Some(240), None, None]);

        let long: WeeklyProgressRecord =
            serde_json::from_value(json!({"world_vault": [1, null, 3, 4]})).unwrap();
        assert_eq!(long.world_vault, [Some(1), None, Some(3)]);

        let junk: WeeklyProgressRecord =
            serde_json::from_value(json!({"world_vault": [0, "", -5]})).unwrap();
        assert_eq!(junk.world_vault, [None, None, None]);
    }

    #[test]
    fn apply_replaces_only_present_groups() {
        let mut record = WeeklyProgressRecord::default();
        record.set_kills(Difficulty::Heroic, 8);
        record.m_plus_dungeons.push(DungeonRun::new("Skyreach", 10));

        let update: WeeklyProgressUpdate = serde_json::from_value(json!({
            "raid_bosses": {"normal": 2},
            "world_vault": [250, null, null]
        }))
        .unwrap();
        record.apply(update);

        // Whole raid group replaced: heroic kills are gone.
        assert_eq!(record.kills("heroic"), 0);
        assert_eq!(record.kills("normal"), 2);
        // Untouched groups survive.
        assert_eq!(record.m_plus_dungeons.len(), 1);
        assert_eq!(record.world_vault, [Some(250), None, None]);
    }

    #[test]
    fn update_with_nothing_is_a_no_op() {
        let mut record = WeeklyProgressRecord::default();
        record.highest_delve = 6;
        let before = record.clone();
        record.apply(serde_json::from_value(json!({})).unwrap());
        assert_eq!(record, before);
    }

    #[test]
    fn normalize_restores_limits() {
        let mut record = WeeklyProgressRecord {
            raid_bosses: BTreeMap::new(),
            m_plus_dungeons: (0..10).map(|i| DungeonRun::new("x", i)).collect(),
            highest_delve: 0,
            world_vault: [Some(0), Some(240), None],
        };
        record.normalize();
        assert_eq!(record.raid_bosses.len(), 4);
        assert_eq!(record.m_plus_dungeons.len(), MAX_DUNGEON_RUNS);
        assert_eq!(record.world_vault, [None, Some(240), None]);
    }
}
