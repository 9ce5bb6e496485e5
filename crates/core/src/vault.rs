//! Great Vault projection engine.
//!
//! Turns one week of raw activity into the item levels the weekly vault
//! would offer. Each of the three tracks has three slots, unlocked by the
//! 1st, 4th and 7th qualifying activity:
//!
//! - **Raid** — boss kills, ordered by difficulty (mythic first). Kills
//!   are only distinguished by difficulty, never individually.
//! - **Dungeon** — keystone runs, ordered by key level (highest first,
//!   ties keep entry order).
//! - **World** — hand-entered item levels, passed through slot by slot.
//!
//! The engine is a pure function. It never fails: a missing record, an
//! unknown difficulty, an out-of-range week or key level all degrade to an
//! empty slot or a named fallback value.

use serde::{Deserialize, Serialize};

use crate::progress::{DungeonRun, WeeklyProgressRecord};
use crate::season::SeasonWeek;
use crate::tables::{self, Difficulty};

/// 1-indexed positions in an ordered activity list that unlock a slot.
pub const VAULT_THRESHOLDS: [u64; 3] = [1, 4, 7];

/// Label carried by every world track slot.
pub const WORLD_LABEL: &str = "World";

/// One unlocked reward choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSlot {
    pub label: String,
    pub ilvl: u32,
}

impl RewardSlot {
    pub fn new(label: impl Into<String>, ilvl: u32) -> Self {
        Self {
            label: label.into(),
            ilvl,
        }
    }
}

/// Three slots of one track, `None` where the threshold was not reached.
pub type TrackSlots = [Option<RewardSlot>; 3];

/// The vault tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Raid,
    Dungeon,
    World,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Raid, Track::Dungeon, Track::World];

    pub fn label(self) -> &'static str {
        match self {
            Self::Raid => "Raid",
            Self::Dungeon => "Dungeon",
            Self::World => "World",
        }
    }
}

/// Projected vault rewards for one character and week. Derived on every
/// read, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSlotProjection {
    pub raid: TrackSlots,
    pub dungeon: TrackSlots,
    pub world: TrackSlots,
}

impl RewardSlotProjection {
    pub fn track(&self, track: Track) -> &TrackSlots {
        match track {
            Track::Raid => &self.raid,
            Track::Dungeon => &self.dungeon,
            Track::World => &self.world,
        }
    }

    /// Number of unlocked slots across all tracks.
    pub fn unlocked(&self) -> usize {
        Track::ALL
            .iter()
            .flat_map(|t| self.track(*t).iter())
            .filter(|s| s.is_some())
            .count()
    }

    /// Highest item level on offer, if any slot is unlocked.
    pub fn best_ilvl(&self) -> Option<u32> {
        Track::ALL
            .iter()
            .flat_map(|t| self.track(*t).iter())
            .flatten()
            .map(|s| s.ilvl)
            .max()
    }
}

/// Project a week of activity onto vault rewards.
///
/// `current_week` is clamped into the season calendar; an absent record
/// projects to an empty vault.
pub fn project(record: Option<&WeeklyProgressRecord>, current_week: i64) -> RewardSlotProjection {
    let Some(record) = record else {
        return RewardSlotProjection::default();
    };
    let week = SeasonWeek::clamped(current_week);

    RewardSlotProjection {
        raid: raid_track(record, week),
        dungeon: dungeon_track(&record.m_plus_dungeons),
        world: world_track(record.world_vault),
    }
}

/// Kill buckets in vault order: known difficulties by precedence, then
/// unrecognized tags in ascending tag order.
fn kill_buckets(record: &WeeklyProgressRecord) -> Vec<(&str, u64)> {
    let known = Difficulty::PRECEDENCE
        .iter()
        .map(|d| (d.tag(), record.kills(d.tag()) as u64));
    let unknown = record
        .raid_bosses
        .iter()
        .filter(|(tag, _)| Difficulty::from_tag(tag).is_none())
        .map(|(tag, kills)| (tag.as_str(), *kills as u64));

    known.chain(unknown).filter(|(_, kills)| *kills > 0).collect()
}

/// Difficulty tag of the `position`-th kill (1-indexed) in the flattened
/// kill list, without materializing the list.
fn nth_kill<'a>(buckets: &[(&'a str, u64)], position: u64) -> Option<&'a str> {
    let mut seen = 0u64;
    for &(tag, kills) in buckets {
        seen = seen.saturating_add(kills);
        if seen >= position {
            return Some(tag);
        }
    }
    None
}

fn raid_track(record: &WeeklyProgressRecord, week: SeasonWeek) -> TrackSlots {
    let buckets = kill_buckets(record);
    VAULT_THRESHOLDS.map(|position| {
        nth_kill(&buckets, position).map(|tag| {
            let label = Difficulty::from_tag(tag).map_or(tag, |d| d.label());
            RewardSlot::new(label, tables::raid_ilvl(tag, week))
        })
    })
}

/// Runs ordered by key level, highest first. Equal key levels keep their
/// entry order.
fn sorted_runs(runs: &[DungeonRun]) -> Vec<&DungeonRun> {
    let mut sorted: Vec<&DungeonRun> = runs.iter().collect();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| b.key_level.cmp(&a.key_level));
    sorted
}

fn dungeon_track(runs: &[DungeonRun]) -> TrackSlots {
    let sorted = sorted_runs(runs);

    VAULT_THRESHOLDS.map(|position| {
        sorted.get(position as usize - 1).map(|run| {
            RewardSlot::new(format!("+{}", run.key_level), tables::mplus_ilvl(run.key_level))
        })
    })
}

fn world_track(world_vault: [Option<u32>; 3]) -> TrackSlots {
    world_vault.map(|ilvl| ilvl.map(|ilvl| RewardSlot::new(WORLD_LABEL, ilvl)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{FALLBACK_RAID_ILVL, MPLUS_KEY_ILVL};

    fn record_with_kills(kills: &[(&str, u32)]) -> WeeklyProgressRecord {
        let mut record = WeeklyProgressRecord::default();
        for (tag, count) in kills {
            record.raid_bosses.insert((*tag).to_string(), *count);
        }
        record
    }

    fn record_with_keys(keys: &[u32]) -> WeeklyProgressRecord {
        WeeklyProgressRecord {
            m_plus_dungeons: keys
                .iter()
                .enumerate()
                .map(|(i, k)| DungeonRun::new(format!("Dungeon {i}"), *k))
                .collect(),
            ..WeeklyProgressRecord::default()
        }
    }

    fn ilvls(slots: &TrackSlots) -> [Option<u32>; 3] {
        slots.clone().map(|s| s.map(|s| s.ilvl))
    }

    #[test]
    fn repeated_projection_is_identical() {
        let mut record = record_with_kills(&[("heroic", 6), ("mythic", 2)]);
        record.m_plus_dungeons = record_with_keys(&[10, 7, 12, 2]).m_plus_dungeons;
        record.world_vault = [Some(246), None, Some(250)];

        let first = project(Some(&record), 5);
        for _ in 0..10 {
            assert_eq!(project(Some(&record), 5), first);
        }
    }

    #[test]
    fn mythic_kills_precede_heroic() {
        let record = record_with_kills(&[("mythic", 1), ("heroic", 5), ("normal", 0), ("lfr", 0)]);
        let projection = project(Some(&record), 4);

        let mythic = Difficulty::Mythic.ilvl_by_week()[4];
        let heroic = Difficulty::Heroic.ilvl_by_week()[4];
        assert_eq!(projection.raid[0], Some(RewardSlot::new("Mythic", mythic)));
        assert_eq!(projection.raid[1], Some(RewardSlot::new("Heroic", heroic)));
        assert_eq!(projection.raid[2], None);
    }

    #[test]
    fn dungeons_sorted_by_key_level_descending() {
        let record = record_with_keys(&[3, 9, 1, 9, 5, 2, 7, 4]);
        let projection = project(Some(&record), 0);

        let labels: Vec<_> = projection
            .dungeon
            .iter()
            .map(|s| s.as_ref().map(|s| s.label.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![Some("+9".into()), Some("+5".into()), Some("+2".into())]
        );
        assert_eq!(
            ilvls(&projection.dungeon),
            [
                Some(MPLUS_KEY_ILVL[9]),
                Some(MPLUS_KEY_ILVL[5]),
                Some(MPLUS_KEY_ILVL[2])
            ]
        );
    }

    #[test]
    fn dungeon_ties_keep_entry_order() {
        let runs = vec![
            DungeonRun::new("First", 8),
            DungeonRun::new("Second", 12),
            DungeonRun::new("Third", 8),
            DungeonRun::new("Fourth", 12),
            DungeonRun::new("Fifth", 8),
        ];
        let names: Vec<&str> = sorted_runs(&runs).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Second", "Fourth", "First", "Third", "Fifth"]);

        let record = record_with_keys(&[10, 10, 10, 10]);
        let projection = project(Some(&record), 1);
        assert!(projection.dungeon[1].is_some());
    }

    #[test]
    fn world_slots_pass_through() {
        let record = WeeklyProgressRecord {
            world_vault: [Some(235), None, Some(240)],
            ..WeeklyProgressRecord::default()
        };
        let projection = project(Some(&record), 3);
        assert_eq!(
            projection.world,
            [
                Some(RewardSlot::new(WORLD_LABEL, 235)),
                None,
                Some(RewardSlot::new(WORLD_LABEL, 240)),
            ]
        );
    }

    #[test]
    fn missing_record_projects_empty_vault() {
        let projection = project(None, 6);
        assert_eq!(projection, RewardSlotProjection::default());
        assert_eq!(projection.raid, [None, None, None]);
        assert_eq!(projection.dungeon, [None, None, None]);
        assert_eq!(projection.world, [None, None, None]);
        assert_eq!(projection.unlocked(), 0);
    }

    #[test]
    fn default_record_projects_empty_vault() {
        let projection = project(Some(&WeeklyProgressRecord::default()), 6);
        assert_eq!(projection, RewardSlotProjection::default());
    }

    #[test]
    fn weeks_clamp_to_calendar() {
        let record = record_with_kills(&[("mythic", 2), ("normal", 3), ("lfr", 4)]);
        assert_eq!(project(Some(&record), 99), project(Some(&record), 12));
        assert_eq!(project(Some(&record), -3), project(Some(&record), 0));
        assert_ne!(project(Some(&record), 0), project(Some(&record), 12));
    }

    #[test]
    fn three_kills_unlock_one_slot() {
        let record = record_with_kills(&[("heroic", 2), ("lfr", 1)]);
        let projection = project(Some(&record), 2);
        assert!(projection.raid[0].is_some());
        assert_eq!(projection.raid[1], None);
        assert_eq!(projection.raid[2], None);
    }

    #[test]
    fn four_kills_unlock_two_slots() {
        let record = record_with_kills(&[("normal", 3), ("lfr", 1)]);
        let projection = project(Some(&record), 2);
        assert_eq!(projection.raid[0].as_ref().unwrap().label, "Normal");
        assert_eq!(projection.raid[1].as_ref().unwrap().label, "LFR");
        assert_eq!(projection.raid[2], None);
    }

    #[test]
    fn seven_kills_unlock_all_slots() {
        let record = record_with_kills(&[("heroic", 7)]);
        let projection = project(Some(&record), 8);
        let heroic = Difficulty::Heroic.ilvl_by_week()[8];
        assert_eq!(ilvls(&projection.raid), [Some(heroic); 3]);
    }

    #[test]
    fn unknown_difficulty_uses_fallback() {
        let record = record_with_kills(&[("story", 2)]);
        let projection = project(Some(&record), 5);
        assert_eq!(
            projection.raid[0],
            Some(RewardSlot::new("story", FALLBACK_RAID_ILVL))
        );
        assert_eq!(projection.raid[1], None);
    }

    #[test]
    fn unknown_difficulty_sorts_after_lfr() {
        let record = record_with_kills(&[("story", 3), ("lfr", 3), ("mythic", 0)]);
        let projection = project(Some(&record), 5);
        assert_eq!(projection.raid[0].as_ref().unwrap().label, "LFR");
        assert_eq!(projection.raid[1].as_ref().unwrap().ilvl, FALLBACK_RAID_ILVL);
    }

    #[test]
    fn huge_kill_counts_do_not_allocate() {
        let record = record_with_kills(&[("lfr", u32::MAX), ("normal", u32::MAX)]);
        let projection = project(Some(&record), 12);
        assert!(projection.raid.iter().all(|s| s.as_ref().is_some_and(|s| s.label == "Normal")));
    }

    #[test]
    fn high_keys_clamp_to_table_end() {
        let record = record_with_keys(&[30]);
        let projection = project(Some(&record), 12);
        assert_eq!(
            projection.dungeon[0],
            Some(RewardSlot::new("+30", *MPLUS_KEY_ILVL.last().unwrap()))
        );
    }

    #[test]
    fn best_ilvl_spans_tracks() {
        let mut record = record_with_keys(&[12]);
        record.world_vault = [Some(290), None, None];
        let projection = project(Some(&record), 1);
        assert_eq!(projection.best_ilvl(), Some(290));
        assert_eq!(projection.unlocked(), 2);
    }
}
