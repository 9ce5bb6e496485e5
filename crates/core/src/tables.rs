//! Item-level lookup tables for the current season.
//!
//! Both tables are fixed per release and compiled into the binary. Raid
//! rewards are indexed by difficulty and season week; keystone rewards are
//! indexed by key level.

use serde::{Deserialize, Serialize};

use crate::season::{SEASON_COLUMNS, SeasonWeek};

/// Item level used for a raid kill whose difficulty tag is not recognized.
pub const FALLBACK_RAID_ILVL: u32 = 230;

/// Raid difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Lfr,
    Normal,
    Heroic,
    Mythic,
}

impl Difficulty {
    /// Highest prestige first. Vault kill lists are built in this order.
    pub const PRECEDENCE: [Difficulty; 4] = [
        Difficulty::Mythic,
        Difficulty::Heroic,
        Difficulty::Normal,
        Difficulty::Lfr,
    ];

    /// Storage tag (`lfr`, `normal`, `heroic`, `mythic`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Lfr => "lfr",
            Self::Normal => "normal",
            Self::Heroic => "heroic",
            Self::Mythic => "mythic",
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lfr => "LFR",
            Self::Normal => "Normal",
            Self::Heroic => "Heroic",
            Self::Mythic => "Mythic",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "lfr" => Some(Self::Lfr),
            "normal" => Some(Self::Normal),
            "heroic" => Some(Self::Heroic),
            "mythic" => Some(Self::Mythic),
            _ => None,
        }
    }

    /// Vault reward column for this difficulty.
    pub fn ilvl_by_week(self) -> &'static [u32; SEASON_COLUMNS] {
        match self {
            Self::Lfr => &RAID_DIFF_ILVL[0].1,
            Self::Normal => &RAID_DIFF_ILVL[1].1,
            Self::Heroic => &RAID_DIFF_ILVL[2].1,
            Self::Mythic => &RAID_DIFF_ILVL[3].1,
        }
    }
}

/// Great Vault raid reward item level by difficulty, index 0 = pre-season,
/// 1–12 = season weeks. The final raid wing opens in week 3 and raises
/// every difficulty by one upgrade step.
pub static RAID_DIFF_ILVL: [(Difficulty, [u32; SEASON_COLUMNS]); 4] = [
    (
        Difficulty::Lfr,
        [220, 233, 233, 237, 237, 237, 237, 237, 237, 237, 237, 237, 237],
    ),
    (
        Difficulty::Normal,
        [233, 246, 246, 250, 250, 250, 250, 250, 250, 250, 250, 250, 250],
    ),
    (
        Difficulty::Heroic,
        [246, 259, 259, 263, 263, 263, 263, 263, 263, 263, 263, 263, 263],
    ),
    (
        Difficulty::Mythic,
        [259, 272, 272, 276, 276, 276, 276, 276, 276, 276, 276, 276, 276],
    ),
];

/// Great Vault keystone reward item level, indexed by key level (0 = M0).
/// Key levels beyond the end of the table use the last entry.
pub static MPLUS_KEY_ILVL: [u32; 13] = [
    246, 246, 250, 250, 253, 256, 256, 259, 259, 263, 266, 266, 272,
];

/// Raid vault item level for a difficulty tag at a (clamped) week.
pub fn raid_ilvl(tag: &str, week: SeasonWeek) -> u32 {
    Difficulty::from_tag(tag)
        .map(|d| d.ilvl_by_week()[week.index()])
        .unwrap_or(FALLBACK_RAID_ILVL)
}

/// Keystone vault item level; key levels past the table clamp to its end.
pub fn mplus_ilvl(key_level: u32) -> u32 {
    let idx = (key_level as usize).min(MPLUS_KEY_ILVL.len() - 1);
    MPLUS_KEY_ILVL[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_difficulties() {
        for (difficulty, row) in &RAID_DIFF_ILVL {
            assert_eq!(difficulty.ilvl_by_week(), row);
        }
    }

    #[test]
    fn higher_difficulty_never_rewards_less() {
        for week in 0..SEASON_COLUMNS {
            let column: Vec<u32> = Difficulty::PRECEDENCE
                .iter()
                .map(|d| d.ilvl_by_week()[week])
                .collect();
            assert!(column.windows(2).all(|w| w[0] >= w[1]), "week {week}: {column:?}");
        }
    }

    #[test]
    fn tag_round_trip() {
        for d in Difficulty::PRECEDENCE {
            assert_eq!(Difficulty::from_tag(d.tag()), Some(d));
        }
        assert_eq!(Difficulty::from_tag("Mythic"), None);
        assert_eq!(Difficulty::from_tag("story"), None);
    }

    #[test]
    fn unknown_tag_uses_fallback() {
        assert_eq!(raid_ilvl("story", SeasonWeek::FINAL), FALLBACK_RAID_ILVL);
        assert_eq!(raid_ilvl("mythic", SeasonWeek::clamped(1)), 272);
    }

    #[test]
    fn key_level_clamps_to_table_end() {
        assert_eq!(mplus_ilvl(0), 246);
        assert_eq!(mplus_ilvl(10), 266);
        assert_eq!(mplus_ilvl(12), 272);
        assert_eq!(mplus_ilvl(25), 272);
        assert_eq!(mplus_ilvl(u32::MAX), 272);
    }
}
