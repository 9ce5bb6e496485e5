//! Season calendar: week numbers, item-level pacing targets, crest caps
//! and the per-week task checklist.
//!
//! A season is a fixed 13-column calendar: week 0 is the pre-season and
//! weeks 1–12 are the numbered season weeks.

use serde::{Deserialize, Serialize};

/// Highest valid season week.
pub const MAX_SEASON_WEEK: u8 = 12;

/// Number of columns in every week-indexed table (pre-season + 12 weeks).
pub const SEASON_COLUMNS: usize = MAX_SEASON_WEEK as usize + 1;

/// Crests that can be earned per week; the cap is cumulative.
pub const CRESTS_PER_WEEK: u32 = 90;

/// Item-level target used once the calendar runs past its last entry.
pub const FINAL_WEEKLY_TARGET: u32 = 280;

/// A week of the season calendar, always within `0..=12`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub struct SeasonWeek(u8);

impl From<SeasonWeek> for u8 {
    fn from(week: SeasonWeek) -> u8 {
        week.0
    }
}

impl TryFrom<i64> for SeasonWeek {
    type Error = String;

    fn try_from(week: i64) -> Result<Self, Self::Error> {
        Self::new(week).ok_or_else(|| format!("season week {week} is outside 0..={MAX_SEASON_WEEK}"))
    }
}

impl SeasonWeek {
    pub const PRE_SEASON: SeasonWeek = SeasonWeek(0);
    pub const FINAL: SeasonWeek = SeasonWeek(MAX_SEASON_WEEK);

    /// Strict constructor: `None` when the week is outside `0..=12`.
    pub fn new(week: i64) -> Option<Self> {
        (0..=MAX_SEASON_WEEK as i64)
            .contains(&week)
            .then(|| Self(week as u8))
    }

    /// Lenient constructor: negative weeks become the pre-season, weeks
    /// past the end become the final week.
    pub fn clamped(week: i64) -> Self {
        Self(week.clamp(0, MAX_SEASON_WEEK as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Column index into week-indexed tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SeasonWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            write!(f, "Pre-Season")
        } else {
            write!(f, "Week {}", self.0)
        }
    }
}

/// Average item level a character should have reached by `week`.
pub fn weekly_target(week: i64) -> u32 {
    match week {
        0 => 215,
        1 | 2 => 235,
        3 | 4 => 250,
        5..=8 => 265,
        _ => FINAL_WEEKLY_TARGET,
    }
}

/// Cumulative crest cap at `week`.
pub fn weekly_crest_cap(week: SeasonWeek) -> u32 {
    CRESTS_PER_WEEK * week.get() as u32
}

/// A single checklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskTemplate {
    pub id: &'static str,
    pub label: &'static str,
}

/// The checklist for one week of the season.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeekPlan {
    pub name: &'static str,
    pub weekly: &'static [TaskTemplate],
    pub daily: &'static [TaskTemplate],
}

const fn task(id: &'static str, label: &'static str) -> TaskTemplate {
    TaskTemplate { id, label }
}

static WEEK_PLANS: [WeekPlan; 10] = [
    WeekPlan {
        name: "Early Access + Pre-Season",
        weekly: &[
            task("level_chars", "Level all characters to max (90)"),
            task("darkmoon", "Use Darkmoon Faire for 10% XP/Renown bonus"),
            task("unlock_delves", "Unlock Delves to Tier 8+ (Tier 11 if available)"),
            task("m0_tour", "Complete M0 dungeon tour for gear (don't upgrade)"),
            task("craft_prep", "Craft 246 ilvl gear in 3-5 slots (60x Veteran Crests each)"),
            task("world_quests", "Complete world quests for gear"),
        ],
        daily: &[
            task("renown_dmf", "Farm Renown (with DMF bonus)"),
            task("delve_farming", "Farm Delves for gear and crests"),
            task("prey_quest", "Complete Prey if rewards are useful"),
        ],
    },
    WeekPlan {
        name: "Season 1 Week 1 - Heroic Week",
        weekly: &[
            task("lfr_tier", "Do LFR for tier pieces (unlock catalyst charges)"),
            task("m0_tour", "Complete M0 tour (items drop at 1/6 Champion 246)"),
            task("world_boss", "Kill world boss (2/6 Champion 250)"),
            task("crafting", "Craft 246 ilvl pieces (3-5 slots) + fill remaining with 233"),
            task("delves_farm", "Farm high-level Delves with coffer keys"),
            task("normal_clear", "Clear Normal raid"),
            task("heroic_clear", "Clear Heroic raid"),
        ],
        daily: &[
            task("prey", "Complete Prey if useful"),
            task("world_quests", "Complete world quests"),
        ],
    },
    WeekPlan {
        name: "Season 1 Week 2 - Mythic Week + M+ Opens",
        weekly: &[
            task("lfr_tier", "Do LFR for tier pieces"),
            task("world_boss", "Kill world boss (2/6 Champion)"),
            task("delves", "Farm high-level Delves with coffer keys (optional)"),
            task("farm_mplus", "Farm +10s (3/6h 266) for vault slots and crests"),
            task("normal_clear", "Full clear Normal raid"),
            task("heroic_clear", "Full clear Heroic raid"),
            task("mythic_prog", "Begin mythic progression"),
        ],
        daily: &[task("prey", "Complete Prey if useful")],
    },
    WeekPlan {
        name: "Season 1 Week 3 - Final Raid Opens",
        weekly: &[
            task("vault_open", "Open vault for 272+ myth item, upgrade AFTER crafting"),
            task("craft_weapon", "Craft 2H mythic weapon at 5/6 285 (60 Myth Crests)"),
            task("lfr_tier", "Do LFR for tier if no 4p yet"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("raid_reclear", "Reclear all raids"),
            task("spend_heroic", "Spend heroic crests after reclear: 10 items to 4/6"),
            task("upgrade_myth", "Upgrade 1/6 272 myth to 4/6 282 (60 crests)"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 4 - Progression",
        weekly: &[
            task("vault", "Open vault for 272+ myth item"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("heroic_crests", "Upgrade 2x 3/6 to 4/6 + 1x 4/6 to 5/6 (100 heroic crests)"),
            task("myth_upgrades", "Upgrade mythic pieces toward 4/6 and 5/6"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 5 - Progression",
        weekly: &[
            task("vault", "Open vault for 272+ myth item"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("craft_second", "Craft second item at 5/6 285 mythic (60 crests)"),
            task("heroic_crests", "Upgrade 2x 4/6 to 5/6 items with 80 heroic crests"),
            task("myth_upgrade", "Upgrade 1/6 272 to 4/6 282 mythic (60 crests)"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 6 - Progression",
        weekly: &[
            task("vault", "Open vault for 272+ myth item"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("heroic_crests", "Upgrade 3x 4/6 to 5/6 items with 120 heroic crests"),
            task("myth_upgrade", "Upgrade 1/6 to 4/6 + 3/6 to 4/6 mythic (60 crests)"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 7 - Progression",
        weekly: &[
            task("vault", "Open vault for 272+ myth item"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("craft_third", "Craft third item at 5/6 285 mythic (60 crests)"),
            task("heroic_crests", "Upgrade 2x 4/6 to 5/6 items with 80 heroic crests"),
            task("myth_upgrade", "Upgrade 1/6 to 3/6 279 mythic (30 crests)"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 8 - Done with Heroic",
        weekly: &[
            task("vault", "Open vault for 272+ myth item"),
            task("farm_m12", "Farm +12s for vault slots and crests"),
            task("heroic_final", "Upgrade 2x 5/6 to 6/6 items with 100 heroic crests"),
            task("myth_upgrades", "Spend 100 mythic crests on 2/6-4/6 upgrades"),
        ],
        daily: &[],
    },
    WeekPlan {
        name: "Season 1 Week 9+ - Final Optimization",
        weekly: &[
            task("vault", "Open vault and optimize picks"),
            task("farm_m12", "Farm +12s and optimally use crests"),
            task("craft_remaining", "Craft remaining slots at 5/6 mythic (60c each)"),
            task("push_282", "Get every item to at least 4/6 282 mythic"),
            task("upgrade_286", "Start upgrading to 5/6 285 and 6/6 289"),
        ],
        daily: &[],
    },
];

/// The checklist for `week`.
///
/// Weeks 10–12 repeat the week 9 plan; weeks outside the calendar fall
/// back to the pre-season plan.
pub fn weekly_tasks(week: i64) -> &'static WeekPlan {
    match week {
        0..=9 => &WEEK_PLANS[week as usize],
        10..=12 => &WEEK_PLANS[9],
        _ => &WEEK_PLANS[0],
    }
}
