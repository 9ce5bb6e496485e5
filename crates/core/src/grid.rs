//! Fixed 3×3 vault grid for display.
//!
//! One row per track, one cell per slot: a filled cell shows the projected
//! item level with a tooltip, an empty cell shows a placeholder glyph.

use serde::Serialize;

use crate::vault::{RewardSlot, RewardSlotProjection, Track};

/// Placeholder shown in locked slots.
pub const EMPTY_GLYPH: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GridCell {
    Filled { ilvl: u32, tooltip: String },
    Empty { glyph: &'static str },
}

impl GridCell {
    fn from_slot(slot: Option<&RewardSlot>) -> Self {
        match slot {
            Some(slot) => Self::Filled {
                ilvl: slot.ilvl,
                tooltip: format!("{} · {}", slot.label, slot.ilvl),
            },
            None => Self::Empty { glyph: EMPTY_GLYPH },
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }

    fn text(&self) -> String {
        match self {
            Self::Filled { ilvl, .. } => ilvl.to_string(),
            Self::Empty { glyph } => (*glyph).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub track: Track,
    pub label: &'static str,
    pub cells: [GridCell; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultGrid {
    pub rows: [GridRow; 3],
}

impl VaultGrid {
    pub fn from_projection(projection: &RewardSlotProjection) -> Self {
        let rows = Track::ALL.map(|track| {
            let slots = projection.track(track);
            GridRow {
                track,
                label: track.label(),
                cells: [0, 1, 2].map(|i| GridCell::from_slot(slots[i].as_ref())),
            }
        });
        Self { rows }
    }
}

impl std::fmt::Display for VaultGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            write!(f, "{:<8}", row.label)?;
            for cell in &row.cells {
                write!(f, " {:>5}", cell.text())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{DungeonRun, WeeklyProgressRecord};
    use crate::vault::project;

    #[test]
    fn empty_projection_renders_placeholders() {
        let grid = VaultGrid::from_projection(&RewardSlotProjection::default());
        assert!(
            grid.rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .all(|c| *c == GridCell::Empty { glyph: EMPTY_GLYPH })
        );
        assert_eq!(grid.rows[0].track, Track::Raid);
        assert_eq!(grid.rows[2].label, "World");
    }

    #[test]
    fn filled_cells_carry_tooltip() {
        let record = WeeklyProgressRecord {
            m_plus_dungeons: vec![DungeonRun::new("Skyreach", 10)],
            world_vault: [None, Some(241), None],
            ..WeeklyProgressRecord::default()
        };
        let grid = VaultGrid::from_projection(&project(Some(&record), 3));

        assert_eq!(
            grid.rows[1].cells[0],
            GridCell::Filled {
                ilvl: 266,
                tooltip: "+10 · 266".into()
            }
        );
        assert!(!grid.rows[2].cells[0].is_filled());
        assert!(grid.rows[2].cells[1].is_filled());
    }

    #[test]
    fn text_rendering_has_one_line_per_track() {
        let mut record = WeeklyProgressRecord::default();
        record.world_vault = [Some(250), None, None];
        let text = VaultGrid::from_projection(&project(Some(&record), 1)).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Raid"));
        assert!(lines[2].contains("250"));
        assert!(lines[2].contains(EMPTY_GLYPH));
    }

    #[test]
    fn cells_serialize_with_state_tag() {
        let json = serde_json::to_value(GridCell::Empty { glyph: EMPTY_GLYPH }).unwrap();
        assert_eq!(json["state"], "empty");
        assert_eq!(json["glyph"], EMPTY_GLYPH);
    }
}
