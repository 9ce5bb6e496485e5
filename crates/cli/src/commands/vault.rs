//! `warband vault` — Print Great Vault grids from the stored roster.

use std::fmt::Write as _;
use warband_config::AppConfig;
use warband_core::error::RosterError;
use warband_core::grid::VaultGrid;
use warband_core::roster::Roster;
use warband_core::season::SeasonWeek;

pub async fn run(
    character: Option<u32>,
    week: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = warband_store::open(&config).await?;
    let roster = warband_store::load_roster(store.as_ref(), &config).await?;

    print!("{}", render(&roster, character, week)?);
    Ok(())
}

/// Render one grid per selected character.
pub fn render(
    roster: &Roster,
    character: Option<u32>,
    week: Option<i64>,
) -> Result<String, RosterError> {
    let week = match week {
        Some(w) => SeasonWeek::new(w).ok_or(RosterError::InvalidWeek(w))?,
        None => roster.current_week(),
    };

    let ids: Vec<u32> = match character {
        Some(id) => vec![roster.character(id)?.id],
        None => roster.characters.iter().map(|c| c.id).collect(),
    };

    let mut out = String::new();
    if ids.is_empty() {
        let _ = writeln!(out, "No characters yet. Add one from the dashboard.");
        return Ok(out);
    }

    for id in ids {
        let c = roster.character(id)?;
        let projection = roster.project_vault(id, Some(week))?;
        let _ = writeln!(
            out,
            "⚔️  {} (#{}) · {week} · {}/9 unlocked",
            c.name,
            c.id,
            projection.unlocked()
        );
        let _ = write!(out, "{}", VaultGrid::from_projection(&projection));
        let _ = writeln!(out);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warband_core::character::NewCharacter;
    use warband_core::progress::WeeklyProgressUpdate;

    fn roster_with_progress() -> Roster {
        let mut roster = Roster::default();
        roster.set_current_week(2).unwrap();
        roster.add_character(NewCharacter {
            name: Some("Thrall".into()),
            ..NewCharacter::default()
        });
        let update: WeeklyProgressUpdate = serde_json::from_value(serde_json::json!({
            "m_plus_dungeons": [{"name": "Skyreach", "key_level": 10}]
        }))
        .unwrap();
        roster
            .upsert_weekly_progress(1, SeasonWeek::clamped(2), update)
            .unwrap();
        roster
    }

    #[test]
    fn renders_every_character() {
        let text = render(&roster_with_progress(), None, None).unwrap();
        assert!(text.contains("Thrall (#1)"));
        assert!(text.contains("Week 2"));
        assert!(text.contains("1/9 unlocked"));
        assert!(text.contains("Dungeon"));
    }

    #[test]
    fn other_week_has_nothing_unlocked() {
        let text = render(&roster_with_progress(), Some(1), Some(5)).unwrap();
        assert!(text.contains("Week 5"));
        assert!(text.contains("0/9 unlocked"));
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = render(&roster_with_progress(), Some(42), None).unwrap_err();
        assert_eq!(err, RosterError::CharacterNotFound(42));
    }

    #[test]
    fn out_of_range_week_is_an_error() {
        let err = render(&roster_with_progress(), None, Some(13)).unwrap_err();
        assert_eq!(err, RosterError::InvalidWeek(13));
    }

    #[test]
    fn empty_roster_prints_hint() {
        let text = render(&Roster::default(), None, None).unwrap();
        assert!(text.contains("No characters yet"));
    }
}
