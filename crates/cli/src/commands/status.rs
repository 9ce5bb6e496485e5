//! `warband status` — Show configuration and roster summary.

use warband_config::AppConfig;
use warband_core::season::{weekly_crest_cap, weekly_target};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("⚔️  Warband Status");
    println!("=================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Data dir:     {}", config.data_dir().display());
    println!("  Storage:      {}", config.store.backend);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  CORS origin:  {}", config.gateway.allowed_origin());

    let store = warband_store::open(&config).await?;
    let roster = warband_store::load_roster(store.as_ref(), &config).await?;
    let week = roster.current_week();

    println!("\n  Season week:  {week}");
    println!("  ilvl target:  {}", weekly_target(week.get() as i64));
    println!("  Crest cap:    {}", weekly_crest_cap(week));
    println!("  Characters:   {}", roster.characters.len());
    for c in &roster.characters {
        let unlocked = roster.project_vault(c.id, None)?.unlocked();
        println!(
            "    #{:<3} {:<16} ilvl {:>6.1}  vault {unlocked}/9",
            c.id,
            c.name,
            c.average_ilvl()
        );
    }
    if let Some(updated) = roster.meta.last_updated {
        println!("  Last saved:   {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `warband init` first");
    }

    Ok(())
}
