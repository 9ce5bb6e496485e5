//! `warband doctor` — Diagnose configuration and storage.

use warband_config::{AppConfig, KNOWN_BACKENDS};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Warband Doctor — Diagnostics");
    println!("===============================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ⚠️  No config file — run `warband init` (using defaults)");
        issues += 1;
        AppConfig::load().ok()
    };

    if let Some(config) = config {
        println!(
            "  ✅ Storage backend: {} (one of {})",
            config.store.backend,
            KNOWN_BACKENDS.join(", ")
        );

        let data_dir = config.data_dir();
        if data_dir.exists() {
            println!("  ✅ Data directory exists: {}", data_dir.display());
        } else {
            println!("  ⚠️  No data directory — run `warband init`");
            issues += 1;
        }

        match warband_store::open(&config).await {
            Ok(store) => match warband_store::load_roster(store.as_ref(), &config).await {
                Ok(roster) => println!(
                    "  ✅ Roster readable ({} characters, {})",
                    roster.characters.len(),
                    roster.current_week()
                ),
                Err(e) => {
                    println!("  ❌ Roster unreadable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Store failed to open: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
