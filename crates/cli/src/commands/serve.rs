//! `warband serve` — Start the HTTP API and dashboard.

use warband_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
        config.validate()?;
    }

    println!("⚔️  Warband Gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Storage:   {}", config.store.backend);

    warband_gateway::start(config).await?;

    Ok(())
}
