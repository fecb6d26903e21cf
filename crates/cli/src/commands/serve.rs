//! `nextyou serve` — Start the HTTP API server.

use nextyou_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if nextyou_providers::requires_api_key(&config) && !config.has_api_key() {
        eprintln!("  ⚠️  No API key configured; /chat will answer with the generic error reply.");
    }

    println!("💪 NextYou Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.default_provider, nextyou_providers::default_model_for(&config));
    println!("   Chat log:  {}", config.chat_log.backend);

    nextyou_gateway::start(config).await?;

    Ok(())
}
