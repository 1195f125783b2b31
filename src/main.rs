mod bridge;
mod config;
mod error;
mod home_assistant;
mod poller;
mod state_machine;
mod ubereats;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use config::TrackerConfig;
use home_assistant::HomeAssistantConnector;
use poller::Poller;
use ubereats::UberEatsClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Settings may live in a .env file next to the binary.
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = TrackerConfig::load().context("failed to load configuration")?;

    let resolver = UberEatsClient::new(config.uber_eats_timeout())
        .context("failed to build Uber Eats client")?;
    let connector = HomeAssistantConnector::new(
        &config.api_server_url,
        &config.access_token,
        config.home_assistant_timeout(),
    );

    let poller = Poller::from_config(&config, resolver, connector);
    match poller.run().await? {}
}
