use log::{error, info};

use choice_agents::Agent;
use choice_agents::config::{AgentOptions, ServerConfig};
use choice_agents::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::init();

    let state = AppState::from_options(AgentOptions::default())
      .map_err(|e| {
        error!("Cannot start without agents: {}", e);
        e
      })?;
    let config = ServerConfig::from_env();

    info!(
      "Serving {} and {} on {}",
      state.event_generator.core().name(),
      state.summarizer.core().name(),
      config.bind_addr
    );
    server::serve(&config, state).await?;
    Ok(())
}
