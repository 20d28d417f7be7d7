//! Main entry point for MegaBot.

use megabot_bot::{BotResult, MegaBot};
use megabot_common::logging::init_logging;
use megabot_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> BotResult<()> {
    let config = ConfigLoader::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(&config.logging.to_logging_config())?;

    info!("Starting MegaBot v{}", env!("CARGO_PKG_VERSION"));

    let bot = MegaBot::new(config);
    if let Err(e) = bot.start().await {
        error!("Bot stopped with an error: {}", e);
        return Err(e);
    }

    info!("MegaBot has shut down");
    Ok(())
}
