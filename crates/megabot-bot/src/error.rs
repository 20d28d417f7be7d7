//! Application-wide error types using thiserror.

use megabot_commands::RegistryError;
use megabot_common::MegabotError;
use megabot_config::ConfigError;
use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shared infrastructure error (logging setup, I/O).
    #[error(transparent)]
    Common(#[from] MegabotError),

    /// Built-in commands could not be registered.
    #[error("Command registration failed: {0}")]
    Registry(#[from] RegistryError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Poise framework error.
    #[error("Framework error: {0}")]
    Framework(String),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;

/// Error type shared by the poise framework callbacks.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
