//! Runtime validation of a fully resolved configuration.

use crate::loader::ConfigError;
use crate::defaults::MAX_COOLDOWN_SECONDS;
use crate::schema::{ActivityKind, Config};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Collects every problem with `config` instead of stopping at the first.
    #[must_use]
    pub fn issues(config: &Config) -> Vec<String> {
        let mut issues = Vec::new();

        if config.discord.token.trim().is_empty() {
            issues.push("discord.token (DISCORD_TOKEN) must be set".to_string());
        }
        if config.discord.prefix.is_empty() {
            issues.push("discord.prefix must not be empty".to_string());
        } else if config.discord.prefix.chars().any(char::is_whitespace) {
            issues.push("discord.prefix must not contain whitespace".to_string());
        }
        if config.cooldown.window_seconds > MAX_COOLDOWN_SECONDS {
            issues.push(format!(
                "cooldown.window_seconds must be at most {MAX_COOLDOWN_SECONDS}"
            ));
        }
        if config.cooldown.sweep_interval_seconds == 0 {
            issues.push("cooldown.sweep_interval_seconds must be positive".to_string());
        }
        if config.presence.activity_type == ActivityKind::Streaming
            && config
                .presence
                .streaming_url
                .as_deref()
                .map_or(true, |url| url.trim().is_empty())
        {
            issues.push("presence.streaming_url is required for the streaming activity".to_string());
        }

        issues
    }

    /// Validates a configuration.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let issues = Self::issues(config);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate(self)
    }
}
