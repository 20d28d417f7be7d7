//! Default values for every configuration section.

use crate::schema::{
    AntiNukeConfig, CooldownConfig, DiscordConfig, LoggingSettings, PresenceConfig,
};
use megabot_common::LogFormat;
use std::collections::BTreeSet;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "!";

/// Cooldown window used when none is configured.
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 5;

/// Longest accepted cooldown window, one day.
pub const MAX_COOLDOWN_SECONDS: u64 = 86_400;

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            owner_id: None,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_COOLDOWN_SECONDS,
            sweep_interval_seconds: 60,
        }
    }
}

impl Default for AntiNukeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_role: None,
            allowed_users: BTreeSet::new(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            status: crate::schema::PresenceStatus::Online,
            activity_type: crate::schema::ActivityKind::Listening,
            activity_text: None,
            streaming_url: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,megabot_commands=debug".to_string(),
            format: LogFormat::Pretty,
            file_directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::*;

    #[test]
    fn test_defaults_match_legacy_environment_defaults() {
        let config = Config::default();
        assert_eq!(config.discord.prefix, "!");
        assert_eq!(config.cooldown.window_seconds, 5);
        assert!(config.discord.owner_id.is_none());
        assert!(config.roles.general.is_none());
        assert!(config.anti_nuke.enabled);
        assert_eq!(config.activity_text(), "!help");
    }
}
