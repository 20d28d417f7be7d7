//! Configuration schema definitions.

use megabot_common::{LogFormat, LoggingConfig, RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for MegaBot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord connection and command prefix.
    pub discord: DiscordConfig,
    /// Roles required by each command category.
    pub roles: RolesConfig,
    /// Command cooldown settings.
    pub cooldown: CooldownConfig,
    /// Anti-nuke allow lists.
    pub anti_nuke: AntiNukeConfig,
    /// Presence shown once connected.
    pub presence: PresenceConfig,
    /// Logging output.
    pub logging: LoggingSettings,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Prefix for message commands.
    pub prefix: String,
    /// The owner bypasses command cooldowns.
    pub owner_id: Option<UserId>,
}

/// Per-category permission roles. Unset means "anyone".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Required by general commands (`ping`, `verification-setup`).
    pub general: Option<RoleId>,
    /// Required by moderation commands (`lockdown`, `unlockdown`).
    pub moderation: Option<RoleId>,
    /// Required by music commands.
    pub music: Option<RoleId>,
    /// Granted by the verification button.
    pub verified: Option<RoleId>,
}

/// Cooldown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Per-user, per-command window in seconds.
    pub window_seconds: u64,
    /// How often expired entries are swept, in seconds.
    pub sweep_interval_seconds: u64,
}

impl CooldownConfig {
    /// The cooldown window as a duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// The sweep interval as a duration.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// Anti-nuke configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiNukeConfig {
    /// Whether deleted roles and channels are restored.
    pub enabled: bool,
    /// Members holding this role may delete roles and channels.
    pub allowed_role: Option<RoleId>,
    /// Users who may delete roles and channels.
    pub allowed_users: BTreeSet<UserId>,
}

/// Presence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Online status.
    pub status: PresenceStatus,
    /// Activity verb.
    pub activity_type: ActivityKind,
    /// Activity text; defaults to `<prefix>help`.
    pub activity_text: Option<String>,
    /// Stream URL, required for the streaming activity.
    pub streaming_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Directory for rolled log files.
    pub file_directory: Option<PathBuf>,
}

impl LoggingSettings {
    /// Converts into the logging setup understood by `megabot-common`.
    #[must_use]
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_directory: self.file_directory.clone(),
            ..LoggingConfig::default()
        }
    }
}

/// Online status shown next to the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Green dot.
    #[default]
    Online,
    /// Away.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Appears offline.
    Invisible,
}

/// Activity verb shown under the bot's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// "Playing ..."
    Playing,
    /// "Streaming ..."
    Streaming,
    /// "Listening to ..."
    #[default]
    Listening,
    /// "Watching ..."
    Watching,
    /// "Competing in ..."
    Competing,
}

/// Error returned when a presence keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownKeyword {
    kind: &'static str,
    value: String,
}

impl FromStr for PresenceStatus {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "invisible" => Ok(Self::Invisible),
            _ => Err(UnknownKeyword {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playing" => Ok(Self::Playing),
            "streaming" => Ok(Self::Streaming),
            "listening" => Ok(Self::Listening),
            "watching" => Ok(Self::Watching),
            "competing" => Ok(Self::Competing),
            _ => Err(UnknownKeyword {
                kind: "activity type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Playing => "playing",
            Self::Streaming => "streaming",
            Self::Listening => "listening",
            Self::Watching => "watching",
            Self::Competing => "competing",
        };
        f.write_str(name)
    }
}

impl Config {
    /// Activity text, falling back to the `<prefix>help` hint.
    #[must_use]
    pub fn activity_text(&self) -> String {
        self.presence
            .activity_text
            .clone()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| format!("{}help", self.discord.prefix))
    }
}
