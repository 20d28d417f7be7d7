//! Configuration loading from TOML files and environment overrides.

use crate::schema::{ActivityKind, Config, PresenceStatus};
use megabot_common::{MegabotError, RoleId, UserId};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "MEGABOT_CONFIG_PATH";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "megabot.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// `.env` file could not be read
    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Offending variable.
        var: &'static str,
        /// Parser message.
        message: String,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<ConfigError> for MegabotError {
    fn from(err: ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the environment and optional files.
    ///
    /// Reads `.env`, then `$MEGABOT_CONFIG_PATH` or `megabot.toml` when
    /// present (defaults otherwise), applies environment overrides and
    /// validates the result.
    pub fn load() -> Result<Config, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let path = env::var(CONFIG_PATH_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match path {
            Some(path) => Self::read_file(&path)?,
            None => {
                info!("No config file found, using defaults with environment overrides");
                Config::default()
            }
        };

        Self::apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, with environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::read_file(path.as_ref())?;
        Self::apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loading configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Apply the environment keys on top of `config`.
    ///
    /// `lookup` abstracts the process environment so tests can feed a map.
    /// Empty id values clear the setting, matching how an unset key behaved
    /// in the original `.env` deployments.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token.trim().to_string();
        }
        if let Some(prefix) = lookup("PREFIX").filter(|p| !p.trim().is_empty()) {
            config.discord.prefix = prefix.trim().to_string();
        }
        if let Some(raw) = lookup("OWNER_ID") {
            config.discord.owner_id = parse_optional_id::<UserId>("OWNER_ID", &raw)?;
        }
        if let Some(raw) = lookup("COOLDOWN_SECONDS") {
            config.cooldown.window_seconds = parse_value("COOLDOWN_SECONDS", &raw)?;
        }

        if let Some(raw) = lookup("GENERAL_PERMS_ROLE_ID") {
            config.roles.general = parse_optional_id::<RoleId>("GENERAL_PERMS_ROLE_ID", &raw)?;
        }
        if let Some(raw) = lookup("MODERATION_PERMS_ROLE_ID") {
            config.roles.moderation =
                parse_optional_id::<RoleId>("MODERATION_PERMS_ROLE_ID", &raw)?;
        }
        if let Some(raw) = lookup("MUSIC_PERMS_ROLE_ID") {
            config.roles.music = parse_optional_id::<RoleId>("MUSIC_PERMS_ROLE_ID", &raw)?;
        }
        if let Some(raw) = lookup("VERIFIED_ROLE_ID") {
            config.roles.verified = parse_optional_id::<RoleId>("VERIFIED_ROLE_ID", &raw)?;
        }

        if let Some(raw) = lookup("ANTI_NUKE_ENABLED") {
            config.anti_nuke.enabled = parse_value("ANTI_NUKE_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("ALLOWED_ROLE_1_ID") {
            config.anti_nuke.allowed_role = parse_optional_id::<RoleId>("ALLOWED_ROLE_1_ID", &raw)?;
        }
        if let Some(raw) = lookup("ALLOWED_USERS_LIST") {
            config.anti_nuke.allowed_users = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_value::<UserId>("ALLOWED_USERS_LIST", s))
                .collect::<Result<_, _>>()?;
        }

        if let Some(raw) = lookup("BOT_STATUS") {
            config.presence.status = parse_value::<PresenceStatus>("BOT_STATUS", &raw)?;
        }
        if let Some(raw) = lookup("BOT_ACTIVITY_TYPE") {
            config.presence.activity_type = parse_value::<ActivityKind>("BOT_ACTIVITY_TYPE", &raw)?;
        }
        if let Some(text) = lookup("BOT_ACTIVITY_TEXT") {
            config.presence.activity_text = Some(text);
        }
        if let Some(url) = lookup("BOT_STREAMING_URL").filter(|u| !u.trim().is_empty()) {
            config.presence.streaming_url = Some(url);
        }

        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::EnvParse {
        var,
        message: format!("'{raw}': {e}"),
    })
}

fn parse_optional_id<T>(var: &'static str, raw: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_value(var, raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_apply_legacy_keys() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("DISCORD_TOKEN", " abc "),
            ("PREFIX", "?"),
            ("OWNER_ID", "42"),
            ("COOLDOWN_SECONDS", "10"),
            ("MODERATION_PERMS_ROLE_ID", "7"),
            ("ALLOWED_USERS_LIST", "1, 2,,3"),
            ("BOT_ACTIVITY_TYPE", "WATCHING"),
        ]);

        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.prefix, "?");
        assert_eq!(config.discord.owner_id, Some(UserId(42)));
        assert_eq!(config.cooldown.window_seconds, 10);
        assert_eq!(config.roles.moderation, Some(RoleId(7)));
        assert_eq!(config.anti_nuke.allowed_users.len(), 3);
        assert_eq!(config.presence.activity_type, ActivityKind::Watching);
    }

    #[test]
    fn test_empty_ids_clear_the_setting() {
        let mut config = Config::default();
        config.roles.general = Some(RoleId(9));

        ConfigLoader::apply_overrides(&mut config, lookup_from(&[("GENERAL_PERMS_ROLE_ID", "")]))
            .unwrap();

        assert!(config.roles.general.is_none());
    }

    #[test]
    fn test_malformed_cooldown_is_reported_with_variable_name() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(
            &mut config,
            lookup_from(&[("COOLDOWN_SECONDS", "soon")]),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::EnvParse { var: "COOLDOWN_SECONDS", .. }));
    }

    #[test]
    fn test_empty_prefix_override_is_ignored() {
        let mut config = Config::default();
        ConfigLoader::apply_overrides(&mut config, lookup_from(&[("PREFIX", "  ")])).unwrap();
        assert_eq!(config.discord.prefix, "!");
    }

    #[test]
    fn test_oversized_cooldown_override_fails_validation() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COOLDOWN_SECONDS", "18446744073709551615"),
        ]);

        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
