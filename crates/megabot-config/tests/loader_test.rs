//! Integration tests for loading configuration files.

use megabot_common::test_utils::init_test_logging;
use megabot_common::{LogFormat, RoleId, UserId};
use megabot_config::{ActivityKind, ConfigError, ConfigLoader, PresenceStatus};
use std::io::Write;

const FULL_CONFIG: &str = r#"
[discord]
token = "file-token"
prefix = "?"
owner_id = "100000000000000001"

[roles]
general = 10
moderation = "11"

[cooldown]
window_seconds = 3

[anti_nuke]
enabled = true
allowed_role = 12
allowed_users = [1, "2"]

[presence]
status = "dnd"
activity_type = "playing"
activity_text = "with fire"

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_full_config_parses() {
    init_test_logging();

    let config = ConfigLoader::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.discord.token, "file-token");
    assert_eq!(config.discord.prefix, "?");
    assert_eq!(config.discord.owner_id, Some(UserId(100_000_000_000_000_001)));
    assert_eq!(config.roles.general, Some(RoleId(10)));
    assert_eq!(config.roles.moderation, Some(RoleId(11)));
    assert!(config.roles.music.is_none());
    assert_eq!(config.cooldown.window_seconds, 3);
    assert!(config.anti_nuke.allowed_users.contains(&UserId(2)));
    assert_eq!(config.presence.status, PresenceStatus::Dnd);
    assert_eq!(config.presence.activity_type, ActivityKind::Playing);
    assert_eq!(config.activity_text(), "with fire");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_falls_back_to_defaults() {
    let config = ConfigLoader::from_toml_str("[discord]\ntoken = \"t\"\n").unwrap();

    assert_eq!(config.discord.prefix, "!");
    assert_eq!(config.cooldown.window_seconds, 5);
    assert_eq!(config.presence.status, PresenceStatus::Online);
}

#[test]
fn test_unknown_status_is_a_parse_error() {
    let result = ConfigLoader::from_toml_str("[presence]\nstatus = \"busy\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    // Environment overrides apply on top of the file; DISCORD_TOKEN may be
    // set on the machine running the tests, so only assert file-only keys.
    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.cooldown.sweep_interval_seconds, 60);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_file_reports_path() {
    let err = ConfigLoader::load_from_file("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.toml"));
}
