//! Bot presence from configuration.

use megabot_config::{ActivityKind, Config, PresenceStatus};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Serenity status for the configured one.
pub const fn online_status(status: PresenceStatus) -> serenity::OnlineStatus {
    match status {
        PresenceStatus::Online => serenity::OnlineStatus::Online,
        PresenceStatus::Idle => serenity::OnlineStatus::Idle,
        PresenceStatus::Dnd => serenity::OnlineStatus::DoNotDisturb,
        PresenceStatus::Invisible => serenity::OnlineStatus::Invisible,
    }
}

/// The configured activity. A streaming activity with an unusable URL is
/// shown as playing instead.
pub fn activity(config: &Config) -> serenity::ActivityData {
    let text = config.activity_text();
    match config.presence.activity_type {
        ActivityKind::Playing => serenity::ActivityData::playing(text),
        ActivityKind::Listening => serenity::ActivityData::listening(text),
        ActivityKind::Watching => serenity::ActivityData::watching(text),
        ActivityKind::Competing => serenity::ActivityData::competing(text),
        ActivityKind::Streaming => {
            let url = config.presence.streaming_url.as_deref().unwrap_or_default();
            serenity::ActivityData::streaming(text.clone(), url).unwrap_or_else(|e| {
                warn!("Invalid streaming URL '{}': {}", url, e);
                serenity::ActivityData::playing(text)
            })
        }
    }
}

/// Apply status and activity to every shard.
pub fn apply(ctx: &serenity::Context, config: &Config) {
    let activity = activity(config);
    info!(
        status = ?config.presence.status,
        kind = %config.presence.activity_type,
        "Setting presence: {}",
        activity.name
    );
    ctx.set_presence(Some(activity), online_status(config.presence.status));
}
