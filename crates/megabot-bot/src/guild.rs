//! Serenity implementations of the guild-side collaborators.

use crate::convert::{serenity_channel_kind, serenity_overwrite, user_id, Snowflake};
use ::serenity::model::guild::audit_log::{Action, ChannelAction, RoleAction};
use async_trait::async_trait;
use megabot_commands::{
    AuditAction, AuditTrail, ChannelSnapshot, GuildActionError, GuildActions, GuildRestorer,
    RoleSnapshot, DEFAULT_COLOUR, VERIFY_BUTTON_ID,
};
use megabot_common::{ChannelId, GuildId, RoleId, UserId};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, info};

const ANTI_NUKE_REASON: &str = "Anti-nuke: restoring deleted object";

fn discord_error(e: &serenity::Error) -> GuildActionError {
    GuildActionError::Discord(e.to_string())
}

/// Guild operations over the bot's HTTP client.
#[derive(Clone)]
pub struct SerenityGuild {
    http: Arc<serenity::Http>,
}

impl SerenityGuild {
    /// Wrap the client's HTTP handle.
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// `@everyone` overwrite with view/send denied when locked and allowed when
/// lifted. Every other bit of `existing` is kept.
pub fn lockdown_overwrite(
    guild: GuildId,
    existing: Option<&serenity::PermissionOverwrite>,
    locked: bool,
) -> serenity::PermissionOverwrite {
    let permissions = serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES;
    let (mut allow, mut deny) = existing.map_or(
        (serenity::Permissions::empty(), serenity::Permissions::empty()),
        |overwrite| (overwrite.allow, overwrite.deny),
    );
    if locked {
        allow.remove(permissions);
        deny.insert(permissions);
    } else {
        deny.remove(permissions);
        allow.insert(permissions);
    }
    serenity::PermissionOverwrite {
        allow,
        deny,
        kind: serenity::PermissionOverwriteType::Role(guild.everyone_role().to_serenity()),
    }
}

#[async_trait]
impl GuildActions for SerenityGuild {
    async fn set_channel_locked(
        &self,
        guild: GuildId,
        channel: ChannelId,
        locked: bool,
    ) -> Result<(), GuildActionError> {
        let target = channel.to_serenity();
        let everyone =
            serenity::PermissionOverwriteType::Role(guild.everyone_role().to_serenity());
        let current = match target
            .to_channel(&*self.http)
            .await
            .map_err(|e| discord_error(&e))?
        {
            serenity::Channel::Guild(guild_channel) => guild_channel
                .permission_overwrites
                .into_iter()
                .find(|overwrite| overwrite.kind == everyone),
            _ => None,
        };

        target
            .create_permission(&*self.http, lockdown_overwrite(guild, current.as_ref(), locked))
            .await
            .map_err(|e| discord_error(&e))
    }

    async fn post_verification_prompt(
        &self,
        channel: ChannelId,
        description: String,
    ) -> Result<(), GuildActionError> {
        let target = channel.to_serenity();
        let is_text = match target.to_channel(&*self.http).await {
            Ok(serenity::Channel::Guild(guild_channel)) => {
                guild_channel.kind == serenity::ChannelType::Text
            }
            Ok(_) => false,
            Err(e) => {
                debug!(%channel, "Failed to resolve verification channel: {}", e);
                false
            }
        };
        if !is_text {
            return Err(GuildActionError::InvalidChannel(channel));
        }

        let embed = serenity::CreateEmbed::new()
            .colour(DEFAULT_COLOUR)
            .description(description);
        let button = serenity::CreateButton::new(VERIFY_BUTTON_ID)
            .label("Verify")
            .style(serenity::ButtonStyle::Success);
        let message = serenity::CreateMessage::new()
            .embed(embed)
            .components(vec![serenity::CreateActionRow::Buttons(vec![button])]);

        target
            .send_message(&*self.http, message)
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(())
    }

    async fn add_member_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), GuildActionError> {
        self.http
            .add_member_role(
                guild.to_serenity(),
                user.to_serenity(),
                role.to_serenity(),
                Some("Verified"),
            )
            .await
            .map_err(|e| discord_error(&e))
    }
}

#[async_trait]
impl AuditTrail for SerenityGuild {
    async fn last_executor(
        &self,
        guild: GuildId,
        action: AuditAction,
    ) -> Result<Option<UserId>, GuildActionError> {
        let action = match action {
            AuditAction::RoleDelete => Action::Role(RoleAction::Delete),
            AuditAction::ChannelDelete => Action::Channel(ChannelAction::Delete),
        };
        let logs = guild
            .to_serenity()
            .audit_logs(&*self.http, Some(action), None, None, Some(1))
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(logs.entries.first().map(|entry| user_id(entry.user_id)))
    }

    async fn member_has_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<bool, GuildActionError> {
        let member = self
            .http
            .get_member(guild.to_serenity(), user.to_serenity())
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(member.roles.contains(&role.to_serenity()))
    }
}

#[async_trait]
impl GuildRestorer for SerenityGuild {
    async fn restore_role(&self, guild: GuildId, role: RoleSnapshot) -> Result<(), GuildActionError> {
        let builder = serenity::EditRole::new()
            .name(&role.name)
            .permissions(serenity::Permissions::from_bits_truncate(role.permissions))
            .colour(role.colour)
            .hoist(role.hoist)
            .mentionable(role.mentionable)
            .audit_log_reason(ANTI_NUKE_REASON);
        let created = guild
            .to_serenity()
            .create_role(&*self.http, builder)
            .await
            .map_err(|e| discord_error(&e))?;
        info!(%guild, old = %role.id, new = %created.id, "Recreated role '{}'", role.name);
        Ok(())
    }

    async fn restore_channel(
        &self,
        guild: GuildId,
        channel: ChannelSnapshot,
    ) -> Result<(), GuildActionError> {
        let mut builder = serenity::CreateChannel::new(&channel.name)
            .kind(serenity_channel_kind(channel.kind))
            .position(channel.position)
            .nsfw(channel.nsfw)
            .permissions(channel.overwrites.iter().map(serenity_overwrite))
            .audit_log_reason(ANTI_NUKE_REASON);
        if let Some(topic) = &channel.topic {
            builder = builder.topic(topic);
        }
        if let Some(parent) = channel.parent {
            builder = builder.category(parent.to_serenity());
        }

        let created = guild
            .to_serenity()
            .create_channel(&*self.http, builder)
            .await
            .map_err(|e| discord_error(&e))?;
        info!(%guild, old = %channel.id, new = %created.id, "Recreated channel '{}'", channel.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockdown_overwrite_targets_everyone() {
        let locked = lockdown_overwrite(GuildId(42), None, true);
        assert_eq!(
            locked.kind,
            serenity::PermissionOverwriteType::Role(serenity::RoleId::new(42))
        );
        assert!(locked.allow.is_empty());
        assert!(locked.deny.contains(serenity::Permissions::VIEW_CHANNEL));
        assert!(locked.deny.contains(serenity::Permissions::SEND_MESSAGES));

        let lifted = lockdown_overwrite(GuildId(42), None, false);
        assert!(lifted.deny.is_empty());
        assert!(lifted.allow.contains(serenity::Permissions::SEND_MESSAGES));
    }

    #[test]
    fn test_lockdown_overwrite_keeps_unrelated_bits() {
        let existing = serenity::PermissionOverwrite {
            allow: serenity::Permissions::ATTACH_FILES | serenity::Permissions::SEND_MESSAGES,
            deny: serenity::Permissions::ADD_REACTIONS,
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(42)),
        };

        let locked = lockdown_overwrite(GuildId(42), Some(&existing), true);
        assert_eq!(locked.allow, serenity::Permissions::ATTACH_FILES);
        assert_eq!(
            locked.deny,
            serenity::Permissions::ADD_REACTIONS
                | serenity::Permissions::VIEW_CHANNEL
                | serenity::Permissions::SEND_MESSAGES
        );

        let lifted = lockdown_overwrite(GuildId(42), Some(&locked), false);
        assert_eq!(lifted.deny, serenity::Permissions::ADD_REACTIONS);
        assert_eq!(
            lifted.allow,
            serenity::Permissions::ATTACH_FILES
                | serenity::Permissions::VIEW_CHANNEL
                | serenity::Permissions::SEND_MESSAGES
        );
    }
}
