//! Guild-level side effects used by the moderation and verification
//! commands.

use crate::error::GuildActionError;
use async_trait::async_trait;
use megabot_common::{ChannelId, GuildId, RoleId, UserId};

/// Mutations a command may perform on a guild.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuildActions: Send + Sync {
    /// Deny (`locked`) or allow `@everyone` to view and send in `channel`.
    async fn set_channel_locked(
        &self,
        guild: GuildId,
        channel: ChannelId,
        locked: bool,
    ) -> Result<(), GuildActionError>;

    /// Post the verification embed with a Verify button. Fails with
    /// [`GuildActionError::InvalidChannel`] unless `channel` is a text
    /// channel.
    async fn post_verification_prompt(
        &self,
        channel: ChannelId,
        description: String,
    ) -> Result<(), GuildActionError>;

    async fn add_member_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), GuildActionError>;
}
