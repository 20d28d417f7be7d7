//! Channel lockdown commands.

use crate::context::InvocationContext;
use crate::error::{CommandError, GuildActionError};
use crate::guild::GuildActions;
use crate::registry::{CommandDefinition, CommandHandler};
use crate::reply::Reply;
use async_trait::async_trait;
use megabot_common::RoleId;
use std::sync::Arc;
use tracing::info;

/// Locks or unlocks the invoking channel for `@everyone`.
pub struct Lockdown {
    guild: Arc<dyn GuildActions>,
    locked: bool,
}

impl Lockdown {
    /// `lockdown`: hide the channel and deny sending.
    pub fn engage(guild: Arc<dyn GuildActions>) -> Self {
        Self {
            guild,
            locked: true,
        }
    }

    /// `unlockdown`: restore view and send.
    pub fn lift(guild: Arc<dyn GuildActions>) -> Self {
        Self {
            guild,
            locked: false,
        }
    }

    pub fn definition(&self, role: Option<RoleId>) -> CommandDefinition {
        let definition = if self.locked {
            CommandDefinition::new("lockdown", "Lockdown this channel")
        } else {
            CommandDefinition::new("unlockdown", "Lift lockdown")
        };
        definition.required_role(role)
    }
}

#[async_trait]
impl CommandHandler for Lockdown {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let guild = ctx.guild().ok_or(GuildActionError::NotInGuild)?;
        let channel = ctx.channel();
        self.guild
            .set_channel_locked(guild, channel, self.locked)
            .await?;
        info!(%guild, %channel, locked = self.locked, "Channel lockdown changed");

        let message = if self.locked {
            "🔒 Channel is now in lockdown."
        } else {
            "🔓 Channel lockdown lifted."
        };
        ctx.reply(Reply::text(message).ephemeral()).await?;
        Ok(())
    }
}
