//! Anti-nuke guard: recreate roles and channels deleted by members who are
//! not on the allow list.

use crate::error::GuildActionError;
use async_trait::async_trait;
use megabot_common::{ChannelId, GuildId, RoleId, UserId};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Audit-log action types the guard inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    RoleDelete,
    ChannelDelete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleDelete => f.write_str("role delete"),
            Self::ChannelDelete => f.write_str("channel delete"),
        }
    }
}

/// Read access to the guild audit log and member roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Executor of the most recent audit entry of `action`.
    async fn last_executor(
        &self,
        guild: GuildId,
        action: AuditAction,
    ) -> Result<Option<UserId>, GuildActionError>;

    async fn member_has_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<bool, GuildActionError>;
}

/// Everything needed to recreate a deleted role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub id: RoleId,
    pub name: String,
    /// Raw permission bits.
    pub permissions: u64,
    pub colour: u32,
    pub hoist: bool,
    pub mentionable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    News,
    Stage,
    Forum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteTarget {
    Role(RoleId),
    Member(UserId),
}

/// One permission overwrite, as raw allow/deny bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverwriteSnapshot {
    pub target: OverwriteTarget,
    pub allow: u64,
    pub deny: u64,
}

/// Everything needed to recreate a deleted guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    pub topic: Option<String>,
    pub parent: Option<ChannelId>,
    pub position: u16,
    pub nsfw: bool,
    pub overwrites: Vec<OverwriteSnapshot>,
}

/// Recreates deleted guild objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuildRestorer: Send + Sync {
    async fn restore_role(&self, guild: GuildId, role: RoleSnapshot)
        -> Result<(), GuildActionError>;

    async fn restore_channel(
        &self,
        guild: GuildId,
        channel: ChannelSnapshot,
    ) -> Result<(), GuildActionError>;
}

/// Who may delete roles and channels without triggering a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntiNukePolicy {
    pub enabled: bool,
    pub allowed_role: Option<RoleId>,
    pub allowed_users: BTreeSet<UserId>,
}

/// What the guard did about one deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Disabled,
    /// The executor is trusted; nothing was restored.
    Allowed(UserId),
    Restored,
    RestoreFailed(String),
}

pub struct AntiNukeGuard {
    policy: AntiNukePolicy,
    audit: Arc<dyn AuditTrail>,
    restorer: Arc<dyn GuildRestorer>,
}

impl AntiNukeGuard {
    pub fn new(
        policy: AntiNukePolicy,
        audit: Arc<dyn AuditTrail>,
        restorer: Arc<dyn GuildRestorer>,
    ) -> Self {
        Self {
            policy,
            audit,
            restorer,
        }
    }

    pub fn policy(&self) -> &AntiNukePolicy {
        &self.policy
    }

    #[instrument(skip(self, role), fields(role = %role.name))]
    pub async fn on_role_deleted(&self, guild: GuildId, role: RoleSnapshot) -> GuardVerdict {
        if !self.policy.enabled {
            return GuardVerdict::Disabled;
        }
        if let Some(executor) = self.trusted_executor(guild, AuditAction::RoleDelete).await {
            return GuardVerdict::Allowed(executor);
        }

        match self.restorer.restore_role(guild, role).await {
            Ok(()) => {
                info!("Restored deleted role");
                GuardVerdict::Restored
            }
            Err(e) => {
                warn!("Failed to restore role: {}", e);
                GuardVerdict::RestoreFailed(e.to_string())
            }
        }
    }

    #[instrument(skip(self, channel), fields(channel = %channel.name))]
    pub async fn on_channel_deleted(
        &self,
        guild: GuildId,
        channel: ChannelSnapshot,
    ) -> GuardVerdict {
        if !self.policy.enabled {
            return GuardVerdict::Disabled;
        }
        if let Some(executor) = self
            .trusted_executor(guild, AuditAction::ChannelDelete)
            .await
        {
            return GuardVerdict::Allowed(executor);
        }

        match self.restorer.restore_channel(guild, channel).await {
            Ok(()) => {
                info!("Restored deleted channel");
                GuardVerdict::Restored
            }
            Err(e) => {
                warn!("Failed to restore channel: {}", e);
                GuardVerdict::RestoreFailed(e.to_string())
            }
        }
    }

    /// The executor of the latest `action`, if they are trusted. Any lookup
    /// failure or unknown executor counts as untrusted.
    async fn trusted_executor(&self, guild: GuildId, action: AuditAction) -> Option<UserId> {
        let executor = match self.audit.last_executor(guild, action).await {
            Ok(Some(executor)) => executor,
            Ok(None) => {
                debug!(%action, "No audit entry found");
                return None;
            }
            Err(e) => {
                warn!(%action, "Audit log lookup failed: {}", e);
                return None;
            }
        };

        if self.policy.allowed_users.contains(&executor) {
            return Some(executor);
        }

        let role = self.policy.allowed_role?;
        match self.audit.member_has_role(guild, executor, role).await {
            Ok(true) => Some(executor),
            Ok(false) => None,
            Err(e) => {
                warn!(%executor, "Role lookup failed: {}", e);
                None
            }
        }
    }
}
