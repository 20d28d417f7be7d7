//! Conversions between serenity models and the command core's types.

use megabot_commands::{
    ChannelKind, ChannelSnapshot, MemberSnapshot, OptionValue, OverwriteSnapshot, OverwriteTarget,
    RoleSnapshot,
};
use megabot_common::{ChannelId, GuildId, RoleId, UserId};
use poise::serenity_prelude as serenity;

/// Snowflake conversions in both directions.
///
/// Discord never hands out id 0, so the reverse direction only sees
/// non-zero values.
pub trait Snowflake {
    /// The serenity id type.
    type Serenity;

    /// Convert to the serenity id.
    fn to_serenity(self) -> Self::Serenity;
}

macro_rules! snowflake_conversion {
    ($ours:ty, $theirs:ty, $from:ident) => {
        impl Snowflake for $ours {
            type Serenity = $theirs;

            fn to_serenity(self) -> $theirs {
                <$theirs>::new(self.get())
            }
        }

        #[doc = concat!("Convert a serenity `", stringify!($theirs), "`.")]
        pub fn $from(id: $theirs) -> $ours {
            <$ours>::from(id.get())
        }
    };
}

snowflake_conversion!(UserId, serenity::UserId, user_id);
snowflake_conversion!(GuildId, serenity::GuildId, guild_id);
snowflake_conversion!(ChannelId, serenity::ChannelId, channel_id);
snowflake_conversion!(RoleId, serenity::RoleId, role_id);

/// Role set and voice state of an invoking member.
pub fn member_snapshot(
    user: serenity::UserId,
    roles: &[serenity::RoleId],
    voice_channel: Option<serenity::ChannelId>,
) -> MemberSnapshot {
    MemberSnapshot::new(user_id(user), roles.iter().copied().map(role_id))
        .in_voice(voice_channel.map(channel_id))
}

/// Voice channel `user` is connected to, from the cache.
pub fn voice_channel(
    cache: &serenity::Cache,
    guild: serenity::GuildId,
    user: serenity::UserId,
) -> Option<serenity::ChannelId> {
    cache
        .guild(guild)
        .and_then(|guild| guild.voice_states.get(&user).and_then(|state| state.channel_id))
}

/// Slash option values the command core understands. Numbers, mentionables
/// and attachments are not used by any command and are dropped.
pub fn option_value(value: &serenity::CommandDataOptionValue) -> Option<OptionValue> {
    match value {
        serenity::CommandDataOptionValue::String(text) => Some(OptionValue::String(text.clone())),
        serenity::CommandDataOptionValue::Integer(number) => Some(OptionValue::Integer(*number)),
        serenity::CommandDataOptionValue::Boolean(flag) => Some(OptionValue::Boolean(*flag)),
        serenity::CommandDataOptionValue::Channel(id) => Some(OptionValue::Channel(channel_id(*id))),
        serenity::CommandDataOptionValue::User(id) => Some(OptionValue::User(user_id(*id))),
        serenity::CommandDataOptionValue::Role(id) => Some(OptionValue::Role(role_id(*id))),
        _ => None,
    }
}

/// Restorable fields of a cached role.
pub fn role_snapshot(role: &serenity::Role) -> RoleSnapshot {
    RoleSnapshot {
        id: role_id(role.id),
        name: role.name.clone(),
        permissions: role.permissions.bits(),
        colour: role.colour.0,
        hoist: role.hoist,
        mentionable: role.mentionable,
    }
}

/// `None` for channel types that cannot be recreated (threads, DMs).
pub fn channel_snapshot(channel: &serenity::GuildChannel) -> Option<ChannelSnapshot> {
    Some(ChannelSnapshot {
        id: channel_id(channel.id),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind)?,
        topic: channel.topic.clone(),
        parent: channel.parent_id.map(channel_id),
        position: channel.position,
        nsfw: channel.nsfw,
        overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(overwrite_snapshot)
            .collect(),
    })
}

/// Channel kinds the anti-nuke guard can recreate.
pub fn channel_kind(kind: serenity::ChannelType) -> Option<ChannelKind> {
    match kind {
        serenity::ChannelType::Text => Some(ChannelKind::Text),
        serenity::ChannelType::Voice => Some(ChannelKind::Voice),
        serenity::ChannelType::Category => Some(ChannelKind::Category),
        serenity::ChannelType::News => Some(ChannelKind::News),
        serenity::ChannelType::Stage => Some(ChannelKind::Stage),
        serenity::ChannelType::Forum => Some(ChannelKind::Forum),
        _ => None,
    }
}

/// Inverse of [`channel_kind`].
pub const fn serenity_channel_kind(kind: ChannelKind) -> serenity::ChannelType {
    match kind {
        ChannelKind::Text => serenity::ChannelType::Text,
        ChannelKind::Voice => serenity::ChannelType::Voice,
        ChannelKind::Category => serenity::ChannelType::Category,
        ChannelKind::News => serenity::ChannelType::News,
        ChannelKind::Stage => serenity::ChannelType::Stage,
        ChannelKind::Forum => serenity::ChannelType::Forum,
    }
}

/// Raw bits of a permission overwrite.
pub fn overwrite_snapshot(overwrite: &serenity::PermissionOverwrite) -> Option<OverwriteSnapshot> {
    let target = match overwrite.kind {
        serenity::PermissionOverwriteType::Role(id) => OverwriteTarget::Role(role_id(id)),
        serenity::PermissionOverwriteType::Member(id) => OverwriteTarget::Member(user_id(id)),
        _ => return None,
    };
    Some(OverwriteSnapshot {
        target,
        allow: overwrite.allow.bits(),
        deny: overwrite.deny.bits(),
    })
}

/// Inverse of [`overwrite_snapshot`].
pub fn serenity_overwrite(overwrite: &OverwriteSnapshot) -> serenity::PermissionOverwrite {
    let kind = match overwrite.target {
        OverwriteTarget::Role(id) => serenity::PermissionOverwriteType::Role(id.to_serenity()),
        OverwriteTarget::Member(id) => serenity::PermissionOverwriteType::Member(id.to_serenity()),
    };
    serenity::PermissionOverwrite {
        allow: serenity::Permissions::from_bits_truncate(overwrite.allow),
        deny: serenity::Permissions::from_bits_truncate(overwrite.deny),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megabot_common::test_utils::discord_fixtures::{test_guild_id, test_role_id};

    #[test]
    fn test_snowflake_round_trip_keeps_value() {
        let guild = test_guild_id();
        assert_eq!(guild_id(guild.to_serenity()), guild);
        assert_eq!(role_id(test_role_id().to_serenity()), test_role_id());
    }

    #[test]
    fn test_option_values() {
        assert_eq!(
            option_value(&serenity::CommandDataOptionValue::Integer(150)),
            Some(OptionValue::Integer(150))
        );
        assert_eq!(
            option_value(&serenity::CommandDataOptionValue::Channel(serenity::ChannelId::new(42))),
            Some(OptionValue::Channel(ChannelId(42)))
        );
        assert_eq!(
            option_value(&serenity::CommandDataOptionValue::Number(1.5)),
            None
        );
    }

    #[test]
    fn test_member_snapshot_carries_roles_and_voice() {
        let member = member_snapshot(
            serenity::UserId::new(1),
            &[serenity::RoleId::new(2), serenity::RoleId::new(3)],
            Some(serenity::ChannelId::new(4)),
        );
        assert_eq!(member.user_id, UserId(1));
        assert!(member.roles.contains(&RoleId(3)));
        assert_eq!(member.voice_channel, Some(ChannelId(4)));
    }

    #[test]
    fn test_overwrite_conversion() {
        let snapshot = OverwriteSnapshot {
            target: OverwriteTarget::Role(RoleId(9)),
            allow: serenity::Permissions::VIEW_CHANNEL.bits(),
            deny: serenity::Permissions::SEND_MESSAGES.bits(),
        };
        let overwrite = serenity_overwrite(&snapshot);
        assert_eq!(overwrite.allow, serenity::Permissions::VIEW_CHANNEL);
        assert_eq!(overwrite_snapshot(&overwrite), Some(snapshot));
    }

    #[test]
    fn test_unsupported_channel_kinds() {
        assert_eq!(channel_kind(serenity::ChannelType::PublicThread), None);
        for kind in [ChannelKind::Text, ChannelKind::Voice, ChannelKind::Forum] {
            assert_eq!(channel_kind(serenity_channel_kind(kind)), Some(kind));
        }
    }
}
