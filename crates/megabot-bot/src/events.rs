//! Gateway event routing into the command core.

use crate::bot::Data;
use crate::convert::{
    channel_id, channel_snapshot, guild_id, member_snapshot, option_value, role_snapshot, user_id,
    voice_channel,
};
use crate::error::Error;
use crate::reply::{InteractionReply, MessageReply};
use crate::slash;
use megabot_commands::{parse_prefixed, ButtonClick, InvocationContext, Invoker};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Central event handler for Discord events.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => on_message(ctx, new_message, data).await,
        serenity::FullEvent::InteractionCreate { interaction } => {
            on_interaction(ctx, interaction, data).await;
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if is_new.unwrap_or(false) {
                info!("Joined guild: {} (ID: {})", guild.name, guild.id);
                let commands = slash::build_commands(data.dispatcher.registry());
                slash::register_guild(&ctx.http, guild_id(guild.id), commands).await;
            }
        }
        serenity::FullEvent::GuildRoleDelete {
            guild_id: guild,
            removed_role_id,
            removed_role_data_if_available,
        } => {
            let Some(role) = removed_role_data_if_available else {
                warn!(%removed_role_id, "Deleted role not in cache, cannot restore");
                return Ok(());
            };
            let verdict = data
                .anti_nuke
                .on_role_deleted(guild_id(*guild), role_snapshot(role))
                .await;
            debug!(?verdict, "Handled role deletion");
        }
        serenity::FullEvent::ChannelDelete { channel, .. } => {
            let Some(snapshot) = channel_snapshot(channel) else {
                debug!(channel = %channel.id, "Ignoring deletion of non-restorable channel");
                return Ok(());
            };
            let verdict = data
                .anti_nuke
                .on_channel_deleted(guild_id(channel.guild_id), snapshot)
                .await;
            debug!(?verdict, "Handled channel deletion");
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Bot ready event received for: {}", data_about_bot.user.name);
        }
        _ => {}
    }
    Ok(())
}

/// Prefix commands. Bots, DMs and unprefixed messages are ignored.
async fn on_message(ctx: &serenity::Context, message: &serenity::Message, data: &Data) {
    if message.author.bot {
        return;
    }
    let Some(guild) = message.guild_id else {
        return;
    };
    let Some((name, arguments)) = parse_prefixed(&message.content, &data.config.discord.prefix)
    else {
        return;
    };

    let member = message.member.as_ref().map(|member| {
        member_snapshot(
            message.author.id,
            &member.roles,
            voice_channel(&ctx.cache, guild, message.author.id),
        )
    });
    let invoker = Invoker {
        user_id: user_id(message.author.id),
        guild: Some(guild_id(guild)),
        channel: channel_id(message.channel_id),
        member,
    };
    let reply = MessageReply::new(ctx.http.clone(), message.channel_id, message.id);
    let invocation =
        InvocationContext::from_message(&name, arguments, invoker, Box::new(reply));

    let result = data.dispatcher.dispatch(invocation).await;
    debug!(command = %name, ?result, "Dispatched prefix command");
}

async fn on_interaction(ctx: &serenity::Context, interaction: &serenity::Interaction, data: &Data) {
    match interaction {
        serenity::Interaction::Command(command) => {
            let options: HashMap<_, _> = command
                .data
                .options
                .iter()
                .filter_map(|option| {
                    option_value(&option.value).map(|value| (option.name.clone(), value))
                })
                .collect();
            let member = command.member.as_deref().map(|member| {
                let voice = command
                    .guild_id
                    .and_then(|guild| voice_channel(&ctx.cache, guild, member.user.id));
                member_snapshot(member.user.id, &member.roles, voice)
            });
            let invoker = Invoker {
                user_id: user_id(command.user.id),
                guild: command.guild_id.map(guild_id),
                channel: channel_id(command.channel_id),
                member,
            };
            let reply = InteractionReply::new(ctx.http.clone(), command.id, command.token.clone());
            let invocation = InvocationContext::from_interaction(
                &command.data.name,
                options,
                invoker,
                Box::new(reply),
            );

            let result = data.dispatcher.dispatch(invocation).await;
            debug!(command = %command.data.name, ?result, "Dispatched slash command");
        }
        serenity::Interaction::Component(component) => {
            let click = ButtonClick {
                custom_id: component.data.custom_id.clone(),
                guild: component.guild_id.map(guild_id),
                user: user_id(component.user.id),
            };
            let reply =
                InteractionReply::new(ctx.http.clone(), component.id, component.token.clone());
            if !data.verify_button.handle(&click, &reply).await {
                debug!(custom_id = %click.custom_id, "Ignoring unknown component");
            }
        }
        _ => {}
    }
}
