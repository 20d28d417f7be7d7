//! Slash command registration from the command registry.

use crate::convert::Snowflake;
use megabot_commands::{CommandDefinition, CommandRegistry, ParameterKind};
use megabot_common::GuildId;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Slash option type for a parameter kind.
pub const fn option_type(kind: ParameterKind) -> serenity::CommandOptionType {
    match kind {
        ParameterKind::String => serenity::CommandOptionType::String,
        ParameterKind::Integer => serenity::CommandOptionType::Integer,
        ParameterKind::Boolean => serenity::CommandOptionType::Boolean,
        ParameterKind::Channel => serenity::CommandOptionType::Channel,
        ParameterKind::User => serenity::CommandOptionType::User,
        ParameterKind::Role => serenity::CommandOptionType::Role,
    }
}

fn create_command(definition: &CommandDefinition) -> serenity::CreateCommand {
    definition.parameters.iter().fold(
        serenity::CreateCommand::new(&definition.name).description(&definition.description),
        |command, parameter| {
            command.add_option(
                serenity::CreateCommandOption::new(
                    option_type(parameter.kind),
                    &parameter.name,
                    &parameter.description,
                )
                .required(parameter.required),
            )
        },
    )
}

/// One slash command per registered definition, in name order.
pub fn build_commands(registry: &CommandRegistry) -> Vec<serenity::CreateCommand> {
    registry
        .definitions()
        .into_iter()
        .map(create_command)
        .collect()
}

/// Replace the guild's slash commands. Failures are logged; the bot keeps
/// serving prefix commands either way.
pub async fn register_guild(
    http: &serenity::Http,
    guild: GuildId,
    commands: Vec<serenity::CreateCommand>,
) {
    match guild.to_serenity().set_commands(http, commands).await {
        Ok(registered) => info!(%guild, "Registered {} slash commands", registered.len()),
        Err(e) => error!(%guild, "Failed to register slash commands: {}", e),
    }
}
