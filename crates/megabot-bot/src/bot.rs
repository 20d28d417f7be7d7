//! Core bot logic using the Poise framework.

use crate::convert::guild_id;
use crate::error::{BotError, BotResult, Error};
use crate::events::event_handler;
use crate::guild::SerenityGuild;
use crate::{presence, slash};
use megabot_commands::{
    builtin_registry, create_dispatcher, AntiNukeGuard, AntiNukePolicy, CommandDispatcher,
    CommandRoles, GuildActions, VerifyButton,
};
use megabot_config::Config;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Application data shared with every event.
pub struct Data {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Routes prefix and slash invocations through the gates.
    pub dispatcher: CommandDispatcher,
    /// Handles clicks on verification prompts.
    pub verify_button: VerifyButton,
    /// Restores roles and channels deleted by untrusted members.
    pub anti_nuke: AntiNukeGuard,
}

/// Main bot structure.
pub struct MegaBot {
    config: Arc<Config>,
}

impl MegaBot {
    /// Creates a new bot instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Gateway intents: guild messages with content, interactions and
    /// voice states for the music commands.
    pub fn intents() -> serenity::GatewayIntents {
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT
    }

    /// Connects to Discord and runs until the gateway closes or Ctrl-C is
    /// received.
    pub async fn start(&self) -> BotResult<()> {
        let config = self.config.clone();

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                event_handler: |ctx, event, framework, data| {
                    Box::pin(event_handler(ctx, event, framework, data))
                },
                on_error: |error| Box::pin(on_error(error)),
                ..Default::default()
            })
            .setup(move |ctx, ready, _framework| Box::pin(setup(ctx, ready, config.clone())))
            .build();

        let mut client = serenity::ClientBuilder::new(&self.config.discord.token, Self::intents())
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
                return;
            }
            info!("Received shutdown signal, starting graceful shutdown");
            shard_manager.shutdown_all().await;
        });

        client
            .start()
            .await
            .map_err(|e| BotError::Framework(format!("{e:?}")))
    }
}

/// Builds the shared data once the gateway is ready: command table,
/// dispatcher, guild collaborators, slash commands and presence.
async fn setup(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    config: Arc<Config>,
) -> Result<Data, Error> {
    info!("Bot connected as: {}", ready.user.name);
    info!("Connected to {} guilds", ready.guilds.len());

    let guild_api = Arc::new(SerenityGuild::new(ctx.http.clone()));
    let actions: Arc<dyn GuildActions> = guild_api.clone();

    let roles = CommandRoles {
        general: config.roles.general,
        moderation: config.roles.moderation,
        music: config.roles.music,
    };
    let registry = builtin_registry(&roles, &actions).map_err(BotError::from)?;
    let dispatcher = create_dispatcher(
        registry,
        config.discord.owner_id,
        config.cooldown.window(),
    );
    dispatcher
        .cooldowns()
        .spawn_sweeper(config.cooldown.sweep_interval());
    debug!("Cooldown sweeper started");

    let commands = slash::build_commands(dispatcher.registry());
    for guild in &ready.guilds {
        slash::register_guild(&ctx.http, guild_id(guild.id), commands.clone()).await;
    }

    presence::apply(ctx, &config);

    let policy = AntiNukePolicy {
        enabled: config.anti_nuke.enabled,
        allowed_role: config.anti_nuke.allowed_role,
        allowed_users: config.anti_nuke.allowed_users.clone(),
    };
    Ok(Data {
        verify_button: VerifyButton::new(actions, config.roles.verified),
        anti_nuke: AntiNukeGuard::new(policy, guild_api.clone(), guild_api),
        dispatcher,
        config,
    })
}

/// Global error handler for the framework.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error in event handler for {}: {:?}", event.snake_case_name(), error);
        }
        // Slash commands are dispatched by the event handler, not poise.
        poise::FrameworkError::UnknownInteraction { interaction, .. } => {
            debug!("Interaction '{}' handled outside poise", interaction.data.name);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
