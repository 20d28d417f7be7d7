//! Music commands over a pluggable playback backend.
//!
//! Nothing here talks to an audio node directly; the bot supplies a
//! [`MusicControl`] implementation and calls [`register_music_commands`].

use crate::context::InvocationContext;
use crate::error::{CommandError, GuildActionError, MusicError, RegistryError};
use crate::registry::{
    CommandDefinition, CommandHandler, CommandRegistry, ParameterKind, ParameterSpec,
};
use crate::reply::Reply;
use async_trait::async_trait;
use megabot_common::{ChannelId, GuildId, RoleId};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Accepted volume levels, in percent.
pub const VOLUME_RANGE: RangeInclusive<i64> = 0..=200;

/// How a search resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    Track,
    Playlist,
    Search,
    Empty,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub uri: Option<String>,
    pub length: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub load_type: LoadType,
    pub tracks: Vec<Track>,
}

impl SearchResult {
    /// The track to play, if the search produced any.
    pub fn first_playable(&self) -> Option<&Track> {
        match self.load_type {
            LoadType::Empty | LoadType::Error => None,
            LoadType::Track | LoadType::Playlist | LoadType::Search => self.tracks.first(),
        }
    }
}

/// Playback backend, one player per guild.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicControl: Send + Sync {
    async fn search(&self, query: String) -> Result<SearchResult, MusicError>;

    /// Join `voice` if needed and start `track`; announcements go to `text`.
    async fn play(
        &self,
        guild: GuildId,
        voice: ChannelId,
        text: ChannelId,
        track: Track,
    ) -> Result<(), MusicError>;

    async fn set_paused(&self, guild: GuildId, paused: bool) -> Result<(), MusicError>;

    async fn stop(&self, guild: GuildId) -> Result<(), MusicError>;

    async fn set_volume(&self, guild: GuildId, level: u16) -> Result<(), MusicError>;
}

/// Register `play`, `pause`, `resume`, `stop` and `volume`.
pub fn register_music_commands(
    registry: &mut CommandRegistry,
    control: &Arc<dyn MusicControl>,
    role: Option<RoleId>,
) -> Result<(), RegistryError> {
    registry.register(
        CommandDefinition::new("play", "Play a track")
            .required_role(role)
            .parameter(ParameterSpec::required(
                "query",
                ParameterKind::String,
                "Song name or URL",
            )),
        Play(control.clone()),
    )?;
    registry.register(
        CommandDefinition::new("pause", "Pause playback").required_role(role),
        Transport {
            control: control.clone(),
            action: TransportAction::Pause,
        },
    )?;
    registry.register(
        CommandDefinition::new("resume", "Resume playback").required_role(role),
        Transport {
            control: control.clone(),
            action: TransportAction::Resume,
        },
    )?;
    registry.register(
        CommandDefinition::new("stop", "Stop playback").required_role(role),
        Transport {
            control: control.clone(),
            action: TransportAction::Stop,
        },
    )?;
    registry.register(
        CommandDefinition::new("volume", "Set the volume")
            .required_role(role)
            .parameter(ParameterSpec::required(
                "level",
                ParameterKind::Integer,
                "Volume from 0 to 200",
            )),
        Volume(control.clone()),
    )?;
    Ok(())
}

struct Play(Arc<dyn MusicControl>);

#[async_trait]
impl CommandHandler for Play {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let guild = ctx.guild().ok_or(GuildActionError::NotInGuild)?;
        let Some(voice) = ctx.member().and_then(|member| member.voice_channel) else {
            ctx.reply(Reply::error("Join a voice channel first.")).await?;
            return Ok(());
        };
        let query = ctx.string_arg("query")?.unwrap_or_default();

        // Searching can take longer than the acknowledgement budget.
        ctx.defer_reply(false).await?;

        let result = self.0.search(query.clone()).await?;
        let Some(track) = result.first_playable().cloned() else {
            debug!(%query, load_type = ?result.load_type, "Search returned nothing playable");
            ctx.edit_reply(Reply::error(format!("No results for `{query}`")))
                .await?;
            return Ok(());
        };

        let title = track.title.clone();
        self.0.play(guild, voice, ctx.channel(), track).await?;
        info!(%guild, %title, "Started playback");
        ctx.edit_reply(Reply::embed(format!("🎶 Now playing **{title}**")))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum TransportAction {
    Pause,
    Resume,
    Stop,
}

struct Transport {
    control: Arc<dyn MusicControl>,
    action: TransportAction,
}

#[async_trait]
impl CommandHandler for Transport {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let guild = ctx.guild().ok_or(GuildActionError::NotInGuild)?;
        let outcome = match self.action {
            TransportAction::Pause => self.control.set_paused(guild, true).await,
            TransportAction::Resume => self.control.set_paused(guild, false).await,
            TransportAction::Stop => self.control.stop(guild).await,
        };

        let reply = match outcome {
            Ok(()) => Reply::embed(match self.action {
                TransportAction::Pause => "⏸️ Paused.",
                TransportAction::Resume => "▶️ Resumed.",
                TransportAction::Stop => "⏹️ Stopped.",
            }),
            Err(MusicError::NoPlayer) => Reply::error("Nothing is playing."),
            Err(e) => return Err(e.into()),
        };
        ctx.reply(reply).await?;
        Ok(())
    }
}

struct Volume(Arc<dyn MusicControl>);

#[async_trait]
impl CommandHandler for Volume {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let guild = ctx.guild().ok_or(GuildActionError::NotInGuild)?;
        let level = ctx.integer_arg("level")?.unwrap_or_default();
        let Some(level) = VOLUME_RANGE
            .contains(&level)
            .then(|| u16::try_from(level).ok())
            .flatten()
        else {
            ctx.reply(Reply::error("Volume must be between 0 and 200."))
                .await?;
            return Ok(());
        };

        match self.0.set_volume(guild, level).await {
            Ok(()) => ctx.reply(Reply::embed(format!("🔊 Volume set to {level}%."))).await?,
            Err(MusicError::NoPlayer) => ctx.reply(Reply::error("Nothing is playing.")).await?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
