//! Error types for the command core and its collaborators.

use crate::registry::ParameterKind;
use megabot_common::ChannelId;
use std::time::Duration;
use thiserror::Error;

/// Error type returned by command handlers.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or querying the command registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    DuplicateName(String),
    #[error("command '{0}' is not registered")]
    NotFound(String),
    #[error("registry is sealed, cannot register '{0}'")]
    Sealed(String),
    #[error("invalid command name '{0}'")]
    InvalidName(String),
}

/// Failure to deliver a reply through the chat platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to deliver reply: {0}")]
pub struct ReplyError(pub String);

/// Errors raised by [`InvocationContext`](crate::context::InvocationContext).
#[derive(Error, Debug)]
pub enum ContextError {
    /// A handler read a parameter with a getter of the wrong kind, or the
    /// platform delivered an option of a different kind than declared.
    #[error("parameter '{parameter}' is declared as {expected} but was read as {found}")]
    SourceMismatch {
        parameter: String,
        expected: ParameterKind,
        found: ParameterKind,
    },

    #[error("command has no parameter named '{0}'")]
    UnknownParameter(String),

    #[error("'{value}' is not a valid {kind} for '{parameter}'")]
    InvalidArgument {
        parameter: String,
        kind: ParameterKind,
        value: String,
    },

    /// The interaction was not acknowledged (or deferred) within the budget.
    #[error("interaction acknowledgement budget exceeded after {elapsed:?}")]
    AcknowledgementExpired { elapsed: Duration },

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Errors raised by guild-level collaborators (moderation, verification,
/// anti-nuke restoration).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuildActionError {
    #[error("channel {0} is not a text channel")]
    InvalidChannel(ChannelId),
    #[error("this command can only be used inside a server")]
    NotInGuild,
    #[error("Discord API error: {0}")]
    Discord(String),
}

/// Errors raised by the music-control collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("failed to load '{0}'")]
    LoadFailed(String),
    #[error("no player is active in this server")]
    NoPlayer,
    #[error("music backend error: {0}")]
    Backend(String),
}
