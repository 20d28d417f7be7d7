//! Outgoing replies and the reply-channel capability.

use crate::error::ReplyError;
use async_trait::async_trait;

/// Accent colour of informational embeds.
pub const DEFAULT_COLOUR: u32 = 0x0099_ff;

/// Accent colour of error embeds.
pub const ERROR_COLOUR: u32 = 0xed42_45;

/// A single embed with a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub description: String,
    pub colour: u32,
}

/// Platform-agnostic reply. Message invocations ignore `ephemeral`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub ephemeral: bool,
}

impl Reply {
    /// Plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Embed reply in the default colour.
    pub fn embed(description: impl Into<String>) -> Self {
        Self {
            embed: Some(Embed {
                description: description.into(),
                colour: DEFAULT_COLOUR,
            }),
            ..Self::default()
        }
    }

    /// Red, ephemeral "❌ ..." embed.
    pub fn error(description: impl AsRef<str>) -> Self {
        Self {
            embed: Some(Embed {
                description: format!("❌ {}", description.as_ref()),
                colour: ERROR_COLOUR,
            }),
            ephemeral: true,
            ..Self::default()
        }
    }

    /// Only the invoker sees the reply (interactions only).
    #[must_use]
    pub const fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

/// Where a command's replies go.
///
/// The gateway adapter implements this once for text messages (send a new
/// message, edit the last one) and once for interactions (initial response,
/// deferral, edit of the original response, follow-ups).
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Send a new reply. For interactions the first call is the initial
    /// response and later calls are follow-ups.
    async fn send(&self, reply: Reply) -> Result<(), ReplyError>;

    /// Replace the most recent reply (or the deferred placeholder).
    async fn edit(&self, reply: Reply) -> Result<(), ReplyError>;

    /// Acknowledge without content. Message channels show a typing
    /// indicator instead.
    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError>;
}
