//! Serenity-backed reply channels for prefix messages and interactions.

use async_trait::async_trait;
use megabot_commands::{Reply, ReplyChannel, ReplyError};
use megabot_common::{truncate_string, MESSAGE_CONTENT_LIMIT};
use parking_lot::Mutex;
use poise::serenity_prelude as serenity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

fn embed(reply: &Reply) -> Option<serenity::CreateEmbed> {
    reply.embed.as_ref().map(|embed| {
        serenity::CreateEmbed::new()
            .description(&embed.description)
            .colour(embed.colour)
    })
}

fn content(reply: &Reply) -> Option<String> {
    reply
        .content
        .as_deref()
        .map(|text| truncate_string(text, MESSAGE_CONTENT_LIMIT))
}

fn discord_error(e: &serenity::Error) -> ReplyError {
    ReplyError(e.to_string())
}

/// Replies to a prefix command by answering the invoking message; edits
/// target the last message sent.
pub struct MessageReply {
    http: Arc<serenity::Http>,
    channel: serenity::ChannelId,
    invoking: serenity::MessageId,
    last_sent: Mutex<Option<serenity::MessageId>>,
}

impl MessageReply {
    /// Reply channel for the message `invoking` in `channel`.
    pub fn new(
        http: Arc<serenity::Http>,
        channel: serenity::ChannelId,
        invoking: serenity::MessageId,
    ) -> Self {
        Self {
            http,
            channel,
            invoking,
            last_sent: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ReplyChannel for MessageReply {
    async fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        let mut builder =
            serenity::CreateMessage::new().reference_message((self.channel, self.invoking));
        if let Some(content) = content(&reply) {
            builder = builder.content(content);
        }
        if let Some(embed) = embed(&reply) {
            builder = builder.embed(embed);
        }

        let message = self
            .channel
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| discord_error(&e))?;
        *self.last_sent.lock() = Some(message.id);
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<(), ReplyError> {
        let last = *self.last_sent.lock();
        let Some(message) = last else {
            return self.send(reply).await;
        };

        let mut builder = serenity::EditMessage::new();
        if let Some(content) = content(&reply) {
            builder = builder.content(content);
        }
        if let Some(embed) = embed(&reply) {
            builder = builder.embed(embed);
        }
        self.channel
            .edit_message(&*self.http, message, builder)
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(())
    }

    async fn defer(&self, _ephemeral: bool) -> Result<(), ReplyError> {
        self.channel
            .broadcast_typing(&*self.http)
            .await
            .map_err(|e| discord_error(&e))
    }
}

/// Replies to a command or component interaction through its token.
///
/// The first `send` or `defer` is the initial response; later sends are
/// follow-ups and edits target the original response.
pub struct InteractionReply {
    http: Arc<serenity::Http>,
    id: serenity::InteractionId,
    token: String,
    responded: AtomicBool,
}

impl InteractionReply {
    /// Reply channel for the interaction `id` with `token`.
    pub fn new(http: Arc<serenity::Http>, id: serenity::InteractionId, token: String) -> Self {
        Self {
            http,
            id,
            token,
            responded: AtomicBool::new(false),
        }
    }

    async fn respond(&self, response: serenity::CreateInteractionResponse) -> Result<(), ReplyError> {
        self.http
            .create_interaction_response(self.id, &self.token, &response, Vec::new())
            .await
            .map_err(|e| discord_error(&e))?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ReplyChannel for InteractionReply {
    async fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        if !self.responded.load(Ordering::SeqCst) {
            let mut message =
                serenity::CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
            if let Some(content) = content(&reply) {
                message = message.content(content);
            }
            if let Some(embed) = embed(&reply) {
                message = message.embed(embed);
            }
            return self
                .respond(serenity::CreateInteractionResponse::Message(message))
                .await;
        }

        let mut followup =
            serenity::CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
        if let Some(content) = content(&reply) {
            followup = followup.content(content);
        }
        if let Some(embed) = embed(&reply) {
            followup = followup.embed(embed);
        }
        self.http
            .create_followup_message(&self.token, &followup, Vec::new())
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<(), ReplyError> {
        let mut edit = serenity::EditInteractionResponse::new();
        if let Some(content) = content(&reply) {
            edit = edit.content(content);
        }
        if let Some(embed) = embed(&reply) {
            edit = edit.embed(embed);
        }
        self.http
            .edit_original_interaction_response(&self.token, &edit, Vec::new())
            .await
            .map_err(|e| discord_error(&e))?;
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError> {
        debug!(interaction = %self.id, ephemeral, "Deferring interaction");
        let message = serenity::CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.respond(serenity::CreateInteractionResponse::Defer(message))
            .await
    }
}
