//! Verification: the setup command and the Verify button.

use crate::context::InvocationContext;
use crate::error::{CommandError, GuildActionError};
use crate::guild::GuildActions;
use crate::registry::{CommandDefinition, CommandHandler, ParameterKind, ParameterSpec};
use crate::reply::{Reply, ReplyChannel};
use async_trait::async_trait;
use megabot_common::{GuildId, RoleId, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// `custom_id` of the button attached to verification prompts.
pub const VERIFY_BUTTON_ID: &str = "verify";

/// Prompt text used unless custom text is requested.
pub const DEFAULT_VERIFICATION_TEXT: &str = "Please verify to get access in the server!";

/// `verification-setup <channel> <custom> [text]`
pub struct VerificationSetup {
    guild: Arc<dyn GuildActions>,
}

impl VerificationSetup {
    pub fn new(guild: Arc<dyn GuildActions>) -> Self {
        Self { guild }
    }

    pub fn definition(role: Option<RoleId>) -> CommandDefinition {
        CommandDefinition::new("verification-setup", "Setup verification message")
            .required_role(role)
            .parameter(ParameterSpec::required(
                "channel",
                ParameterKind::Channel,
                "Target channel",
            ))
            .parameter(ParameterSpec::required(
                "custom",
                ParameterKind::Boolean,
                "Use custom text",
            ))
            .parameter(ParameterSpec::optional(
                "text",
                ParameterKind::String,
                "Custom message",
            ))
    }
}

/// Custom text only applies when requested and non-blank.
fn prompt_text(custom: bool, text: Option<String>) -> String {
    match text {
        Some(text) if custom && !text.trim().is_empty() => text,
        _ => DEFAULT_VERIFICATION_TEXT.to_string(),
    }
}

#[async_trait]
impl CommandHandler for VerificationSetup {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let Some(channel) = ctx.channel_arg("channel")? else {
            ctx.reply(Reply::error("Invalid channel")).await?;
            return Ok(());
        };
        let custom = ctx.bool_arg("custom")?.unwrap_or(false);
        let description = prompt_text(custom, ctx.string_arg("text")?);

        match self
            .guild
            .post_verification_prompt(channel, description)
            .await
        {
            Ok(()) => {
                ctx.reply(Reply::text("Verification sent.").ephemeral())
                    .await?;
            }
            Err(GuildActionError::InvalidChannel(_)) => {
                ctx.reply(Reply::error("Invalid channel")).await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

/// A component interaction as seen by [`VerifyButton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonClick {
    pub custom_id: String,
    pub guild: Option<GuildId>,
    pub user: UserId,
}

/// Grants the verified role to whoever clicks the Verify button.
pub struct VerifyButton {
    guild: Arc<dyn GuildActions>,
    verified_role: Option<RoleId>,
}

impl VerifyButton {
    pub fn new(guild: Arc<dyn GuildActions>, verified_role: Option<RoleId>) -> Self {
        Self {
            guild,
            verified_role,
        }
    }

    /// Returns `false` for buttons this handler does not own.
    ///
    /// The acknowledgement goes out before the role grant; grant failures
    /// are logged and otherwise ignored.
    pub async fn handle(&self, click: &ButtonClick, reply: &dyn ReplyChannel) -> bool {
        if click.custom_id != VERIFY_BUTTON_ID {
            return false;
        }

        if let Err(e) = reply.send(Reply::text("✅ Verified!").ephemeral()).await {
            warn!("Failed to acknowledge verify button: {}", e);
        }

        match (click.guild, self.verified_role) {
            (Some(guild), Some(role)) => {
                if let Err(e) = self.guild.add_member_role(guild, click.user, role).await {
                    warn!(user = %click.user, %role, "Failed to grant verified role: {}", e);
                }
            }
            _ => debug!("No verified role configured or click outside a guild"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OptionValue;
    use crate::guild::MockGuildActions;
    use crate::test_support::{interaction_ctx, invoker, message_ctx, RecordingReply};
    use megabot_common::ChannelId;
    use mockall::predicate::eq;

    fn bound(mut ctx: InvocationContext) -> InvocationContext {
        ctx.bind_parameters(&VerificationSetup::definition(None).parameters);
        ctx
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(prompt_text(false, Some("hi".into())), DEFAULT_VERIFICATION_TEXT);
        assert_eq!(prompt_text(true, None), DEFAULT_VERIFICATION_TEXT);
        assert_eq!(prompt_text(true, Some("  ".into())), DEFAULT_VERIFICATION_TEXT);
        assert_eq!(prompt_text(true, Some("Click below".into())), "Click below");
    }

    #[tokio::test]
    async fn test_setup_posts_custom_text_from_message() {
        let mut guild = MockGuildActions::new();
        guild
            .expect_post_verification_prompt()
            .with(eq(ChannelId(42)), eq("Welcome aboard".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));

        let (ctx, recorder) = message_ctx(
            "verification-setup",
            &["<#42>", "true", "Welcome", "aboard"],
            invoker(1, None),
        );
        let mut ctx = bound(ctx);
        VerificationSetup::new(Arc::new(guild))
            .execute(&mut ctx)
            .await
            .unwrap();

        assert_eq!(
            recorder.sent(),
            vec![Reply::text("Verification sent.").ephemeral()]
        );
    }

    #[tokio::test]
    async fn test_setup_rejects_non_text_channel() {
        let mut guild = MockGuildActions::new();
        guild
            .expect_post_verification_prompt()
            .returning(|channel, _| Err(GuildActionError::InvalidChannel(channel)));

        let (ctx, recorder) = interaction_ctx(
            "verification-setup",
            vec![
                ("channel", OptionValue::Channel(ChannelId(7))),
                ("custom", OptionValue::Boolean(false)),
            ],
            invoker(1, None),
        );
        let mut ctx = bound(ctx);
        VerificationSetup::new(Arc::new(guild))
            .execute(&mut ctx)
            .await
            .unwrap();

        assert_eq!(recorder.sent(), vec![Reply::error("Invalid channel")]);
    }

    #[tokio::test]
    async fn test_verify_button_grants_role() {
        let mut guild = MockGuildActions::new();
        guild
            .expect_add_member_role()
            .with(eq(GuildId(1)), eq(UserId(2)), eq(RoleId(3)))
            .times(1)
            .returning(|_, _, _| Err(GuildActionError::Discord("hierarchy".into())));

        let button = VerifyButton::new(Arc::new(guild), Some(RoleId(3)));
        let reply = RecordingReply::default();
        let click = ButtonClick {
            custom_id: VERIFY_BUTTON_ID.to_string(),
            guild: Some(GuildId(1)),
            user: UserId(2),
        };

        assert!(button.handle(&click, &reply).await);
        assert_eq!(reply.sent(), vec![Reply::text("✅ Verified!").ephemeral()]);
    }

    #[tokio::test]
    async fn test_other_buttons_are_ignored() {
        let button = VerifyButton::new(Arc::new(MockGuildActions::new()), Some(RoleId(3)));
        let reply = RecordingReply::default();
        let click = ButtonClick {
            custom_id: "something-else".to_string(),
            guild: Some(GuildId(1)),
            user: UserId(2),
        };

        assert!(!button.handle(&click, &reply).await);
        assert!(reply.events().is_empty());
    }
}
