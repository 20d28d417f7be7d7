//! Invocation context: one shape for prefix messages and slash interactions.

use crate::error::ContextError;
use crate::permissions::RoleMembership;
use crate::registry::{ParameterKind, ParameterSpec};
use crate::reply::{Reply, ReplyChannel};
use megabot_common::{
    parse_channel_mention, parse_role_mention, parse_user_mention, ChannelId, GuildId, RoleId,
    UserId,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Discord invalidates an interaction token that is not answered within
/// three seconds.
pub const ACKNOWLEDGEMENT_BUDGET: Duration = Duration::from_secs(3);

/// A typed option delivered with a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Channel(ChannelId),
    User(UserId),
    Role(RoleId),
}

impl OptionValue {
    /// The parameter kind this value satisfies.
    pub const fn kind(&self) -> ParameterKind {
        match self {
            Self::String(_) => ParameterKind::String,
            Self::Integer(_) => ParameterKind::Integer,
            Self::Boolean(_) => ParameterKind::Boolean,
            Self::Channel(_) => ParameterKind::Channel,
            Self::User(_) => ParameterKind::User,
            Self::Role(_) => ParameterKind::Role,
        }
    }
}

/// What the handler may ask about the invoking member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: UserId,
    pub roles: HashSet<RoleId>,
    /// Voice channel the member is connected to, if any.
    pub voice_channel: Option<ChannelId>,
}

impl MemberSnapshot {
    pub fn new(user_id: UserId, roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
            voice_channel: None,
        }
    }

    #[must_use]
    pub fn in_voice(mut self, channel: Option<ChannelId>) -> Self {
        self.voice_channel = channel;
        self
    }
}

impl RoleMembership for MemberSnapshot {
    fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Who invoked the command and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub user_id: UserId,
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    /// Absent outside guilds, or when the platform omitted member data.
    pub member: Option<MemberSnapshot>,
}

/// The two invocation shapes.
#[derive(Debug, Clone)]
pub enum InvocationSource {
    /// `<prefix>name arg arg ...` in a text channel.
    Message { arguments: Vec<String> },
    /// Slash command with named, typed options.
    Interaction {
        options: HashMap<String, OptionValue>,
        received_at: Instant,
    },
}

/// Acknowledgement state of the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Pending,
    Deferred,
    Replied,
}

/// Split a prefixed message into a lowercased command name and its
/// whitespace-separated arguments.
pub fn parse_prefixed(content: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some((name, tokens.map(str::to_string).collect()))
}

/// Everything a handler needs about one invocation.
///
/// Owned by a single dispatch and dropped when the handler returns.
pub struct InvocationContext {
    command: String,
    invoker: Invoker,
    source: InvocationSource,
    parameters: Vec<ParameterSpec>,
    responder: Box<dyn ReplyChannel>,
    ack: Acknowledgement,
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("command", &self.command)
            .field("invoker", &self.invoker)
            .field("source", &self.source)
            .field("ack", &self.ack)
            .finish_non_exhaustive()
    }
}

impl InvocationContext {
    /// Context for a prefix message.
    pub fn from_message(
        command: &str,
        arguments: Vec<String>,
        invoker: Invoker,
        reply: Box<dyn ReplyChannel>,
    ) -> Self {
        Self::new(command, InvocationSource::Message { arguments }, invoker, reply)
    }

    /// Context for a slash interaction received now.
    pub fn from_interaction(
        command: &str,
        options: HashMap<String, OptionValue>,
        invoker: Invoker,
        reply: Box<dyn ReplyChannel>,
    ) -> Self {
        let source = InvocationSource::Interaction {
            options,
            received_at: Instant::now(),
        };
        Self::new(command, source, invoker, reply)
    }

    fn new(
        command: &str,
        source: InvocationSource,
        invoker: Invoker,
        reply: Box<dyn ReplyChannel>,
    ) -> Self {
        Self {
            command: command.to_lowercase(),
            invoker,
            source,
            parameters: Vec::new(),
            responder: reply,
            ack: Acknowledgement::Pending,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn invoker(&self) -> UserId {
        self.invoker.user_id
    }

    pub fn guild(&self) -> Option<GuildId> {
        self.invoker.guild
    }

    pub fn channel(&self) -> ChannelId {
        self.invoker.channel
    }

    pub fn member(&self) -> Option<&MemberSnapshot> {
        self.invoker.member.as_ref()
    }

    pub fn source(&self) -> &InvocationSource {
        &self.source
    }

    /// Whether this is a slash interaction (and thus subject to the
    /// acknowledgement budget).
    pub fn is_interaction(&self) -> bool {
        matches!(self.source, InvocationSource::Interaction { .. })
    }

    pub fn acknowledgement(&self) -> Acknowledgement {
        self.ack
    }

    /// Instant by which an interaction must be acknowledged; `None` for
    /// messages.
    pub fn acknowledgement_deadline(&self) -> Option<Instant> {
        match &self.source {
            InvocationSource::Interaction { received_at, .. } => {
                Some(*received_at + ACKNOWLEDGEMENT_BUDGET)
            }
            InvocationSource::Message { .. } => None,
        }
    }

    /// Attach the declared parameters of the resolved command. Argument
    /// getters resolve names against this list.
    pub fn bind_parameters(&mut self, parameters: &[ParameterSpec]) {
        self.parameters = parameters.to_vec();
    }

    // ---- arguments -------------------------------------------------------

    /// Read a text parameter. Message arguments of any declared kind can be
    /// read raw.
    pub fn string_arg(&self, name: &str) -> Result<Option<String>, ContextError> {
        let (index, spec) = self.declared(name)?;
        match &self.source {
            InvocationSource::Message { arguments } => Ok(self.raw_token(index, spec, arguments)),
            InvocationSource::Interaction { .. } => self.typed_arg(name, ParameterKind::String, |value| {
                match value {
                    OptionValue::String(text) => Some(text.clone()),
                    _ => None,
                }
            }),
        }
    }

    pub fn integer_arg(&self, name: &str) -> Result<Option<i64>, ContextError> {
        self.typed_arg(name, ParameterKind::Integer, |value| match value {
            OptionValue::Integer(number) => Some(*number),
            _ => None,
        })
    }

    pub fn bool_arg(&self, name: &str) -> Result<Option<bool>, ContextError> {
        self.typed_arg(name, ParameterKind::Boolean, |value| match value {
            OptionValue::Boolean(flag) => Some(*flag),
            _ => None,
        })
    }

    pub fn channel_arg(&self, name: &str) -> Result<Option<ChannelId>, ContextError> {
        self.typed_arg(name, ParameterKind::Channel, |value| match value {
            OptionValue::Channel(channel) => Some(*channel),
            _ => None,
        })
    }

    pub fn user_arg(&self, name: &str) -> Result<Option<UserId>, ContextError> {
        self.typed_arg(name, ParameterKind::User, |value| match value {
            OptionValue::User(user) => Some(*user),
            _ => None,
        })
    }

    pub fn role_arg(&self, name: &str) -> Result<Option<RoleId>, ContextError> {
        self.typed_arg(name, ParameterKind::Role, |value| match value {
            OptionValue::Role(role) => Some(*role),
            _ => None,
        })
    }

    /// Check every declared parameter against what the invocation carries.
    ///
    /// Returns a user-facing reason naming the first problem.
    pub fn validate_arguments(&self) -> Result<(), String> {
        for (index, spec) in self.parameters.iter().enumerate() {
            match &self.source {
                InvocationSource::Interaction { options, .. } => match options.get(&spec.name) {
                    None if spec.required => {
                        return Err(format!("Missing required option `{}`", spec.name));
                    }
                    Some(value) if value.kind() != spec.kind => {
                        return Err(format!("Option `{}` must be a {}", spec.name, spec.kind));
                    }
                    _ => {}
                },
                InvocationSource::Message { arguments } => {
                    match self.raw_token(index, spec, arguments) {
                        None if spec.required => {
                            return Err(format!(
                                "Missing required argument `{}` ({})",
                                spec.name, spec.kind
                            ));
                        }
                        Some(token) if !token_parses(spec.kind, &token) => {
                            return Err(format!(
                                "`{token}` is not a valid {} for `{}`",
                                spec.kind, spec.name
                            ));
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn declared(&self, name: &str) -> Result<(usize, &ParameterSpec), ContextError> {
        self.parameters
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
            .ok_or_else(|| ContextError::UnknownParameter(name.to_string()))
    }

    /// Positional mapping; the last text parameter swallows the remainder so
    /// free-form text survives whitespace splitting.
    fn raw_token(&self, index: usize, spec: &ParameterSpec, arguments: &[String]) -> Option<String> {
        let is_last = index + 1 == self.parameters.len();
        if is_last && spec.kind == ParameterKind::String {
            let rest = arguments.get(index..).unwrap_or_default();
            return (!rest.is_empty()).then(|| rest.join(" "));
        }
        arguments.get(index).cloned()
    }

    fn typed_arg<T>(
        &self,
        name: &str,
        kind: ParameterKind,
        extract: impl Fn(&OptionValue) -> Option<T>,
    ) -> Result<Option<T>, ContextError>
    where
        T: FromToken,
    {
        let (index, spec) = self.declared(name)?;
        if spec.kind != kind {
            return Err(ContextError::SourceMismatch {
                parameter: name.to_string(),
                expected: spec.kind,
                found: kind,
            });
        }

        match &self.source {
            InvocationSource::Interaction { options, .. } => match options.get(name) {
                None => Ok(None),
                Some(value) => extract(value).map(Some).ok_or_else(|| {
                    ContextError::SourceMismatch {
                        parameter: name.to_string(),
                        expected: spec.kind,
                        found: value.kind(),
                    }
                }),
            },
            InvocationSource::Message { arguments } => match self.raw_token(index, spec, arguments) {
                None => Ok(None),
                Some(token) => T::from_token(&token).map(Some).ok_or(ContextError::InvalidArgument {
                    parameter: name.to_string(),
                    kind,
                    value: token,
                }),
            },
        }
    }

    // ---- replies ---------------------------------------------------------

    /// Reply to the invocation.
    ///
    /// The first reply is sent; after [`defer_reply`](Self::defer_reply) it
    /// replaces the deferred placeholder instead; after an earlier reply it
    /// is sent as an additional message.
    pub async fn reply(&mut self, reply: Reply) -> Result<(), ContextError> {
        match self.ack {
            Acknowledgement::Pending => {
                self.ensure_within_budget()?;
                self.responder.send(reply).await?;
            }
            Acknowledgement::Deferred => self.responder.edit(reply).await?,
            Acknowledgement::Replied => self.responder.send(reply).await?,
        }
        self.ack = Acknowledgement::Replied;
        Ok(())
    }

    /// Reply with a default-coloured embed.
    pub async fn reply_embed(&mut self, description: impl Into<String>) -> Result<(), ContextError> {
        self.reply(Reply::embed(description)).await
    }

    /// Replace the previous reply; sends one if nothing was sent yet.
    pub async fn edit_reply(&mut self, reply: Reply) -> Result<(), ContextError> {
        match self.ack {
            Acknowledgement::Pending => self.reply(reply).await,
            Acknowledgement::Deferred | Acknowledgement::Replied => {
                self.responder.edit(reply).await?;
                self.ack = Acknowledgement::Replied;
                Ok(())
            }
        }
    }

    /// Acknowledge now and answer later. Handlers must call this before any
    /// operation that may outlast [`ACKNOWLEDGEMENT_BUDGET`].
    ///
    /// No-op once acknowledged. Message invocations only get a typing
    /// indicator and keep their state.
    pub async fn defer_reply(&mut self, ephemeral: bool) -> Result<(), ContextError> {
        if self.ack != Acknowledgement::Pending {
            return Ok(());
        }
        if !self.is_interaction() {
            self.responder.defer(ephemeral).await?;
            return Ok(());
        }

        self.ensure_within_budget()?;
        self.responder.defer(ephemeral).await?;
        self.ack = Acknowledgement::Deferred;
        debug!("Deferred reply for '{}'", self.command);
        Ok(())
    }

    /// Defer an interaction that has not been acknowledged yet. Use before
    /// work of unknown duration.
    pub async fn defer_if_needed(&mut self) -> Result<(), ContextError> {
        if self.is_interaction() && self.ack == Acknowledgement::Pending {
            self.defer_reply(false).await?;
        }
        Ok(())
    }

    fn ensure_within_budget(&self) -> Result<(), ContextError> {
        if let InvocationSource::Interaction { received_at, .. } = &self.source {
            let elapsed = received_at.elapsed();
            if elapsed > ACKNOWLEDGEMENT_BUDGET {
                return Err(ContextError::AcknowledgementExpired { elapsed });
            }
        }
        Ok(())
    }
}

/// Parsing of raw message tokens into typed values.
trait FromToken: Sized {
    fn from_token(token: &str) -> Option<Self>;
}

impl FromToken for String {
    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_string())
    }
}

impl FromToken for i64 {
    fn from_token(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl FromToken for bool {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromToken for ChannelId {
    fn from_token(token: &str) -> Option<Self> {
        parse_channel_mention(token)
    }
}

impl FromToken for UserId {
    fn from_token(token: &str) -> Option<Self> {
        parse_user_mention(token)
    }
}

impl FromToken for RoleId {
    fn from_token(token: &str) -> Option<Self> {
        parse_role_mention(token)
    }
}

fn token_parses(kind: ParameterKind, token: &str) -> bool {
    match kind {
        ParameterKind::String => true,
        ParameterKind::Integer => i64::from_token(token).is_some(),
        ParameterKind::Boolean => bool::from_token(token).is_some(),
        ParameterKind::Channel => ChannelId::from_token(token).is_some(),
        ParameterKind::User => UserId::from_token(token).is_some(),
        ParameterKind::Role => RoleId::from_token(token).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ParameterSpec;
    use crate::test_support::{interaction_ctx, invoker, message_ctx, ReplyEvent};

    fn verification_params() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("channel", ParameterKind::Channel, "Target channel"),
            ParameterSpec::required("custom", ParameterKind::Boolean, "Use custom text"),
            ParameterSpec::optional("text", ParameterKind::String, "Custom text"),
        ]
    }

    #[test]
    fn test_parse_prefixed() {
        assert_eq!(
            parse_prefixed("!PING  a b", "!"),
            Some(("ping".to_string(), vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(parse_prefixed("hello", "!"), None);
        assert_eq!(parse_prefixed("!", "!"), None);
        assert_eq!(parse_prefixed("! ping", "!"), Some(("ping".to_string(), vec![])));
    }

    #[test]
    fn test_message_arguments_map_positionally() {
        let (mut ctx, _) = message_ctx(
            "verification-setup",
            &["<#42>", "yes", "Click", "the", "button"],
            invoker(1, None),
        );
        ctx.bind_parameters(&verification_params());

        assert_eq!(ctx.channel_arg("channel").unwrap(), Some(ChannelId(42)));
        assert_eq!(ctx.bool_arg("custom").unwrap(), Some(true));
        assert_eq!(
            ctx.string_arg("text").unwrap().as_deref(),
            Some("Click the button")
        );
        assert!(ctx.validate_arguments().is_ok());
    }

    #[test]
    fn test_message_missing_and_invalid_arguments() {
        let (mut ctx, _) = message_ctx("verification-setup", &["general"], invoker(1, None));
        ctx.bind_parameters(&verification_params());

        let reason = ctx.validate_arguments().unwrap_err();
        assert!(reason.contains("channel"), "{reason}");
        assert!(matches!(
            ctx.channel_arg("channel"),
            Err(ContextError::InvalidArgument { .. })
        ));
        assert_eq!(ctx.bool_arg("custom").unwrap(), None);

        let (mut ctx, _) = message_ctx("verification-setup", &["42"], invoker(1, None));
        ctx.bind_parameters(&verification_params());
        let reason = ctx.validate_arguments().unwrap_err();
        assert!(reason.contains("custom"), "{reason}");
    }

    #[test]
    fn test_interaction_kind_mismatch() {
        let (mut ctx, _) = interaction_ctx(
            "verification-setup",
            vec![
                ("channel", OptionValue::String("general".into())),
                ("custom", OptionValue::Boolean(false)),
            ],
            invoker(1, None),
        );
        ctx.bind_parameters(&verification_params());

        assert!(matches!(
            ctx.channel_arg("channel"),
            Err(ContextError::SourceMismatch {
                found: ParameterKind::String,
                ..
            })
        ));
        assert!(matches!(
            ctx.integer_arg("custom"),
            Err(ContextError::SourceMismatch {
                expected: ParameterKind::Boolean,
                found: ParameterKind::Integer,
                ..
            })
        ));
        assert_eq!(ctx.bool_arg("custom").unwrap(), Some(false));
        assert!(ctx.validate_arguments().is_err());
    }

    #[test]
    fn test_unknown_parameter() {
        let (ctx, _) = message_ctx("ping", &[], invoker(1, None));
        assert!(matches!(
            ctx.string_arg("anything"),
            Err(ContextError::UnknownParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_reply_after_defer_edits() {
        let (mut ctx, recorder) = interaction_ctx("ping", vec![], invoker(1, None));
        ctx.defer_reply(true).await.unwrap();
        assert_eq!(ctx.acknowledgement(), Acknowledgement::Deferred);

        ctx.reply(Reply::text("done")).await.unwrap();
        ctx.reply(Reply::text("more")).await.unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                ReplyEvent::Deferred { ephemeral: true },
                ReplyEvent::Edited(Reply::text("done")),
                ReplyEvent::Sent(Reply::text("more")),
            ]
        );
    }

    #[tokio::test]
    async fn test_message_defer_keeps_pending() {
        let (mut ctx, recorder) = message_ctx("play", &[], invoker(1, None));
        ctx.defer_reply(false).await.unwrap();
        assert_eq!(ctx.acknowledgement(), Acknowledgement::Pending);
        assert!(ctx.acknowledgement_deadline().is_none());

        ctx.edit_reply(Reply::text("first")).await.unwrap();
        assert_eq!(recorder.sent(), vec![Reply::text("first")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_past_budget_without_defer_fails() {
        let (mut ctx, recorder) = interaction_ctx("ping", vec![], invoker(1, None));
        tokio::time::advance(Duration::from_secs(4)).await;

        let err = ctx.reply(Reply::text("too late")).await.unwrap_err();
        assert!(matches!(err, ContextError::AcknowledgementExpired { .. }));
        assert!(recorder.events().is_empty());
        assert_eq!(ctx.acknowledgement(), Acknowledgement::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_reply_survives_budget() {
        let (mut ctx, recorder) = interaction_ctx("play", vec![], invoker(1, None));
        ctx.defer_if_needed().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        ctx.reply(Reply::text("Now playing")).await.unwrap();
        assert_eq!(recorder.sent(), vec![Reply::text("Now playing")]);
    }

    #[test]
    fn test_member_snapshot_roles() {
        let member = MemberSnapshot::new(UserId(5), [RoleId(1), RoleId(2)])
            .in_voice(Some(ChannelId(9)));
        assert!(member.has_role(RoleId(2)));
        assert!(!member.has_role(RoleId(3)));
        assert_eq!(member.voice_channel, Some(ChannelId(9)));
    }
}
