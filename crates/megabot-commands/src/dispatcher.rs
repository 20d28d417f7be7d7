//! Command dispatcher: lookup, gates, validation and handler invocation.

use crate::context::{Acknowledgement, InvocationContext};
use crate::cooldown::CooldownGate;
use crate::permissions::PermissionGate;
use crate::registry::CommandRegistry;
use crate::reply::Reply;
use megabot_common::UserId;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Reply sent when a handler fails. Details only go to the log.
pub const HANDLER_FAILURE_MESSAGE: &str = "Something went wrong while running this command.";

/// Reply sent when the invoker lacks the required role.
pub const MISSING_ROLE_MESSAGE: &str = "Missing role";

/// Outcome of one dispatch. Exactly one is produced per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// No command with that name; nothing was sent or recorded.
    UnknownCommand,
    Handled,
    /// Still cooling down; nothing was sent.
    RejectedCooldown,
    RejectedPermission,
    RejectedValidation(String),
    HandlerFailed(String),
}

/// Stages an invocation passes through, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Received,
    CooldownChecked,
    PermissionChecked,
    HandlerInvoked,
    Replied,
    Failed,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Routes invocations through the gates to their handlers.
///
/// Cheap to share: every field is either `Copy` or behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownGate>,
    owner: Option<UserId>,
    window: Duration,
}

impl CommandDispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        cooldowns: Arc<CooldownGate>,
        owner: Option<UserId>,
        window: Duration,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            owner,
            window,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn cooldowns(&self) -> &Arc<CooldownGate> {
        &self.cooldowns
    }

    /// Run one invocation to completion.
    ///
    /// Unknown commands and cooldown rejections are silent. Permission and
    /// validation rejections get one visible reply. Handler errors are
    /// logged and answered with [`HANDLER_FAILURE_MESSAGE`].
    #[instrument(skip(self, ctx), fields(command = %ctx.command(), invoker = %ctx.invoker()))]
    pub async fn dispatch(&self, mut ctx: InvocationContext) -> DispatchResult {
        stage(DispatchStage::Received);

        let Ok(command) = self.registry.lookup(ctx.command()) else {
            debug!("Ignoring unknown command");
            return DispatchResult::UnknownCommand;
        };

        let bypass = self.owner == Some(ctx.invoker());
        // No await between lookup and acquisition: the entry is recorded
        // before anything else can observe this invocation.
        if !self.cooldowns.try_acquire(
            ctx.invoker(),
            &command.definition.name,
            Instant::now(),
            self.window,
            bypass,
        ) {
            debug!("Rejected by cooldown");
            return DispatchResult::RejectedCooldown;
        }
        stage(DispatchStage::CooldownChecked);

        if !PermissionGate::check(ctx.member(), command.definition.required_role) {
            debug!("Rejected by permission gate");
            send_rejection(&mut ctx, Reply::error(MISSING_ROLE_MESSAGE)).await;
            return DispatchResult::RejectedPermission;
        }
        stage(DispatchStage::PermissionChecked);

        ctx.bind_parameters(&command.definition.parameters);
        if let Err(reason) = ctx.validate_arguments() {
            debug!("Rejected by argument validation: {}", reason);
            send_rejection(&mut ctx, Reply::error(&reason)).await;
            return DispatchResult::RejectedValidation(reason);
        }

        stage(DispatchStage::HandlerInvoked);
        match command.handler.execute(&mut ctx).await {
            Ok(()) => {
                stage(DispatchStage::Replied);
                DispatchResult::Handled
            }
            Err(e) => {
                stage(DispatchStage::Failed);
                error!("Command handler failed: {:?}", e);
                send_failure(&mut ctx).await;
                DispatchResult::HandlerFailed(e.to_string())
            }
        }
    }
}

fn stage(stage: DispatchStage) {
    debug!(%stage, "Dispatch stage");
}

async fn send_rejection(ctx: &mut InvocationContext, reply: Reply) {
    if let Err(e) = ctx.reply(reply).await {
        warn!("Failed to send reply for '{}': {}", ctx.command(), e);
    }
}

/// Reports a handler failure, replacing the handler's own reply when it
/// already sent one.
async fn send_failure(ctx: &mut InvocationContext) {
    let reply = Reply::error(HANDLER_FAILURE_MESSAGE);
    let sent = if ctx.acknowledgement() == Acknowledgement::Replied {
        ctx.edit_reply(reply).await
    } else {
        ctx.reply(reply).await
    };
    if let Err(e) = sent {
        warn!("Failed to send failure reply for '{}': {}", ctx.command(), e);
    }
}
