//! Ping command.

use crate::context::InvocationContext;
use crate::error::CommandError;
use crate::registry::{CommandDefinition, CommandHandler};
use crate::reply::Reply;
use async_trait::async_trait;
use megabot_common::RoleId;
use tokio::time::Instant;

/// Replies "Pinging..." and edits in the round-trip time.
pub struct Ping;

impl Ping {
    pub fn definition(role: Option<RoleId>) -> CommandDefinition {
        CommandDefinition::new("ping", "Check latency").required_role(role)
    }
}

#[async_trait]
impl CommandHandler for Ping {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        let start = Instant::now();
        ctx.reply(Reply::text("Pinging...")).await?;
        let elapsed = start.elapsed().as_millis();
        ctx.edit_reply(Reply::text(format!("Pong! {elapsed}ms"))).await?;
        Ok(())
    }
}
