//! Shared fakes for the dispatcher integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use megabot_commands::{
    CommandError, CommandHandler, InvocationContext, Invoker, MemberSnapshot, OptionValue, Reply,
    ReplyChannel, ReplyError,
};
use megabot_common::test_utils::discord_fixtures::{test_channel_id, test_guild_id};
use megabot_common::{RoleId, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Reply channel that keeps every outgoing reply.
#[derive(Clone, Default)]
pub struct FakeReply {
    pub sent: Arc<Mutex<Vec<Reply>>>,
    pub deferrals: Arc<AtomicUsize>,
}

impl FakeReply {
    pub fn replies(&self) -> Vec<Reply> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ReplyChannel for FakeReply {
    async fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        self.sent.lock().push(reply);
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<(), ReplyError> {
        self.sent.lock().push(reply);
        Ok(())
    }

    async fn defer(&self, _ephemeral: bool) -> Result<(), ReplyError> {
        self.deferrals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handler that counts calls and replies "done".
#[derive(Clone, Default)]
pub struct CountingHandler {
    pub calls: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandHandler for CountingHandler {
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.reply(Reply::text("done")).await?;
        Ok(())
    }
}

pub fn member(user: UserId, roles: &[RoleId]) -> MemberSnapshot {
    MemberSnapshot::new(user, roles.iter().copied())
}

fn invoker(user: UserId, member: Option<MemberSnapshot>) -> Invoker {
    Invoker {
        user_id: user,
        guild: Some(test_guild_id()),
        channel: test_channel_id(),
        member,
    }
}

pub fn message(
    command: &str,
    args: &[&str],
    user: UserId,
    member: Option<MemberSnapshot>,
) -> (InvocationContext, FakeReply) {
    let reply = FakeReply::default();
    let ctx = InvocationContext::from_message(
        command,
        args.iter().map(|arg| (*arg).to_string()).collect(),
        invoker(user, member),
        Box::new(reply.clone()),
    );
    (ctx, reply)
}

pub fn interaction(
    command: &str,
    options: Vec<(&str, OptionValue)>,
    user: UserId,
    member: Option<MemberSnapshot>,
) -> (InvocationContext, FakeReply) {
    let reply = FakeReply::default();
    let options: HashMap<_, _> = options
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    let ctx = InvocationContext::from_interaction(
        command,
        options,
        invoker(user, member),
        Box::new(reply.clone()),
    );
    (ctx, reply)
}
