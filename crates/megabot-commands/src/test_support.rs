//! Reply recorder and context builders shared by unit tests.

use crate::context::{InvocationContext, Invoker, MemberSnapshot, OptionValue};
use crate::error::ReplyError;
use crate::reply::{Reply, ReplyChannel};
use async_trait::async_trait;
use megabot_common::{ChannelId, GuildId, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    Sent(Reply),
    Edited(Reply),
    Deferred { ephemeral: bool },
}

/// Records every call; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingReply {
    events: Arc<Mutex<Vec<ReplyEvent>>>,
}

impl RecordingReply {
    pub fn events(&self) -> Vec<ReplyEvent> {
        self.events.lock().clone()
    }

    pub fn sent(&self) -> Vec<Reply> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReplyEvent::Sent(reply) | ReplyEvent::Edited(reply) => Some(reply),
                ReplyEvent::Deferred { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReplyChannel for RecordingReply {
    async fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        self.events.lock().push(ReplyEvent::Sent(reply));
        Ok(())
    }

    async fn edit(&self, reply: Reply) -> Result<(), ReplyError> {
        self.events.lock().push(ReplyEvent::Edited(reply));
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), ReplyError> {
        self.events.lock().push(ReplyEvent::Deferred { ephemeral });
        Ok(())
    }
}

pub fn invoker(user: u64, member: Option<MemberSnapshot>) -> Invoker {
    Invoker {
        user_id: UserId(user),
        guild: Some(GuildId(100)),
        channel: ChannelId(200),
        member,
    }
}

pub fn message_ctx(
    command: &str,
    args: &[&str],
    invoker: Invoker,
) -> (InvocationContext, RecordingReply) {
    let recorder = RecordingReply::default();
    let arguments = args.iter().map(|arg| (*arg).to_string()).collect();
    let ctx =
        InvocationContext::from_message(command, arguments, invoker, Box::new(recorder.clone()));
    (ctx, recorder)
}

pub fn interaction_ctx(
    command: &str,
    options: Vec<(&str, OptionValue)>,
    invoker: Invoker,
) -> (InvocationContext, RecordingReply) {
    let recorder = RecordingReply::default();
    let options: HashMap<String, OptionValue> = options
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    let ctx =
        InvocationContext::from_interaction(command, options, invoker, Box::new(recorder.clone()));
    (ctx, recorder)
}
