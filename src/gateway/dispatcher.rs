//! Per-message decision function.

use crate::commands;
use crate::context::BotContext;
use crate::policy::{self, ReplyDecision};
use awaybot_core::error::AwayError;
use awaybot_core::ident::bare_id;
use awaybot_core::message::InboundEvent;
use tracing::debug;

/// What one inbound event amounts to. Exactly one branch acts per message.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Immediate reply to an owner command.
    Command(String),
    /// Away-message for the chat, sent after the human-latency delay.
    AutoReply(String),
    Silent,
}

/// Route one inbound event: owner commands first, then the reply policy.
///
/// Owner messages never fall through to the policy engine, so the owner is
/// never auto-replied even when no command matches. For everyone else a
/// `Send` decision stamps the cooldown timestamp here, at decision time:
/// a second message inside the deferral window is already throttled, at
/// the cost of counting a reply whose send may later fail.
pub fn dispatch(
    ctx: &mut BotContext,
    event: &InboundEvent,
    now_ms: i64,
) -> Result<Outcome, AwayError> {
    if event.from_self {
        debug!("ignoring self-authored message in {}", event.chat_id);
        return Ok(Outcome::Silent);
    }

    let sender = event.sender_id.as_deref().unwrap_or(&event.chat_id);
    let text = event.text_or_empty();

    if bare_id(sender) == ctx.config().owner {
        return Ok(match commands::interpret(ctx, &event.chat_id, text)? {
            Some(reply) => Outcome::Command(reply),
            None => Outcome::Silent,
        });
    }

    let decision = policy::decide(
        ctx.config(),
        &ctx.last_reply,
        &event.chat_id,
        event.is_group,
        false,
        now_ms,
    );
    match decision {
        ReplyDecision::Send => {
            ctx.last_reply.insert(event.chat_id.clone(), now_ms);
            Ok(Outcome::AutoReply(ctx.config().autoreply.clone()))
        }
        ReplyDecision::Ignore => {
            debug!("no auto-reply for {}", event.chat_id);
            Ok(Outcome::Silent)
        }
    }
}
