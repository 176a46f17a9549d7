//! Inbound WhatsApp event translation — filtering, unwrapping, forwarding.

use awaybot_core::message::InboundEvent;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Pull the plain text out of a wire message, if it carries any.
///
/// The protocol wraps the payload in optional layers (`device_sent`,
/// `ephemeral`, `view_once`) and the text itself lives in one of two fields:
/// `conversation` for simple messages, `extendedTextMessage.text` for
/// replies, links, and formatted text. Media-only messages yield `None`.
pub(super) fn extract_text(msg: &waproto::whatsapp::Message) -> Option<String> {
    let inner = msg
        .device_sent_message
        .as_ref()
        .and_then(|d| d.message.as_deref())
        .or_else(|| {
            msg.ephemeral_message
                .as_ref()
                .and_then(|e| e.message.as_deref())
        })
        .or_else(|| {
            msg.view_once_message
                .as_ref()
                .and_then(|v| v.message.as_deref())
        })
        .unwrap_or(msg);

    inner
        .conversation
        .as_deref()
        .or_else(|| {
            inner
                .extended_text_message
                .as_ref()
                .and_then(|e| e.text.as_deref())
        })
        .map(str::to_string)
}

/// Translate a message event into the gateway's inbound envelope.
///
/// Echoes of messages this process sent are dropped here; self-authored
/// messages from other linked devices are forwarded with `from_self` set so
/// the dispatcher can ignore them. Media-only messages are forwarded with
/// empty text — they still count as inbound activity for the reply policy.
pub(super) async fn handle_message_event(
    msg: waproto::whatsapp::Message,
    info: wacore::types::message::MessageInfo,
    tx: &mpsc::Sender<InboundEvent>,
    sent_ids: &Arc<Mutex<HashSet<String>>>,
) {
    debug!(
        "wa msg: is_group={}, is_from_me={}, sender={}, chat={}",
        info.source.is_group, info.source.is_from_me, info.source.sender.user, info.source.chat.user,
    );

    if sent_ids.lock().await.remove(&info.id) {
        debug!("skipping own echo: {}", info.id);
        return;
    }

    let event = InboundEvent {
        chat_id: info.source.chat.to_string(),
        sender_id: if info.source.sender.user.is_empty() {
            None
        } else {
            Some(info.source.sender.user.clone())
        },
        from_self: info.source.is_from_me,
        is_group: info.source.is_group,
        text: extract_text(&msg),
    };

    if tx.send(event).await.is_err() {
        info!("whatsapp event receiver dropped");
    }
}
