use serde::{Deserialize, Serialize};

/// An inbound chat event delivered by a messaging session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Conversation identifier (full JID on WhatsApp).
    pub chat_id: String,
    /// Account that authored the message. In direct chats this is the
    /// chat itself; in groups it is the participant. `None` when the
    /// platform does not attribute a sender.
    pub sender_id: Option<String>,
    /// Whether this event echoes a message sent from this account.
    #[serde(default)]
    pub from_self: bool,
    /// Whether the conversation is a multi-party chat.
    #[serde(default)]
    pub is_group: bool,
    /// Plain text content. `None` for media-only messages.
    pub text: Option<String>,
}

impl InboundEvent {
    /// Text content, with media-only messages reading as empty.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
