use crate::{error::AwayError, message::InboundEvent};
use async_trait::async_trait;

/// Messaging session trait, the transport seam.
///
/// A session owns the connection to one messaging platform: it delivers
/// inbound events and accepts outbound sends. The bot core only ever sees
/// this trait, never platform types.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Human-readable session name.
    fn name(&self) -> &str;

    /// Connect and start listening for messages.
    /// Returns a receiver that yields inbound events in delivery order.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundEvent>, AwayError>;

    /// Send plain text to a chat.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), AwayError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), AwayError>;
}
