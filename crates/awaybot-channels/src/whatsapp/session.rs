//! `ChatSession` trait implementation for WhatsApp.

use super::send::retry_send;
use super::WhatsAppSession;
use async_trait::async_trait;
use awaybot_core::{error::AwayError, message::InboundEvent, traits::ChatSession};
use tokio::sync::mpsc;
use tracing::info;
use wacore_binary::jid::Jid;

#[async_trait]
impl ChatSession for WhatsAppSession {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, AwayError> {
        let (tx, rx) = mpsc::channel(64);
        *self.msg_tx.lock().await = Some(tx.clone());
        self.build_and_run_bot(tx).await?;
        self.spawn_relink_watcher();
        info!("WhatsApp session started");
        Ok(rx)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), AwayError> {
        let client_guard = self.client.lock().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| AwayError::Channel("whatsapp client not connected".into()))?;

        let jid: Jid = chat_id
            .parse()
            .map_err(|e| AwayError::Channel(format!("invalid whatsapp JID '{chat_id}': {e}")))?;

        let msg = waproto::whatsapp::Message {
            conversation: Some(text.to_string()),
            ..Default::default()
        };
        let msg_id = retry_send(client, &jid, msg).await?;
        // Track sent message ID to ignore our own echo.
        self.sent_ids.lock().await.insert(msg_id);

        Ok(())
    }

    async fn stop(&self) -> Result<(), AwayError> {
        info!("WhatsApp session stopped");
        *self.client.lock().await = None;
        Ok(())
    }
}
