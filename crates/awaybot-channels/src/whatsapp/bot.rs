//! Bot lifecycle — building, running, and re-pairing the WhatsApp bot.

use super::events::handle_message_event;
use super::{qr, session_db_path, session_dir, WhatsAppSession};
use crate::store::SqlxSessionStore;
use awaybot_core::{error::AwayError, message::InboundEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wacore::types::events::Event;
use whatsapp_rust::bot::Bot;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

impl WhatsAppSession {
    /// Delete the stale session, build a fresh bot, and run it.
    ///
    /// Used when WhatsApp was unlinked from the phone and the session is
    /// invalidated — the library won't generate new QR codes with stale
    /// keys. New events keep flowing through the same stored sender.
    pub(super) async fn restart_for_pairing(&self) -> Result<(), AwayError> {
        let dir = session_dir(&self.data_dir);
        if std::path::Path::new(&dir).exists() {
            info!("deleting stale WhatsApp session at {dir}");
            let _ = std::fs::remove_dir_all(&dir);
        }

        // Old bot is now orphaned.
        *self.client.lock().await = None;

        let tx = self
            .msg_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| AwayError::Channel("WhatsApp not started yet".into()))?;

        self.build_and_run_bot(tx).await
    }

    /// Watch for logout notifications and re-pair when one arrives.
    ///
    /// Spawned once by `start()`; the handles it holds are the same
    /// `Arc`-wrapped fields every bot instance shares.
    pub(super) fn spawn_relink_watcher(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            loop {
                session.relink.notified().await;
                warn!("WhatsApp session invalidated, re-pairing with a fresh QR code");
                if let Err(e) = session.restart_for_pairing().await {
                    warn!("re-pairing failed: {e}");
                }
            }
        });
    }

    /// Build a WhatsApp bot with the event handler and run it in the
    /// background. Shared by `start()` and `restart_for_pairing()`.
    pub(super) async fn build_and_run_bot(
        &self,
        tx: mpsc::Sender<InboundEvent>,
    ) -> Result<(), AwayError> {
        let db_path = session_db_path(&self.data_dir);
        let client_handle = self.client.clone();

        info!("WhatsApp bot building (session: {db_path})...");

        let backend = Arc::new(
            SqlxSessionStore::new(&db_path)
                .await
                .map_err(|e| AwayError::Channel(format!("whatsapp store init failed: {e}")))?,
        );

        let tx_events = tx;
        let client_for_event = client_handle.clone();
        let sent_ids_for_event = self.sent_ids.clone();
        let relink_for_event = self.relink.clone();

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .with_device_props(
                Some("Auto Reply Bot".to_string()),
                None,
                Some(waproto::whatsapp::device_props::PlatformType::Desktop),
            )
            .on_event(move |event, client| {
                let tx = tx_events.clone();
                let client_store = client_for_event.clone();
                let sent_ids = sent_ids_for_event.clone();
                let relink = relink_for_event.clone();
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            info!("WhatsApp QR code generated (scan to pair)");
                            qr::print_pairing_qr(&code);
                        }
                        Event::PairSuccess(_) => {
                            info!("WhatsApp pairing successful");
                        }
                        Event::Connected(_) => {
                            info!("WhatsApp connected");
                            *client_store.lock().await = Some(client);
                        }
                        Event::Disconnected(_) => {
                            warn!("WhatsApp disconnected");
                            *client_store.lock().await = None;
                        }
                        Event::LoggedOut(_) => {
                            warn!("WhatsApp logged out — session invalidated");
                            *client_store.lock().await = None;
                            relink.notify_one();
                        }
                        Event::Message(msg, info) => {
                            handle_message_event(*msg, info, &tx, &sent_ids).await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| AwayError::Channel(format!("whatsapp bot build failed: {e}")))?;

        // Store client reference immediately if already connected.
        *client_handle.lock().await = Some(bot.client());

        // Run bot in background; the library owns reconnect/backoff.
        let _handle = bot
            .run()
            .await
            .map_err(|e| AwayError::Channel(format!("whatsapp bot run failed: {e}")))?;

        info!("WhatsApp bot started");
        Ok(())
    }
}
