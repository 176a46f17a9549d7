//! WhatsApp session, pure Rust via `whatsapp-rust`.
//!
//! Speaks the WhatsApp Web protocol (Noise handshake + Signal encryption).
//! Pairing works like WhatsApp Web: scan a QR code from the phone. Session
//! state is persisted to `{data_dir}/session/whatsapp.db`; when WhatsApp
//! invalidates it (unlink from the phone), the session wipes itself and
//! pairs again with a fresh QR code.

mod bot;
mod events;
mod qr;
mod send;
mod session;

#[cfg(test)]
mod tests;

pub use qr::generate_qr_terminal;

use awaybot_core::config::shellexpand;
use awaybot_core::message::InboundEvent;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

/// WhatsApp session using the WhatsApp Web protocol.
///
/// All shared state is `Arc`-wrapped so the event handler of whichever bot
/// instance is currently running (the initial one or a re-paired one) feeds
/// the same fields.
#[derive(Clone)]
pub struct WhatsAppSession {
    data_dir: String,
    /// Client handle for sending, set once connected.
    client: Arc<Mutex<Option<Arc<whatsapp_rust::client::Client>>>>,
    /// IDs of messages this process sent, to drop their echoes on receive.
    sent_ids: Arc<Mutex<HashSet<String>>>,
    /// Event sender, stored so a relink reuses the same pipeline.
    msg_tx: Arc<Mutex<Option<mpsc::Sender<InboundEvent>>>>,
    /// Signalled on logout; the relink watcher wipes the session and rebuilds.
    relink: Arc<Notify>,
}

impl WhatsAppSession {
    /// Create a new session rooted at `data_dir`.
    pub fn new(data_dir: &str) -> Self {
        Self {
            data_dir: data_dir.to_string(),
            client: Arc::new(Mutex::new(None)),
            sent_ids: Arc::new(Mutex::new(HashSet::new())),
            msg_tx: Arc::new(Mutex::new(None)),
            relink: Arc::new(Notify::new()),
        }
    }
}

/// Directory holding session state, wiped on relink.
pub(super) fn session_dir(data_dir: &str) -> String {
    format!("{}/session", shellexpand(data_dir))
}

/// Path of the session database, creating its directory if needed.
pub(super) fn session_db_path(data_dir: &str) -> String {
    let dir = session_dir(data_dir);
    let _ = std::fs::create_dir_all(&dir);
    format!("{dir}/whatsapp.db")
}
