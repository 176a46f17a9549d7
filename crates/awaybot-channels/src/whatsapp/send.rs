//! Outbound sending with transport-level retry.

use std::time::Duration;

use awaybot_core::error::AwayError;
use tracing::{error, warn};
use wacore_binary::jid::Jid;
use whatsapp_rust::client::Client;

pub(super) const SEND_ATTEMPTS: u32 = 3;

/// Delay before re-attempting a failed send. Doubles from 500ms, so the
/// three attempts span about 1.5s of waiting in total.
pub(super) fn backoff(failed_attempts: u32) -> Duration {
    Duration::from_millis(500 << (failed_attempts - 1))
}

/// Send a message, retrying transient transport failures. Returns the
/// message ID on success so the caller can suppress the echo.
pub(super) async fn retry_send(
    client: &Client,
    jid: &Jid,
    msg: waproto::whatsapp::Message,
) -> Result<String, AwayError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match client.send_message(jid.clone(), msg.clone()).await {
            Ok(msg_id) => return Ok(msg_id),
            Err(e) => e,
        };
        if attempt >= SEND_ATTEMPTS {
            error!("send to {jid} failed on final attempt {attempt}: {err}");
            return Err(AwayError::Channel(format!(
                "send to {jid} failed after {SEND_ATTEMPTS} attempts: {err}"
            )));
        }
        let wait = backoff(attempt);
        warn!(
            "send to {jid} failed ({err}), attempt {attempt}/{SEND_ATTEMPTS}, backing off {}ms",
            wait.as_millis()
        );
        tokio::time::sleep(wait).await;
    }
}
