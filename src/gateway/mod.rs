//! Gateway — event loop connecting the messaging session to the bot core.
//!
//! Pulls inbound events off the session receiver, runs them through the
//! dispatcher, and performs the resulting sends. Auto-replies go out on a
//! deferred task to emulate human response latency; command replies go out
//! immediately.

mod dispatcher;


pub use dispatcher::{dispatch, Outcome};

use crate::context::{now_ms, BotContext};
use awaybot_core::ident::bare_id;
use awaybot_core::message::InboundEvent;
use awaybot_core::traits::ChatSession;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Delay before an auto-reply goes out, emulating a human picking up the
/// phone. The cooldown timestamp is stamped before this delay starts.
const REPLY_DELAY: Duration = Duration::from_secs(2);

/// The bot's main loop: one session, one context, one event at a time.
pub struct Gateway {
    session: Arc<dyn ChatSession>,
    ctx: BotContext,
    /// Cancelled on shutdown; pending deferred replies are dropped.
    shutdown: CancellationToken,
}

impl Gateway {
    pub fn new(session: Arc<dyn ChatSession>, ctx: BotContext) -> Self {
        Self {
            session,
            ctx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Run until Ctrl-C or the session closes its event stream.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self
            .session
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start {} session: {e}", self.session.name()))?;

        self.banner();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
                event = rx.recv() => {
                    let Some(event) = event else {
                        warn!("session event stream closed");
                        break;
                    };
                    self.handle_event(event).await;
                }
            }
        }

        self.shutdown.cancel();
        if let Err(e) = self.session.stop().await {
            warn!("session stop failed: {e}");
        }
        Ok(())
    }

    /// Dispatch one event and act on the outcome. Events are handled
    /// strictly in arrival order; only the deferred sends overlap.
    async fn handle_event(&mut self, event: InboundEvent) {
        match dispatch(&mut self.ctx, &event, now_ms()) {
            Ok(Outcome::Command(reply)) => {
                if let Err(e) = self.session.send_text(&event.chat_id, &reply).await {
                    warn!("command reply failed: {e}");
                }
            }
            Ok(Outcome::AutoReply(text)) => {
                debug!("auto-reply owed to {}", event.chat_id);
                spawn_deferred_send(
                    self.session.clone(),
                    event.chat_id.clone(),
                    text,
                    REPLY_DELAY,
                    self.shutdown.clone(),
                );
            }
            Ok(Outcome::Silent) => {}
            Err(e) => error!("failed to handle message in {}: {e}", event.chat_id),
        }
    }

    /// Startup summary, mirroring what the owner sees in `.status`.
    fn banner(&self) {
        let c = self.ctx.config();
        info!("WhatsApp auto-reply bot connected");
        info!("owner: +{}", c.owner);
        info!(
            "auto-reply: {} | cooldown: {} minutes | ignore groups: {}",
            if c.enabled { "on" } else { "off" },
            c.cooldown_minutes(),
            if c.ignore_groups { "yes" } else { "no" },
        );
        info!(
            "owner commands: .change .status .toggle .cooldown <min> \
             .blacklist <num> .whitelist <num> .stats"
        );
    }
}

/// Send `text` to `chat_id` after `delay`, unless shutdown wins the race.
///
/// Failures are logged and swallowed; the cooldown stamp already happened
/// at decision time and is not rolled back.
fn spawn_deferred_send(
    session: Arc<dyn ChatSession>,
    chat_id: String,
    text: String,
    delay: Duration,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("deferred reply to {chat_id} dropped on shutdown");
            }
            _ = tokio::time::sleep(delay) => {
                match session.send_text(&chat_id, &text).await {
                    Ok(()) => info!("auto-replied to +{}", bare_id(&chat_id)),
                    Err(e) => error!("auto-reply to +{} failed: {e}", bare_id(&chat_id)),
                }
            }
        }
    });
}
