//! Session-scoped bot state.

use awaybot_core::config::{Config, ConfigStore};
use std::collections::{HashMap, HashSet};

/// Everything the dispatcher reads and mutates for one bot instance.
///
/// Holding the state here instead of globals keeps the core testable and
/// lets several independent bots run in one process.
pub struct BotContext {
    pub store: ConfigStore,
    /// Chat ID → epoch-ms of the last auto-reply sent there. Grows for the
    /// process lifetime; also feeds `.status` and `.stats`.
    pub last_reply: HashMap<String, i64>,
    /// Chats whose next owner message becomes the new away-template.
    pub pending_template: HashSet<String>,
}

impl BotContext {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            last_reply: HashMap::new(),
            pending_template: HashSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.store.get()
    }
}

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
