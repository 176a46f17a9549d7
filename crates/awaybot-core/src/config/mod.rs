
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AwayError;

/// Bot settings, stored as a single JSON document.
///
/// Field names follow the deployed config file format: the millisecond
/// interval is called `cooldown` on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account allowed to issue control commands (digits only).
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Away-message template, sent verbatim.
    #[serde(default = "default_autoreply")]
    pub autoreply: String,
    /// Minimum interval between auto-replies to the same chat, in ms.
    #[serde(rename = "cooldown", default = "default_cooldown_ms")]
    pub cooldown_ms: i64,
    /// Global kill switch for auto-replies. Owner commands stay live.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When true, group chats never receive auto-replies.
    #[serde(rename = "ignoreGroups", default = "default_true")]
    pub ignore_groups: bool,
    /// Digits-only identifiers excluded from auto-replies.
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Fields this build does not know about; written back on persist.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_owner() -> String {
    "917983186356".to_string()
}

fn default_autoreply() -> String {
    concat!(
        "Hey there!✌️\n\n",
        "I'm currently away from my phone and might not be able to respond immediately. ",
        "But don't worry - I'll get back to you as soon as I'm available! ⚡\n\n",
        "*Please note:* If it's urgent, feel free to call me directly. ",
        "Otherwise, I'll reply to your message shortly.\n\n",
        "Have a great day! ✨"
    )
    .to_string()
}

/// 1200 minutes.
fn default_cooldown_ms() -> i64 {
    72_000_000
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            autoreply: default_autoreply(),
            cooldown_ms: default_cooldown_ms(),
            enabled: true,
            ignore_groups: true,
            blacklist: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Cooldown in whole minutes, as rendered in owner-facing replies.
    pub fn cooldown_minutes(&self) -> i64 {
        self.cooldown_ms / 60_000
    }

    /// Whether a normalized identifier is excluded from auto-replies.
    pub fn is_blacklisted(&self, id: &str) -> bool {
        self.blacklist.iter().any(|b| b == id)
    }
}

/// Durable store for [`Config`]: load once, write through on every change.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Load the config document, creating it with defaults when absent.
    ///
    /// A file that exists but does not parse is a hard error. Replacing a
    /// corrupt file would silently throw away the user's settings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AwayError> {
        let path = path.into();
        if !path.exists() {
            info!("config not found at {}, writing defaults", path.display());
            let store = Self {
                path,
                config: Config::default(),
            };
            store.persist()?;
            return Ok(store);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| AwayError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| AwayError::Config(format!("failed to parse {}: {e}", path.display())))?;

        Ok(Self { path, config })
    }

    pub fn get(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a change and persist the whole document before returning.
    pub fn mutate(&mut self, f: impl FnOnce(&mut Config)) -> Result<(), AwayError> {
        f(&mut self.config);
        self.persist()
    }

    /// Write the full document as one atomic replacement.
    ///
    /// The document goes to a sibling temp file first and is renamed over
    /// the target, so a crash mid-write leaves the previous valid file.
    fn persist(&self) -> Result<(), AwayError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}
