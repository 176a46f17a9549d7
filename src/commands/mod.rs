//! Owner command interpreter — instant replies, config mutations.

#[cfg(test)]
mod tests;

use crate::context::BotContext;
use awaybot_core::error::AwayError;
use awaybot_core::ident::{bare_id, normalize};
use chrono::TimeZone;
use tracing::info;

/// Arms template capture for the sending chat.
const TEMPLATE_TRIGGER: &str = ".change";

/// Known owner commands. Matching is case-sensitive on the leading token;
/// the no-argument commands require an exact match, the argument-taking
/// ones require their trailing space.
///
/// `.change` is not in this enum: it arms template capture, which
/// [`interpret`] resolves before ordinary command parsing so the trigger
/// itself is never captured.
pub enum OwnerCommand {
    Status,
    Toggle,
    Cooldown(String),
    Blacklist(String),
    Whitelist(String),
    Stats,
}

impl OwnerCommand {
    /// Parse a command from message text. Returns `None` for anything else;
    /// unrecognized owner text is silently ignored upstream.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            ".status" => return Some(Self::Status),
            ".toggle" => return Some(Self::Toggle),
            ".stats" => return Some(Self::Stats),
            _ => {}
        }
        if let Some(arg) = text.strip_prefix(".cooldown ") {
            return Some(Self::Cooldown(arg.to_string()));
        }
        if let Some(arg) = text.strip_prefix(".blacklist ") {
            return Some(Self::Blacklist(arg.to_string()));
        }
        if let Some(arg) = text.strip_prefix(".whitelist ") {
            return Some(Self::Whitelist(arg.to_string()));
        }
        None
    }
}

/// Interpret one owner message. Returns the chat reply, or `None` when the
/// text matches no command.
///
/// Priority is two-level: the literal `.change` trigger first (so it
/// re-arms capture instead of being captured), then an armed capture flag
/// consumes the message whatever it says, then the remaining commands.
pub fn interpret(
    ctx: &mut BotContext,
    chat_id: &str,
    text: &str,
) -> Result<Option<String>, AwayError> {
    if text == TEMPLATE_TRIGGER {
        ctx.pending_template.insert(chat_id.to_string());
        info!("owner requested to change the auto-reply template");
        return Ok(Some("✏️ Send the new auto-reply message now:".to_string()));
    }

    if ctx.pending_template.remove(chat_id) {
        ctx.store.mutate(|c| c.autoreply = text.to_string())?;
        info!("auto-reply template updated by owner");
        return Ok(Some(format!(
            "✅ *Auto-reply updated!*\n\n📝 New message:\n{text}"
        )));
    }

    let Some(cmd) = OwnerCommand::parse(text) else {
        return Ok(None);
    };

    let reply = match cmd {
        OwnerCommand::Status => handle_status(ctx),
        OwnerCommand::Toggle => handle_toggle(ctx)?,
        OwnerCommand::Cooldown(arg) => handle_cooldown(ctx, &arg)?,
        OwnerCommand::Blacklist(arg) => handle_blacklist(ctx, &arg)?,
        OwnerCommand::Whitelist(arg) => handle_whitelist(ctx, &arg)?,
        OwnerCommand::Stats => handle_stats(ctx),
    };
    Ok(Some(reply))
}

fn handle_status(ctx: &BotContext) -> String {
    let c = ctx.config();
    info!("status requested by owner");
    format!(
        "📊 *Bot Status*\n\n\
         🤖 Auto-reply: {}\n\
         ⏱️ Cooldown: {} min\n\
         🚫 Blacklist: {} numbers\n\
         👥 Ignore groups: {}\n\
         💬 Replied to: {} chats",
        if c.enabled { "✅ ON" } else { "❌ OFF" },
        c.cooldown_minutes(),
        c.blacklist.len(),
        if c.ignore_groups { "Yes" } else { "No" },
        ctx.last_reply.len(),
    )
}

fn handle_toggle(ctx: &mut BotContext) -> Result<String, AwayError> {
    ctx.store.mutate(|c| c.enabled = !c.enabled)?;
    let enabled = ctx.config().enabled;
    info!(
        "auto-reply {} by owner",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(format!(
        "🔄 Auto-reply is now {}",
        if enabled {
            "✅ *ENABLED*"
        } else {
            "❌ *DISABLED*"
        }
    ))
}

fn handle_cooldown(ctx: &mut BotContext, arg: &str) -> Result<String, AwayError> {
    let minutes = arg.split_whitespace().next().unwrap_or("");
    let Ok(minutes) = minutes.parse::<i64>() else {
        return Ok(invalid_cooldown());
    };
    if minutes < 1 {
        return Ok(invalid_cooldown());
    }
    // Absurdly large values would overflow the millisecond conversion;
    // treat them like any other invalid argument.
    let Some(cooldown_ms) = minutes.checked_mul(60_000) else {
        return Ok(invalid_cooldown());
    };
    ctx.store.mutate(|c| c.cooldown_ms = cooldown_ms)?;
    info!("cooldown set to {minutes} minutes by owner");
    Ok(format!("⏱️ Cooldown set to *{minutes} minutes*"))
}

fn invalid_cooldown() -> String {
    "❌ Invalid usage!\n\n✅ Correct: .cooldown 5\n(Sets 5 minute cooldown)".to_string()
}

fn handle_blacklist(ctx: &mut BotContext, arg: &str) -> Result<String, AwayError> {
    let number = normalize(arg);
    if number.is_empty() {
        return Ok("❌ Usage: .blacklist 919876543210".to_string());
    }
    if ctx.config().is_blacklisted(&number) {
        return Ok("⚠️ Already in blacklist".to_string());
    }
    ctx.store.mutate(|c| c.blacklist.push(number.clone()))?;
    info!("blacklisted +{number}");
    Ok(format!("🚫 Blacklisted: +{number}"))
}

fn handle_whitelist(ctx: &mut BotContext, arg: &str) -> Result<String, AwayError> {
    let number = normalize(arg);
    if number.is_empty() {
        return Ok("❌ Usage: .whitelist 919876543210".to_string());
    }
    if !ctx.config().is_blacklisted(&number) {
        return Ok("⚠️ Not in blacklist".to_string());
    }
    ctx.store.mutate(|c| c.blacklist.retain(|b| b != &number))?;
    info!("whitelisted +{number}");
    Ok(format!("✅ Removed: +{number}"))
}

fn handle_stats(ctx: &BotContext) -> String {
    info!("stats requested by owner");
    let mut sorted: Vec<(&String, &i64)> = ctx.last_reply.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));
    sorted.truncate(10);

    let mut out = "📈 *Reply Statistics*\n\n".to_string();
    if sorted.is_empty() {
        out.push_str("No replies sent yet.");
        return out;
    }
    out.push_str(&format!("Total chats: {}\n\n", sorted.len()));
    for (i, (chat, &ts)) in sorted.iter().enumerate() {
        let when = chrono::Local
            .timestamp_millis_opt(ts)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        out.push_str(&format!("{}. +{}\n   {when}\n\n", i + 1, bare_id(chat)));
    }
    out
}
