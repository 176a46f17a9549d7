use super::*;
use awaybot_core::config::ConfigStore;
use tempfile::TempDir;

/// Context backed by a throwaway config file. The TempDir must outlive the
/// context or the persist path disappears.
fn test_ctx() -> (TempDir, BotContext) {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::load(dir.path().join("config.json")).unwrap();
    (dir, BotContext::new(store))
}

const CHAT: &str = "917983186356@s.whatsapp.net";

#[test]
fn test_parse_all_commands() {
    assert!(matches!(
        OwnerCommand::parse(".status"),
        Some(OwnerCommand::Status)
    ));
    assert!(matches!(
        OwnerCommand::parse(".toggle"),
        Some(OwnerCommand::Toggle)
    ));
    assert!(matches!(
        OwnerCommand::parse(".stats"),
        Some(OwnerCommand::Stats)
    ));
    assert!(matches!(
        OwnerCommand::parse(".cooldown 5"),
        Some(OwnerCommand::Cooldown(arg)) if arg == "5"
    ));
    assert!(matches!(
        OwnerCommand::parse(".blacklist 919876543210"),
        Some(OwnerCommand::Blacklist(_))
    ));
    assert!(matches!(
        OwnerCommand::parse(".whitelist 919876543210"),
        Some(OwnerCommand::Whitelist(_))
    ));
}

#[test]
fn test_parse_is_strict() {
    // Case-sensitive, exact tokens, trailing space required for arguments.
    assert!(OwnerCommand::parse(".Status").is_none());
    assert!(OwnerCommand::parse(".cooldown").is_none());
    assert!(OwnerCommand::parse(".blacklist").is_none());
    assert!(OwnerCommand::parse("status").is_none());
    assert!(OwnerCommand::parse("hello").is_none());
    // The capture trigger is interpret()'s job, not a parsed command.
    assert!(OwnerCommand::parse(".change").is_none());
}

#[test]
fn test_unknown_owner_text_is_silently_ignored() {
    let (_dir, mut ctx) = test_ctx();
    let reply = interpret(&mut ctx, CHAT, "see you tonight").unwrap();
    assert!(reply.is_none());
}

#[test]
fn test_template_capture_flow() {
    let (_dir, mut ctx) = test_ctx();

    let prompt = interpret(&mut ctx, CHAT, ".change").unwrap().unwrap();
    assert!(prompt.contains("Send the new auto-reply message"));
    assert!(ctx.pending_template.contains(CHAT));

    // The next message is the template, even when it looks like a command.
    let ack = interpret(&mut ctx, CHAT, ".status").unwrap().unwrap();
    assert!(ack.contains("Auto-reply updated"));
    assert_eq!(ctx.config().autoreply, ".status");
    assert!(!ctx.pending_template.contains(CHAT));

    // After capture the same text is a command again.
    let status = interpret(&mut ctx, CHAT, ".status").unwrap().unwrap();
    assert!(status.contains("Bot Status"));
}

#[test]
fn test_change_trigger_rearms_instead_of_being_captured() {
    let (_dir, mut ctx) = test_ctx();
    interpret(&mut ctx, CHAT, ".change").unwrap();
    let prompt = interpret(&mut ctx, CHAT, ".change").unwrap().unwrap();
    assert!(prompt.contains("Send the new auto-reply message"));
    assert_ne!(ctx.config().autoreply, ".change");
    assert!(ctx.pending_template.contains(CHAT));
}

#[test]
fn test_capture_flags_are_per_chat() {
    let (_dir, mut ctx) = test_ctx();
    let other = "4917612345678@s.whatsapp.net";
    interpret(&mut ctx, CHAT, ".change").unwrap();

    // A message in another chat is not captured.
    let status = interpret(&mut ctx, other, ".status").unwrap().unwrap();
    assert!(status.contains("Bot Status"));
    assert!(ctx.pending_template.contains(CHAT));
}

#[test]
fn test_toggle_flips_and_persists() {
    let (dir, mut ctx) = test_ctx();
    assert!(ctx.config().enabled);

    let reply = interpret(&mut ctx, CHAT, ".toggle").unwrap().unwrap();
    assert!(reply.contains("DISABLED"));
    assert!(!ctx.config().enabled);

    let reloaded = ConfigStore::load(dir.path().join("config.json")).unwrap();
    assert!(!reloaded.get().enabled, "toggle must be written through");
}

#[test]
fn test_cooldown_rejects_bad_input_without_mutation() {
    let (_dir, mut ctx) = test_ctx();
    let before = ctx.config().cooldown_ms;

    for bad in [".cooldown abc", ".cooldown 0", ".cooldown -5"] {
        let reply = interpret(&mut ctx, CHAT, bad).unwrap().unwrap();
        assert!(reply.contains("Invalid usage"), "{bad} should be rejected");
        assert_eq!(ctx.config().cooldown_ms, before, "{bad} must not mutate");
    }
}

#[test]
fn test_cooldown_rejects_minutes_that_overflow_ms() {
    let (_dir, mut ctx) = test_ctx();
    let before = ctx.config().cooldown_ms;

    // i64::MAX / 60_000 is about 1.5e14; anything past it cannot be
    // represented in milliseconds.
    let reply = interpret(&mut ctx, CHAT, ".cooldown 200000000000000")
        .unwrap()
        .unwrap();
    assert!(reply.contains("Invalid usage"));
    assert_eq!(ctx.config().cooldown_ms, before);
}

#[test]
fn test_cooldown_sets_minutes_as_ms() {
    let (_dir, mut ctx) = test_ctx();
    let reply = interpret(&mut ctx, CHAT, ".cooldown 5").unwrap().unwrap();
    assert!(reply.contains("5 minutes"));
    assert_eq!(ctx.config().cooldown_ms, 300_000);
}

#[test]
fn test_blacklist_normalizes_the_argument() {
    let (_dir, mut ctx) = test_ctx();
    let reply = interpret(&mut ctx, CHAT, ".blacklist +91 98765-43210")
        .unwrap()
        .unwrap();
    assert_eq!(reply, "🚫 Blacklisted: +919876543210");
    assert!(ctx.config().is_blacklisted("919876543210"));
}

#[test]
fn test_blacklist_spaced_number_collapses() {
    let (_dir, mut ctx) = test_ctx();
    interpret(&mut ctx, CHAT, ".blacklist 91 234").unwrap();
    assert!(ctx.config().is_blacklisted("91234"));
}

#[test]
fn test_blacklist_duplicate_is_a_noop_warning() {
    let (_dir, mut ctx) = test_ctx();
    interpret(&mut ctx, CHAT, ".blacklist 919876543210").unwrap();
    let reply = interpret(&mut ctx, CHAT, ".blacklist 919876543210")
        .unwrap()
        .unwrap();
    assert_eq!(reply, "⚠️ Already in blacklist");
    assert_eq!(ctx.config().blacklist.len(), 1);
}

#[test]
fn test_blacklist_without_digits_is_a_usage_error() {
    let (_dir, mut ctx) = test_ctx();
    let reply = interpret(&mut ctx, CHAT, ".blacklist abc").unwrap().unwrap();
    assert!(reply.starts_with("❌ Usage"));
    assert!(ctx.config().blacklist.is_empty());
}

#[test]
fn test_whitelist_removes_then_warns() {
    let (_dir, mut ctx) = test_ctx();
    interpret(&mut ctx, CHAT, ".blacklist 919876543210").unwrap();

    let reply = interpret(&mut ctx, CHAT, ".whitelist 919876543210")
        .unwrap()
        .unwrap();
    assert_eq!(reply, "✅ Removed: +919876543210");
    assert!(ctx.config().blacklist.is_empty());

    // Second removal is a no-op with an unchanged blacklist.
    let reply = interpret(&mut ctx, CHAT, ".whitelist 919876543210")
        .unwrap()
        .unwrap();
    assert_eq!(reply, "⚠️ Not in blacklist");
    assert!(ctx.config().blacklist.is_empty());
}

#[test]
fn test_blacklist_survives_a_restart() {
    let (dir, mut ctx) = test_ctx();
    interpret(&mut ctx, CHAT, ".blacklist 91 234").unwrap();
    drop(ctx);

    let reloaded = ConfigStore::load(dir.path().join("config.json")).unwrap();
    assert!(reloaded.get().is_blacklisted("91234"));
}

#[test]
fn test_status_reports_current_settings() {
    let (_dir, mut ctx) = test_ctx();
    ctx.last_reply.insert("111@s.whatsapp.net".to_string(), 1);
    interpret(&mut ctx, CHAT, ".blacklist 919876543210").unwrap();

    let status = interpret(&mut ctx, CHAT, ".status").unwrap().unwrap();
    assert!(status.contains("✅ ON"));
    assert!(status.contains("1200 min"));
    assert!(status.contains("1 numbers"));
    assert!(status.contains("Ignore groups: Yes"));
    assert!(status.contains("Replied to: 1 chats"));
}

#[test]
fn test_stats_lists_most_recent_first() {
    let (_dir, mut ctx) = test_ctx();
    ctx.last_reply.insert("111@s.whatsapp.net".to_string(), 1_000);
    ctx.last_reply.insert("222@s.whatsapp.net".to_string(), 3_000);
    ctx.last_reply.insert("333@s.whatsapp.net".to_string(), 2_000);

    let stats = interpret(&mut ctx, CHAT, ".stats").unwrap().unwrap();
    let p1 = stats.find("+222").expect("most recent chat listed");
    let p2 = stats.find("+333").expect("middle chat listed");
    let p3 = stats.find("+111").expect("oldest chat listed");
    assert!(p1 < p2 && p2 < p3, "stats must be most-recent-first:\n{stats}");
}

#[test]
fn test_stats_with_no_replies() {
    let (_dir, mut ctx) = test_ctx();
    let stats = interpret(&mut ctx, CHAT, ".stats").unwrap().unwrap();
    assert!(stats.contains("No replies sent yet."));
}
