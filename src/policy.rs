//! Reply policy — whether an inbound message earns the away-message.

use awaybot_core::config::Config;
use awaybot_core::ident::bare_id;
use std::collections::HashMap;

/// Outcome of the reply policy for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDecision {
    Send,
    Ignore,
}

/// Decide whether a chat gets the auto-reply. First matching rule wins:
/// owner, kill switch, group filter, blacklist, then the cooldown gate.
///
/// The cooldown is strict: a message arriving exactly `cooldown_ms` after
/// the last reply is still ignored. The caller stamps the new timestamp.
pub fn decide(
    config: &Config,
    last_reply: &HashMap<String, i64>,
    chat_id: &str,
    is_group: bool,
    sender_is_owner: bool,
    now_ms: i64,
) -> ReplyDecision {
    if sender_is_owner {
        return ReplyDecision::Ignore;
    }
    if !config.enabled {
        return ReplyDecision::Ignore;
    }
    if is_group && config.ignore_groups {
        return ReplyDecision::Ignore;
    }
    if config.is_blacklisted(bare_id(chat_id)) {
        return ReplyDecision::Ignore;
    }
    if let Some(&last) = last_reply.get(chat_id) {
        if now_ms - last <= config.cooldown_ms {
            return ReplyDecision::Ignore;
        }
    }
    ReplyDecision::Send
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            cooldown_ms: 60_000,
            ..Config::default()
        }
    }

    const CHAT: &str = "4917612345678@s.whatsapp.net";

    #[test]
    fn test_disabled_ignores_everything() {
        let mut c = config();
        c.enabled = false;
        let d = decide(&c, &HashMap::new(), CHAT, false, false, 1_000);
        assert_eq!(d, ReplyDecision::Ignore);
    }

    #[test]
    fn test_owner_is_never_auto_replied() {
        let d = decide(&config(), &HashMap::new(), CHAT, false, true, 1_000);
        assert_eq!(d, ReplyDecision::Ignore);
    }

    #[test]
    fn test_groups_ignored_when_configured() {
        let group = "120363001234567890@g.us";
        let d = decide(&config(), &HashMap::new(), group, true, false, 1_000);
        assert_eq!(d, ReplyDecision::Ignore);

        let mut c = config();
        c.ignore_groups = false;
        let d = decide(&c, &HashMap::new(), group, true, false, 1_000);
        assert_eq!(d, ReplyDecision::Send);
    }

    #[test]
    fn test_blacklisted_chat_is_ignored() {
        let mut c = config();
        c.blacklist.push("4917612345678".to_string());
        let d = decide(&c, &HashMap::new(), CHAT, false, false, 1_000);
        assert_eq!(d, ReplyDecision::Ignore);
    }

    #[test]
    fn test_cooldown_boundary_is_strict() {
        let c = config();
        let t0 = 1_000_000;
        let mut last = HashMap::new();
        last.insert(CHAT.to_string(), t0);

        let at = |now| decide(&c, &last, CHAT, false, false, now);
        assert_eq!(at(t0 + c.cooldown_ms - 1), ReplyDecision::Ignore);
        assert_eq!(
            at(t0 + c.cooldown_ms),
            ReplyDecision::Ignore,
            "exactly cooldown_ms elapsed is still within the window"
        );
        assert_eq!(at(t0 + c.cooldown_ms + 1), ReplyDecision::Send);
    }

    #[test]
    fn test_fresh_chat_gets_a_reply() {
        let d = decide(&config(), &HashMap::new(), CHAT, false, false, 1_000);
        assert_eq!(d, ReplyDecision::Send);
    }
}
