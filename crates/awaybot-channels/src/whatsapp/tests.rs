use super::events::extract_text;
use super::qr::generate_qr_terminal;
use super::send::{backoff, SEND_ATTEMPTS};
use std::time::Duration;
use wacore_binary::jid::{Jid, JidExt};

fn plain(text: &str) -> waproto::whatsapp::Message {
    waproto::whatsapp::Message {
        conversation: Some(text.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_extract_conversation_text() {
    assert_eq!(extract_text(&plain("hello")), Some("hello".to_string()));
}

#[test]
fn test_extract_extended_text() {
    let msg = waproto::whatsapp::Message {
        extended_text_message: Some(Box::new(
            waproto::whatsapp::message::ExtendedTextMessage {
                text: Some("quoted reply".to_string()),
                ..Default::default()
            },
        )),
        ..Default::default()
    };
    assert_eq!(extract_text(&msg), Some("quoted reply".to_string()));
}

#[test]
fn test_extract_unwraps_ephemeral_wrapper() {
    let msg = waproto::whatsapp::Message {
        ephemeral_message: Some(Box::new(waproto::whatsapp::message::FutureProofMessage {
            message: Some(Box::new(plain("disappearing"))),
            ..Default::default()
        })),
        ..Default::default()
    };
    assert_eq!(extract_text(&msg), Some("disappearing".to_string()));
}

#[test]
fn test_extract_media_only_is_none() {
    let msg = waproto::whatsapp::Message::default();
    assert_eq!(extract_text(&msg), None, "media-only messages carry no text");
}

#[test]
fn test_jid_group_detection() {
    // Group JIDs use the @g.us server.
    let group_jid: Jid = "120363001234567890@g.us".parse().unwrap();
    assert!(group_jid.is_group(), "g.us JID should be detected as group");

    // Personal JIDs use @s.whatsapp.net.
    let personal_jid: Jid = "5511999887766@s.whatsapp.net".parse().unwrap();
    assert!(
        !personal_jid.is_group(),
        "s.whatsapp.net JID should not be group"
    );
}

#[test]
fn test_send_backoff_doubles() {
    assert_eq!(backoff(1), Duration::from_millis(500));
    assert_eq!(backoff(2), Duration::from_millis(1000));
    // The final attempt never sleeps, so only attempts 1..SEND_ATTEMPTS
    // ever reach backoff.
    assert_eq!(backoff(SEND_ATTEMPTS - 1), Duration::from_millis(1000));
}

#[test]
fn test_generate_qr_terminal() {
    let qr = generate_qr_terminal("test-pairing-data").unwrap();
    assert!(!qr.is_empty());
    // Half-block rendering only uses these four characters.
    assert!(qr
        .chars()
        .all(|c| matches!(c, '█' | '▀' | '▄' | ' ' | '\n')));
}
