//! Identifier helpers for chat and account IDs.
//!
//! WhatsApp addresses conversations by JID, e.g. `4917612345678@s.whatsapp.net`
//! for a direct chat or `120363041234567890@g.us` for a group. Config entries,
//! throttle keys, and statistics all use the bare part before the `@`.

/// Strip the domain suffix from a JID-style identifier.
pub fn bare_id(id: &str) -> &str {
    id.split('@').next().unwrap_or(id)
}

/// Collapse an identifier to its digits.
///
/// Phone numbers arrive in many shapes (`+91 98765-43210`, `919876543210`),
/// so blacklist entries are stored digits-only and compared digits-only.
/// Returns an empty string when the input carries no digits at all.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
