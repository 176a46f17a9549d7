//! # awaybot-channels
//!
//! Messaging platform integration for the away bot.

pub mod store;
pub mod whatsapp;
