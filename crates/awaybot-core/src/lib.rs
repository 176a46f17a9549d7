//! # awaybot-core
//!
//! Core types, traits, configuration, and error handling for the away bot.

pub mod config;
pub mod error;
pub mod ident;
pub mod message;
pub mod traits;
