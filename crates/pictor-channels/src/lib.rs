//! # pictor-channels
//!
//! Messaging platform integrations for Pictor.

pub mod telegram;
