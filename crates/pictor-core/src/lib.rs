//! # pictor-core
//!
//! Core types, traits, configuration, deployment descriptor, and error handling
//! for the Pictor worker.

pub mod config;
pub mod deploy;
pub mod error;
pub mod message;
pub mod traits;
