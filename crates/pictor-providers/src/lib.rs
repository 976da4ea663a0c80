//! # pictor-providers
//!
//! Image generation provider implementations for Pictor.

pub mod gemini;
