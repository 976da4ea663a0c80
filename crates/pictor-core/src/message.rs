use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming text message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID.
    pub sender_id: String,
    /// Sender's first name, used to address them in replies.
    pub sender_name: String,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    pub reply_target: String,
    /// Platform message ID of the incoming message.
    pub message_id: i64,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A message the bot has already sent, kept so it can be edited or deleted later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub target: String,
    pub message_id: i64,
}

/// Text formatting applied when sending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Image bytes produced by a generator.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    /// MIME type reported by the provider (e.g. "image/png").
    pub mime_type: String,
    /// Any text the model returned alongside the image.
    pub caption: Option<String>,
    /// Model identifier that produced the image.
    pub model: String,
    pub processing_time_ms: u64,
}

impl GeneratedImage {
    /// File extension matching the MIME type, defaulting to `png`.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}
