//! Outbound Bot API calls.

use super::types::{TgMessage, TgResponse, TgUser};
use super::TelegramChannel;
use pictor_core::error::PictorError;
use tracing::{debug, info, warn};

/// Telegram's hard limit for a single text message.
pub(crate) const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// Send text to a chat, splitting long text. Returns the id of the last chunk sent.
    pub(crate) async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<i64, PictorError> {
        let mut last_id = None;

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if markdown {
                body["parse_mode"] = "Markdown".into();
            }

            let sent = match self.call::<TgMessage>("sendMessage", &body).await {
                Ok(msg) => msg,
                Err(PictorError::Channel(e)) if markdown && e.contains("can't parse entities") => {
                    debug!("Markdown parse failed, retrying as plain text");
                    let plain = serde_json::json!({
                        "chat_id": chat_id,
                        "text": chunk,
                    });
                    self.call::<TgMessage>("sendMessage", &plain).await?
                }
                Err(e) => return Err(e),
            };
            last_id = Some(sent.message_id);
        }

        last_id.ok_or_else(|| PictorError::Channel("telegram: nothing to send".into()))
    }

    /// Replace the text of a message the bot sent earlier.
    pub(crate) async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), PictorError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": truncate(text, MAX_MESSAGE_LEN),
        });
        self.call::<serde_json::Value>("editMessageText", &body)
            .await
            .map(|_| ())
    }

    /// Delete a message the bot sent earlier.
    pub(crate) async fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), PictorError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });
        self.call::<bool>("deleteMessage", &body).await.map(|_| ())
    }

    /// Upload an image with a caption.
    pub(crate) async fn send_photo_bytes(
        &self,
        chat_id: i64,
        image: &[u8],
        filename: &str,
        caption: &str,
    ) -> Result<(), PictorError> {
        let url = format!("{}/sendPhoto", self.base_url);

        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_for(filename))
            .map_err(|e| PictorError::Channel(format!("mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", truncate(caption, 1024).to_string())
            .part("photo", part);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                PictorError::Channel(format!("telegram sendPhoto failed: {}", e.without_url()))
            })?;

        let body: TgResponse<TgMessage> = resp
            .json()
            .await
            .map_err(|e| PictorError::Channel(format!("telegram sendPhoto parse failed: {e}")))?;

        if !body.ok {
            return Err(PictorError::Channel(format!(
                "telegram sendPhoto error: {}",
                body.description.unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Fetch the bot's own account. Fails on a revoked or mistyped token.
    pub(crate) async fn get_me(&self) -> Result<TgUser, PictorError> {
        self.call::<TgUser>("getMe", &serde_json::json!({})).await
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Welcome and usage" },
                { "command": "help", "description": "How to describe an image" },
                { "command": "generate", "description": "Generate an image from a description" },
            ]
        });

        match self.call::<bool>("setMyCommands", &commands).await {
            Ok(_) => info!("registered Telegram bot commands"),
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }

    /// POST a JSON body to a Bot API method and unwrap the `result` field.
    async fn call<T>(&self, method: &str, body: &serde_json::Value) -> Result<T, PictorError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                PictorError::Channel(format!("telegram {method} failed: {}", e.without_url()))
            })?;

        let parsed: TgResponse<T> = resp
            .json()
            .await
            .map_err(|e| PictorError::Channel(format!("telegram {method} parse failed: {e}")))?;

        if !parsed.ok {
            return Err(PictorError::Channel(format!(
                "telegram {method} error: {}",
                parsed.description.unwrap_or_default()
            )));
        }
        parsed
            .result
            .ok_or_else(|| PictorError::Channel(format!("telegram {method} returned no result")))
    }
}

fn mime_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Cut text to at most `max_len` bytes on a char boundary.
pub(crate) fn truncate(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Split a long message into chunks that respect Telegram's limit.
pub(crate) fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = if start + max_len >= text.len() {
            text.len()
        } else {
            let mut e = start + max_len;
            while !text.is_char_boundary(e) {
                e -= 1;
            }
            e
        };
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}
