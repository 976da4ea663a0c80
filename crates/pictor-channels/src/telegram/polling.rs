//! Long-polling update loop and Channel trait implementation.

use super::types::{TgMessage, TgResponse, TgUpdate};
use super::{parse_chat_id, TelegramChannel};
use async_trait::async_trait;
use pictor_core::{
    error::PictorError,
    message::{IncomingMessage, SentMessage, TextFormat},
    traits::Channel,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const MAX_BACKOFF_SECS: u64 = 60;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn bot_username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, PictorError> {
        let me = self.get_me().await?;
        match me.username {
            Some(username) => {
                info!("Telegram bot authorized as @{username}");
                let _ = self.username.set(username);
            }
            None => warn!("telegram getMe returned no username for bot {}", me.id),
        }
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let allowed_users = self.config.allowed_users.clone();
        let poll_timeout = self.config.poll_timeout_secs;
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let offset = last_update_id.lock().await.map(|id| id + 1);

                let mut url = format!("{base_url}/getUpdates?timeout={poll_timeout}");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(Duration::from_secs(poll_timeout + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!(
                            "telegram poll error (retry in {backoff_secs}s): {}",
                            e.without_url()
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = next_backoff(backoff_secs);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = next_backoff(backoff_secs);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = next_backoff(backoff_secs);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(incoming) = update
                        .message
                        .and_then(|m| to_incoming(m, &allowed_users))
                    else {
                        continue;
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_text(
        &self,
        target: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage, PictorError> {
        let chat_id = parse_chat_id(target)?;
        let message_id = self
            .send_message(chat_id, text, format == TextFormat::Markdown)
            .await?;
        Ok(SentMessage {
            target: target.to_string(),
            message_id,
        })
    }

    async fn edit_text(&self, message: &SentMessage, text: &str) -> Result<(), PictorError> {
        let chat_id = parse_chat_id(&message.target)?;
        self.edit_message(chat_id, message.message_id, text).await
    }

    async fn delete(&self, message: &SentMessage) -> Result<(), PictorError> {
        let chat_id = parse_chat_id(&message.target)?;
        self.delete_message(chat_id, message.message_id).await
    }

    async fn send_photo(
        &self,
        target: &str,
        image: &[u8],
        filename: &str,
        caption: &str,
    ) -> Result<(), PictorError> {
        let chat_id = parse_chat_id(target)?;
        self.send_photo_bytes(chat_id, image, filename, caption)
            .await
    }

    async fn stop(&self) -> Result<(), PictorError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

pub(crate) fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

/// Convert a Telegram message into an [`IncomingMessage`], dropping anything
/// the bot should not see: non-text, anonymous, bot-authored, or unauthorized.
pub(crate) fn to_incoming(msg: TgMessage, allowed_users: &[i64]) -> Option<IncomingMessage> {
    let text = msg.text?;
    let user = msg.from?;

    if user.is_bot {
        debug!("telegram: ignoring message from bot {}", user.id);
        return None;
    }

    if !allowed_users.is_empty() && !allowed_users.contains(&user.id) {
        warn!("ignoring message from unauthorized user {}", user.id);
        return None;
    }

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender_id: user.id.to_string(),
        sender_name: user.first_name,
        reply_target: msg.chat.id.to_string(),
        message_id: msg.message_id,
        text,
        timestamp: chrono::Utc::now(),
    })
}
