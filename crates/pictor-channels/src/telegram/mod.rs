//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates`; replies via `sendMessage`,
//! `editMessageText`, `deleteMessage` and `sendPhoto`.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
pub(crate) mod send;
pub(crate) mod types;


use pictor_core::{config::TelegramConfig, error::PictorError};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
    /// The bot's username from `getMe`, set on start.
    username: OnceLock<String>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig) -> Self {
        let base_url = format!("{TELEGRAM_API_URL}/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
            username: OnceLock::new(),
        }
    }
}

/// Parse a channel target into a Telegram chat id.
fn parse_chat_id(target: &str) -> Result<i64, PictorError> {
    target
        .parse()
        .map_err(|e| PictorError::Channel(format!("invalid telegram chat_id '{target}': {e}")))
}
