use crate::{
    error::PictorError,
    message::{GeneratedImage, IncomingMessage, SentMessage, TextFormat},
};
use async_trait::async_trait;

/// Image generator trait — the brush.
///
/// Every image backend implements this trait so the bot can swap them freely.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Model identifier used for generation.
    fn model(&self) -> &str;

    /// Generate an image for the user's description.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, PictorError>;

    /// Check if the provider is reachable and the credentials are accepted.
    async fn is_available(&self) -> bool;
}

/// Messaging Channel trait — the nervous system.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// The bot's own handle on this platform, once known (after `start`).
    /// Commands addressed to any other handle are ignored.
    fn bot_username(&self) -> Option<&str> {
        None
    }

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, PictorError>;

    /// Send text to a target and return a handle to the sent message.
    async fn send_text(
        &self,
        target: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage, PictorError>;

    /// Replace the text of a previously sent message.
    async fn edit_text(&self, message: &SentMessage, text: &str) -> Result<(), PictorError>;

    /// Delete a previously sent message.
    async fn delete(&self, message: &SentMessage) -> Result<(), PictorError>;

    /// Send an image with a caption.
    async fn send_photo(
        &self,
        target: &str,
        image: &[u8],
        filename: &str,
        caption: &str,
    ) -> Result<(), PictorError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), PictorError>;
}
