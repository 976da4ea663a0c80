//! The `/generate` flow: notice, generate, deliver or apologise.

use super::Bot;
use crate::commands;
use pictor_core::{
    error::PictorError,
    message::{IncomingMessage, SentMessage, TextFormat},
};
use tracing::{error, info, warn};

impl Bot {
    pub(super) async fn generate(&self, incoming: &IncomingMessage, prompt: &str) {
        let user = &incoming.sender_name;
        let chat = &incoming.reply_target;
        info!("Received image generation request from {user} (Chat ID: {chat}): '{prompt}'");

        let notice = match self
            .channel
            .send_text(chat, commands::PROCESSING, TextFormat::Plain)
            .await
        {
            Ok(sent) => Some(sent),
            Err(e) => {
                warn!("failed to send processing notice to {chat}: {e}");
                None
            }
        };

        let result = match self.generator.generate(prompt).await {
            Ok(image) => {
                info!("Image generated successfully for: '{prompt}'");
                let filename = format!("generated_image_{chat}.{}", image.extension());
                self.channel
                    .send_photo(chat, &image.data, &filename, &commands::caption(prompt))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if let Some(notice) = notice {
                    if let Err(e) = self.channel.delete(&notice).await {
                        warn!("failed to delete processing notice in {chat}: {e}");
                    }
                }
            }
            Err(e) => {
                log_failure(&e, prompt);
                self.report_failure(incoming, notice.as_ref(), &commands::apology(&e, user))
                    .await;
            }
        }
    }

    /// Replace the processing notice with the apology, or send it fresh if
    /// there is no notice to edit.
    async fn report_failure(
        &self,
        incoming: &IncomingMessage,
        notice: Option<&SentMessage>,
        text: &str,
    ) {
        let edited = match notice {
            Some(notice) => match self.channel.edit_text(notice, text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("failed to edit processing notice: {e}");
                    false
                }
            },
            None => false,
        };
        if !edited {
            self.reply(incoming, text, TextFormat::Plain).await;
        }
    }
}

fn log_failure(err: &PictorError, prompt: &str) {
    match err {
        PictorError::Blocked(reason) => {
            warn!("Image generation blocked for prompt: '{prompt}'. Reason: {reason}")
        }
        PictorError::Stopped(reason) => {
            warn!("Image generation stopped for prompt: '{prompt}'. Reason: {reason}")
        }
        PictorError::NoImage => {
            warn!("Image generation succeeded for '{prompt}', but no image data was returned")
        }
        other => error!("Error during image generation for prompt '{prompt}': {other}"),
    }
}
