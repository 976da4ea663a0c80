//! Bot gateway — the main event loop connecting the channel and the image generator.

mod generate;


use crate::commands::{self, Command};
use pictor_core::{
    message::{IncomingMessage, TextFormat},
    traits::{Channel, ImageGenerator},
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes incoming messages to command handlers.
pub struct Bot {
    pub(super) generator: Arc<dyn ImageGenerator>,
    pub(super) channel: Arc<dyn Channel>,
}

impl Bot {
    pub fn new(generator: Arc<dyn ImageGenerator>, channel: Arc<dyn Channel>) -> Self {
        Self { generator, channel }
    }

    /// Run until ctrl-c.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await
    }

    /// Run the event loop until `shutdown` resolves or the channel closes.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Pictor running | generator: {} ({}) | channel: {}",
            self.generator.name(),
            self.generator.model(),
            self.channel.name(),
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                incoming = rx.recv() => {
                    let Some(incoming) = incoming else {
                        info!("channel closed, stopping");
                        break;
                    };
                    let bot = self.clone();
                    tokio::spawn(async move {
                        bot.handle_message(incoming).await;
                    });
                }
                _ = &mut shutdown => break,
            }
        }

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }
        Ok(())
    }

    /// Handle one incoming message.
    pub(crate) async fn handle_message(&self, incoming: IncomingMessage) {
        let Some(command) = Command::parse(&incoming.text, self.channel.bot_username()) else {
            debug!("ignoring non-command message from {}", incoming.sender_id);
            return;
        };

        match command {
            Command::Start => {
                let text = commands::welcome(&incoming.sender_name);
                self.reply(&incoming, &text, TextFormat::Plain).await;
            }
            Command::Help => {
                self.reply(&incoming, commands::HELP_TEXT, TextFormat::Markdown)
                    .await;
            }
            Command::Generate(prompt) if prompt.is_empty() => {
                self.reply(&incoming, commands::GENERATE_USAGE, TextFormat::Plain)
                    .await;
            }
            Command::Generate(prompt) => self.generate(&incoming, &prompt).await,
        }
    }

    /// Send a reply, logging failures instead of propagating them.
    async fn reply(&self, incoming: &IncomingMessage, text: &str, format: TextFormat) {
        if let Err(e) = self
            .channel
            .send_text(&incoming.reply_target, text, format)
            .await
        {
            warn!("failed to reply to {}: {e}", incoming.reply_target);
        }
    }
}
