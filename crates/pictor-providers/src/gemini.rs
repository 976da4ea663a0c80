//! Google Gemini image generation provider.
//!
//! Calls the Gemini `generateContent` endpoint asking for image output, and
//! extracts the first inline image part. Auth via URL query param.

mod types;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pictor_core::{
    config::GeminiConfig, error::PictorError, message::GeneratedImage, traits::ImageGenerator,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use types::{GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig};

/// Finish reasons that mean the model stopped for policy reasons.
const POLICY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

/// Google Gemini image provider.
pub struct GeminiImageGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiImageGenerator {
    /// Create from config values.
    pub fn from_config(config: GeminiConfig) -> Result<Self, PictorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PictorError::Provider(format!("gemini: failed to build client: {e}")))?;
        Ok(Self { client, config })
    }

    fn request_body(&self, description: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(self.config.render_prompt(description))],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, PictorError> {
        let start = Instant::now();
        let model = &self.config.model;
        let body = self.request_body(prompt);

        let url = format!(
            "{}/models/{model}:generateContent?key={}",
            self.config.base_url, self.config.api_key
        );
        debug!("gemini: POST models/{model}:generateContent");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PictorError::Provider(format!("gemini request failed: {}", e.without_url()))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(PictorError::Provider(format!(
                "gemini returned {status}: {text}"
            )));
        }

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| PictorError::Provider(format!("gemini: failed to parse response: {e}")))?;

        let mut image = extract_image(parsed, model)?;
        image.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "gemini: generated {} ({} bytes) in {}ms",
            image.mime_type,
            image.data.len(),
            image.processing_time_ms
        );
        Ok(image)
    }

    async fn is_available(&self) -> bool {
        if self.config.api_key.is_empty() {
            warn!("gemini: no API key configured");
            return false;
        }
        let url = format!(
            "{}/models/{}?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!("gemini not available: model lookup returned {}", resp.status());
                false
            }
            Err(e) => {
                warn!("gemini not available: {}", e.without_url());
                false
            }
        }
    }
}

/// Classify a parsed response: blocked prompt, policy stop, image, or nothing usable.
fn extract_image(resp: GeminiResponse, model: &str) -> Result<GeneratedImage, PictorError> {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(PictorError::Blocked(reason.to_string()));
    }

    let candidate = resp
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(PictorError::NoImage)?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let caption = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let caption = (!caption.is_empty()).then_some(caption);

    let inline = parts
        .into_iter()
        .filter_map(|p| p.inline_data)
        .find(|d| d.mime_type.starts_with("image/"));

    match inline {
        Some(blob) => {
            let data = BASE64.decode(blob.data.as_bytes()).map_err(|e| {
                PictorError::Provider(format!("gemini: invalid base64 image data: {e}"))
            })?;
            Ok(GeneratedImage {
                data,
                mime_type: blob.mime_type,
                caption,
                model: model.to_string(),
                processing_time_ms: 0,
            })
        }
        None => {
            let finish = candidate.finish_reason.unwrap_or_default();
            if POLICY_FINISH_REASONS.contains(&finish.as_str()) {
                return Err(PictorError::Stopped(finish));
            }
            warn!(
                "gemini: response had no image data (finish_reason: {finish:?}, text: {:?})",
                caption.unwrap_or_default()
            );
            Err(PictorError::NoImage)
        }
    }
}
