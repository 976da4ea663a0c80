use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PictorError;


/// Environment variable holding the Telegram bot token (secret on the platform).
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the Google AI API key (secret on the platform).
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Optional override for the Gemini model.
pub const ENV_GEMINI_MODEL: &str = "PICTOR_GEMINI_MODEL";

/// Top-level Pictor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pictor: PictorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// General worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PictorConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for daily rolling log files. Unset = stdout only.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for PictorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user IDs allowed to use the bot. Empty = allow all.
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    /// Long-polling timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allowed_users: Vec::new(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

/// Google Gemini image generation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Prompt sent to the model; `{prompt}` is replaced by the user's description.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            prompt_template: default_prompt_template(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl GeminiConfig {
    /// Render the prompt template for a user description.
    pub fn render_prompt(&self, description: &str) -> String {
        if self.prompt_template.contains("{prompt}") {
            self.prompt_template.replace("{prompt}", description)
        } else {
            format!("{} {description}", self.prompt_template.trim_end())
        }
    }
}

impl Config {
    /// Overlay values from the process environment. Returns the variables applied.
    pub fn apply_env(&mut self) -> Vec<&'static str> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup. Empty values are ignored.
    /// Returns the variables applied.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut applied = Vec::new();

        if let Some(token) = get(ENV_TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = token;
            applied.push(ENV_TELEGRAM_BOT_TOKEN);
        }
        if let Some(key) = get(ENV_GOOGLE_API_KEY) {
            self.gemini.api_key = key;
            applied.push(ENV_GOOGLE_API_KEY);
        }
        if let Some(model) = get(ENV_GEMINI_MODEL) {
            self.gemini.model = model;
            applied.push(ENV_GEMINI_MODEL);
        }
        applied
    }

    /// Names of required secrets that are still empty.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.telegram.bot_token.trim().is_empty() {
            missing.push(ENV_TELEGRAM_BOT_TOKEN);
        }
        if self.gemini.api_key.trim().is_empty() {
            missing.push(ENV_GOOGLE_API_KEY);
        }
        missing
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "Pictor".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_gemini_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_prompt_template() -> String {
    "Generate an image depicting: {prompt}".to_string()
}
fn default_request_timeout() -> u64 {
    120
}

/// Load a `.env` file into the process environment, if one exists.
///
/// Local development convenience; on the platform the secrets are injected
/// directly. Returns the path that was loaded. Runs before logging is set up,
/// so the caller reports the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>, PictorError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(PictorError::Config(format!("failed to read .env file: {e}"))),
    }
}

/// Parse configuration from a TOML string.
pub fn from_toml(content: &str) -> Result<Config, PictorError> {
    toml::from_str(content).map_err(|e| PictorError::Config(format!("failed to parse config: {e}")))
}

/// Where a loaded configuration came from. Config is read before logging is
/// set up, so the caller reports this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// The file that was read, or `None` when it was missing and defaults were used.
    pub file: Option<PathBuf>,
    /// Environment variables that overrode file values.
    pub env_overrides: Vec<&'static str>,
}

/// Load configuration from a TOML file, then overlay the environment.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<(Config, ConfigSource), PictorError> {
    let (mut config, file) = load_file(Path::new(path))?;
    let env_overrides = config.apply_env();
    Ok((
        config,
        ConfigSource {
            file,
            env_overrides,
        },
    ))
}

fn load_file(path: &Path) -> Result<(Config, Option<PathBuf>), PictorError> {
    if !path.exists() {
        return Ok((Config::default(), None));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| PictorError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    Ok((from_toml(&content)?, Some(path.to_path_buf())))
}
