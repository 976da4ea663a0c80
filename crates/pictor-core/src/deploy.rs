//! Deployment descriptor — the platform manifest that provisions the worker.
//!
//! The descriptor is a YAML document with a top-level `services` sequence.
//! Each service declares its type, runtime, build and start commands, and the
//! environment variables the platform injects. Secret-sourced variables carry
//! `fromSecret: true` and never an inline value.
//!
//! The platform itself owns deploy-time failures (missing secrets, failing
//! builds); this module only models the file and checks its structure.

mod validate;

#[cfg(test)]
mod tests;

pub use validate::{is_version_literal, Finding, Violation, WorkerProfile};

use crate::config::{ENV_GOOGLE_API_KEY, ENV_TELEGRAM_BOT_TOKEN};
use crate::error::PictorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Parsed deployment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub services: Vec<ServiceSpec>,
}

/// One service entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub name: String,
    pub env: Runtime,
    pub build_command: String,
    pub start_command: String,
    #[serde(default)]
    pub env_vars: Vec<EnvVarSpec>,
}

/// One environment variable declaration.
///
/// Exactly one of `from_secret` or `value` is set. Parsing rejects entries that
/// set both or neither; [`ServiceSpec::validate`] reports the same for specs
/// built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEnvVar")]
pub struct EnvVarSpec {
    pub key: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub from_secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// The value was written as an unquoted YAML float, so trailing zeros
    /// (`3.10` → `3.1`) may have been lost.
    #[serde(skip)]
    pub unquoted_float: bool,
}

/// On-file shape of an env var entry, before the secret/literal check.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvVar {
    key: String,
    #[serde(default)]
    from_secret: bool,
    #[serde(default)]
    value: Option<serde_yaml::Value>,
}

impl TryFrom<RawEnvVar> for EnvVarSpec {
    type Error = String;

    fn try_from(raw: RawEnvVar) -> Result<Self, Self::Error> {
        let (value, unquoted_float) = match raw.value {
            None | Some(serde_yaml::Value::Null) => (None, false),
            Some(serde_yaml::Value::String(s)) => (Some(s), false),
            Some(serde_yaml::Value::Number(n)) => (Some(n.to_string()), n.is_f64()),
            Some(serde_yaml::Value::Bool(b)) => (Some(b.to_string()), false),
            Some(other) => {
                return Err(format!(
                    "env var '{}': value must be a scalar, got {other:?}",
                    raw.key
                ))
            }
        };

        match (raw.from_secret, value.is_some()) {
            (true, true) => Err(format!(
                "env var '{}' is marked fromSecret but carries an inline value",
                raw.key
            )),
            (false, false) => Err(format!(
                "env var '{}' has neither fromSecret nor value",
                raw.key
            )),
            _ => Ok(Self {
                key: raw.key,
                from_secret: raw.from_secret,
                value,
                unquoted_float,
            }),
        }
    }
}

impl EnvVarSpec {
    /// A variable supplied by the platform's secret store.
    pub fn secret(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from_secret: true,
            value: None,
            unquoted_float: false,
        }
    }

    /// A variable with a literal value checked into the descriptor.
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from_secret: false,
            value: Some(value.into()),
            unquoted_float: false,
        }
    }

    /// Secret-sourced with no inline value.
    pub fn is_secret(&self) -> bool {
        self.from_secret && self.value.is_none()
    }

    /// The literal value, if this is a literal variable.
    pub fn literal_value(&self) -> Option<&str> {
        if self.from_secret {
            None
        } else {
            self.value.as_deref()
        }
    }
}

/// Service type in the platform's taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Web,
    /// Long-running background process with no inbound HTTP.
    Worker,
    /// Private service reachable only inside the platform network.
    Pserv,
    Cron,
    /// Anything the platform accepts that this crate does not know about.
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Web => "web",
            Self::Worker => "worker",
            Self::Pserv => "pserv",
            Self::Cron => "cron",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "web" => Self::Web,
            "worker" => Self::Worker,
            "pserv" => Self::Pserv,
            "cron" => Self::Cron,
            _ => Self::Other(s),
        }
    }
}

impl From<ServiceType> for String {
    fn from(t: ServiceType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime identifier (`env` key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Runtime {
    Python,
    Node,
    Ruby,
    Go,
    Rust,
    Elixir,
    Docker,
    Image,
    Other(String),
}

impl Runtime {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Python => "python",
            Self::Node => "node",
            Self::Ruby => "ruby",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Elixir => "elixir",
            Self::Docker => "docker",
            Self::Image => "image",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Literal env var that pins the runtime version.
    pub fn version_var(&self) -> Option<&'static str> {
        match self {
            Self::Python => Some("PYTHON_VERSION"),
            Self::Node => Some("NODE_VERSION"),
            Self::Ruby => Some("RUBY_VERSION"),
            Self::Elixir => Some("ELIXIR_VERSION"),
            Self::Rust => Some("RUST_VERSION"),
            _ => None,
        }
    }
}

impl From<String> for Runtime {
    fn from(s: String) -> Self {
        match s.as_str() {
            "python" => Self::Python,
            "node" => Self::Node,
            "ruby" => Self::Ruby,
            "go" => Self::Go,
            "rust" => Self::Rust,
            "elixir" => Self::Elixir,
            "docker" => Self::Docker,
            "image" => Self::Image,
            _ => Self::Other(s),
        }
    }
}

impl From<Runtime> for String {
    fn from(r: Runtime) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Descriptor {
    /// Descriptor holding a single service.
    pub fn single(service: ServiceSpec) -> Self {
        Self {
            services: vec![service],
        }
    }

    /// Parse a descriptor from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, PictorError> {
        serde_yaml::from_str(content)
            .map_err(|e| PictorError::Descriptor(format!("failed to parse descriptor: {e}")))
    }

    /// Read and parse a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PictorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PictorError::Descriptor(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Emit the descriptor using the platform's key spelling.
    pub fn to_yaml(&self) -> Result<String, PictorError> {
        serde_yaml::to_string(self)
            .map_err(|e| PictorError::Descriptor(format!("failed to serialize descriptor: {e}")))
    }

    /// Look up a service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }
}

impl ServiceSpec {
    /// The Python worker manifest for the Telegram image bot, as originally deployed.
    pub fn telegram_worker() -> Self {
        Self {
            service_type: ServiceType::Worker,
            name: "telegram-gemini-image-bot".to_string(),
            env: Runtime::Python,
            build_command: "pip install -r requirements.txt".to_string(),
            start_command: "python bot.py".to_string(),
            env_vars: vec![
                EnvVarSpec::secret(ENV_TELEGRAM_BOT_TOKEN),
                EnvVarSpec::secret(ENV_GOOGLE_API_KEY),
                EnvVarSpec::literal("PYTHON_VERSION", "3.11"),
            ],
        }
    }

    /// Manifest for this crate's own worker binary.
    pub fn pictor_worker() -> Self {
        Self {
            service_type: ServiceType::Worker,
            name: "pictor".to_string(),
            env: Runtime::Rust,
            build_command: "cargo build --release".to_string(),
            start_command: "./target/release/pictor start".to_string(),
            env_vars: vec![
                EnvVarSpec::secret(ENV_TELEGRAM_BOT_TOKEN),
                EnvVarSpec::secret(ENV_GOOGLE_API_KEY),
                EnvVarSpec::literal("RUST_VERSION", "1.82"),
            ],
        }
    }

    /// Look up an env var declaration by key.
    pub fn env_var(&self, key: &str) -> Option<&EnvVarSpec> {
        self.env_vars.iter().find(|v| v.key == key)
    }
}
