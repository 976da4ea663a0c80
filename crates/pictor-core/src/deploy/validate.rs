//! Structural checks for deployment descriptors.

use super::{Descriptor, Runtime, ServiceSpec, ServiceType};
use crate::config::{ENV_GOOGLE_API_KEY, ENV_TELEGRAM_BOT_TOKEN};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// A single problem found in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("service name is empty")]
    EmptyName,

    #[error("{0} is empty")]
    EmptyCommand(&'static str),

    #[error("unknown service type '{0}'")]
    UnknownServiceType(String),

    #[error("unknown runtime '{0}'")]
    UnknownRuntime(String),

    #[error("env var with empty key")]
    EmptyEnvKey,

    #[error("env var '{0}' is declared more than once")]
    DuplicateEnvKey(String),

    #[error("env var '{0}' is marked fromSecret but carries an inline value")]
    InlineSecret(String),

    #[error("env var '{0}' has neither fromSecret nor value")]
    MissingValue(String),

    #[error("expected exactly one service, found {0}")]
    ServiceCount(usize),

    #[error("expected service type '{expected}', found '{found}'")]
    WrongServiceType { expected: String, found: String },

    #[error("expected runtime '{expected}', found '{found}'")]
    WrongRuntime { expected: String, found: String },

    #[error("required env var '{0}' is not declared")]
    MissingEnvVar(String),

    #[error("env var '{0}' is not part of the worker contract")]
    UnexpectedEnvVar(String),

    #[error("env var '{0}' must be secret-sourced")]
    NotSecret(String),

    #[error("env var '{key}' must be a literal version like 3.11, got {value:?}")]
    BadVersionPin { key: String, value: Option<String> },

    #[error("env var '{key}' is an unquoted YAML number ({value}); quote it so 3.10 is not read as 3.1")]
    UnquotedVersionPin { key: String, value: String },
}

/// A violation located in a named service (or the descriptor as a whole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub service: Option<String>,
    pub violation: Violation,
}

impl Finding {
    fn descriptor(violation: Violation) -> Self {
        Self {
            service: None,
            violation,
        }
    }

    fn in_service(service: &ServiceSpec, violation: Violation) -> Self {
        Self {
            service: Some(service.name.clone()),
            violation,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service {
            Some(name) if !name.is_empty() => write!(f, "service '{name}': {}", self.violation),
            Some(_) => write!(f, "unnamed service: {}", self.violation),
            None => write!(f, "{}", self.violation),
        }
    }
}

/// What a worker descriptor must declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProfile {
    pub runtime: Runtime,
    /// Keys that must be secret-sourced.
    pub secrets: Vec<String>,
    /// Literal key pinning the runtime version, if the runtime has one.
    pub version_pin: Option<String>,
}

impl WorkerProfile {
    /// Profile for the Telegram image bot on the given runtime.
    pub fn telegram_bot(runtime: Runtime) -> Self {
        let version_pin = runtime.version_var().map(str::to_string);
        Self {
            runtime,
            secrets: vec![
                ENV_TELEGRAM_BOT_TOKEN.to_string(),
                ENV_GOOGLE_API_KEY.to_string(),
            ],
            version_pin,
        }
    }

    fn expected_keys(&self) -> Vec<&str> {
        self.secrets
            .iter()
            .map(String::as_str)
            .chain(self.version_pin.as_deref())
            .collect()
    }
}

impl ServiceSpec {
    /// Structural checks that hold for any service on the platform.
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        if self.name.trim().is_empty() {
            out.push(Violation::EmptyName);
        }
        if self.build_command.trim().is_empty() {
            out.push(Violation::EmptyCommand("buildCommand"));
        }
        if self.start_command.trim().is_empty() {
            out.push(Violation::EmptyCommand("startCommand"));
        }
        if !self.service_type.is_known() {
            out.push(Violation::UnknownServiceType(
                self.service_type.as_str().to_string(),
            ));
        }
        if !self.env.is_known() {
            out.push(Violation::UnknownRuntime(self.env.as_str().to_string()));
        }

        let mut seen = HashSet::new();
        for var in &self.env_vars {
            if var.key.trim().is_empty() {
                out.push(Violation::EmptyEnvKey);
                continue;
            }
            if !seen.insert(var.key.as_str()) {
                out.push(Violation::DuplicateEnvKey(var.key.clone()));
            }
            match (var.from_secret, var.value.is_some()) {
                (true, true) => out.push(Violation::InlineSecret(var.key.clone())),
                (false, false) => out.push(Violation::MissingValue(var.key.clone())),
                _ => {}
            }
        }

        out
    }
}

impl Descriptor {
    /// Structural checks across every service.
    pub fn validate(&self) -> Vec<Finding> {
        self.services
            .iter()
            .flat_map(|svc| {
                svc.validate()
                    .into_iter()
                    .map(move |v| Finding::in_service(svc, v))
            })
            .collect()
    }

    /// Structural checks plus the single-worker contract described by `profile`.
    pub fn check_worker(&self, profile: &WorkerProfile) -> Vec<Finding> {
        let mut out = self.validate();

        let svc = match self.services.as_slice() {
            [only] => only,
            other => {
                out.push(Finding::descriptor(Violation::ServiceCount(other.len())));
                return out;
            }
        };

        if svc.service_type != ServiceType::Worker {
            out.push(Finding::in_service(
                svc,
                Violation::WrongServiceType {
                    expected: ServiceType::Worker.to_string(),
                    found: svc.service_type.to_string(),
                },
            ));
        }
        if svc.env != profile.runtime {
            out.push(Finding::in_service(
                svc,
                Violation::WrongRuntime {
                    expected: profile.runtime.to_string(),
                    found: svc.env.to_string(),
                },
            ));
        }

        let expected = profile.expected_keys();
        for key in &expected {
            if svc.env_var(key).is_none() {
                out.push(Finding::in_service(
                    svc,
                    Violation::MissingEnvVar(key.to_string()),
                ));
            }
        }
        let mut reported = HashSet::new();
        for var in &svc.env_vars {
            if !expected.contains(&var.key.as_str()) && reported.insert(var.key.as_str()) {
                out.push(Finding::in_service(
                    svc,
                    Violation::UnexpectedEnvVar(var.key.clone()),
                ));
            }
        }

        for key in &profile.secrets {
            if let Some(var) = svc.env_var(key) {
                if !var.is_secret() {
                    out.push(Finding::in_service(svc, Violation::NotSecret(key.clone())));
                }
            }
        }

        if let Some(pin) = &profile.version_pin {
            if let Some(var) = svc.env_var(pin) {
                let literal = var.literal_value();
                if let (true, Some(value)) = (var.unquoted_float, literal) {
                    out.push(Finding::in_service(
                        svc,
                        Violation::UnquotedVersionPin {
                            key: pin.clone(),
                            value: value.to_string(),
                        },
                    ));
                } else if !literal.is_some_and(is_version_literal) {
                    out.push(Finding::in_service(
                        svc,
                        Violation::BadVersionPin {
                            key: pin.clone(),
                            value: literal.map(str::to_string),
                        },
                    ));
                }
            }
        }

        out
    }
}

/// `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`, digits only.
pub fn is_version_literal(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    (1..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
