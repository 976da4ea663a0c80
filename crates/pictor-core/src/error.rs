use thiserror::Error;

/// Top-level error type for Pictor.
#[derive(Debug, Error)]
pub enum PictorError {
    /// Error from the image generation provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider refused the prompt before generating anything.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// Generation started but was stopped by the provider (safety, recitation, ...).
    #[error("generation stopped: {0}")]
    Stopped(String),

    /// The provider answered successfully but returned no image data.
    #[error("no image in provider response")]
    NoImage,

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed deployment descriptor.
    #[error("descriptor error: {0}")]
    Descriptor(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
