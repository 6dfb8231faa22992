use thiserror::Error;

/// Top-level error type for SecretarIA.
#[derive(Debug, Error)]
pub enum SecretariaError {
    /// Configuration error — refuses startup (bad encryption key, bad TOML).
    #[error("config error: {0}")]
    Config(String),

    /// Sealed blob failed authentication: tampered ciphertext or wrong key.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Memory/storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Error from the messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the language-model provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// A looked-up entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
