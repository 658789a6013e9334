//! Provider-level error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to the host by the provider lifecycle.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Static configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// An operation needed `init` to have succeeded first.
    #[error("provider must be initialized before {0}")]
    NotInitialized(&'static str),

    /// `start` was called on a provider that is already running.
    #[error("provider is already running")]
    AlreadyRunning,

    /// The provider has been stopped and cannot be reused.
    #[error("provider has been stopped")]
    Stopped,

    /// `start` was called outside a Tokio runtime.
    #[error("start must be called from within a Tokio runtime")]
    NoRuntime,
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
