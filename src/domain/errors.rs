use thiserror::Error;

/// Domain-level errors shared by adapters, provider clients and the dispatcher.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A parameter was missing, mistyped or otherwise unusable. The provider was not called.
    #[error("invalid parameters: {0}")]
    Validation(String),

    /// The provider reported that the addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing, expired or insufficient credentials.
    #[error("authorization failed: {0}")]
    Unauthorized(String),

    /// The provider throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure status returned by the provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("network error: {0}")]
    Transport(String),

    /// No capability is registered under the requested name.
    #[error("unknown tool: {0}")]
    UnknownCapability(String),

    /// Any other unexpected failure.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
