//! Error types for the zanko domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error type; `ChatError` is what the dispatcher surfaces to
//! the caller.
//!
//! User-facing messages never echo the matched security pattern, raw
//! provider error text, or internal identifiers other than the opaque
//! session id.

use thiserror::Error;

/// The top-level error type surfaced by the chat dispatcher.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The client exceeded its fixed-window request budget.
    /// Not retryable within the current window.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    /// The input failed the security pre-screen or basic validation.
    /// Deliberately generic — the matched pattern is never echoed back.
    #[error("Invalid request format")]
    InputRejected,

    /// Both the primary provider and the fallback failed.
    #[error("AI services temporarily unavailable")]
    ProviderUnavailable(#[source] ProviderError),

    /// An explicit session lookup named an unknown session.
    #[error("Session not found")]
    SessionNotFound,
}

/// Result type alias using `ChatError`.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Failure modes of the generative-text provider collaborator.
///
/// `RateLimited` and `Transient` trigger the single fallback substitution;
/// `Fatal` propagates immediately.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider rate limited")]
    RateLimited,

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("fatal provider failure: {0}")]
    Fatal(String),
}

impl ProviderError {
    /// Whether this failure should be retried against the fallback provider.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient(_))
    }
}

/// Failure of the retrieval collaborator (timeout, backend unavailable).
///
/// Never fatal to a request — the dispatcher degrades to context-free
/// prompting.
#[derive(Debug, Clone, Error)]
#[error("retrieval unavailable: {0}")]
pub struct RetrievalError(pub String);
