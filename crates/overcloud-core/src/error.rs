//! Error types for overcloud-core.

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by shared collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The refresh scheduler rejected the request.
    #[error("refresh error: {0}")]
    Refresh(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Create a refresh error.
    #[must_use]
    pub fn refresh(msg: impl Into<String>) -> Self {
        Self::Refresh(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
