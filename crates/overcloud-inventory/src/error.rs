//! Error types for overcloud-inventory.

/// Result type alias using [`InventoryError`].
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised while reconciling a node's inventory.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The status collection command could not be run on the node.
    #[error("shell command failed: {0}")]
    Shell(String),

    /// The service group referenced does not exist.
    #[error("service group not found: {0}")]
    ServiceGroupNotFound(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    /// Create a shell error.
    #[must_use]
    pub fn shell(msg: impl Into<String>) -> Self {
        Self::Shell(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Render an error with every source in its chain, outermost first.
pub(crate) fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
