//! Error types for overcloud-control.

use overcloud_core::CoreError;

use crate::remote::RemoteError;

/// Result type alias using [`ControlError`].
pub type ControlResult<T> = Result<T, ControlError>;

/// Boxed cause carried by operation failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while driving node lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The node could not be moved to the manageable state.
    #[error("unable to set node manageable: {message}")]
    HostSetManageable {
        /// Human-readable cause extracted from the remote response.
        message: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// Hardware introspection failed.
    #[error("unable to introspect node: {message}")]
    HostIntrospect {
        /// Human-readable cause extracted from the remote response.
        message: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// The node could not be made available.
    #[error("unable to provide node: {message}")]
    HostProvide {
        /// Human-readable cause extracted from the remote response.
        message: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// A power state change failed.
    #[error("unable to set power state: {message}")]
    HostSetPowerState {
        /// Human-readable cause extracted from the remote response.
        message: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// Remote deletion of the node failed.
    #[error("unable to destroy node: {message}")]
    HostDestroy {
        /// Human-readable cause extracted from the remote response.
        message: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// No credentials of the requested type are configured.
    #[error("No credentials defined")]
    MissingCredentials,

    /// Logging on to this platform is not supported.
    #[error("Logon to platform [{platform}] not supported")]
    UnsupportedPlatform {
        /// Operating system image name of the node.
        platform: String,
    },

    /// The credential check could not reach the host.
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// The host rejected the credentials.
    #[error("login failed: {0}")]
    InvalidCredentials(String),

    /// Node not found.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Manager not found.
    #[error("manager not found: {0}")]
    ManagerNotFound(String),

    /// The node is not attached to any manager.
    #[error("node {0} has no manager")]
    NoManager(String),

    /// The task queue is at capacity.
    #[error("task queue is full")]
    QueueFull,

    /// A queued task exceeded its timeout.
    #[error("task timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed.
        secs: u64,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service error.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Shared collaborator error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an unreachable-host error.
    #[must_use]
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create an invalid-credentials error.
    #[must_use]
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    /// Human-readable text for embedding into an operation failure.
    ///
    /// Remote failures yield the text dug out of the response body; every
    /// other error uses its display form.
    #[must_use]
    pub fn failure_message(&self) -> String {
        match self {
            Self::Remote(e) => e.message(),
            other => other.to_string(),
        }
    }

    /// Whether this error is one of the wrapped operation failures.
    #[must_use]
    pub const fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            Self::HostSetManageable { .. }
                | Self::HostIntrospect { .. }
                | Self::HostProvide { .. }
                | Self::HostSetPowerState { .. }
                | Self::HostDestroy { .. }
        )
    }
}
