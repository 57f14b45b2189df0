//! Clients for the manager's remote services.
//!
//! A manager exposes two services. The baremetal service answers node
//! provision, power and delete requests synchronously with an HTTP status.
//! The workflow service runs long operations (introspection, provisioning)
//! as executions that are started once and then polled by id.

mod http;

pub use http::{HttpManagerConnector, IronicClient, MistralClient};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use overcloud_core::Manager;
use reqwest::StatusCode;
use serde_json::Value;

/// Result type alias using [`RemoteError`].
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors returned by remote service clients.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a 4xx or 5xx status.
    #[error("remote returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The manager does not expose the requested service.
    #[error("manager {manager} has no {service} endpoint")]
    MissingEndpoint {
        /// Manager name.
        manager: String,
        /// Service kind.
        service: &'static str,
    },
}

impl RemoteError {
    /// Human-readable text for this failure.
    ///
    /// For error statuses the text is taken from the response body via
    /// [`error_message`], falling back to the status itself.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { status, body } => {
                let message = error_message(body);
                if message.is_empty() {
                    status.to_string()
                } else {
                    message
                }
            }
            other => other.to_string(),
        }
    }
}

/// Extract the human text from an error response body.
///
/// Bodies are tried as JSON in this order: `error_message` (itself often a
/// JSON document carrying a `faultstring`), a top-level `faultstring`,
/// `message`, then `title`. Anything else yields the trimmed body.
#[must_use]
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_owned();
    };

    if let Some(inner) = value.get("error_message") {
        let inner = match inner {
            Value::String(text) => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
            other => other.clone(),
        };
        if let Some(fault) = inner.get("faultstring").and_then(Value::as_str) {
            return fault.to_owned();
        }
        if let Some(text) = inner.as_str() {
            return text.to_owned();
        }
    }

    ["faultstring", "message", "title"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map_or_else(|| body.trim().to_owned(), ToOwned::to_owned)
}

/// State of a workflow execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    /// Still running; poll again.
    Running,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Error,
    /// Any other state reported by the service.
    Other(String),
}

impl ExecutionState {
    /// Parse a state string as reported by the workflow service.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "RUNNING" => Self::Running,
            "SUCCESS" => Self::Success,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Whether the execution has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Error => write!(f, "ERROR"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A workflow execution handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Execution identifier.
    pub id: String,
    /// Current state.
    pub state: ExecutionState,
}

impl Execution {
    /// Create an execution handle.
    #[must_use]
    pub fn new(id: impl Into<String>, state: ExecutionState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }
}

/// Synchronous node operations on the baremetal service.
///
/// Every call returns the HTTP status of the response. Transport failures and
/// error statuses surface as [`RemoteError`]s.
#[async_trait]
pub trait BaremetalService: Send + Sync {
    /// Request a provision state transition (e.g. "manage").
    async fn set_node_provision_state(&self, node: &str, action: &str)
        -> RemoteResult<StatusCode>;

    /// Request a power state change (e.g. "power on").
    async fn set_node_power_state(&self, node: &str, action: &str) -> RemoteResult<StatusCode>;

    /// Delete the node from the baremetal service.
    async fn delete_node(&self, node: &str) -> RemoteResult<StatusCode>;
}

/// Asynchronous workflow executions.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Start a workflow with the given input.
    async fn create_execution(&self, workflow: &str, input: &Value) -> RemoteResult<Execution>;

    /// Fetch the current state of an execution.
    async fn get_execution(&self, id: &str) -> RemoteResult<Execution>;
}

/// Resolves service handles for a manager.
#[async_trait]
pub trait ManagerConnector: Send + Sync {
    /// Baremetal service of the manager.
    async fn baremetal(&self, manager: &Manager) -> RemoteResult<Arc<dyn BaremetalService>>;

    /// Workflow service of the manager.
    async fn workflow(&self, manager: &Manager) -> RemoteResult<Arc<dyn WorkflowService>>;
}
