//! Task queue gateway.
//!
//! Lifecycle requests never run inline. Each one becomes a [`QueueRequest`]
//! naming the node method to run later on a task worker. The queue itself
//! belongs to the embedding application and is reached through
//! [`TaskQueueGateway`]. [`MemoryTaskQueue`] is a single-process
//! implementation.

mod memory;

pub use memory::MemoryTaskQueue;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use overcloud_core::{Node, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ControlResult;

/// Target class used for node tasks.
pub const HOST_CLASS: &str = "Host";

/// Unique identifier for a queued task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique task ID using ULID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node methods that can be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMethod {
    /// Move the node to the manageable state.
    Manage,
    /// Run hardware introspection.
    Introspect,
    /// Make the node available for deployment.
    Provide,
    /// Change the power state; takes the target action as its only argument.
    SetPowerState,
    /// Delete the node on the manager.
    DestroyRemote,
    /// Delete the local node record.
    DestroyLocal,
}

impl NodeMethod {
    /// Method name as written into queue records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manage => "manage",
            Self::Introspect => "introspect",
            Self::Provide => "provide",
            Self::SetPowerState => "set_power_state",
            Self::DestroyRemote => "destroy_remote",
            Self::DestroyLocal => "destroy_local",
        }
    }
}

impl fmt::Display for NodeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue priority. Higher priorities are dequeued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// User-initiated operations.
    High,
}

/// The object a task runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskTarget {
    /// Class name of the target.
    pub class: String,
    /// Target identifier.
    pub id: NodeId,
}

impl TaskTarget {
    /// Target a node.
    #[must_use]
    pub fn host(id: &NodeId) -> Self {
        Self {
            class: HOST_CLASS.to_owned(),
            id: id.clone(),
        }
    }
}

impl fmt::Display for TaskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.id)
    }
}

/// Tracked task reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    /// Human-readable description of the action.
    pub action: String,
    /// User that requested the action.
    pub userid: String,
}

impl TaskOptions {
    /// Create task options.
    #[must_use]
    pub fn new(action: impl Into<String>, userid: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            userid: userid.into(),
        }
    }
}

/// Completion hook attached to a request with a tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCallback {
    /// Tracked task to update.
    pub task_id: TaskId,
    /// Action text of the tracked task.
    pub action: String,
    /// User that requested the action.
    pub userid: String,
}

/// A unit of queued work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRequest {
    /// Request identifier.
    pub id: TaskId,
    /// Object to run against.
    pub target: TaskTarget,
    /// Method to invoke on the target.
    pub method: NodeMethod,
    /// Ordered positional arguments.
    pub args: Vec<Value>,
    /// Queue priority.
    pub priority: Priority,
    /// Role of the workers allowed to run the task.
    pub role: String,
    /// Execution zone.
    pub zone: Option<String>,
    /// Maximum run time once started.
    pub timeout: Duration,
    /// Completion hook, set when the request has a tracked task.
    pub callback: Option<TaskCallback>,
}

impl QueueRequest {
    /// Build a request for a node method with no arguments.
    #[must_use]
    pub fn for_node(node: &Node, method: NodeMethod, role: &str, timeout: Duration) -> Self {
        Self {
            id: TaskId::generate(),
            target: TaskTarget::host(&node.id),
            method,
            args: Vec::new(),
            priority: Priority::High,
            role: role.to_owned(),
            zone: node.zone.clone(),
            timeout,
            callback: None,
        }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Positional argument at `index`, if it is a string.
    #[must_use]
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }
}

/// Status of a queued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a worker.
    Queued,
    /// Running on a worker.
    Running,
    /// Finished successfully.
    Finished,
    /// Finished with an error.
    Failed {
        /// Error message.
        message: String,
    },
}

impl TaskStatus {
    /// Whether the task has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed { .. })
    }
}

/// A tracked task as seen by the requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: TaskId,
    /// Action text.
    pub action: String,
    /// Requesting user.
    pub userid: String,
    /// Current status.
    pub status: TaskStatus,
}

/// Submission side of the task queue.
#[async_trait]
pub trait TaskQueueGateway: Send + Sync {
    /// Queue a request. Returns the request id.
    async fn submit(&self, request: QueueRequest) -> ControlResult<TaskId>;

    /// Queue a request together with a tracked task that is updated when
    /// the request completes. Returns the tracked task id.
    async fn submit_with_callback(
        &self,
        options: TaskOptions,
        request: QueueRequest,
    ) -> ControlResult<TaskId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_for_node() {
        let mut node = Node::new("node-0", None);
        node.zone = Some("default".to_owned());

        let request = QueueRequest::for_node(
            &node,
            NodeMethod::SetPowerState,
            "ems_operations",
            Duration::from_secs(600),
        )
        .with_arg("power on");

        assert_eq!(request.target.class, "Host");
        assert_eq!(request.target.id, node.id);
        assert_eq!(request.priority, Priority::High);
        assert_eq!(request.zone.as_deref(), Some("default"));
        assert_eq!(request.str_arg(0), Some("power on"));
        assert!(request.callback.is_none());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn method_names() {
        assert_eq!(NodeMethod::DestroyLocal.to_string(), "destroy_local");
        assert_eq!(NodeMethod::SetPowerState.as_str(), "set_power_state");
    }
}
