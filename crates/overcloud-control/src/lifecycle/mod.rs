//! Node lifecycle state machine.
//!
//! The manager is the source of truth for a node's state. The controller
//! only requests transitions and asks for an inventory refresh once the
//! manager reports that a transition has been accepted or completed:
//!
//! ```text
//!  enroll ──manage──▶ manageable ──introspect──▶ manageable
//!                         │
//!                         └──provide──▶ available ──(deploy)──▶ active
//!
//!  any non-active ──destroy_remote──▶ deleted ──destroy_local──▶ (gone)
//! ```
//!
//! Every `request_*` call only queues work. The matching operation runs
//! later on a task worker.

mod controller;
mod validate;

pub use controller::LifecycleController;
pub use validate::{
    validate_destroy, validate_set_node_maintenance, validate_start, validate_stop,
    validate_unset_node_maintenance,
};

use serde::Serialize;

/// Workflow that inspects a node's hardware.
pub const INTROSPECT_WORKFLOW: &str = "tripleo.baremetal.v1.introspect";

/// Workflow that makes a node available for deployment.
pub const PROVIDE_WORKFLOW: &str = "tripleo.baremetal.v1.provide";

/// Whether an operation may be requested, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Whether the operation is allowed.
    pub available: bool,
    /// Reason shown when it is not.
    pub message: Option<String>,
}

impl Availability {
    /// The operation is allowed.
    #[must_use]
    pub const fn available() -> Self {
        Self {
            available: true,
            message: None,
        }
    }

    /// The operation is refused for the given reason.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: Some(message.into()),
        }
    }
}
