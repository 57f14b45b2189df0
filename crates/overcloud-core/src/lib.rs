//! Shared entities for overcloud host management.
//!
//! Lifecycle control and inventory reconciliation only meet at two points:
//! the node (and its owning manager) and the trigger that asks an external
//! scheduler to refresh a manager's inventory. Both live here.

#![forbid(unsafe_code)]

pub mod error;
pub mod refresh;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use refresh::{RecordingRefresh, RefreshTrigger};
pub use types::{Hardware, Manager, ManagerEndpoints, ManagerId, Node, NodeId};
