//! Node and manager storage.
//!
//! Persistence lives outside this crate. The controller only needs to look
//! nodes and managers up, save node changes and drop a node record once the
//! remote resource is gone. An in-memory implementation is provided for
//! testing and embedding.

mod memory;

pub use memory::MemoryNodeStore;

use async_trait::async_trait;
use overcloud_core::{Manager, ManagerId, Node, NodeId};

use crate::error::ControlResult;

/// Storage backend for nodes and their managers.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get a node by ID.
    async fn get_node(&self, id: &NodeId) -> ControlResult<Option<Node>>;

    /// Get a manager by ID.
    async fn get_manager(&self, id: &ManagerId) -> ControlResult<Option<Manager>>;

    /// Save changes to an existing node.
    async fn update_node(&self, node: &Node) -> ControlResult<()>;

    /// Remove a node record and everything it owns.
    async fn destroy_node(&self, id: &NodeId) -> ControlResult<()>;
}
