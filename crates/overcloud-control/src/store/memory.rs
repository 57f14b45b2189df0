//! In-memory node store for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use overcloud_core::{Manager, ManagerId, Node, NodeId};

use crate::error::{ControlError, ControlResult};

use super::NodeStore;

/// In-memory node store for testing.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: RwLock<HashMap<NodeId, Node>>,
    managers: RwLock<HashMap<ManagerId, Manager>>,
}

impl MemoryNodeStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, node: Node) -> ControlResult<()> {
        self.nodes
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?
            .insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert or replace a manager.
    pub fn insert_manager(&self, manager: Manager) -> ControlResult<()> {
        self.managers
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?
            .insert(manager.id.clone(), manager);
        Ok(())
    }

    /// Number of stored nodes.
    pub fn node_count(&self) -> ControlResult<usize> {
        self.nodes
            .read()
            .map(|nodes| nodes.len())
            .map_err(|_| ControlError::internal("lock poisoned"))
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn get_node(&self, id: &NodeId) -> ControlResult<Option<Node>> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| ControlError::internal("lock poisoned"))?;
        Ok(nodes.get(id).cloned())
    }

    async fn get_manager(&self, id: &ManagerId) -> ControlResult<Option<Manager>> {
        let managers = self
            .managers
            .read()
            .map_err(|_| ControlError::internal("lock poisoned"))?;
        Ok(managers.get(id).cloned())
    }

    async fn update_node(&self, node: &Node) -> ControlResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?;

        let existing = nodes
            .get_mut(&node.id)
            .ok_or_else(|| ControlError::NodeNotFound(node.id.to_string()))?;

        *existing = node.clone();
        existing.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn destroy_node(&self, id: &NodeId) -> ControlResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?;

        nodes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ControlError::NodeNotFound(id.to_string()))
    }
}
