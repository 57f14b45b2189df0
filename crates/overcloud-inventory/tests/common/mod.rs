//! Common test utilities for reconciliation integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use overcloud_core::Node;
use overcloud_inventory::{
    FilesystemEntry, InventoryError, InventoryResult, MemoryInventoryStore, RemoteShell,
    ServiceReconciler, SystemService,
};

/// Reconciler over an in-memory store holding one node.
pub struct TestInventory {
    pub store: Arc<MemoryInventoryStore>,
    pub reconciler: ServiceReconciler,
    pub node: Node,
}

impl TestInventory {
    pub fn new() -> Self {
        let store = Arc::new(MemoryInventoryStore::new());
        let reconciler = ServiceReconciler::new(store.clone());
        let node = Node::new("overcloud-controller-0", None);
        Self {
            store,
            reconciler,
            node,
        }
    }

    /// Record services on the node.
    pub fn services(&self, names: &[&str]) -> Vec<SystemService> {
        names
            .iter()
            .map(|name| {
                let service = SystemService::new(self.node.id.clone(), *name);
                self.store.insert_service(service.clone()).unwrap();
                service
            })
            .collect()
    }

    /// Record a file on the node.
    pub fn file(&self, path: &str, contents: Option<&str>) -> FilesystemEntry {
        let mut entry = FilesystemEntry::new(self.node.id.clone(), path);
        entry.contents = contents.map(str::to_owned);
        self.store.insert_filesystem(entry.clone()).unwrap();
        entry
    }
}

impl Default for TestInventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell answering every command with a fixed output, or failing.
pub struct FakeShell {
    output: Result<String, String>,
    commands: Mutex<Vec<String>>,
}

impl FakeShell {
    pub fn answering(output: &str) -> Self {
        Self {
            output: Ok(output.to_owned()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_owned()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn run(&self, command: &str) -> InventoryResult<String> {
        self.commands.lock().unwrap().push(command.to_owned());
        self.output.clone().map_err(InventoryError::shell)
    }
}
