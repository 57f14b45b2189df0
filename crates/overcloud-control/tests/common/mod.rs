//! Common test utilities for lifecycle integration tests.

pub mod fakes;

use std::sync::Arc;

use overcloud_control::config::OperationsConfig;
use overcloud_control::{LifecycleController, MemoryNodeStore, MemoryTaskQueue};
use overcloud_core::{Manager, Node, RecordingRefresh};

use fakes::{FakeBaremetal, FakeConnector, FakeWorkflow};

/// Controller wired to in-memory collaborators and fake remote services.
pub struct TestControl {
    pub store: Arc<MemoryNodeStore>,
    pub queue: Arc<MemoryTaskQueue>,
    pub refresh: Arc<RecordingRefresh>,
    pub baremetal: Arc<FakeBaremetal>,
    pub workflow: Arc<FakeWorkflow>,
    pub connector: Arc<FakeConnector>,
    pub controller: LifecycleController,
    pub manager: Manager,
    pub node: Node,
}

impl TestControl {
    /// Creates a controller with one manager owning one node.
    pub fn new() -> Self {
        Self::with_node(|node| node)
    }

    /// Creates a controller whose node is adjusted by `f` before it is stored.
    pub fn with_node(f: impl FnOnce(Node) -> Node) -> Self {
        let store = Arc::new(MemoryNodeStore::new());
        let queue = Arc::new(MemoryTaskQueue::new(100));
        let refresh = Arc::new(RecordingRefresh::new());
        let baremetal = Arc::new(FakeBaremetal::new());
        let workflow = Arc::new(FakeWorkflow::new());
        let connector = Arc::new(FakeConnector::new(baremetal.clone(), workflow.clone()));

        let manager = Manager::new("undercloud")
            .with_endpoints("http://undercloud:6385", "http://undercloud:8989");
        let mut node = f(Node::new("overcloud-compute-0", Some(manager.id.clone())));
        node.zone = Some("default".to_owned());

        store.insert_manager(manager.clone()).unwrap();
        store.insert_node(node.clone()).unwrap();

        let controller = LifecycleController::new(
            store.clone(),
            connector.clone(),
            queue.clone(),
            refresh.clone(),
            OperationsConfig::default(),
        );

        Self {
            store,
            queue,
            refresh,
            baremetal,
            workflow,
            connector,
            controller,
            manager,
            node,
        }
    }

    /// Number of refreshes queued so far.
    pub fn refreshes(&self) -> usize {
        self.refresh.count().unwrap()
    }
}

impl Default for TestControl {
    fn default() -> Self {
        Self::new()
    }
}
