//! Embedded lifecycle service.
//!
//! Wires the in-memory queue, the lifecycle controller and a pool of task
//! workers together for applications that do not bring their own queue.

mod worker;

pub use worker::TaskWorker;

use std::sync::Arc;

use overcloud_core::RefreshTrigger;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ControlConfig;
use crate::error::ControlResult;
use crate::lifecycle::LifecycleController;
use crate::queue::{MemoryTaskQueue, TaskQueueGateway};
use crate::remote::{HttpManagerConnector, ManagerConnector};
use crate::store::NodeStore;

/// Running lifecycle service.
pub struct ControlService {
    queue: Arc<MemoryTaskQueue>,
    controller: Arc<LifecycleController>,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl ControlService {
    /// Start the service with the given collaborators.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(
        config: &ControlConfig,
        nodes: Arc<dyn NodeStore>,
        connector: Arc<dyn ManagerConnector>,
        refresh: Arc<dyn RefreshTrigger>,
    ) -> Self {
        let queue = Arc::new(MemoryTaskQueue::new(config.queue.max_size));
        info!(max_size = config.queue.max_size, "task queue initialised");

        let gateway: Arc<dyn TaskQueueGateway> = queue.clone();
        let controller = Arc::new(LifecycleController::new(
            nodes,
            connector,
            gateway,
            refresh,
            config.operations.clone(),
        ));

        let cancel = CancellationToken::new();
        let workers = spawn_workers(config.queue.workers, &queue, &controller, &cancel);
        info!(count = config.queue.workers, "task workers started");

        Self {
            queue,
            controller,
            cancel,
            workers,
        }
    }

    /// Start the service talking HTTP to each manager's endpoints.
    pub fn with_http(
        config: &ControlConfig,
        nodes: Arc<dyn NodeStore>,
        refresh: Arc<dyn RefreshTrigger>,
    ) -> ControlResult<Self> {
        let connector = Arc::new(HttpManagerConnector::new(&config.remote)?);
        Ok(Self::start(config, nodes, connector, refresh))
    }

    /// The lifecycle controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    /// The task queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<MemoryTaskQueue> {
        &self.queue
    }

    /// Stop the workers once their current task is done.
    pub async fn shutdown(self) {
        info!("waiting for task workers to finish");
        self.cancel.cancel();

        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task failed");
            }
        }

        info!("lifecycle service shutdown complete");
    }
}

fn spawn_workers(
    count: usize,
    queue: &Arc<MemoryTaskQueue>,
    controller: &Arc<LifecycleController>,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(count);
    for id in 0..count {
        let worker = TaskWorker::new(id, Arc::clone(queue), Arc::clone(controller));
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            worker.run(cancel).await;
        }));
    }
    handles
}
