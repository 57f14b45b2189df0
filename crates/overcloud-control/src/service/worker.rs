//! Task worker implementation.
//!
//! Executes queued node methods against the lifecycle controller.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::ControlError;
use crate::lifecycle::LifecycleController;
use crate::queue::{MemoryTaskQueue, QueueRequest, TaskStatus};

/// Worker that takes requests from the queue and runs them.
pub struct TaskWorker {
    id: usize,
    queue: Arc<MemoryTaskQueue>,
    controller: Arc<LifecycleController>,
}

impl TaskWorker {
    /// Create a new task worker.
    #[must_use]
    pub fn new(
        id: usize,
        queue: Arc<MemoryTaskQueue>,
        controller: Arc<LifecycleController>,
    ) -> Self {
        Self {
            id,
            queue,
            controller,
        }
    }

    /// Run the worker loop until the cancellation token is triggered.
    ///
    /// A task that has started always runs to completion or to its timeout.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(worker_id = self.id, "task worker started");

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!(worker_id = self.id, "task worker shutting down");
                    break;
                }

                request = self.queue.next() => {
                    self.process(request).await;
                }
            }
        }

        info!(worker_id = self.id, "task worker stopped");
    }

    /// Run one request and record its outcome on the queue.
    pub async fn process(&self, request: QueueRequest) {
        info!(
            worker_id = self.id,
            task_id = %request.id,
            method = %request.method,
            target = %request.target,
            "starting task"
        );

        let result = tokio::time::timeout(request.timeout, self.controller.dispatch(&request))
            .await
            .unwrap_or_else(|_| {
                Err(ControlError::Timeout {
                    secs: request.timeout.as_secs(),
                })
            });

        let status = match result {
            Ok(()) => {
                info!(task_id = %request.id, method = %request.method, "task finished");
                TaskStatus::Finished
            }
            Err(e) => {
                error!(task_id = %request.id, method = %request.method, error = %e, "task failed");
                TaskStatus::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.queue.update_status(&request.id, status);
    }
}
