//! In-memory task queue.
//!
//! The queue is single-flight per target: a request is never handed to a
//! worker while another request for the same target is running. Blocked
//! requests keep their place and are dispatched once the running one
//! reaches a terminal status.

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info};

use crate::error::{ControlError, ControlResult};

use super::{
    QueueRequest, TaskCallback, TaskId, TaskOptions, TaskQueueGateway, TaskRecord, TaskStatus,
    TaskTarget,
};

/// Task queue holding pending and running node tasks.
///
/// Status and tracking data of finished tasks is retained for the most
/// recent `max_size` terminal tasks; older ones are evicted as new tasks
/// finish. [`forget`](Self::forget) drops a finished task early.
pub struct MemoryTaskQueue {
    pending: RwLock<VecDeque<QueueRequest>>,
    running: DashMap<TaskTarget, TaskId>,
    statuses: DashMap<TaskId, TaskStatus>,
    tracked: DashMap<TaskId, TaskOptions>,
    finished: Mutex<VecDeque<TaskId>>,
    max_size: usize,
    notify: Notify,
}

impl MemoryTaskQueue {
    /// Create a new queue with the specified maximum number of pending tasks.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            pending: RwLock::new(VecDeque::new()),
            running: DashMap::new(),
            statuses: DashMap::new(),
            tracked: DashMap::new(),
            finished: Mutex::new(VecDeque::new()),
            max_size,
            notify: Notify::new(),
        }
    }

    async fn enqueue(&self, request: QueueRequest) -> ControlResult<TaskId> {
        let id = request.id.clone();
        let method = request.method;
        let target = request.target.clone();

        {
            let mut pending = self.pending.write().await;
            if pending.len() >= self.max_size {
                return Err(ControlError::QueueFull);
            }
            self.statuses.insert(id.clone(), TaskStatus::Queued);
            pending.push_back(request);
        }

        self.notify.notify_one();

        info!(task_id = %id, method = %method, target = %target, "task queued");
        Ok(id)
    }

    /// Remove the highest-priority request whose target is idle.
    fn take_dispatchable(&self, pending: &mut VecDeque<QueueRequest>) -> Option<QueueRequest> {
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, r)| !self.running.contains_key(&r.target))
            .max_by_key(|(i, r)| (r.priority, Reverse(*i)))
            .map(|(i, _)| i)?;

        let request = pending.remove(index)?;
        self.running
            .insert(request.target.clone(), request.id.clone());
        self.statuses.insert(request.id.clone(), TaskStatus::Running);

        debug!(task_id = %request.id, target = %request.target, "task dequeued");
        Some(request)
    }

    /// Wait for the next dispatchable request.
    ///
    /// Called by task workers. The request is marked running and its target
    /// stays blocked until [`update_status`](Self::update_status) records a
    /// terminal status.
    pub async fn next(&self) -> QueueRequest {
        loop {
            {
                let mut pending = self.pending.write().await;
                if let Some(request) = self.take_dispatchable(&mut pending) {
                    if !pending.is_empty() {
                        self.notify.notify_one();
                    }
                    return request;
                }
            }

            self.notify.notified().await;
        }
    }

    /// Take the next dispatchable request without blocking.
    pub async fn try_next(&self) -> Option<QueueRequest> {
        let mut pending = self.pending.write().await;
        self.take_dispatchable(&mut pending)
    }

    /// Update the status of a task.
    ///
    /// A terminal status releases the task's target and may evict the
    /// oldest finished task.
    pub fn update_status(&self, id: &TaskId, status: TaskStatus) {
        let is_terminal = status.is_terminal();
        let previous = self.statuses.insert(id.clone(), status);

        if is_terminal {
            self.running.retain(|_, task_id| task_id != id);
            if !previous.is_some_and(|p| p.is_terminal()) {
                self.retain_finished(id);
            }
            self.notify.notify_one();
        }
    }

    fn retain_finished(&self, id: &TaskId) {
        let mut finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        finished.push_back(id.clone());
        while finished.len() > self.max_size {
            if let Some(evicted) = finished.pop_front() {
                self.statuses.remove(&evicted);
                self.tracked.remove(&evicted);
                debug!(task_id = %evicted, "finished task evicted");
            }
        }
    }

    /// Drop the status and tracking data of a finished task.
    ///
    /// Returns `false` if the task is unknown or has not finished yet.
    pub fn forget(&self, id: &TaskId) -> bool {
        if self.statuses.remove_if(id, |_, s| s.is_terminal()).is_none() {
            return false;
        }
        self.tracked.remove(id);
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|task_id| task_id != id);
        true
    }

    /// Get the current status of a task.
    #[must_use]
    pub fn status(&self, id: &TaskId) -> Option<TaskStatus> {
        self.statuses.get(id).map(|s| s.clone())
    }

    /// Get a tracked task.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<TaskRecord> {
        let options = self.tracked.get(id)?;
        Some(TaskRecord {
            id: id.clone(),
            action: options.action.clone(),
            userid: options.userid.clone(),
            status: self.status(id).unwrap_or(TaskStatus::Queued),
        })
    }

    /// Snapshot of the pending requests in queue order.
    pub async fn pending(&self) -> Vec<QueueRequest> {
        self.pending.read().await.iter().cloned().collect()
    }

    /// Get the number of pending tasks.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Get the number of running tasks.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Check whether a target has a running task.
    #[must_use]
    pub fn is_running(&self, target: &TaskTarget) -> bool {
        self.running.contains_key(target)
    }
}

#[async_trait]
impl TaskQueueGateway for MemoryTaskQueue {
    async fn submit(&self, request: QueueRequest) -> ControlResult<TaskId> {
        self.enqueue(request).await
    }

    async fn submit_with_callback(
        &self,
        options: TaskOptions,
        mut request: QueueRequest,
    ) -> ControlResult<TaskId> {
        let task_id = request.id.clone();
        request.callback = Some(TaskCallback {
            task_id: task_id.clone(),
            action: options.action.clone(),
            userid: options.userid.clone(),
        });

        self.tracked.insert(task_id.clone(), options);
        if let Err(e) = self.enqueue(request).await {
            self.tracked.remove(&task_id);
            return Err(e);
        }
        Ok(task_id)
    }
}
