//! Inventory refresh trigger.
//!
//! Both the lifecycle controller and the reconciliation engine hand off to an
//! external refresh scheduler once the manager is known to hold new state.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::types::{Manager, ManagerId};

/// Schedules an asynchronous inventory refresh of a manager.
///
/// Implementations must return as soon as the refresh is queued. The caller
/// never waits for the refresh itself.
#[async_trait]
pub trait RefreshTrigger: Send + Sync {
    /// Queue a refresh of everything the manager owns.
    async fn queue_refresh(&self, manager: &Manager) -> CoreResult<()>;
}

/// Refresh trigger that only records which managers were queued.
#[derive(Debug, Default)]
pub struct RecordingRefresh {
    queued: Mutex<Vec<ManagerId>>,
}

impl RecordingRefresh {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Managers queued so far, oldest first.
    pub fn queued(&self) -> CoreResult<Vec<ManagerId>> {
        self.queued
            .lock()
            .map(|q| q.clone())
            .map_err(|_| CoreError::internal("lock poisoned"))
    }

    /// Number of refreshes queued so far.
    pub fn count(&self) -> CoreResult<usize> {
        self.queued().map(|q| q.len())
    }
}

#[async_trait]
impl RefreshTrigger for RecordingRefresh {
    async fn queue_refresh(&self, manager: &Manager) -> CoreResult<()> {
        self.queued
            .lock()
            .map_err(|_| CoreError::internal("lock poisoned"))?
            .push(manager.id.clone());
        Ok(())
    }
}
