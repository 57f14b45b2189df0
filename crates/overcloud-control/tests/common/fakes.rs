//! Scripted fakes of the manager's remote services.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use overcloud_control::remote::{
    BaremetalService, Execution, ExecutionState, ManagerConnector, RemoteError, RemoteResult,
    WorkflowService,
};
use overcloud_core::Manager;
use reqwest::StatusCode;
use serde_json::Value;

/// A recorded baremetal call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaremetalCall {
    Provision { node: String, action: String },
    Power { node: String, action: String },
    Delete { node: String },
}

/// Baremetal service answering every call with the next scripted response.
///
/// Once the script is exhausted every call answers `202 Accepted`
/// (or `204 No Content` for deletes).
pub struct FakeBaremetal {
    responses: Mutex<VecDeque<RemoteResult<StatusCode>>>,
    calls: Mutex<Vec<BaremetalCall>>,
}

impl FakeBaremetal {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a plain status response.
    pub fn respond(&self, status: StatusCode) {
        self.responses.lock().unwrap().push_back(Ok(status));
    }

    /// Queue an error response with the given body.
    pub fn fail(&self, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::Status {
                status,
                body: body.to_owned(),
            }));
    }

    pub fn calls(&self) -> Vec<BaremetalCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: BaremetalCall, default: StatusCode) -> RemoteResult<StatusCode> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(default))
    }
}

#[async_trait]
impl BaremetalService for FakeBaremetal {
    async fn set_node_provision_state(
        &self,
        node: &str,
        action: &str,
    ) -> RemoteResult<StatusCode> {
        self.answer(
            BaremetalCall::Provision {
                node: node.to_owned(),
                action: action.to_owned(),
            },
            StatusCode::ACCEPTED,
        )
    }

    async fn set_node_power_state(&self, node: &str, action: &str) -> RemoteResult<StatusCode> {
        self.answer(
            BaremetalCall::Power {
                node: node.to_owned(),
                action: action.to_owned(),
            },
            StatusCode::ACCEPTED,
        )
    }

    async fn delete_node(&self, node: &str) -> RemoteResult<StatusCode> {
        self.answer(
            BaremetalCall::Delete {
                node: node.to_owned(),
            },
            StatusCode::NO_CONTENT,
        )
    }
}

/// Workflow service replaying a scripted sequence of execution states.
///
/// The first state is returned by `create_execution`, each later one by a
/// `get_execution` call.
pub struct FakeWorkflow {
    states: Mutex<VecDeque<ExecutionState>>,
    started: Mutex<Vec<(String, Value)>>,
    polls: AtomicUsize,
    create_error: Mutex<Option<RemoteError>>,
    poll_error: Mutex<Option<RemoteError>>,
}

impl FakeWorkflow {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(VecDeque::new()),
            started: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            create_error: Mutex::new(None),
            poll_error: Mutex::new(None),
        }
    }

    /// Script the states the execution goes through.
    pub fn script(&self, states: &[&str]) {
        *self.states.lock().unwrap() = states.iter().map(|s| ExecutionState::parse(s)).collect();
    }

    /// Make the next `create_execution` fail.
    pub fn fail_create(&self, error: RemoteError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    /// Make the next `get_execution` fail.
    pub fn fail_poll(&self, error: RemoteError) {
        *self.poll_error.lock().unwrap() = Some(error);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<(String, Value)> {
        self.started.lock().unwrap().clone()
    }

    fn next_state(&self) -> ExecutionState {
        self.states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ExecutionState::Success)
    }
}

#[async_trait]
impl WorkflowService for FakeWorkflow {
    async fn create_execution(&self, workflow: &str, input: &Value) -> RemoteResult<Execution> {
        if let Some(error) = self.create_error.lock().unwrap().take() {
            return Err(error);
        }
        self.started
            .lock()
            .unwrap()
            .push((workflow.to_owned(), input.clone()));
        Ok(Execution::new("execution-1", self.next_state()))
    }

    async fn get_execution(&self, id: &str) -> RemoteResult<Execution> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.poll_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(Execution::new(id, self.next_state()))
    }
}

/// Connector handing out the same fakes for every manager.
pub struct FakeConnector {
    baremetal: Arc<FakeBaremetal>,
    workflow: Arc<FakeWorkflow>,
}

impl FakeConnector {
    pub fn new(baremetal: Arc<FakeBaremetal>, workflow: Arc<FakeWorkflow>) -> Self {
        Self {
            baremetal,
            workflow,
        }
    }
}

#[async_trait]
impl ManagerConnector for FakeConnector {
    async fn baremetal(&self, _manager: &Manager) -> RemoteResult<Arc<dyn BaremetalService>> {
        Ok(self.baremetal.clone())
    }

    async fn workflow(&self, _manager: &Manager) -> RemoteResult<Arc<dyn WorkflowService>> {
        Ok(self.workflow.clone())
    }
}
