//! Lifecycle operations against the manager's remote services.

use std::sync::Arc;

use overcloud_core::{Manager, Node, RefreshTrigger};
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::OperationsConfig;
use crate::error::{BoxError, ControlError, ControlResult};
use crate::queue::{NodeMethod, QueueRequest, TaskId, TaskOptions, TaskQueueGateway};
use crate::remote::{ExecutionState, ManagerConnector, RemoteError};
use crate::store::NodeStore;

use super::{INTROSPECT_WORKFLOW, PROVIDE_WORKFLOW};

const POWER_ON: &str = "power on";
const POWER_OFF: &str = "power off";
const MANAGE_ACTION: &str = "manage";

/// Builds the operation failure for an underlying error.
type WrapFailure = fn(String, BoxError) -> ControlError;

/// Drives node lifecycle transitions.
///
/// `request_*` methods queue a task and return its id. The remaining
/// operations are the task bodies, run by a worker through
/// [`dispatch`](Self::dispatch).
pub struct LifecycleController {
    nodes: Arc<dyn NodeStore>,
    connector: Arc<dyn ManagerConnector>,
    queue: Arc<dyn TaskQueueGateway>,
    refresh: Arc<dyn RefreshTrigger>,
    config: OperationsConfig,
}

impl LifecycleController {
    /// Create a new controller.
    #[must_use]
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        connector: Arc<dyn ManagerConnector>,
        queue: Arc<dyn TaskQueueGateway>,
        refresh: Arc<dyn RefreshTrigger>,
        config: OperationsConfig,
    ) -> Self {
        Self {
            nodes,
            connector,
            queue,
            refresh,
            config,
        }
    }

    fn request(&self, node: &Node, method: NodeMethod) -> QueueRequest {
        QueueRequest::for_node(
            node,
            method,
            &self.config.role,
            self.config.timeout_for(method),
        )
    }

    async fn queue_tracked(
        &self,
        request: QueueRequest,
        action: String,
        userid: &str,
    ) -> ControlResult<TaskId> {
        let method = request.method;
        let task_id = self
            .queue
            .submit_with_callback(TaskOptions::new(action, userid), request)
            .await?;

        info!(task_id = %task_id, method = %method, userid = %userid, "lifecycle task queued");
        Ok(task_id)
    }

    async fn manager_of(&self, node: &Node) -> ControlResult<Manager> {
        let manager_id = node
            .manager_id
            .as_ref()
            .ok_or_else(|| ControlError::NoManager(node.name.clone()))?;

        self.nodes
            .get_manager(manager_id)
            .await?
            .ok_or_else(|| ControlError::ManagerNotFound(manager_id.to_string()))
    }

    /// Queue a transition to the manageable state.
    pub async fn request_manage(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        let request = self.request(node, NodeMethod::Manage);
        self.queue_tracked(request, "Setting node to manageable".to_owned(), userid)
            .await
    }

    /// Queue hardware introspection.
    pub async fn request_introspect(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        let request = self.request(node, NodeMethod::Introspect);
        self.queue_tracked(request, "Introspect node".to_owned(), userid)
            .await
    }

    /// Queue a transition to the available state.
    pub async fn request_provide(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        let request = self.request(node, NodeMethod::Provide);
        self.queue_tracked(
            request,
            "Provide Host (Setting Host to available state)".to_owned(),
            userid,
        )
        .await
    }

    /// Queue a power on.
    pub async fn request_start(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        self.request_power_state(node, POWER_ON, userid).await
    }

    /// Queue a power off.
    pub async fn request_stop(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        self.request_power_state(node, POWER_OFF, userid).await
    }

    async fn request_power_state(
        &self,
        node: &Node,
        action: &str,
        userid: &str,
    ) -> ControlResult<TaskId> {
        let request = self.request(node, NodeMethod::SetPowerState).with_arg(action);
        self.queue_tracked(request, format!("Setting node power state: {action}"), userid)
            .await
    }

    /// Queue removal of the node from the manager.
    pub async fn request_destroy(&self, node: &Node, userid: &str) -> ControlResult<TaskId> {
        let request = self.request(node, NodeMethod::DestroyRemote);
        let action = format!(
            "Deleting Ironic node: {} for user {}",
            node.uid_ems, userid
        );
        self.queue_tracked(request, action, userid).await
    }

    /// Run a queued request against the node it targets.
    pub async fn dispatch(&self, request: &QueueRequest) -> ControlResult<()> {
        let node = self
            .nodes
            .get_node(&request.target.id)
            .await?
            .ok_or_else(|| ControlError::NodeNotFound(request.target.id.to_string()))?;

        match request.method {
            NodeMethod::Manage => self.manage(&node).await,
            NodeMethod::Introspect => self.introspect(&node).await,
            NodeMethod::Provide => self.provide(&node).await,
            NodeMethod::SetPowerState => {
                let action = request.str_arg(0).ok_or_else(|| {
                    ControlError::internal("set_power_state requires an action argument")
                })?;
                self.set_power_state(&node, action).await
            }
            NodeMethod::DestroyRemote => self.destroy_remote(&node).await,
            NodeMethod::DestroyLocal => self.destroy_local(&node).await,
        }
    }

    /// Ask the baremetal service to move the node to the manageable state.
    pub async fn manage(&self, node: &Node) -> ControlResult<()> {
        self.set_provision_state(node, MANAGE_ACTION)
            .await
            .map_err(|e| {
                failure(node, "manage", e, |message, source| {
                    ControlError::HostSetManageable { message, source }
                })
            })
    }

    async fn set_provision_state(&self, node: &Node, action: &str) -> ControlResult<()> {
        let manager = self.manager_of(node).await?;
        let service = self.connector.baremetal(&manager).await?;
        let status = service.set_node_provision_state(&node.name, action).await?;
        self.refresh_on(node, &manager, status, StatusCode::ACCEPTED)
            .await
    }

    /// Change the node's power state.
    pub async fn set_power_state(&self, node: &Node, action: &str) -> ControlResult<()> {
        self.change_power_state(node, action)
            .await
            .map_err(|e| {
                failure(node, "set_power_state", e, |message, source| {
                    ControlError::HostSetPowerState { message, source }
                })
            })
    }

    async fn change_power_state(&self, node: &Node, action: &str) -> ControlResult<()> {
        let manager = self.manager_of(node).await?;
        let service = self.connector.baremetal(&manager).await?;
        let status = service.set_node_power_state(&node.name, action).await?;
        self.refresh_on(node, &manager, status, StatusCode::ACCEPTED)
            .await
    }

    /// Queue a refresh when the service answered with the expected status.
    ///
    /// Error statuses fail; any other status is left alone.
    async fn refresh_on(
        &self,
        node: &Node,
        manager: &Manager,
        status: StatusCode,
        expected: StatusCode,
    ) -> ControlResult<()> {
        if status == expected {
            self.refresh.queue_refresh(manager).await?;
            info!(node = %node.name, status = %status, "transition accepted, refresh queued");
            return Ok(());
        }

        check_error_status(status)?;
        debug!(node = %node.name, status = %status, "unexpected status, nothing to do");
        Ok(())
    }

    /// Run hardware introspection and wait for it to finish.
    pub async fn introspect(&self, node: &Node) -> ControlResult<()> {
        self.run_workflow(node, INTROSPECT_WORKFLOW)
            .await
            .map_err(|e| {
                failure(node, "introspect", e, |message, source| {
                    ControlError::HostIntrospect { message, source }
                })
            })
    }

    /// Make the node available and wait for the workflow to finish.
    pub async fn provide(&self, node: &Node) -> ControlResult<()> {
        self.run_workflow(node, PROVIDE_WORKFLOW)
            .await
            .map_err(|e| {
                failure(node, "provide", e, |message, source| {
                    ControlError::HostProvide { message, source }
                })
            })
    }

    /// Start a workflow for the node and poll it until it leaves `RUNNING`.
    ///
    /// The worker is held for the whole run. Only a terminal `SUCCESS`
    /// queues a refresh.
    async fn run_workflow(&self, node: &Node, workflow: &str) -> ControlResult<()> {
        let manager = self.manager_of(node).await?;
        let service = self.connector.workflow(&manager).await?;

        let input = json!({ "node_uuids": [node.name] });
        let mut execution = service.create_execution(workflow, &input).await?;
        info!(node = %node.name, workflow = %workflow, execution = %execution.id, "workflow started");

        let mut polls: u32 = 0;
        while execution.state == ExecutionState::Running {
            tokio::time::sleep(self.config.poll_interval()).await;
            execution = service.get_execution(&execution.id).await?;
            polls += 1;
        }

        if execution.state == ExecutionState::Success {
            self.refresh.queue_refresh(&manager).await?;
            info!(node = %node.name, workflow = %workflow, polls, "workflow succeeded, refresh queued");
        } else {
            debug!(
                node = %node.name,
                workflow = %workflow,
                state = %execution.state,
                polls,
                "workflow ended without success, nothing to do"
            );
        }
        Ok(())
    }

    /// Delete the node on the manager.
    ///
    /// Archived nodes have no remote counterpart and are removed locally.
    /// After a successful remote delete the local record is removed by a
    /// separately queued task.
    pub async fn destroy_remote(&self, node: &Node) -> ControlResult<()> {
        if node.archived {
            return self.destroy_local(node).await.inspect_err(|e| {
                error!(node = %node.uid_ems, error = %e, "unable to destroy archived node");
            });
        }

        self.delete_remote(node).await.map_err(|e| {
            failure(node, "destroy_remote", e, |message, source| {
                ControlError::HostDestroy { message, source }
            })
        })
    }

    async fn delete_remote(&self, node: &Node) -> ControlResult<()> {
        let manager = self.manager_of(node).await?;
        let service = self.connector.baremetal(&manager).await?;
        let status = service.delete_node(&node.name).await?;

        if status == StatusCode::NO_CONTENT {
            let request = self.request(node, NodeMethod::DestroyLocal);
            let task_id = self.queue.submit(request).await?;
            info!(node = %node.uid_ems, task_id = %task_id, "remote node deleted, local removal queued");
            return Ok(());
        }

        check_error_status(status)?;
        debug!(node = %node.uid_ems, status = %status, "unexpected delete status, nothing to do");
        Ok(())
    }

    /// Remove the local node record.
    pub async fn destroy_local(&self, node: &Node) -> ControlResult<()> {
        self.nodes.destroy_node(&node.id).await?;
        info!(node = %node.name, "node record removed");
        Ok(())
    }

    /// Detach the node from its manager.
    ///
    /// The availability zone is cleared when no manager is given or the
    /// given manager owns the node.
    pub async fn disconnect_manager(
        &self,
        node: &Node,
        manager: Option<&Manager>,
    ) -> ControlResult<Node> {
        let mut node = node.clone();
        let owns = manager.map_or(true, |m| node.manager_id.as_ref() == Some(&m.id));
        if owns {
            node.availability_zone = None;
        }
        node.manager_id = None;

        self.nodes.update_node(&node).await?;
        info!(node = %node.name, "node disconnected from manager");
        Ok(node)
    }
}

/// Error statuses returned as plain responses are failures too.
fn check_error_status(status: StatusCode) -> ControlResult<()> {
    if status.is_client_error() || status.is_server_error() {
        return Err(RemoteError::Status {
            status,
            body: String::new(),
        }
        .into());
    }
    Ok(())
}

/// Log an operation failure and wrap it with the extracted message.
fn failure(node: &Node, operation: &str, e: ControlError, wrap: WrapFailure) -> ControlError {
    error!(node = %node.name, operation = %operation, error = %e, "lifecycle operation failed");
    let message = e.failure_message();
    wrap(message, Box::new(e))
}
