//! HTTP clients for the baremetal and workflow services.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use overcloud_core::Manager;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{ControlError, ControlResult};

use super::{
    BaremetalService, Execution, ExecutionState, ManagerConnector, RemoteError, RemoteResult,
    WorkflowService,
};

const API_VERSION_HEADER: &str = "X-OpenStack-Ironic-API-Version";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Raw execution response from the workflow API.
#[derive(serde::Deserialize)]
struct RawExecution {
    id: String,
    state: String,
}

impl From<RawExecution> for Execution {
    fn from(raw: RawExecution) -> Self {
        Self::new(raw.id, ExecutionState::parse(&raw.state))
    }
}

/// Turn error statuses into [`RemoteError::Status`], keeping the body.
async fn check_status(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::Status { status, body });
    }
    Ok(response)
}

fn with_token(request: RequestBuilder, token: Option<&SecretString>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTH_TOKEN_HEADER, token.expose_secret()),
        None => request,
    }
}

/// HTTP client for an Ironic-style baremetal API.
#[derive(Debug, Clone)]
pub struct IronicClient {
    client: Client,
    base_url: String,
    api_version: String,
    auth_token: Option<SecretString>,
}

impl IronicClient {
    /// Create a client for the given base URL.
    #[must_use]
    pub fn new(client: Client, base_url: &str, config: &RemoteConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_version: config.baremetal_api_version.clone(),
            auth_token: config.auth_token.clone().map(SecretString::from),
        }
    }

    fn node_url(&self, node: &str) -> String {
        format!("{}/v1/nodes/{}", self.base_url, node)
    }

    async fn put_state(&self, node: &str, kind: &str, target: &str) -> RemoteResult<StatusCode> {
        let url = format!("{}/states/{}", self.node_url(node), kind);
        let request = self
            .client
            .put(&url)
            .header(API_VERSION_HEADER, &self.api_version)
            .json(&json!({ "target": target }));

        let response = with_token(request, self.auth_token.as_ref())
            .send()
            .await?;
        let status = check_status(response).await?.status();

        debug!(node = %node, kind = %kind, target = %target, status = %status, "state change requested");
        Ok(status)
    }
}

#[async_trait]
impl BaremetalService for IronicClient {
    async fn set_node_provision_state(
        &self,
        node: &str,
        action: &str,
    ) -> RemoteResult<StatusCode> {
        self.put_state(node, "provision", action).await
    }

    async fn set_node_power_state(&self, node: &str, action: &str) -> RemoteResult<StatusCode> {
        self.put_state(node, "power", action).await
    }

    async fn delete_node(&self, node: &str) -> RemoteResult<StatusCode> {
        let request = self
            .client
            .delete(self.node_url(node))
            .header(API_VERSION_HEADER, &self.api_version);

        let response = with_token(request, self.auth_token.as_ref())
            .send()
            .await?;
        Ok(check_status(response).await?.status())
    }
}

/// HTTP client for a Mistral-style workflow API.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl MistralClient {
    /// Create a client for the given base URL.
    #[must_use]
    pub fn new(client: Client, base_url: &str, config: &RemoteConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_token: config.auth_token.clone().map(SecretString::from),
        }
    }

    async fn decode(response: Response) -> RemoteResult<Execution> {
        let raw: RawExecution = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(raw.into())
    }
}

/// Request body for starting an execution. The workflow input travels as a
/// JSON document embedded in a string.
fn execution_body(workflow: &str, input: &Value) -> Value {
    json!({
        "workflow_name": workflow,
        "input": input.to_string(),
    })
}

#[async_trait]
impl WorkflowService for MistralClient {
    async fn create_execution(&self, workflow: &str, input: &Value) -> RemoteResult<Execution> {
        let url = format!("{}/v2/executions", self.base_url);
        let request = self.client.post(&url).json(&execution_body(workflow, input));

        let response = with_token(request, self.auth_token.as_ref())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_execution(&self, id: &str) -> RemoteResult<Execution> {
        let url = format!("{}/v2/executions/{}", self.base_url, id);
        let request = self.client.get(&url);

        let response = with_token(request, self.auth_token.as_ref())
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Connector building HTTP clients from a manager's endpoints.
///
/// All clients share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpManagerConnector {
    client: Client,
    config: RemoteConfig,
}

impl HttpManagerConnector {
    /// Create a new connector from configuration.
    pub fn new(config: &RemoteConfig) -> ControlResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ControlError::Http)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ManagerConnector for HttpManagerConnector {
    async fn baremetal(&self, manager: &Manager) -> RemoteResult<Arc<dyn BaremetalService>> {
        let url = manager
            .endpoints
            .baremetal
            .as_deref()
            .ok_or_else(|| RemoteError::MissingEndpoint {
                manager: manager.name.clone(),
                service: "baremetal",
            })?;
        Ok(Arc::new(IronicClient::new(
            self.client.clone(),
            url,
            &self.config,
        )))
    }

    async fn workflow(&self, manager: &Manager) -> RemoteResult<Arc<dyn WorkflowService>> {
        let url = manager
            .endpoints
            .workflow
            .as_deref()
            .ok_or_else(|| RemoteError::MissingEndpoint {
                manager: manager.name.clone(),
                service: "workflow",
            })?;
        Ok(Arc::new(MistralClient::new(
            self.client.clone(),
            url,
            &self.config,
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn connector_creation() {
        let connector = HttpManagerConnector::new(&RemoteConfig::default());
        assert!(connector.is_ok());
    }

    #[test]
    fn node_urls_trim_trailing_slash() {
        let client = IronicClient::new(
            Client::new(),
            "http://undercloud:6385/",
            &RemoteConfig::default(),
        );
        assert_eq!(
            client.node_url("node-0"),
            "http://undercloud:6385/v1/nodes/node-0"
        );
        assert_eq!(client.api_version, "1.29");
    }

    #[test]
    fn execution_input_is_embedded_as_text() {
        let body = execution_body(
            "tripleo.baremetal.v1.introspect",
            &json!({ "node_uuids": ["node-0"] }),
        );

        assert_eq!(body["workflow_name"], "tripleo.baremetal.v1.introspect");
        let input: Value = serde_json::from_str(body["input"].as_str().unwrap()).unwrap();
        assert_eq!(input["node_uuids"][0], "node-0");
    }

    #[test]
    fn raw_execution_conversion() {
        let raw: RawExecution =
            serde_json::from_str(r#"{"id": "ex-1", "state": "SUCCESS", "workflow_name": "x"}"#)
                .unwrap();
        let execution = Execution::from(raw);
        assert_eq!(execution, Execution::new("ex-1", ExecutionState::Success));
    }

    #[tokio::test]
    async fn missing_endpoint_is_reported() {
        let connector = HttpManagerConnector::new(&RemoteConfig::default()).unwrap();
        let manager = Manager::new("undercloud");

        let result = connector.baremetal(&manager).await;
        assert!(matches!(
            result,
            Err(RemoteError::MissingEndpoint {
                service: "baremetal",
                ..
            })
        ));
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn error_status_keeps_body() {
        let result = check_status(response(409, r#"{"faultstring": "Node is locked"}"#)).await;

        match result {
            Err(RemoteError::Status { status, body }) => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(body, r#"{"faultstring": "Node is locked"}"#);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let err = check_status(response(500, "boom")).await.unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    #[tokio::test]
    async fn success_statuses_pass_through() {
        for code in [200, 202, 204] {
            let checked = check_status(response(code, "")).await.unwrap();
            assert_eq!(checked.status().as_u16(), code);
        }
    }

    #[tokio::test]
    async fn execution_decoding_maps_errors() {
        let execution =
            MistralClient::decode(response(200, r#"{"id": "ex-1", "state": "RUNNING"}"#))
                .await
                .unwrap();
        assert_eq!(execution, Execution::new("ex-1", ExecutionState::Running));

        let failed = MistralClient::decode(response(404, r#"{"message": "Execution not found"}"#))
            .await
            .unwrap_err();
        assert_eq!(failed.message(), "Execution not found");

        let garbled = MistralClient::decode(response(200, "not json")).await;
        assert!(matches!(garbled, Err(RemoteError::Decode(_))));
    }
}
