//! Configuration for overcloud-control.

use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{ControlError, ControlResult};
use crate::queue::NodeMethod;

/// Top-level configuration for lifecycle control.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ControlConfig {
    /// In-memory task queue configuration.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Lifecycle operation configuration.
    #[serde(default)]
    pub operations: OperationsConfig,

    /// Remote service client configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl ControlConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `overcloud.toml` in the current directory (if present)
    /// 3. Environment variables with `OVERCLOUD_` prefix
    pub fn load() -> ControlResult<Self> {
        Self::from_file("overcloud.toml")
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ControlResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("OVERCLOUD_").split("__"))
            .extract()
            .map_err(|e| ControlError::Config(e.to_string()))
    }
}

/// In-memory task queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of pending tasks.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Number of task workers to spawn.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

const fn default_max_size() -> usize {
    100
}

const fn default_workers() -> usize {
    2
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            workers: default_workers(),
        }
    }
}

/// Lifecycle operation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationsConfig {
    /// Timeout for the manage task (seconds).
    #[serde(default = "default_short_timeout_secs")]
    pub manageable_timeout_secs: u64,

    /// Timeout for the introspect task (seconds).
    #[serde(default = "default_long_timeout_secs")]
    pub introspect_timeout_secs: u64,

    /// Timeout for the provide task (seconds).
    #[serde(default = "default_long_timeout_secs")]
    pub provide_timeout_secs: u64,

    /// Timeout for power state tasks (seconds).
    #[serde(default = "default_short_timeout_secs")]
    pub power_timeout_secs: u64,

    /// Timeout for delete tasks (seconds).
    #[serde(default = "default_short_timeout_secs")]
    pub delete_timeout_secs: u64,

    /// Delay between workflow execution polls (seconds).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Queue role that executes lifecycle tasks.
    #[serde(default = "default_role")]
    pub role: String,
}

const fn default_short_timeout_secs() -> u64 {
    600
}

const fn default_long_timeout_secs() -> u64 {
    3600
}

const fn default_poll_interval_secs() -> u64 {
    5
}

fn default_role() -> String {
    "ems_operations".to_owned()
}

impl OperationsConfig {
    /// Delay between workflow execution polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Queue timeout for a node method.
    #[must_use]
    pub const fn timeout_for(&self, method: NodeMethod) -> Duration {
        let secs = match method {
            NodeMethod::Manage => self.manageable_timeout_secs,
            NodeMethod::Introspect => self.introspect_timeout_secs,
            NodeMethod::Provide => self.provide_timeout_secs,
            NodeMethod::SetPowerState => self.power_timeout_secs,
            NodeMethod::DestroyRemote | NodeMethod::DestroyLocal => self.delete_timeout_secs,
        };
        Duration::from_secs(secs)
    }
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            manageable_timeout_secs: default_short_timeout_secs(),
            introspect_timeout_secs: default_long_timeout_secs(),
            provide_timeout_secs: default_long_timeout_secs(),
            power_timeout_secs: default_short_timeout_secs(),
            delete_timeout_secs: default_short_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            role: default_role(),
        }
    }
}

/// Remote service client configuration.
#[derive(Clone, Deserialize)]
pub struct RemoteConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the baremetal API version header.
    #[serde(default = "default_baremetal_api_version")]
    pub baremetal_api_version: String,

    /// Token sent as `X-Auth-Token`, if the services require one.
    #[serde(default)]
    pub auth_token: Option<String>,
}

const fn default_remote_timeout_secs() -> u64 {
    30
}

fn default_baremetal_api_version() -> String {
    "1.29".to_owned()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_remote_timeout_secs(),
            baremetal_api_version: default_baremetal_api_version(),
            auth_token: None,
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("timeout_secs", &self.timeout_secs)
            .field("baremetal_api_version", &self.baremetal_api_version)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ControlConfig::default();
        assert_eq!(config.queue.max_size, 100);
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.operations.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.operations.role, "ems_operations");
        assert_eq!(config.remote.timeout_secs, 30);
        assert!(config.remote.auth_token.is_none());
    }

    #[test]
    fn per_method_timeouts() {
        let ops = OperationsConfig::default();
        assert_eq!(ops.timeout_for(NodeMethod::Manage), Duration::from_secs(600));
        assert_eq!(
            ops.timeout_for(NodeMethod::Introspect),
            Duration::from_secs(3600)
        );
        assert_eq!(ops.timeout_for(NodeMethod::Provide), Duration::from_secs(3600));
        assert_eq!(
            ops.timeout_for(NodeMethod::DestroyLocal),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
            [queue]
            max_size = 10

            [operations]
            introspect_timeout_secs = 7200
            poll_interval_secs = 1

            [remote]
            baremetal_api_version = "1.46"
            auth_token = "gAAAA"
        "#;

        let config: ControlConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.queue.max_size, 10);
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.operations.introspect_timeout_secs, 7200);
        assert_eq!(config.operations.provide_timeout_secs, 3600);
        assert_eq!(config.operations.poll_interval_secs, 1);
        assert_eq!(config.remote.baremetal_api_version, "1.46");
        assert!(!format!("{:?}", config.remote).contains("gAAAA"));
    }
}
