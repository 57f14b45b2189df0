//! Node and manager entities shared by the control and inventory crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique node ID using ULID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerId(String);

impl ManagerId {
    /// Create a new manager ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique manager ID using ULID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ManagerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hardware facts reported by the owning manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hardware {
    /// Provision state as reported by the baremetal service
    /// (e.g. "manageable", "available", "active").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision_state: Option<String>,
}

/// A physical host managed through a remote infrastructure-management plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Local identifier.
    pub id: NodeId,
    /// Node name; the baremetal service addresses nodes by this value.
    pub name: String,
    /// Identifier of the node inside the manager.
    pub uid_ems: String,
    /// Power state as reported by the manager ("on", "off", ...).
    pub state: String,
    /// Hardware facts.
    #[serde(default)]
    pub hardware: Hardware,
    /// Set once the backing remote resource no longer exists.
    #[serde(default)]
    pub archived: bool,
    /// Owning manager.
    pub manager_id: Option<ManagerId>,
    /// Availability zone the node belongs to.
    pub availability_zone: Option<String>,
    /// Operating system image name, used to decide which logins are supported.
    pub os_image_name: Option<String>,
    /// Execution zone for queued work on this node.
    pub zone: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new, unarchived node with an unknown power state.
    #[must_use]
    pub fn new(name: impl Into<String>, manager_id: Option<ManagerId>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: NodeId::generate(),
            uid_ems: name.clone(),
            name,
            state: "unknown".to_owned(),
            hardware: Hardware::default(),
            archived: false,
            manager_id,
            availability_zone: None,
            os_image_name: None,
            zone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the reported power state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the reported provision state.
    #[must_use]
    pub fn with_provision_state(mut self, provision_state: impl Into<String>) -> Self {
        self.hardware.provision_state = Some(provision_state.into());
        self
    }

    /// Mark the node as archived.
    #[must_use]
    pub const fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    /// Set the operating system image name.
    #[must_use]
    pub fn with_os_image(mut self, os_image_name: impl Into<String>) -> Self {
        self.os_image_name = Some(os_image_name.into());
        self
    }

    /// Provision state, if the manager reported one.
    #[must_use]
    pub fn provision_state(&self) -> Option<&str> {
        self.hardware.provision_state.as_deref()
    }
}

/// Endpoints of the remote services a manager exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerEndpoints {
    /// Base URL of the baremetal service.
    pub baremetal: Option<String>,
    /// Base URL of the workflow service.
    pub workflow: Option<String>,
}

/// The external infrastructure-management system owning one or more nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    /// Local identifier.
    pub id: ManagerId,
    /// Display name.
    pub name: String,
    /// Execution zone for queued work against this manager.
    pub zone: Option<String>,
    /// Remote service endpoints.
    #[serde(default)]
    pub endpoints: ManagerEndpoints,
}

impl Manager {
    /// Create a new manager without endpoints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ManagerId::generate(),
            name: name.into(),
            zone: None,
            endpoints: ManagerEndpoints::default(),
        }
    }

    /// Set the remote service endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        baremetal: impl Into<String>,
        workflow: impl Into<String>,
    ) -> Self {
        self.endpoints = ManagerEndpoints {
            baremetal: Some(baremetal.into()),
            workflow: Some(workflow.into()),
        };
        self
    }
}
