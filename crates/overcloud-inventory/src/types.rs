//! Inventory records observed on a node.

use std::fmt;

use chrono::{DateTime, Utc};
use overcloud_core::NodeId;
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from an existing value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID using ULID.
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

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a service group.
    ServiceGroupId
);
record_id!(
    /// Unique identifier for a system service.
    SystemServiceId
);
record_id!(
    /// Unique identifier for a filesystem entry.
    FilesystemEntryId
);

/// Aggregate state of the services in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    /// Every member service is active.
    Active,
    /// No member service is active.
    #[default]
    Inactive,
    /// Some but not all member services are active.
    Degraded,
}

impl GroupStatus {
    /// Derive the group status from member activity.
    #[must_use]
    pub const fn from_counts(active: usize, total: usize) -> Self {
        if active == 0 {
            Self::Inactive
        } else if active == total {
            Self::Active
        } else {
            Self::Degraded
        }
    }

    /// Lower-case name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Degraded => "degraded",
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named cluster of related operating-system services on a node.
///
/// The group owns neither its services nor its filesystem entries; both
/// association lists are replaced wholesale on every reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub id: ServiceGroupId,
    pub node_id: NodeId,
    pub name: String,
    pub status: GroupStatus,
    pub service_ids: Vec<SystemServiceId>,
    pub filesystem_ids: Vec<FilesystemEntryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceGroup {
    /// Create an unsaved, empty group on a node.
    #[must_use]
    pub fn new(node_id: NodeId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceGroupId::generate(),
            node_id,
            name: name.into(),
            status: GroupStatus::default(),
            service_ids: Vec::new(),
            filesystem_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An operating-system service known on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemService {
    pub id: SystemServiceId,
    pub node_id: NodeId,
    pub name: String,
    pub status: Option<String>,
}

impl SystemService {
    /// Create a service with no recorded status.
    #[must_use]
    pub fn new(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id: SystemServiceId::generate(),
            node_id,
            name: name.into(),
            status: None,
        }
    }

    /// Set the reported status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A file collected from a node, optionally with its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemEntry {
    pub id: FilesystemEntryId,
    pub node_id: NodeId,
    pub path: String,
    pub contents: Option<String>,
}

impl FilesystemEntry {
    /// Create an entry without contents.
    #[must_use]
    pub fn new(node_id: NodeId, path: impl Into<String>) -> Self {
        Self {
            id: FilesystemEntryId::generate(),
            node_id,
            path: path.into(),
            contents: None,
        }
    }

    /// Set the collected contents.
    #[must_use]
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    /// Whether the entry is a configuration file with something to parse.
    #[must_use]
    pub fn is_parseable_config(&self) -> bool {
        self.path.contains(".conf") && self.contents.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Where a configuration attribute came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSource {
    /// Parsed from file contents collected during a scan.
    Scan,
}

/// A key/value pair parsed from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigAttribute {
    pub section: Option<String>,
    pub name: String,
    pub value: String,
    /// Comment block preceding the key.
    pub description: Option<String>,
    /// `path:section:name`, unique among the attributes of one file.
    pub unique_name: String,
    pub source: AttributeSource,
}
