//! Inventory persistence.

mod memory;

pub use memory::MemoryInventoryStore;

use async_trait::async_trait;
use overcloud_core::NodeId;

use crate::error::InventoryResult;
use crate::types::{
    AttributeSource, ConfigAttribute, FilesystemEntry, ServiceGroup, ServiceGroupId, SystemService,
};

/// Trait for inventory persistence backends.
///
/// Association lists are written as a whole: saving a group replaces its
/// member services and filesystem entries in one step, and
/// [`replace_service_groups`](Self::replace_service_groups) replaces a
/// node's group set in one step.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Services on a node whose names appear in `names`.
    async fn system_services_named(
        &self,
        node: &NodeId,
        names: &[String],
    ) -> InventoryResult<Vec<SystemService>>;

    /// Filesystem entries on a node whose path starts with `prefix`.
    async fn filesystems_with_prefix(
        &self,
        node: &NodeId,
        prefix: &str,
    ) -> InventoryResult<Vec<FilesystemEntry>>;

    /// The node's group with this name, or a new unsaved one.
    async fn find_or_init_service_group(
        &self,
        node: &NodeId,
        name: &str,
    ) -> InventoryResult<ServiceGroup>;

    /// Insert or update a group together with both of its associations.
    async fn save_service_group(&self, group: &ServiceGroup) -> InventoryResult<()>;

    /// Make `keep` the node's complete group set, dropping every other group.
    async fn replace_service_groups(
        &self,
        node: &NodeId,
        keep: &[ServiceGroupId],
    ) -> InventoryResult<()>;

    /// All groups on a node.
    async fn service_groups(&self, node: &NodeId) -> InventoryResult<Vec<ServiceGroup>>;

    /// Replace the attributes recorded for a file.
    async fn save_custom_attributes(
        &self,
        file: &FilesystemEntry,
        attributes: Vec<ConfigAttribute>,
        source: AttributeSource,
    ) -> InventoryResult<()>;
}
