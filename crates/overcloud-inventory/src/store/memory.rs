//! In-memory inventory store for testing.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use overcloud_core::NodeId;

use crate::error::{InventoryError, InventoryResult};
use crate::types::{
    AttributeSource, ConfigAttribute, FilesystemEntry, FilesystemEntryId, ServiceGroup,
    ServiceGroupId, SystemService,
};

use super::InventoryStore;

/// In-memory inventory store for testing.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    services: RwLock<Vec<SystemService>>,
    filesystems: RwLock<Vec<FilesystemEntry>>,
    groups: RwLock<HashMap<ServiceGroupId, ServiceGroup>>,
    attributes: RwLock<HashMap<FilesystemEntryId, Vec<ConfigAttribute>>>,
}

impl MemoryInventoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a service observed on a node.
    pub fn insert_service(&self, service: SystemService) -> InventoryResult<()> {
        self.services
            .write()
            .map_err(|_| InventoryError::internal("lock poisoned"))?
            .push(service);
        Ok(())
    }

    /// Record a file collected from a node.
    pub fn insert_filesystem(&self, entry: FilesystemEntry) -> InventoryResult<()> {
        self.filesystems
            .write()
            .map_err(|_| InventoryError::internal("lock poisoned"))?
            .push(entry);
        Ok(())
    }

    /// Attributes recorded for a file.
    pub fn attributes(&self, file: &FilesystemEntryId) -> InventoryResult<Vec<ConfigAttribute>> {
        self.attributes
            .read()
            .map(|attributes| attributes.get(file).cloned().unwrap_or_default())
            .map_err(|_| InventoryError::internal("lock poisoned"))
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn system_services_named(
        &self,
        node: &NodeId,
        names: &[String],
    ) -> InventoryResult<Vec<SystemService>> {
        let services = self
            .services
            .read()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;
        Ok(services
            .iter()
            .filter(|s| &s.node_id == node && names.contains(&s.name))
            .cloned()
            .collect())
    }

    async fn filesystems_with_prefix(
        &self,
        node: &NodeId,
        prefix: &str,
    ) -> InventoryResult<Vec<FilesystemEntry>> {
        let filesystems = self
            .filesystems
            .read()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;
        Ok(filesystems
            .iter()
            .filter(|f| &f.node_id == node && f.path.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn find_or_init_service_group(
        &self,
        node: &NodeId,
        name: &str,
    ) -> InventoryResult<ServiceGroup> {
        let groups = self
            .groups
            .read()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;
        Ok(groups
            .values()
            .find(|g| &g.node_id == node && g.name == name)
            .cloned()
            .unwrap_or_else(|| ServiceGroup::new(node.clone(), name)))
    }

    async fn save_service_group(&self, group: &ServiceGroup) -> InventoryResult<()> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;

        let mut saved = group.clone();
        saved.updated_at = Utc::now();
        groups.insert(saved.id.clone(), saved);
        Ok(())
    }

    async fn replace_service_groups(
        &self,
        node: &NodeId,
        keep: &[ServiceGroupId],
    ) -> InventoryResult<()> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;

        if let Some(missing) = keep.iter().find(|id| !groups.contains_key(*id)) {
            return Err(InventoryError::ServiceGroupNotFound(missing.to_string()));
        }

        let keep: HashSet<&ServiceGroupId> = keep.iter().collect();
        groups.retain(|id, group| &group.node_id != node || keep.contains(id));
        Ok(())
    }

    async fn service_groups(&self, node: &NodeId) -> InventoryResult<Vec<ServiceGroup>> {
        let groups = self
            .groups
            .read()
            .map_err(|_| InventoryError::internal("lock poisoned"))?;
        let mut found: Vec<_> = groups
            .values()
            .filter(|g| &g.node_id == node)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn save_custom_attributes(
        &self,
        file: &FilesystemEntry,
        attributes: Vec<ConfigAttribute>,
        _source: AttributeSource,
    ) -> InventoryResult<()> {
        self.attributes
            .write()
            .map_err(|_| InventoryError::internal("lock poisoned"))?
            .insert(file.id.clone(), attributes);
        Ok(())
    }
}
