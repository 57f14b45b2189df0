//! In-memory credential store for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{ControlError, ControlResult};

use super::{AuthStatus, AuthType, CredentialOwner, CredentialRecord, CredentialStore};

type Key = (CredentialOwner, AuthType);

/// In-memory credential store keyed by owner and type.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<Key, CredentialRecord>>,
}

impl MemoryCredentialStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same owner and type.
    pub fn insert(&self, record: CredentialRecord) -> ControlResult<()> {
        let key = (record.owner.clone(), record.auth_type.clone());
        self.records
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?
            .insert(key, record);
        Ok(())
    }

    /// Number of stored records.
    pub fn len(&self) -> ControlResult<usize> {
        self.records
            .read()
            .map(|records| records.len())
            .map_err(|_| ControlError::internal("lock poisoned"))
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> ControlResult<bool> {
        self.len().map(|n| n == 0)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find(
        &self,
        owner: &CredentialOwner,
        auth_type: &AuthType,
    ) -> ControlResult<Option<CredentialRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| ControlError::internal("lock poisoned"))?;
        Ok(records.get(&(owner.clone(), auth_type.clone())).cloned())
    }

    async fn find_or_create(
        &self,
        owner: &CredentialOwner,
        auth_type: &AuthType,
        name: &str,
    ) -> ControlResult<CredentialRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?;

        let record = records
            .entry((owner.clone(), auth_type.clone()))
            .or_insert_with(|| {
                CredentialRecord::new(owner.clone(), auth_type.clone()).with_name(name)
            });
        Ok(record.clone())
    }

    async fn update_status(
        &self,
        id: &str,
        status: AuthStatus,
        details: Option<String>,
    ) -> ControlResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ControlError::internal("lock poisoned"))?;

        let record = records
            .values_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ControlError::internal(format!("credential {id} not found")))?;

        record.status = status;
        record.status_details = details;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use overcloud_core::NodeId;

    use super::*;

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let store = MemoryCredentialStore::new();
        let owner = CredentialOwner::Node(NodeId::new("n1"));

        let first = store
            .find_or_create(&owner, &AuthType::SshKeypair, "Host node-0")
            .await
            .unwrap();
        let second = store
            .find_or_create(&owner, &AuthType::SshKeypair, "other name")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("Host node-0"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_keeps_one_record_per_owner_and_type() {
        let store = MemoryCredentialStore::new();
        let owner = CredentialOwner::Node(NodeId::new("n1"));

        store
            .insert(CredentialRecord::new(owner.clone(), AuthType::Default).with_userid("a"))
            .unwrap();
        store
            .insert(CredentialRecord::new(owner.clone(), AuthType::Default).with_userid("b"))
            .unwrap();

        let found = store
            .find(&owner, &AuthType::Default)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.userid.as_deref(), Some("b"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn update_status_records_details() {
        let store = MemoryCredentialStore::new();
        let owner = CredentialOwner::Node(NodeId::new("n1"));
        let record = CredentialRecord::new(owner.clone(), AuthType::SshKeypair);
        let id = record.id.clone();
        store.insert(record).unwrap();

        store
            .update_status(&id, AuthStatus::Unreachable, Some("no route".to_owned()))
            .await
            .unwrap();

        let found = store
            .find(&owner, &AuthType::SshKeypair)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, AuthStatus::Unreachable);
        assert_eq!(found.status_details.as_deref(), Some("no route"));
    }
}
