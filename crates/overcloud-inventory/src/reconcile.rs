//! Reconciliation of a node's live services into service groups.
//!
//! Each pass is a full resync: the groups parsed from the status report
//! become the node's complete group set, and every group's member services
//! and configuration files are recomputed from scratch.

use std::sync::{Arc, LazyLock};

use overcloud_core::Node;
use regex::Regex;
use tracing::{debug, error, info, instrument};

use crate::attributes::ConfigAttributeExtractor;
use crate::error::{error_chain, InventoryResult};
use crate::shell::RemoteShell;
use crate::status::{parse_service_status, ParsedGroup, SERVICE_STATUS_COMMAND};
use crate::store::InventoryStore;
use crate::types::ServiceGroup;

/// Trailing " service..." part of a group name.
static SERVICE_SUFFIX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\sservice.*").ok());

/// Configuration directory for a group: `Nova Service` lives in `/etc/nova`.
#[must_use]
pub fn config_dir(group_name: &str) -> String {
    let lowered = group_name.to_lowercase();
    let dir = match SERVICE_SUFFIX.as_ref() {
        Some(re) => re.replace(&lowered, "").into_owned(),
        None => lowered,
    };
    format!("/etc/{dir}")
}

/// Correlates a node's service status report with its inventory.
pub struct ServiceReconciler {
    store: Arc<dyn InventoryStore>,
    extractor: ConfigAttributeExtractor,
}

impl ServiceReconciler {
    /// Create a reconciler writing through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        let extractor = ConfigAttributeExtractor::new(store.clone());
        Self { store, extractor }
    }

    /// Collect the status report from the node and reconcile it.
    #[instrument(skip(self, node, shell), fields(node = %node.name))]
    pub async fn refresh_services(
        &self,
        node: &Node,
        shell: &dyn RemoteShell,
    ) -> InventoryResult<Vec<ServiceGroup>> {
        let report = shell.run(SERVICE_STATUS_COMMAND).await.inspect_err(|e| {
            error!(node = %node.name, error = %error_chain(e), "unable to collect service status");
        })?;
        self.reconcile(node, &report).await
    }

    /// Reconcile a status report into the node's service groups.
    ///
    /// Any failure aborts the pass and is returned as is.
    pub async fn reconcile(&self, node: &Node, report: &str) -> InventoryResult<Vec<ServiceGroup>> {
        let parsed = parse_service_status(report);

        match self.sync_groups(node, &parsed).await {
            Ok(groups) => {
                info!(node = %node.name, groups = groups.len(), "service groups reconciled");
                Ok(groups)
            }
            Err(e) => {
                error!(node = %node.name, error = %error_chain(&e), "service reconciliation failed");
                Err(e)
            }
        }
    }

    async fn sync_groups(
        &self,
        node: &Node,
        parsed: &[ParsedGroup],
    ) -> InventoryResult<Vec<ServiceGroup>> {
        let mut groups = Vec::with_capacity(parsed.len());

        for entry in parsed {
            let mut group = self
                .store
                .find_or_init_service_group(&node.id, &entry.name)
                .await?;

            let services = self
                .store
                .system_services_named(&node.id, &entry.service_names())
                .await?;

            let dir = config_dir(&entry.name);
            let filesystems = self.store.filesystems_with_prefix(&node.id, &dir).await?;

            group.status = entry.status;
            group.service_ids = services.into_iter().map(|s| s.id).collect();
            group.filesystem_ids = filesystems.iter().map(|f| f.id.clone()).collect();
            self.store.save_service_group(&group).await?;

            if filesystems.is_empty() {
                debug!(group = %group.name, dir = %dir, "no configuration files for group");
            } else {
                self.extractor.extract(&filesystems).await?;
            }

            groups.push(group);
        }

        let keep: Vec<_> = groups.iter().map(|g| g.id.clone()).collect();
        self.store.replace_service_groups(&node.id, &keep).await?;

        Ok(groups)
    }
}
