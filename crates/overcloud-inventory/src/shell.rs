//! Command execution on a managed node.

use async_trait::async_trait;

use crate::error::InventoryResult;

/// Runs shell commands on a node and returns their standard output.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `command` and return what it printed.
    async fn run(&self, command: &str) -> InventoryResult<String>;
}
