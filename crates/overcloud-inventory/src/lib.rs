//! Overcloud Inventory Reconciliation
//!
//! Turns the live state collected from a node into inventory records:
//! services are grouped into service groups, each group is associated with
//! the node's services and with the files under its configuration
//! directory, and configuration files are parsed into attributes.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use overcloud_inventory::{MemoryInventoryStore, ServiceReconciler};
//!
//! let reconciler = ServiceReconciler::new(Arc::new(MemoryInventoryStore::new()));
//! let groups = reconciler.refresh_services(&node, &shell).await?;
//! ```

#![forbid(unsafe_code)]

pub mod attributes;
pub mod config_parser;
pub mod error;
pub mod reconcile;
pub mod shell;
pub mod status;
pub mod store;
pub mod types;

pub use attributes::ConfigAttributeExtractor;
pub use error::{InventoryError, InventoryResult};
pub use reconcile::ServiceReconciler;
pub use shell::RemoteShell;
pub use store::{InventoryStore, MemoryInventoryStore};
pub use types::{
    AttributeSource, ConfigAttribute, FilesystemEntry, GroupStatus, ServiceGroup, SystemService,
};
