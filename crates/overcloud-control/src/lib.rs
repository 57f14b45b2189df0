//! Overcloud Lifecycle Control
//!
//! This crate drives bare-metal nodes through their lifecycle on a remote
//! infrastructure manager and resolves the credentials used to log on to
//! them.
//!
//! # Architecture
//!
//! - **Lifecycle**: [`LifecycleController`] queues manage, introspect,
//!   provide, power and destroy operations and runs them against the
//!   manager's baremetal and workflow services
//! - **Remote services**: [`remote`] defines the service contracts and
//!   provides HTTP clients for Ironic- and Mistral-style APIs
//! - **Queue**: [`queue`] defines the submission gateway and an in-memory,
//!   single-flight-per-node queue; [`service`] runs task workers over it
//! - **Credentials**: [`credentials`] picks the best credential for a node,
//!   falling back to the manager's keypair, and records check results
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use overcloud_control::{ControlConfig, ControlService, MemoryNodeStore};
//!
//! let config = ControlConfig::load()?;
//! let service = ControlService::with_http(&config, Arc::new(MemoryNodeStore::new()), refresh)?;
//!
//! let task_id = service.controller().request_manage(&node, "admin").await?;
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod lifecycle;
pub mod queue;
pub mod remote;
pub mod service;
pub mod store;

pub use config::ControlConfig;
pub use credentials::{CredentialResolver, MemoryCredentialStore};
pub use error::{ControlError, ControlResult};
pub use lifecycle::{Availability, LifecycleController};
pub use queue::{MemoryTaskQueue, TaskQueueGateway};
pub use service::ControlService;
pub use store::{MemoryNodeStore, NodeStore};
