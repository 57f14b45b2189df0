//! Credentials for logging on to nodes.
//!
//! Credentials are owned either by a node or by its manager. A node uses its
//! own records first and falls back to the manager's ssh keypair. See
//! [`CredentialResolver`] for the lookup rules.

mod memory;
mod resolver;

pub use memory::MemoryCredentialStore;
pub use resolver::{CredentialResolver, SshLogin, SshOptions};

use std::fmt;

use async_trait::async_trait;
use overcloud_core::{ManagerId, Node, NodeId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ControlResult;

/// Kind of credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// SSH user with private key.
    SshKeypair,
    /// User and password.
    Default,
    /// Web services login.
    Ws,
    /// Out-of-band management controller login.
    Ipmi,
    /// Remote shell login.
    Remote,
    /// Any other type.
    Other(String),
}

impl AuthType {
    /// Parse a credential type name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "ssh_keypair" => Self::SshKeypair,
            "default" => Self::Default,
            "ws" => Self::Ws,
            "ipmi" => Self::Ipmi,
            "remote" => Self::Remote,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Credential type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SshKeypair => "ssh_keypair",
            Self::Default => "default",
            Self::Ws => "ws",
            Self::Ipmi => "ipmi",
            Self::Remote => "remote",
            Self::Other(s) => s,
        }
    }

    /// How credentials of this type are checked.
    #[must_use]
    pub const fn verify_method(&self) -> VerifyMethod {
        match self {
            Self::Remote | Self::Default | Self::SshKeypair => VerifyMethod::Ssh,
            Self::Ipmi => VerifyMethod::Ipmi,
            Self::Ws | Self::Other(_) => VerifyMethod::Ws,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol used to check a credential against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMethod {
    /// Log on over SSH.
    Ssh,
    /// Call the node's web services.
    Ws,
    /// Query the management controller.
    Ipmi,
}

/// Owner of a credential record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CredentialOwner {
    /// Owned by a node.
    Node(NodeId),
    /// Owned by a manager.
    Manager(ManagerId),
}

impl CredentialOwner {
    /// Whether the record belongs to the given node.
    #[must_use]
    pub fn is_node(&self, id: &NodeId) -> bool {
        matches!(self, Self::Node(owner) if owner == id)
    }
}

/// Outcome of the last credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// Login succeeded.
    Valid,
    /// Login was rejected.
    Invalid,
    /// The host could not be reached.
    Unreachable,
    /// The check itself failed.
    Error,
    /// Never checked.
    #[default]
    None,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Unreachable => "unreachable",
            Self::Error => "error",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// A stored credential.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Record identifier.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Owner of the record.
    pub owner: CredentialOwner,
    /// Credential type.
    pub auth_type: AuthType,
    /// Login user.
    pub userid: Option<String>,
    /// Login password.
    pub password: Option<SecretString>,
    /// Private key data.
    pub auth_key: Option<SecretString>,
    /// Outcome of the last check.
    pub status: AuthStatus,
    /// Detail of the last failed check.
    pub status_details: Option<String>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn secret_is_blank(value: Option<&SecretString>) -> bool {
    is_blank(value.map(|v| v.expose_secret()))
}

impl CredentialRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new(owner: CredentialOwner, auth_type: AuthType) -> Self {
        Self {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            name: None,
            owner,
            auth_type,
            userid: None,
            password: None,
            auth_key: None,
            status: AuthStatus::None,
            status_details: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the login user.
    #[must_use]
    pub fn with_userid(mut self, userid: impl Into<String>) -> Self {
        self.userid = Some(userid.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the private key data.
    #[must_use]
    pub fn with_auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the validation status.
    #[must_use]
    pub fn with_status(mut self, status: AuthStatus) -> Self {
        self.status = status;
        self
    }

    /// A record is usable when it carries a password or a key.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.has_password() || self.has_auth_key()
    }

    /// Whether a login user is set.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !is_blank(self.userid.as_deref())
    }

    /// Whether a non-blank password is set.
    #[must_use]
    pub fn has_password(&self) -> bool {
        !secret_is_blank(self.password.as_ref())
    }

    /// Whether non-blank key data is set.
    #[must_use]
    pub fn has_auth_key(&self) -> bool {
        !secret_is_blank(self.auth_key.as_ref())
    }
}

/// Storage of credential records.
///
/// Implementations keep at most one record per owner and type.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the record of a type for an owner.
    async fn find(
        &self,
        owner: &CredentialOwner,
        auth_type: &AuthType,
    ) -> ControlResult<Option<CredentialRecord>>;

    /// Find the record of a type for an owner, creating an empty one named
    /// `name` if none exists.
    async fn find_or_create(
        &self,
        owner: &CredentialOwner,
        auth_type: &AuthType,
        name: &str,
    ) -> ControlResult<CredentialRecord>;

    /// Record the outcome of a credential check.
    async fn update_status(
        &self,
        id: &str,
        status: AuthStatus,
        details: Option<String>,
    ) -> ControlResult<()>;
}

/// Checks a credential against a live node.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Log on to the node with the credential using the given method.
    ///
    /// Fails with [`ControlError::Unreachable`](crate::ControlError::Unreachable)
    /// when the node cannot be reached and
    /// [`ControlError::InvalidCredentials`](crate::ControlError::InvalidCredentials)
    /// when the login is rejected.
    async fn verify(
        &self,
        method: VerifyMethod,
        node: &Node,
        credential: Option<&CredentialRecord>,
    ) -> ControlResult<()>;
}
