//! Credential lookup across the node and its manager.

use std::sync::Arc;

use overcloud_core::Node;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::error::{ControlError, ControlResult};

use super::{
    AuthStatus, AuthType, CredentialOwner, CredentialRecord, CredentialStore, CredentialVerifier,
};

/// User that does not need a password for sudo.
const ROOT_USER: &str = "root";

/// Class name used when naming placeholder records.
const PLACEHOLDER_CLASS: &str = "Host";

/// Connection options for an SSH login.
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// Private key data, when logging on with a key.
    pub key_data: Option<SecretString>,
    /// Whether sudo can be used without a password.
    pub passwordless_sudo: bool,
}

/// Everything needed to open an SSH session to a node.
#[derive(Debug, Clone)]
pub struct SshLogin {
    /// Login user.
    pub user: Option<String>,
    /// Login password, when logging on with a password.
    pub password: Option<SecretString>,
    /// User to switch to after logging on.
    pub su_user: Option<String>,
    /// Password of `su_user`.
    pub su_password: Option<SecretString>,
    /// Connection options.
    pub options: SshOptions,
}

/// Resolves which credential a node uses and records verification results.
///
/// Node-owned records take precedence. Lookup order is the requested type,
/// then `ssh_keypair`, then `default`; the first record that carries a
/// password or key wins. When none does, the manager's `ssh_keypair` record
/// is used as is.
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl CredentialResolver {
    /// Create a new resolver.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, verifier }
    }

    async fn node_record(
        &self,
        node: &Node,
        auth_type: &AuthType,
    ) -> ControlResult<Option<CredentialRecord>> {
        self.store
            .find(&CredentialOwner::Node(node.id.clone()), auth_type)
            .await
    }

    async fn manager_keypair(&self, node: &Node) -> ControlResult<Option<CredentialRecord>> {
        match &node.manager_id {
            Some(manager_id) => {
                self.store
                    .find(
                        &CredentialOwner::Manager(manager_id.clone()),
                        &AuthType::SshKeypair,
                    )
                    .await
            }
            None => Ok(None),
        }
    }

    /// Pick the credential a node should use.
    pub async fn best_fit(
        &self,
        node: &Node,
        requested: Option<&AuthType>,
    ) -> ControlResult<Option<CredentialRecord>> {
        let mut order: Vec<AuthType> = requested.cloned().into_iter().collect();
        for fallback in [AuthType::SshKeypair, AuthType::Default] {
            if !order.contains(&fallback) {
                order.push(fallback);
            }
        }

        for auth_type in &order {
            if let Some(record) = self.node_record(node, auth_type).await? {
                if record.is_available() {
                    return Ok(Some(record));
                }
            }
        }

        self.manager_keypair(node).await
    }

    /// Whether the node falls back to its manager's credential.
    pub async fn is_using_parent_credentials(&self, node: &Node) -> ControlResult<bool> {
        let best = self.best_fit(node, None).await?;
        Ok(!best.is_some_and(|record| record.owner.is_node(&node.id)))
    }

    /// Whether the node has a login user for the given type.
    pub async fn has_credentials(&self, node: &Node, auth_type: &AuthType) -> ControlResult<bool> {
        Ok(self
            .node_record(node, auth_type)
            .await?
            .is_some_and(|record| record.has_credentials()))
    }

    /// Whether credentials of the given type are missing.
    ///
    /// For `ssh_keypair`, a node without its own key relies on the manager's
    /// keypair, so only the manager's user matters.
    pub async fn missing_credentials(
        &self,
        node: &Node,
        auth_type: &AuthType,
    ) -> ControlResult<bool> {
        if *auth_type != AuthType::SshKeypair {
            return Ok(!self.has_credentials(node, auth_type).await?);
        }

        let own_key = self
            .node_record(node, auth_type)
            .await?
            .is_some_and(|record| record.has_auth_key());
        if own_key {
            return Ok(!self.has_credentials(node, auth_type).await?);
        }

        Ok(!self
            .manager_keypair(node)
            .await?
            .is_some_and(|record| record.has_credentials()))
    }

    /// Overall authentication status shown for the node.
    pub async fn status_summary(&self, node: &Node) -> ControlResult<AuthStatus> {
        let keypair = self.node_record(node, &AuthType::SshKeypair).await?;
        if let Some(record) = keypair.as_ref().filter(|r| r.has_auth_key()) {
            return Ok(record.status);
        }

        if let Some(record) = self
            .node_record(node, &AuthType::Default)
            .await?
            .filter(CredentialRecord::has_password)
        {
            return Ok(record.status);
        }

        Ok(keypair.map_or(AuthStatus::None, |record| record.status))
    }

    /// Login parameters for an SSH session to the node.
    ///
    /// Both the key and the password login resolve through [`best_fit`],
    /// so a node without credentials of its own logs on with its
    /// manager's keypair.
    ///
    /// [`best_fit`]: Self::best_fit
    pub async fn ssh_login(&self, node: &Node) -> ControlResult<SshLogin> {
        if let Some(record) = self.best_fit(node, None).await? {
            if record.has_credentials() && record.has_auth_key() {
                let passwordless_sudo = record.userid.as_deref() != Some(ROOT_USER);
                return Ok(SshLogin {
                    user: record.userid,
                    password: None,
                    su_user: None,
                    su_password: None,
                    options: SshOptions {
                        key_data: record.auth_key,
                        passwordless_sudo,
                    },
                });
            }
        }

        let record = self.best_fit(node, Some(&AuthType::Default)).await?;
        let (user, password) = record
            .filter(CredentialRecord::has_credentials)
            .map_or((None, None), |r| (r.userid, r.password));
        let passwordless_sudo = user.as_deref() != Some(ROOT_USER);

        Ok(SshLogin {
            user,
            password,
            su_user: None,
            su_password: None,
            options: SshOptions {
                key_data: None,
                passwordless_sudo,
            },
        })
    }

    /// Check that the node accepts credentials of the given type.
    pub async fn verify_credentials(&self, node: &Node, auth_type: &AuthType) -> ControlResult<()> {
        if self.missing_credentials(node, auth_type).await? {
            return Err(ControlError::MissingCredentials);
        }

        let platform = node.os_image_name.as_deref().unwrap_or_default();
        if *auth_type != AuthType::Ipmi && !platform.contains("linux") {
            return Err(ControlError::UnsupportedPlatform {
                platform: platform.to_owned(),
            });
        }

        let credential = self.best_fit(node, Some(auth_type)).await?;
        self.verifier
            .verify(auth_type.verify_method(), node, credential.as_ref())
            .await
    }

    /// Log on over SSH and record the outcome on the node's keypair record.
    ///
    /// A placeholder `ssh_keypair` record is created for the node if it has
    /// none. When the node resolves to one of its own credentials, that
    /// record receives the status instead. Verification failures are stored,
    /// not returned.
    pub async fn update_ssh_auth_status(&self, node: &Node) -> ControlResult<AuthStatus> {
        let owner = CredentialOwner::Node(node.id.clone());
        let placeholder = self
            .store
            .find_or_create(
                &owner,
                &AuthType::SshKeypair,
                &format!("{PLACEHOLDER_CLASS} {}", node.name),
            )
            .await?;

        let credential = self.best_fit(node, None).await?;
        let target = match &credential {
            Some(record) if record.owner.is_node(&node.id) => record.clone(),
            _ => placeholder,
        };

        let (status, details) = match self.verify_credentials(node, &target.auth_type).await {
            Ok(()) => (AuthStatus::Valid, None),
            Err(e) => {
                warn!(node = %node.name, error = %e, "ssh credential check failed");
                let status = match e {
                    ControlError::Unreachable(_) => AuthStatus::Unreachable,
                    ControlError::InvalidCredentials(_)
                    | ControlError::MissingCredentials
                    | ControlError::UnsupportedPlatform { .. } => AuthStatus::Invalid,
                    _ => AuthStatus::Error,
                };
                (status, Some(e.to_string()))
            }
        };

        self.store
            .update_status(&target.id, status, details)
            .await?;

        if target.status == status {
            debug!(node = %node.name, status = %status, "ssh auth status unchanged");
        } else {
            info!(node = %node.name, from = %target.status, to = %status, "ssh auth status updated");
        }
        Ok(status)
    }
}
