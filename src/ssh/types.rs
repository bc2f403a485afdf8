//! Request and response shapes for the SSH key endpoints.

use serde::{Deserialize, Serialize};

use crate::client::FormBody;

/// SSH public key registered with the account.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SshKey {
    /// Backend identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Public key material.
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SshKeyList {
    #[serde(default)]
    pub(super) ssh_keys: Vec<SshKey>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedSshKey {
    pub(super) key: SshKey,
}

/// Parameters for `POST /vm/sshkey/new`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateSshKeyRequest {
    /// Display name.
    pub name: String,
    /// Public key material.
    pub public_key: String,
}

impl CreateSshKeyRequest {
    /// Encodes the request as the backend's form fields.
    #[must_use]
    pub fn form(&self) -> FormBody {
        FormBody::new()
            .field("key_name", self.name.as_str())
            .field("key_value", self.public_key.as_str())
    }
}

/// Parameters for `POST /vm/sshkey/edit`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateSshKeyRequest {
    /// Key being edited.
    pub uuid: String,
    /// New display name.
    pub name: String,
    /// Public key material, resent unchanged when only renaming.
    pub public_key: String,
}

impl UpdateSshKeyRequest {
    /// Encodes the request as the backend's form fields.
    #[must_use]
    pub fn form(&self) -> FormBody {
        FormBody::new()
            .field("ssh_key", self.uuid.as_str())
            .field("key_name", self.name.as_str())
            .field("key_value", self.public_key.as_str())
    }
}
