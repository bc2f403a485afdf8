//! SSH key management.

mod error;
mod types;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{Client, ClientError, FormBody, ResponseBody};
use crate::lookup::names_match;
use crate::retry::{RetryConfig, RetryError, with_retry_until_valid};

pub use error::SshKeyError;
pub use types::{CreateSshKeyRequest, SshKey, UpdateSshKeyRequest};

const LIST_PATH: &str = "/vm/sshkeys/list";
const CREATE_PATH: &str = "/vm/sshkey/new";
const EDIT_PATH: &str = "/vm/sshkey/edit";
const DELETE_PATH: &str = "/vm/sshkey/delete";

/// SSH key endpoints of the OneProvider API.
#[derive(Clone, Debug)]
pub struct SshKeyService {
    client: Client,
}

impl SshKeyService {
    /// Wraps a transport client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists every key on the account.
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::Request`] when the backend call fails.
    pub async fn list(&self) -> Result<Vec<SshKey>, SshKeyError> {
        self.fetch_keys()
            .await
            .map_err(SshKeyError::request("list ssh keys"))
    }

    /// Finds a key by exact UUID.
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::NotFoundById`] when the listing lacks the key
    /// and [`SshKeyError::Request`] when the listing fails.
    pub async fn get_by_id(&self, id: &str) -> Result<SshKey, SshKeyError> {
        let keys = self
            .fetch_keys()
            .await
            .map_err(SshKeyError::request("get ssh key by id"))?;
        keys.into_iter()
            .find(|key| key.uuid == id)
            .ok_or_else(|| SshKeyError::NotFoundById { id: id.to_owned() })
    }

    /// Finds a key by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::NotFoundByName`] when no key matches and
    /// [`SshKeyError::Request`] when the listing fails.
    pub async fn get_by_name(&self, name: &str) -> Result<SshKey, SshKeyError> {
        let keys = self
            .fetch_keys()
            .await
            .map_err(SshKeyError::request("get ssh key by name"))?;
        keys.into_iter()
            .find(|key| names_match(&key.name, name))
            .ok_or_else(|| SshKeyError::NotFoundByName {
                name: name.to_owned(),
            })
    }

    /// Registers a new key.
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::Validation`] for a blank name or key and
    /// [`SshKeyError::Request`] when the backend rejects it.
    pub async fn create(&self, request: &CreateSshKeyRequest) -> Result<SshKey, SshKeyError> {
        require_non_blank("key name", &request.name)?;
        require_non_blank("public key", &request.public_key)?;
        let body: ResponseBody<types::CreatedSshKey> = self
            .client
            .post_form(CREATE_PATH, &request.form())
            .await
            .map_err(SshKeyError::request("create ssh key"))?;
        debug!(uuid = %body.response.key.uuid, "ssh key created");
        Ok(body.response.key)
    }

    /// Submits an edit. The backend applies it asynchronously; see
    /// [`SshKeyService::update_confirmed`].
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::Validation`] for a blank name and
    /// [`SshKeyError::Request`] when the backend rejects the edit.
    pub async fn update(&self, request: &UpdateSshKeyRequest) -> Result<(), SshKeyError> {
        require_non_blank("key name", &request.name)?;
        self.client
            .send(Method::POST, EDIT_PATH, Some(&request.form()))
            .await
            .map_err(SshKeyError::request("update ssh key"))
    }

    /// Deletes a key.
    ///
    /// # Errors
    ///
    /// Returns [`SshKeyError::Request`] when the backend rejects the call.
    pub async fn destroy(&self, uuid: &str) -> Result<(), SshKeyError> {
        let form = FormBody::new().field("ssh_key", uuid);
        self.client
            .send(Method::POST, DELETE_PATH, Some(&form))
            .await
            .map_err(SshKeyError::request("destroy ssh key"))
    }

    /// Submits an edit, then re-reads the key until the new name is
    /// visible. A key missing from the listing is retried and, if it never
    /// reappears, reported as the last [`ClientError::EntityNotFound`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SshKeyService::update`], or
    /// [`SshKeyError::Unconfirmed`] when the new name never shows up.
    pub async fn update_confirmed(
        &self,
        request: &UpdateSshKeyRequest,
        retry: &RetryConfig,
        cancel: &CancellationToken,
    ) -> Result<SshKey, SshKeyError> {
        self.update(request).await?;
        with_retry_until_valid(
            cancel,
            retry,
            move || self.read_key(&request.uuid),
            |key: &SshKey| key.name == request.name,
        )
        .await
        .map_err(|err| unconfirmed("update ssh key", err))
    }

    async fn fetch_keys(&self) -> Result<Vec<SshKey>, ClientError> {
        let body: ResponseBody<types::SshKeyList> = self.client.get(LIST_PATH).await?;
        Ok(body.response.ssh_keys)
    }

    async fn read_key(&self, uuid: &str) -> Result<SshKey, ClientError> {
        let keys = self.fetch_keys().await?;
        keys.into_iter()
            .find(|key| key.uuid == uuid)
            .ok_or(ClientError::EntityNotFound)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), SshKeyError> {
    if value.trim().is_empty() {
        return Err(SshKeyError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn unconfirmed(action: &'static str, err: RetryError<ClientError>) -> SshKeyError {
    match err {
        RetryError::Permanent(source) => SshKeyError::Request { action, source },
        other => SshKeyError::Unconfirmed {
            action,
            source: other,
        },
    }
}
