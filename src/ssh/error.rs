//! Error types for the SSH key service.

use thiserror::Error;

use crate::client::ClientError;
use crate::retry::RetryError;

/// Errors raised by [`crate::ssh::SshKeyService`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SshKeyError {
    /// A backend call failed.
    #[error("ssh: {action} failed: {source}")]
    Request {
        /// Operation that issued the call.
        action: &'static str,
        /// Transport or business failure.
        source: ClientError,
    },
    /// No key carries the requested identifier.
    #[error("ssh: key not found for id {id}")]
    NotFoundById {
        /// Identifier passed by the caller.
        id: String,
    },
    /// No key carries the requested name.
    #[error("ssh: key not found for name {name}")]
    NotFoundByName {
        /// Name passed by the caller.
        name: String,
    },
    /// Raised before any network call when a request is incomplete.
    #[error("ssh: invalid request: {0}")]
    Validation(String),
    /// The edit never became visible within the retry budget.
    #[error("ssh: {action} not confirmed: {source}")]
    Unconfirmed {
        /// Operation being confirmed.
        action: &'static str,
        /// Why the retry loop stopped.
        source: RetryError<ClientError>,
    },
}

impl SshKeyError {
    pub(super) fn request(action: &'static str) -> impl Fn(ClientError) -> Self {
        move |source| Self::Request { action, source }
    }

    /// Returns `true` when the key is missing, whether the backend said so or
    /// the listing did not contain it.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_entity_not_found(),
            Self::NotFoundById { .. } | Self::NotFoundByName { .. } => true,
            Self::Validation(_) | Self::Unconfirmed { .. } => false,
        }
    }
}
