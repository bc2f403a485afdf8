//! Error types for the VM service.

use thiserror::Error;

use crate::client::ClientError;
use crate::retry::RetryError;

/// Errors raised by [`crate::vm::VmService`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VmError {
    /// A backend call failed.
    #[error("vm: {action} failed: {source}")]
    Request {
        /// Operation that issued the call.
        action: &'static str,
        /// Transport or business failure.
        source: ClientError,
    },
    /// No template carries the requested name.
    #[error("vm: template not found for name {name}")]
    TemplateNotFound {
        /// Name passed by the caller.
        name: String,
    },
    /// No location in any region matches the requested city.
    #[error("vm: location not found for city {city}")]
    LocationNotFound {
        /// City passed by the caller.
        city: String,
    },
    /// No size carries the requested name.
    #[error("vm: size not found for name {name}")]
    SizeNotFound {
        /// Name passed by the caller.
        name: String,
    },
    /// Raised before any network call when a request is incomplete.
    #[error("vm: invalid request: {0}")]
    Validation(String),
    /// The backend never reflected the change within the retry budget.
    #[error("vm: {action} not confirmed: {source}")]
    Unconfirmed {
        /// Operation being confirmed.
        action: &'static str,
        /// Why the retry loop stopped.
        source: RetryError<ClientError>,
    },
}

impl VmError {
    pub(super) fn request(action: &'static str) -> impl Fn(ClientError) -> Self {
        move |source| Self::Request { action, source }
    }

    /// Returns `true` when the entity is missing, whether the backend said
    /// so or a client-side lookup came up empty.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_entity_not_found(),
            Self::TemplateNotFound { .. }
            | Self::LocationNotFound { .. }
            | Self::SizeNotFound { .. } => true,
            Self::Validation(_) | Self::Unconfirmed { .. } => false,
        }
    }
}
