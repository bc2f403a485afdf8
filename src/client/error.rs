//! Error types for the transport client.

use thiserror::Error;

/// Backend error codes that map onto dedicated [`ClientError`] variants.
///
/// The backend reports business failures inside a 2xx response body as
/// `{"error": {"code": .., "message": ..}}`. Codes listed here are well known
/// and callers branch on them; any other code surfaces as
/// [`ClientError::Business`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum KnownErrorCode {
    /// The referenced VM or entity does not exist on the backend.
    EntityNotFound,
}

impl KnownErrorCode {
    /// Every known code, in table order.
    pub const ALL: [Self; 1] = [Self::EntityNotFound];

    /// Numeric code as sent by the backend.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::EntityNotFound => 42,
        }
    }

    /// Looks up a numeric code in the table.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.code() == code)
    }

    /// Sentinel error associated with this code.
    #[must_use]
    pub const fn sentinel(self) -> ClientError {
        match self {
            Self::EntityNotFound => ClientError::EntityNotFound,
        }
    }
}

/// Errors raised by [`crate::client::Client`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// The backend answered with a status outside `200..300`.
    #[error("client: api request failed with status: {status}")]
    Transport {
        /// HTTP status code returned by the backend.
        status: u16,
    },
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("client: api request could not be sent: {message}")]
    Connection {
        /// Message from the HTTP stack.
        message: String,
    },
    /// The response body was not the JSON shape expected.
    #[error("client: failed to decode {stage}: {message}")]
    Decode {
        /// Which decoding pass failed.
        stage: DecodeStage,
        /// Parser diagnostic.
        message: String,
    },
    /// The backend reported an error code outside the known table.
    #[error("client: api internal error {code}: {message}")]
    Business {
        /// Backend error code.
        code: i64,
        /// Backend error message.
        message: String,
    },
    /// The HTTP stack could not be initialised.
    #[error("client: failed to build http client: {message}")]
    Setup {
        /// Message from the HTTP stack.
        message: String,
    },
    /// Sentinel for [`KnownErrorCode::EntityNotFound`].
    #[error("client: entity not found")]
    EntityNotFound,
}

impl ClientError {
    /// Returns `true` for the backend's "entity not found" sentinel.
    #[must_use]
    pub const fn is_entity_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound)
    }

    /// Returns `true` when repeating the same request may succeed: lost
    /// connections and 5xx statuses.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Transport { status } => *status >= 500,
            Self::Decode { .. }
            | Self::Business { .. }
            | Self::Setup { .. }
            | Self::EntityNotFound => false,
        }
    }
}

/// Identifies the decoding pass that failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeStage {
    /// Reading the body bytes off the connection.
    Body,
    /// Speculative decoding of the `error` envelope.
    ErrorEnvelope,
    /// Decoding the caller's result type.
    Payload,
}

impl std::fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Body => "response body",
            Self::ErrorEnvelope => "error response body",
            Self::Payload => "response",
        };
        f.write_str(label)
    }
}
