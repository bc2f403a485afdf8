//! Response decoding for a backend that always answers 200.
//!
//! Business failures arrive inside the body, so every 2xx body is decoded
//! twice: once into [`ErrorEnvelope`] and, when no error is present, into the
//! caller's payload type.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{ClientError, DecodeStage, KnownErrorCode};

/// Error object embedded in a response body.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ApiErrorBody {
    /// Backend error code; `0` when the backend omits it.
    #[serde(default)]
    pub code: i64,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
}

/// Generic shape shared by every response.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ErrorEnvelope {
    /// Present and non-null only when the backend rejected the request.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Successful payload wrapper: every read answers `{"response": ...}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ResponseBody<T> {
    /// Endpoint specific payload.
    pub response: T,
}

impl ApiErrorBody {
    /// Maps the body through the known-code table.
    #[must_use]
    pub fn into_client_error(self) -> ClientError {
        KnownErrorCode::from_code(self.code).map_or(
            ClientError::Business {
                code: self.code,
                message: self.message,
            },
            KnownErrorCode::sentinel,
        )
    }
}

/// Rejects statuses outside `200..300` without looking at the body.
pub(crate) const fn check_status(status: u16) -> Result<(), ClientError> {
    if status >= 200 && status < 300 {
        Ok(())
    } else {
        Err(ClientError::Transport { status })
    }
}

/// Fails with the embedded business error when one is present.
pub(crate) fn check_error_envelope(body: &[u8]) -> Result<(), ClientError> {
    let envelope: ErrorEnvelope =
        serde_json::from_slice(body).map_err(|err| ClientError::Decode {
            stage: DecodeStage::ErrorEnvelope,
            message: err.to_string(),
        })?;
    envelope
        .error
        .map_or(Ok(()), |error| Err(error.into_client_error()))
}

/// Applies the full status, envelope, payload pipeline to a response.
///
/// # Errors
///
/// Returns [`ClientError::Transport`] for non-2xx statuses,
/// [`ClientError::Decode`] for malformed bodies, and the mapped business
/// error when the body carries one.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ClientError> {
    check_status(status)?;
    check_error_envelope(body)?;
    serde_json::from_slice(body).map_err(|err| ClientError::Decode {
        stage: DecodeStage::Payload,
        message: err.to_string(),
    })
}

/// Like [`decode_response`] but discards the payload.
///
/// # Errors
///
/// Same as [`decode_response`], minus payload decoding.
pub fn check_response(status: u16, body: &[u8]) -> Result<(), ClientError> {
    check_status(status)?;
    check_error_envelope(body)
}
