//! Transport client for the OneProvider API.
//!
//! The backend answers `200 OK` even when a request fails and reports the
//! real outcome inside the JSON body. [`Client`] therefore treats the status
//! line only as a transport signal and inspects every body for an embedded
//! `error` object before decoding the caller's payload. It performs exactly
//! one request per call; retries are layered on top by the services.

mod envelope;
mod error;
mod form;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, OneProviderConfig, parse_endpoint};

pub use envelope::{ApiErrorBody, ErrorEnvelope, ResponseBody, check_response, decode_response};
pub use error::{ClientError, DecodeStage, KnownErrorCode};
pub use form::FormBody;

/// User agent sent with every request.
pub const USER_AGENT: &str = "OneApi/1.0";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "Api-Key";
/// Header carrying the client key.
pub const CLIENT_KEY_HEADER: &str = "Client-Key";
/// Content type sent with every request, including body-less reads.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated endpoint and key pair.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    endpoint: String,
    api_key: HeaderValue,
    client_key: HeaderValue,
}

impl Credentials {
    /// Trims and validates the three inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] when the endpoint is not an
    /// absolute URI, [`ConfigError::MissingField`] when either key is blank
    /// and [`ConfigError::InvalidKey`] when a key cannot be sent as a header.
    pub fn new(endpoint: &str, api_key: &str, client_key: &str) -> Result<Self, ConfigError> {
        parse_endpoint(endpoint)?;
        let api = api_key.trim();
        if api.is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "api key should not be empty",
            )));
        }
        let client = client_key.trim();
        if client.is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "client key should not be empty",
            )));
        }
        Ok(Self {
            endpoint: endpoint.trim().trim_end_matches('/').to_owned(),
            api_key: secret_header("api key", api)?,
            client_key: secret_header("client key", client)?,
        })
    }

    /// Builds credentials from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn from_config(config: &OneProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(&config.endpoint, &config.api_key, &config.client_key)
    }

    /// Base endpoint without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn secret_header(field: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    let mut header = HeaderValue::from_str(value).map_err(|err| ConfigError::InvalidKey {
        field,
        reason: err.to_string(),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("client_key", &"<redacted>")
            .finish()
    }
}

/// Signed, single-shot HTTP client.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    credentials: Arc<Credentials>,
}

impl Client {
    /// Creates a client with a 30 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the TLS backend cannot be
    /// initialised.
    pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Setup {
                message: err.to_string(),
            })?;
        Ok(Self::with_http_client(credentials, http))
    }

    /// Creates a client over a caller supplied `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            http,
            credentials: Arc::new(credentials),
        }
    }

    /// Credentials the client signs requests with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.credentials.endpoint)
    }

    /// Issues one request and decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] for non-2xx statuses,
    /// [`ClientError::Connection`] when no response arrives,
    /// [`ClientError::Decode`] for malformed bodies, and the mapped
    /// business error when the body reports one.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&FormBody>,
    ) -> Result<T, ClientError> {
        let (status, bytes) = self.execute(method, path, body).await?;
        decode_response(status, &bytes)
    }

    /// Issues one request and only checks it for errors.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`], without payload decoding.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&FormBody>,
    ) -> Result<(), ClientError> {
        let (status, bytes) = self.execute(method, path, body).await?;
        check_response(status, &bytes)
    }

    /// `GET` shorthand for [`Client::call`].
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::GET, path, None).await
    }

    /// `POST` shorthand for [`Client::call`] with a form body.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &FormBody,
    ) -> Result<T, ClientError> {
        self.call(Method::POST, path, Some(body)).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&FormBody>,
    ) -> Result<(u16, Vec<u8>), ClientError> {
        let url = self.url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .header(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT))
            .header(API_KEY_HEADER, self.credentials.api_key.clone())
            .header(CLIENT_KEY_HEADER, self.credentials.client_key.clone());
        if let Some(form) = body {
            request = request.body(form.encode());
        }

        debug!(%method, path, "sending API request");
        let response = request.send().await.map_err(|err| ClientError::Connection {
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        debug!(%method, path, status, "received API response");
        envelope::check_status(status)?;

        let bytes = response.bytes().await.map_err(|err| ClientError::Decode {
            stage: DecodeStage::Body,
            message: err.to_string(),
        })?;
        Ok((status, bytes.to_vec()))
    }
}
