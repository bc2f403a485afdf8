//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.oneprovider.com";

/// OneProvider API settings derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "ONEPROVIDER")]
pub struct OneProviderConfig {
    /// Base URI of the API. Defaults to `https://api.oneprovider.com`.
    #[ortho_config(default = "https://api.oneprovider.com".to_owned())]
    pub endpoint: String,
    /// API key sent in the `Api-Key` header. This value is required.
    pub api_key: String,
    /// Client key sent in the `Client-Key` header. This value is required.
    pub client_key: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

const ENDPOINT_FIELD: FieldMetadata =
    FieldMetadata::new("API endpoint", "ONEPROVIDER_ENDPOINT", "endpoint");
const API_KEY_FIELD: FieldMetadata =
    FieldMetadata::new("OneProvider API key", "ONEPROVIDER_API_KEY", "api_key");
const CLIENT_KEY_FIELD: FieldMetadata = FieldMetadata::new(
    "OneProvider client key",
    "ONEPROVIDER_CLIENT_KEY",
    "client_key",
);

impl OneProviderConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to oneprovider.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("oneprovider")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide missing values via environment variables or the
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is blank
    /// and [`ConfigError::InvalidEndpoint`] when the endpoint is not an
    /// absolute URI.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(&self.endpoint, &ENDPOINT_FIELD)?;
        parse_endpoint(&self.endpoint)?;
        Self::require_field(&self.api_key, &API_KEY_FIELD)?;
        Self::require_field(&self.client_key, &CLIENT_KEY_FIELD)?;
        Ok(())
    }
}

/// Parses an endpoint string, rejecting relative or non-hierarchical URIs.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidEndpoint {
        endpoint: trimmed.to_owned(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: trimmed.to_owned(),
            reason: String::from("endpoint must be a base URI such as https://api.oneprovider.com"),
        });
    }
    Ok(url)
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// The endpoint could not be parsed as an absolute URI.
    #[error("endpoint '{endpoint}' is a malformed URI: {reason}")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// A key contains bytes that cannot be sent in an HTTP header.
    #[error("{field} is not a valid header value: {reason}")]
    InvalidKey {
        /// Which key was rejected.
        field: &'static str,
        /// Parser diagnostic.
        reason: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
