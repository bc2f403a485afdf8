//! Entry point bundling every OneProvider service over one shared client.

use thiserror::Error;

use crate::client::{Client, ClientError, Credentials};
use crate::config::{ConfigError, OneProviderConfig};
use crate::ssh::SshKeyService;
use crate::vm::VmService;

/// Errors raised while assembling [`OneProvider`] from configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SetupError {
    /// The configuration is incomplete or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Services sharing a single transport client.
#[derive(Clone, Debug)]
pub struct OneProvider {
    /// VM catalogue and lifecycle operations.
    pub vm: VmService,
    /// SSH key management.
    pub ssh: SshKeyService,
}

impl OneProvider {
    /// Builds the services over an existing client.
    #[must_use]
    pub fn new(client: &Client) -> Self {
        Self {
            vm: VmService::new(client.clone()),
            ssh: SshKeyService::new(client.clone()),
        }
    }

    /// Builds a client for already validated credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the HTTP client cannot be built.
    pub fn from_credentials(credentials: Credentials) -> Result<Self, ClientError> {
        Client::new(credentials).map(|client| Self::new(&client))
    }

    /// Validates loaded configuration and builds the services.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] when the configuration is incomplete or
    /// malformed and [`SetupError::Client`] when the HTTP client cannot be
    /// built.
    pub fn from_config(config: &OneProviderConfig) -> Result<Self, SetupError> {
        let credentials = Credentials::from_config(config)?;
        Ok(Self::from_credentials(credentials)?)
    }
}
