//! Client library for the OneProvider hosting API.
//!
//! The crate wraps the backend's quirky transport, where failures arrive
//! inside `200 OK` bodies, behind a typed [`Client`], exposes VM and SSH key
//! operations as services, and provides a bounded retry engine for reads that
//! must wait out the backend's eventual consistency.

pub mod client;
pub mod config;
mod lookup;
pub mod retry;
pub mod service;
pub mod ssh;
pub mod vm;

pub use client::{Client, ClientError, Credentials, KnownErrorCode};
pub use config::{ConfigError, OneProviderConfig};
pub use retry::{Attempt, RetryConfig, RetryError, with_retry, with_retry_until_valid};
pub use service::{OneProvider, SetupError};
pub use ssh::{SshKey, SshKeyError, SshKeyService};
pub use vm::{VmError, VmService};
