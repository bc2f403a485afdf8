//! VM operations: catalogue lookups and the instance lifecycle.
//!
//! Lookups list the whole collection and filter client side; the backend
//! offers no server-side filtering.

mod error;
mod types;

use std::collections::BTreeMap;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{Client, ClientError, ResponseBody};
use crate::lookup::names_match;
use crate::retry::{Attempt, RetryConfig, RetryError, with_retry, with_retry_until_valid};

pub use error::VmError;
pub use types::{
    AvailableIps, CreateInstanceRequest, CreatedInstance, DestroyInstanceRequest,
    DestroyedInstance, InstanceInfo, Location, Size, Template, TemplateDisplay,
    UpdateHostnameRequest,
};

const TEMPLATES_PATH: &str = "/vm/templates";
const LOCATIONS_PATH: &str = "/vm/locations";
const SIZES_PATH: &str = "/vm/sizes";
const INFO_PATH: &str = "/vm/info";
const CREATE_PATH: &str = "/vm/create";
const HOSTNAME_PATH: &str = "/vm/hostname";
const DESTROY_PATH: &str = "/vm/destroy";

/// Locations keyed by region name.
pub type LocationsByRegion = BTreeMap<String, Vec<Location>>;

/// VM endpoints of the OneProvider API.
#[derive(Clone, Debug)]
pub struct VmService {
    client: Client,
}

impl VmService {
    /// Wraps a transport client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists every template.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`] when the backend call fails.
    pub async fn list_templates(&self) -> Result<Vec<Template>, VmError> {
        self.fetch_templates()
            .await
            .map_err(VmError::request("list templates"))
    }

    /// Finds a template by name, ignoring case. The first match wins.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::TemplateNotFound`] when no template matches and
    /// [`VmError::Request`] when the listing fails.
    pub async fn get_template_by_name(&self, name: &str) -> Result<Template, VmError> {
        let templates = self
            .fetch_templates()
            .await
            .map_err(VmError::request("get template by name"))?;
        templates
            .into_iter()
            .find(|template| names_match(&template.name, name))
            .ok_or_else(|| VmError::TemplateNotFound {
                name: name.to_owned(),
            })
    }

    /// Lists every location grouped by region.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`] when the backend call fails.
    pub async fn list_locations(&self) -> Result<LocationsByRegion, VmError> {
        self.fetch_locations()
            .await
            .map_err(VmError::request("list locations"))
    }

    /// Finds a location by exact, case-sensitive city name across all
    /// regions.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::LocationNotFound`] when no region lists the city
    /// and [`VmError::Request`] when the listing fails.
    pub async fn get_location_by_city(&self, city: &str) -> Result<Location, VmError> {
        let regions = self
            .fetch_locations()
            .await
            .map_err(VmError::request("get location by city"))?;
        regions
            .into_values()
            .flatten()
            .find(|location| location.city == city)
            .ok_or_else(|| VmError::LocationNotFound {
                city: city.to_owned(),
            })
    }

    /// Lists every instance size.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`] when the backend call fails.
    pub async fn list_sizes(&self) -> Result<Vec<Size>, VmError> {
        self.fetch_sizes()
            .await
            .map_err(VmError::request("list sizes"))
    }

    /// Finds a size by its type name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::SizeNotFound`] when no size matches and
    /// [`VmError::Request`] when the listing fails.
    pub async fn get_size_by_name(&self, name: &str) -> Result<Size, VmError> {
        let sizes = self
            .fetch_sizes()
            .await
            .map_err(VmError::request("get size by name"))?;
        sizes
            .into_iter()
            .find(|size| names_match(&size.size_type, name))
            .ok_or_else(|| VmError::SizeNotFound {
                name: name.to_owned(),
            })
    }

    /// Reads the live details of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`]; an unknown ID carries the
    /// [`ClientError::EntityNotFound`] sentinel.
    pub async fn get_instance_by_id(&self, id: &str) -> Result<InstanceInfo, VmError> {
        self.fetch_instance(id)
            .await
            .map_err(VmError::request("get instance by id"))
    }

    /// Creates an instance.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Validation`] for a blank hostname or template and
    /// [`VmError::Request`] when the backend rejects the request.
    pub async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<CreatedInstance, VmError> {
        require_non_blank("hostname", &request.hostname)?;
        require_non_blank("template", &request.template)?;
        let body: ResponseBody<CreatedInstance> = self
            .client
            .post_form(CREATE_PATH, &request.form())
            .await
            .map_err(VmError::request("create instance"))?;
        debug!(id = %body.response.id, hostname = %body.response.hostname, "instance created");
        Ok(body.response)
    }

    /// Changes an instance's hostname. The backend applies the change
    /// asynchronously; see [`VmService::update_instance_hostname_confirmed`].
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Validation`] for a blank hostname, before any
    /// network call, and [`VmError::Request`] when the backend rejects it.
    pub async fn update_instance_hostname(
        &self,
        request: &UpdateHostnameRequest,
    ) -> Result<(), VmError> {
        require_non_blank("hostname", &request.hostname)?;
        self.client
            .send(Method::POST, HOSTNAME_PATH, Some(&request.form()))
            .await
            .map_err(VmError::request("update instance hostname"))
    }

    /// Destroys an instance and returns the final billing summary.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`] when the backend rejects the request.
    pub async fn destroy_instance(
        &self,
        request: &DestroyInstanceRequest,
    ) -> Result<DestroyedInstance, VmError> {
        let body: ResponseBody<DestroyedInstance> = self
            .client
            .post_form(DESTROY_PATH, &request.form())
            .await
            .map_err(VmError::request("destroy instance"))?;
        Ok(body.response)
    }

    /// Polls until a freshly created instance becomes readable.
    ///
    /// "Not found" and transient failures are retried; any other error
    /// stops the loop.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::Request`] for a permanent failure and
    /// [`VmError::Unconfirmed`] when the budget runs out or `cancel` fires.
    pub async fn wait_for_instance(
        &self,
        id: &str,
        retry: &RetryConfig,
        cancel: &CancellationToken,
    ) -> Result<InstanceInfo, VmError> {
        with_retry(cancel, retry, move |_| async move {
            match self.fetch_instance(id).await {
                Ok(info) => Attempt::Done(info),
                Err(err) if err.is_entity_not_found() || err.is_transient() => {
                    Attempt::Retry(Some(err))
                }
                Err(err) => Attempt::Fail(err),
            }
        })
        .await
        .map_err(|err| unconfirmed("wait for instance", err))
    }

    /// Changes the hostname, then re-reads the instance until the new
    /// hostname is visible.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`VmService::update_instance_hostname`], or
    /// [`VmError::Unconfirmed`] when the change never shows up.
    pub async fn update_instance_hostname_confirmed(
        &self,
        request: &UpdateHostnameRequest,
        retry: &RetryConfig,
        cancel: &CancellationToken,
    ) -> Result<InstanceInfo, VmError> {
        self.update_instance_hostname(request).await?;
        with_retry_until_valid(
            cancel,
            retry,
            move || self.fetch_instance(&request.vm_id),
            |info: &InstanceInfo| info.hostname == request.hostname,
        )
        .await
        .map_err(|err| unconfirmed("update instance hostname", err))
    }

    async fn fetch_templates(&self) -> Result<Vec<Template>, ClientError> {
        let body: ResponseBody<Vec<Template>> = self.client.get(TEMPLATES_PATH).await?;
        Ok(body.response)
    }

    async fn fetch_locations(&self) -> Result<LocationsByRegion, ClientError> {
        let body: ResponseBody<LocationsByRegion> = self.client.get(LOCATIONS_PATH).await?;
        Ok(body.response)
    }

    async fn fetch_sizes(&self) -> Result<Vec<Size>, ClientError> {
        let body: ResponseBody<Vec<Size>> = self.client.get(SIZES_PATH).await?;
        Ok(body.response)
    }

    async fn fetch_instance(&self, id: &str) -> Result<InstanceInfo, ClientError> {
        let body: ResponseBody<types::InstanceInfoResponse> =
            self.client.get(&format!("{INFO_PATH}/{id}")).await?;
        Ok(body.response.server_info)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), VmError> {
    if value.trim().is_empty() {
        return Err(VmError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn unconfirmed(action: &'static str, err: RetryError<ClientError>) -> VmError {
    match err {
        RetryError::Permanent(source) => VmError::Request { action, source },
        other => VmError::Unconfirmed {
            action,
            source: other,
        },
    }
}
