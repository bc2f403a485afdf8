//! Request and response shapes for the `/vm` endpoints.

use serde::{Deserialize, Serialize};

use crate::client::FormBody;

/// Operating system template offered for new instances.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Template {
    /// Numeric template identifier.
    pub id: u64,
    /// Template name, for example `Ubuntu 24.04`.
    pub name: String,
    /// Image size in bytes, sent as a decimal string.
    pub size: String,
    /// Presentation metadata.
    #[serde(default)]
    pub display: TemplateDisplay,
}

/// Presentation metadata attached to a [`Template`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateDisplay {
    /// Short display name.
    pub name: String,
    /// Display label.
    pub display: String,
    /// Long description.
    pub description: String,
    /// Provider specific flag.
    pub oca: i64,
}

/// Datacenter location.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Location {
    /// Location identifier, sent as a string.
    pub id: String,
    /// Region the location belongs to, for example `Africa`.
    pub region: String,
    /// ISO country code.
    pub country: String,
    /// City name.
    pub city: String,
    /// Instance types offered at this location.
    #[serde(default)]
    pub available_types: Vec<String>,
    /// Instance size identifiers offered at this location.
    #[serde(default)]
    pub available_sizes: Vec<u64>,
    /// Free address pools.
    #[serde(default)]
    pub available_ips: AvailableIps,
}

/// Address availability for a [`Location`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AvailableIps {
    /// IPv4 availability as reported by the backend.
    pub ipv4: String,
    /// IPv6 availability as reported by the backend.
    pub ipv6: String,
}

/// Hardware profile for new instances.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Size {
    /// Size identifier.
    pub id: String,
    /// Size name, for example `VPS-S`.
    #[serde(rename = "type")]
    pub size_type: String,
    /// Number of CPU cores.
    #[serde(default)]
    pub cores: String,
    /// Memory in MB.
    #[serde(default)]
    pub ram: String,
    /// Disk size in GB.
    #[serde(default)]
    pub disk: String,
}

/// Live details of an instance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Primary address.
    #[serde(rename = "ipaddress", default)]
    pub ip_address: String,
    /// Current hostname.
    #[serde(default)]
    pub hostname: String,
    /// City of the hosting location.
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct InstanceInfoResponse {
    pub(super) server_info: InstanceInfo,
}

/// Parameters for `POST /vm/create`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateInstanceRequest {
    /// Target location identifier.
    pub location_id: u64,
    /// Hardware size identifier.
    pub instance_size: u64,
    /// Template identifier.
    pub template: String,
    /// Hostname assigned at creation.
    pub hostname: String,
    /// SSH key UUIDs installed on the instance.
    pub ssh_keys: Vec<String>,
}

impl CreateInstanceRequest {
    /// Encodes the request as the backend's form fields.
    #[must_use]
    pub fn form(&self) -> FormBody {
        FormBody::new()
            .field("location_id", self.location_id.to_string())
            .field("instance_size", self.instance_size.to_string())
            .field("template", self.template.as_str())
            .field("hostname", self.hostname.as_str())
            .indexed("ssh_keys", self.ssh_keys.iter().map(String::as_str))
    }
}

/// Instance returned by `POST /vm/create`.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreatedInstance {
    /// Backend status message.
    #[serde(default)]
    pub message: String,
    /// New instance identifier.
    pub id: String,
    /// Assigned address.
    #[serde(default)]
    pub ip_address: String,
    /// Assigned hostname.
    #[serde(default)]
    pub hostname: String,
    /// Initial root password.
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CreatedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedInstance")
            .field("message", &self.message)
            .field("id", &self.id)
            .field("ip_address", &self.ip_address)
            .field("hostname", &self.hostname)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for `POST /vm/hostname`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateHostnameRequest {
    /// Instance identifier.
    pub vm_id: String,
    /// New hostname.
    pub hostname: String,
}

impl UpdateHostnameRequest {
    /// Encodes the request as the backend's form fields.
    #[must_use]
    pub fn form(&self) -> FormBody {
        FormBody::new()
            .field("vm_id", self.vm_id.as_str())
            .field("hostname", self.hostname.as_str())
    }
}

/// Parameters for `POST /vm/destroy`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DestroyInstanceRequest {
    /// Instance identifier.
    pub vm_id: String,
    /// Confirms that the instance may be closed immediately.
    pub confirm_close: bool,
}

impl DestroyInstanceRequest {
    /// Encodes the request as the backend's form fields.
    #[must_use]
    pub fn form(&self) -> FormBody {
        FormBody::new()
            .field("vm_id", self.vm_id.as_str())
            .field("confirm_close", self.confirm_close.to_string())
    }
}

/// Billing summary returned by `POST /vm/destroy`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DestroyedInstance {
    /// Backend status message.
    pub message: String,
    /// Hours billed.
    #[serde(rename = "usageHours")]
    pub usage_hours: String,
    /// Bandwidth overusage in GB.
    #[serde(rename = "bandwidthOverusage")]
    pub bandwidth_overusage: String,
    /// Cost of the bandwidth overusage.
    #[serde(rename = "bandwidthOverusageCost")]
    pub bandwidth_overusage_cost: String,
    /// Extra hours charged.
    #[serde(rename = "additionalHoursForCharge")]
    pub additional_hours_for_charge: String,
}
