//! Network topology loaded from a JSON inventory file.
//!
//! The inventory is a flat list of managed devices under a `"topology"`
//! key, each with a hostname and a management address:
//!
//! ```json
//! {"topology": [{"device_name": "C8K1", "ip_address": "10.0.0.1"}]}
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::CommandError;

/// One managed device in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceRecord {
    /// Device hostname as it appears in the inventory.
    #[serde(rename = "device_name")]
    pub hostname: String,
    /// Management IP address used for SSH sessions.
    #[serde(rename = "ip_address")]
    pub address: String,
}

/// The full device inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(rename = "topology")]
    devices: Vec<DeviceRecord>,
}

impl Topology {
    /// Loads the inventory from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Io`] if the file cannot be read, or
    /// [`CommandError::InvalidInput`] if it is not valid inventory JSON.
    pub fn load(path: &Path) -> Result<Self, CommandError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| CommandError::InvalidInput {
            message: format!("malformed topology file {}: {e}", path.display()),
        })
    }

    /// Builds a topology from an in-memory device list.
    #[must_use]
    pub const fn from_devices(devices: Vec<DeviceRecord>) -> Self {
        Self { devices }
    }

    /// All devices in inventory order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    /// Number of devices in the inventory.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the inventory is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Looks up a device by hostname, case-insensitively.
    #[must_use]
    pub fn find(&self, hostname: &str) -> Option<&DeviceRecord> {
        self.devices
            .iter()
            .find(|d| d.hostname.eq_ignore_ascii_case(hostname))
    }

    /// Renders the inventory as a JSON list of `[hostname, address]`
    /// pairs for inclusion in a prompt.
    #[must_use]
    pub fn prompt_pairs(&self) -> String {
        let pairs: Vec<(&str, &str)> = self
            .devices
            .iter()
            .map(|d| (d.hostname.as_str(), d.address.as_str()))
            .collect();
        serde_json::to_string(&pairs).unwrap_or_default()
    }
}
