//! Managed-device inventory and command execution.

pub mod executor;
pub mod ssh;
pub mod topology;

pub use executor::{CommandCache, DeviceConnector, DeviceExecutor};
pub use ssh::SshConnector;
pub use topology::{DeviceRecord, Topology};
