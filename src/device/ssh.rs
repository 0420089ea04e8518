//! SSH transport for device command execution.
//!
//! One session per command: connect, authenticate, exec, collect
//! output, close. IOS-XE devices drop idle exec channels quickly, so
//! holding sessions open across the selection loop buys nothing.

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use ssh2::Session;

use crate::agent::config::DeviceCredentials;
use crate::device::executor::DeviceConnector;
use crate::device::topology::DeviceRecord;
use crate::error::AgentError;

const SSH_PORT: u16 = 22;

/// Password-authenticated SSH connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl SshConnector {
    /// Creates a connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn open_session(
        device: &DeviceRecord,
        credentials: &DeviceCredentials,
        timeout: Duration,
    ) -> Result<Session, AgentError> {
        let unreachable = |message: String| AgentError::DeviceUnreachable {
            device: device.hostname.clone(),
            message,
        };

        let addr: SocketAddr = format!("{}:{SSH_PORT}", device.address)
            .parse()
            .map_err(|e| unreachable(format!("invalid address {}: {e}", device.address)))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| unreachable(format!("connect failed: {e}")))?;

        let mut session =
            Session::new().map_err(|e| unreachable(format!("session init failed: {e}")))?;
        session.set_tcp_stream(stream);
        session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| unreachable(format!("handshake failed: {e}")))?;
        session
            .userauth_password(&credentials.username, &credentials.password)
            .map_err(|e| unreachable(format!("authentication failed: {e}")))?;
        Ok(session)
    }
}

impl DeviceConnector for SshConnector {
    fn run_command(
        &self,
        device: &DeviceRecord,
        credentials: &DeviceCredentials,
        command: &str,
        timeout: Duration,
    ) -> Result<String, AgentError> {
        let unreachable = |message: String| AgentError::DeviceUnreachable {
            device: device.hostname.clone(),
            message,
        };

        tracing::debug!(
            device = %device.hostname,
            address = %device.address,
            command = %command,
            "opening ssh session"
        );
        let session = Self::open_session(device, credentials, timeout)?;

        let mut channel = session
            .channel_session()
            .map_err(|e| unreachable(format!("channel open failed: {e}")))?;
        channel
            .exec(command)
            .map_err(|e| unreachable(format!("exec failed: {e}")))?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| unreachable(format!("read failed: {e}")))?;
        channel
            .wait_close()
            .map_err(|e| unreachable(format!("close failed: {e}")))?;

        tracing::debug!(
            device = %device.hostname,
            bytes = output.len(),
            "command output collected"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_address_is_unreachable() {
        let device = DeviceRecord {
            hostname: "r1".to_string(),
            address: "not-an-ip".to_string(),
        };
        let credentials = DeviceCredentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        let result = SshConnector::new().run_command(
            &device,
            &credentials,
            "show version",
            Duration::from_millis(10),
        );
        assert!(matches!(
            result,
            Err(AgentError::DeviceUnreachable { .. })
        ));
    }
}
