//! Command execution against managed devices, with caching and retry.
//!
//! Every (command, device) pair is executed at most once per session:
//! results land in a [`CommandCache`] and later requests for the same
//! pair are served from it. A transport failure is retried once before
//! surfacing as [`AgentError::DeviceUnreachable`].

use std::collections::HashMap;
use std::time::Duration;

use crate::agent::config::DeviceCredentials;
use crate::device::DeviceRecord;
use crate::error::AgentError;

/// Attempts per command before a device is declared unreachable.
const CONNECT_ATTEMPTS: u32 = 2;

/// Session-scoped cache of command output keyed by command, then device.
///
/// Entries are written once and never overwritten.
#[derive(Debug, Default)]
pub struct CommandCache {
    entries: HashMap<String, HashMap<String, String>>,
}

impl CommandCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up cached output for a (command, device) pair.
    #[must_use]
    pub fn get(&self, command: &str, device: &str) -> Option<&str> {
        self.entries
            .get(command)
            .and_then(|per_device| per_device.get(device))
            .map(String::as_str)
    }

    /// Records output for a (command, device) pair unless one exists.
    pub fn insert_if_absent(&mut self, command: &str, device: &str, output: String) {
        self.entries
            .entry(command.to_string())
            .or_default()
            .entry(device.to_string())
            .or_insert(output);
    }

    /// Number of distinct commands cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Transport for running one command on one device.
///
/// The SSH implementation lives in [`crate::device::ssh`]; tests plug in
/// doubles.
pub trait DeviceConnector: Send + Sync {
    /// Runs `command` on `device` and returns its raw output.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DeviceUnreachable`] on connection or
    /// session failures.
    fn run_command(
        &self,
        device: &DeviceRecord,
        credentials: &DeviceCredentials,
        command: &str,
        timeout: Duration,
    ) -> Result<String, AgentError>;
}

/// Runs commands against devices through a [`DeviceConnector`], caching
/// results for the session.
pub struct DeviceExecutor {
    connector: Box<dyn DeviceConnector>,
    credentials: DeviceCredentials,
    timeout: Duration,
    cache: CommandCache,
}

impl std::fmt::Debug for DeviceExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceExecutor")
            .field("timeout", &self.timeout)
            .field("cached_commands", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl DeviceExecutor {
    /// Creates an executor over the given transport.
    #[must_use]
    pub fn new(
        connector: Box<dyn DeviceConnector>,
        credentials: DeviceCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            connector,
            credentials,
            timeout,
            cache: CommandCache::new(),
        }
    }

    /// Runs `command` on `device`, serving repeats from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DeviceUnreachable`] once retry is exhausted.
    pub fn run(&mut self, command: &str, device: &DeviceRecord) -> Result<String, AgentError> {
        if let Some(cached) = self.cache.get(command, &device.hostname) {
            tracing::debug!(
                device = %device.hostname,
                command = %command,
                "serving command output from cache"
            );
            return Ok(cached.to_string());
        }

        let mut last_err = None;
        for attempt in 1..=CONNECT_ATTEMPTS {
            match self
                .connector
                .run_command(device, &self.credentials, command, self.timeout)
            {
                Ok(output) => {
                    self.cache
                        .insert_if_absent(command, &device.hostname, output.clone());
                    return Ok(output);
                }
                Err(e) => {
                    tracing::warn!(
                        device = %device.hostname,
                        attempt,
                        error = %e,
                        "command execution failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| AgentError::DeviceUnreachable {
            device: device.hostname.clone(),
            message: "no connection attempts were made".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn device(name: &str) -> DeviceRecord {
        DeviceRecord {
            hostname: name.to_string(),
            address: "10.0.0.1".to_string(),
        }
    }

    fn credentials() -> DeviceCredentials {
        DeviceCredentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    }

    /// Connector double that counts calls and fails the first `failures`.
    struct CountingConnector {
        calls: Mutex<u32>,
        failures: u32,
    }

    impl CountingConnector {
        fn new(failures: u32) -> Self {
            Self {
                calls: Mutex::new(0),
                failures,
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap_or_else(|_| unreachable!())
        }
    }

    impl DeviceConnector for CountingConnector {
        fn run_command(
            &self,
            device: &DeviceRecord,
            _credentials: &DeviceCredentials,
            command: &str,
            _timeout: Duration,
        ) -> Result<String, AgentError> {
            let mut calls = self.calls.lock().unwrap_or_else(|_| unreachable!());
            *calls += 1;
            if *calls <= self.failures {
                return Err(AgentError::DeviceUnreachable {
                    device: device.hostname.clone(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(format!("output of {command} on {}", device.hostname))
        }
    }

    impl DeviceConnector for std::sync::Arc<CountingConnector> {
        fn run_command(
            &self,
            device: &DeviceRecord,
            credentials: &DeviceCredentials,
            command: &str,
            timeout: Duration,
        ) -> Result<String, AgentError> {
            self.as_ref().run_command(device, credentials, command, timeout)
        }
    }

    #[test]
    fn test_cache_insert_if_absent_never_overwrites() {
        let mut cache = CommandCache::new();
        cache.insert_if_absent("show version", "r1", "first".to_string());
        cache.insert_if_absent("show version", "r1", "second".to_string());
        assert_eq!(cache.get("show version", "r1"), Some("first"));
        assert_eq!(cache.get("show version", "r2"), None);
    }

    #[test]
    fn test_run_caches_output() {
        let connector = std::sync::Arc::new(CountingConnector::new(0));
        let mut executor = DeviceExecutor::new(
            Box::new(std::sync::Arc::clone(&connector)),
            credentials(),
            Duration::from_secs(20),
        );
        let r1 = device("r1");

        let first = executor
            .run("show version", &r1)
            .unwrap_or_else(|_| unreachable!());
        let second = executor
            .run("show version", &r1)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(first, second);
        // The repeat is served from the cache: one session only.
        assert_eq!(connector.calls(), 1);
    }

    #[test]
    fn test_run_retries_once_then_succeeds() {
        let connector = std::sync::Arc::new(CountingConnector::new(1));
        let mut executor = DeviceExecutor::new(
            Box::new(std::sync::Arc::clone(&connector)),
            credentials(),
            Duration::from_secs(20),
        );
        let output = executor
            .run("show clock", &device("r1"))
            .unwrap_or_else(|_| unreachable!());
        assert!(output.contains("show clock"));
        // Two attempts total: one failure, one success.
        assert_eq!(connector.calls(), 2);
    }

    #[test]
    fn test_run_gives_up_after_retry() {
        let connector = Box::new(CountingConnector::new(10));
        let mut executor =
            DeviceExecutor::new(connector, credentials(), Duration::from_secs(20));
        let result = executor.run("show clock", &device("r1"));
        assert!(matches!(
            result,
            Err(AgentError::DeviceUnreachable { .. })
        ));
    }

    #[test]
    fn test_cache_is_per_device() {
        let connector = Box::new(CountingConnector::new(0));
        let mut executor =
            DeviceExecutor::new(connector, credentials(), Duration::from_secs(20));
        let out1 = executor
            .run("show version", &device("r1"))
            .unwrap_or_else(|_| unreachable!());
        let out2 = executor
            .run("show version", &device("r2"))
            .unwrap_or_else(|_| unreachable!());
        assert_ne!(out1, out2);
    }
}
