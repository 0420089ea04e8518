//! Error types for netrag.
//!
//! Three layers: [`StoreError`] for the knowledge store, [`AgentError`] for
//! the agent pipeline and providers, and [`CommandError`] for the CLI edge.

use thiserror::Error;

/// Errors from the agent pipeline, providers, and device execution.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was found in configuration or environment.
    #[error("no API key found; set OPENAI_API_KEY or NETRAG_API_KEY")]
    ApiKeyMissing,

    /// Device credentials were not configured.
    #[error("device credentials missing; set DEVICE_USERNAME and DEVICE_PASSWORD")]
    CredentialsMissing,

    /// The configured provider name is not recognized.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// Transport-level API failure (connection, rate limit, server error).
    ///
    /// Not retried by the provider; callers decide whether to retry.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error description.
        message: String,
        /// HTTP status code, if one was received.
        status: Option<u16>,
    },

    /// A role reply failed to parse as its expected JSON shape after the
    /// configured number of retries.
    #[error("response parse failed: {message}")]
    ResponseParse {
        /// What failed to parse and why.
        message: String,
        /// The raw response content, for diagnostics.
        content: String,
    },

    /// A prompt template was rendered without a required field.
    #[error("prompt render failed: unresolved field `{field}`")]
    Format {
        /// The placeholder left unresolved.
        field: String,
    },

    /// A pipeline-level failure outside any single role.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Description of the failure.
        message: String,
    },

    /// A device could not be reached after exhausting retries.
    ///
    /// Aborts only that device's execution for the current question.
    #[error("device {device} unreachable: {message}")]
    DeviceUnreachable {
        /// Hostname of the device.
        device: String,
        /// Description of the last attempt's failure.
        message: String,
    },

    /// Knowledge store failure inside the flow.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the knowledge store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The embeddings API call failed.
    #[error("embedding request failed: {message}")]
    Embedding {
        /// Provider error description.
        message: String,
    },

    /// Stored or ingested data did not match the expected shape.
    #[error("malformed store data: {message}")]
    Malformed {
        /// Description of the mismatch.
        message: String,
    },

    /// The store's connection lock was poisoned by a panicking thread.
    #[error("store lock poisoned")]
    Poisoned,

    /// Filesystem failure reading or writing store-adjacent files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by CLI command implementations.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Agent pipeline failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Knowledge store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// User-supplied input was invalid.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },
}

/// Convenience alias for CLI command results.
pub type Result<T, E = CommandError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_agent_error() {
        let store_err = StoreError::Malformed {
            message: "bad metadata".to_string(),
        };
        let agent_err: AgentError = store_err.into();
        assert!(matches!(agent_err, AgentError::Store(_)));
    }

    #[test]
    fn test_device_unreachable_display() {
        let err = AgentError::DeviceUnreachable {
            device: "r1".to_string(),
            message: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("r1"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_format_error_names_field() {
        let err = AgentError::Format {
            field: "documentation".to_string(),
        };
        assert!(err.to_string().contains("documentation"));
    }
}
