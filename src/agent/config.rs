//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default chat model for all six roles.
const DEFAULT_MODEL: &str = "gpt-4o";
/// Default embeddings model for the knowledge store.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Starting size of the candidate pool offered to the command finder.
pub const DEFAULT_POOL_FLOOR: usize = 10;
/// Pool growth per rejection or sentinel miss.
pub const DEFAULT_POOL_STEP: usize = 10;
/// Pool size past which a question is declared unanswerable.
pub const DEFAULT_POOL_CEILING: usize = 110;
/// Default retries when a role reply fails to parse as its JSON shape.
const DEFAULT_MAX_PARSE_RETRIES: u32 = 3;
/// Default window (in turns) for the command finder's conversation.
const DEFAULT_HISTORY_WINDOW: usize = 20;
/// Default per-command device session timeout in seconds.
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 20;
/// Default max tokens for selector-style replies (finder, validator,
/// refiner, resolver).
const DEFAULT_REPLY_MAX_TOKENS: u32 = 1024;
/// Default max tokens for the verbose answerer and combiner replies.
const DEFAULT_ANSWER_MAX_TOKENS: u32 = 4096;

/// SSH credentials for device sessions.
#[derive(Debug, Clone)]
pub struct DeviceCredentials {
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: String,
}

/// Configuration for the agent pipeline.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Chat model used by all six roles.
    pub model: String,
    /// Embeddings model used by the knowledge store.
    pub embedding_model: String,
    /// Starting candidate pool size for command selection.
    pub pool_floor: usize,
    /// Pool growth per rejection.
    pub pool_step: usize,
    /// Pool ceiling; exceeding it fails the current question.
    pub pool_ceiling: usize,
    /// Retries when a role reply fails to parse as its JSON shape.
    pub max_parse_retries: u32,
    /// Window (in turns) for the command finder's conversation.
    pub history_window: usize,
    /// Per-command device session timeout.
    pub command_timeout: Duration,
    /// Max tokens for selector-style replies.
    pub reply_max_tokens: u32,
    /// Max tokens for answerer and combiner replies.
    pub answer_max_tokens: u32,
    /// SSH username for devices, if configured.
    pub device_username: Option<String>,
    /// SSH password for devices, if configured.
    pub device_password: Option<String>,
    /// Directory containing system prompt override files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Resolves device credentials from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::CredentialsMissing`] if either half is absent.
    pub fn credentials(&self) -> Result<DeviceCredentials, AgentError> {
        match (&self.device_username, &self.device_password) {
            (Some(username), Some(password)) => Ok(DeviceCredentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => Err(AgentError::CredentialsMissing),
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    embedding_model: Option<String>,
    pool_floor: Option<usize>,
    pool_step: Option<usize>,
    pool_ceiling: Option<usize>,
    max_parse_retries: Option<u32>,
    history_window: Option<usize>,
    command_timeout: Option<Duration>,
    reply_max_tokens: Option<u32>,
    answer_max_tokens: Option<u32>,
    device_username: Option<String>,
    device_password: Option<String>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("NETRAG_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("NETRAG_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("NETRAG_BASE_URL"))
                .ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("NETRAG_MODEL").ok();
        }
        if self.embedding_model.is_none() {
            self.embedding_model = std::env::var("NETRAG_EMBEDDING_MODEL").ok();
        }
        if self.device_username.is_none() {
            self.device_username = std::env::var("DEVICE_USERNAME").ok();
        }
        if self.device_password.is_none() {
            self.device_password = std::env::var("DEVICE_PASSWORD").ok();
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("NETRAG_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the embeddings model.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the candidate pool floor.
    #[must_use]
    pub const fn pool_floor(mut self, n: usize) -> Self {
        self.pool_floor = Some(n);
        self
    }

    /// Sets the candidate pool growth step.
    #[must_use]
    pub const fn pool_step(mut self, n: usize) -> Self {
        self.pool_step = Some(n);
        self
    }

    /// Sets the candidate pool ceiling.
    #[must_use]
    pub const fn pool_ceiling(mut self, n: usize) -> Self {
        self.pool_ceiling = Some(n);
        self
    }

    /// Sets the parse retry count.
    #[must_use]
    pub const fn max_parse_retries(mut self, n: u32) -> Self {
        self.max_parse_retries = Some(n);
        self
    }

    /// Sets the finder conversation window.
    #[must_use]
    pub const fn history_window(mut self, n: usize) -> Self {
        self.history_window = Some(n);
        self
    }

    /// Sets the per-command device session timeout.
    #[must_use]
    pub const fn command_timeout(mut self, duration: Duration) -> Self {
        self.command_timeout = Some(duration);
        self
    }

    /// Sets the selector-style reply max tokens.
    #[must_use]
    pub const fn reply_max_tokens(mut self, n: u32) -> Self {
        self.reply_max_tokens = Some(n);
        self
    }

    /// Sets the answerer/combiner reply max tokens.
    #[must_use]
    pub const fn answer_max_tokens(mut self, n: u32) -> Self {
        self.answer_max_tokens = Some(n);
        self
    }

    /// Sets the device SSH username.
    #[must_use]
    pub fn device_username(mut self, username: impl Into<String>) -> Self {
        self.device_username = Some(username.into());
        self
    }

    /// Sets the device SSH password.
    #[must_use]
    pub fn device_password(mut self, password: impl Into<String>) -> Self {
        self.device_password = Some(password.into());
        self
    }

    /// Sets the prompt override directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            pool_floor: self.pool_floor.unwrap_or(DEFAULT_POOL_FLOOR),
            pool_step: self.pool_step.unwrap_or(DEFAULT_POOL_STEP),
            pool_ceiling: self.pool_ceiling.unwrap_or(DEFAULT_POOL_CEILING),
            max_parse_retries: self.max_parse_retries.unwrap_or(DEFAULT_MAX_PARSE_RETRIES),
            history_window: self.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW),
            command_timeout: self
                .command_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS)),
            reply_max_tokens: self.reply_max_tokens.unwrap_or(DEFAULT_REPLY_MAX_TOKENS),
            answer_max_tokens: self.answer_max_tokens.unwrap_or(DEFAULT_ANSWER_MAX_TOKENS),
            device_username: self.device_username,
            device_password: self.device_password,
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.pool_floor, 10);
        assert_eq!(config.pool_step, 10);
        assert_eq!(config.pool_ceiling, 110);
        assert_eq!(config.command_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .model("gpt-4o-mini")
            .pool_ceiling(50)
            .command_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.pool_ceiling, 50);
        assert_eq!(config.command_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_credentials_missing() {
        let config = AgentConfig::builder()
            .api_key("key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_credentials_present() {
        let config = AgentConfig::builder()
            .api_key("key")
            .device_username("admin")
            .device_password("secret")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let creds = config.credentials().unwrap_or_else(|_| unreachable!());
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }
}
