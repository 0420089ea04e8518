//! Chat backend selection.
//!
//! The configured provider name picks the concrete [`LlmProvider`] the
//! pipeline drives. Only OpenAI-compatible endpoints are wired in;
//! anything speaking that API is reachable by pointing
//! `NETRAG_BASE_URL` at it.

use std::sync::Arc;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Chat backends the pipeline knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI, or any endpoint speaking its chat-completions API.
    OpenAi,
}

impl ProviderKind {
    /// Resolves a configured provider name, ignoring case and padding.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for a name with no
    /// wired backend.
    pub fn from_name(name: &str) -> Result<Self, AgentError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            _ => Err(AgentError::UnsupportedProvider {
                name: name.to_string(),
            }),
        }
    }
}

/// Builds the chat provider named by `config.provider`.
///
/// All six roles share one provider handle, so it comes back already
/// reference-counted.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] if the configured name
/// resolves to no backend.
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match ProviderKind::from_name(&config.provider)? {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(config))),
    }
}
