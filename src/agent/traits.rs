//! Role agent trait definition.
//!
//! All six roles (finder, validator, refiner, resolver, answerer, combiner)
//! implement this trait, which provides a uniform interface for the
//! orchestrator: a fixed system prompt, model configuration, optional
//! few-shot turns, and caller-supplied conversation history.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::message::{ChatMessage, ChatRequest, ChatResponse, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from a role execution.
#[derive(Debug, Clone)]
pub struct RoleReply {
    /// The role's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all roles in the pipeline.
///
/// Roles encapsulate one responsibility with a fixed system prompt and
/// model configuration. History is passed in by the caller as a slice of
/// prior turns; roles never hold history themselves.
#[async_trait]
pub trait RoleAgent: Send + Sync {
    /// Role name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this role.
    fn model(&self) -> &str;

    /// System prompt that defines the role's behavior.
    fn system_prompt(&self) -> &str;

    /// Fixed few-shot example turns inserted after the system prompt.
    fn few_shot(&self) -> &[ChatMessage] {
        &[]
    }

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        true
    }

    /// Sampling temperature (0.0 = deterministic).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the role with the given user message and prior history.
    ///
    /// Assembles: optional system instruction, few-shot examples, the
    /// caller's history, then the new prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        history: &[ChatMessage],
        user_msg: &str,
    ) -> Result<RoleReply, AgentError> {
        let mut messages = Vec::with_capacity(2 + self.few_shot().len() + history.len());
        if !self.system_prompt().is_empty() {
            messages.push(system_message(self.system_prompt()));
        }
        messages.extend_from_slice(self.few_shot());
        messages.extend_from_slice(history);
        messages.push(user_message(user_msg));

        let request = ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(RoleReply {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Strips markdown code fences from a model reply, if present.
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// Executes a role and parses its reply into the expected JSON shape,
/// retrying on parse failure.
///
/// Malformed structured output is treated as a retryable transient error:
/// the call is re-issued up to `max_parse_retries` additional times before
/// the parse failure surfaces as [`AgentError::ResponseParse`]. Transport
/// errors are never retried here.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] once retries are exhausted, or
/// any [`AgentError`] from the underlying call.
pub async fn ask_structured<T>(
    agent: &dyn RoleAgent,
    provider: &dyn LlmProvider,
    history: &[ChatMessage],
    user_msg: &str,
    max_parse_retries: u32,
) -> Result<(T, RoleReply), AgentError>
where
    T: DeserializeOwned,
{
    let mut attempt: u32 = 0;
    loop {
        let reply = agent.execute(provider, history, user_msg).await?;
        let json_str = strip_code_fences(&reply.content);
        match serde_json::from_str::<T>(json_str) {
            Ok(parsed) => return Ok((parsed, reply)),
            Err(e) if attempt < max_parse_retries => {
                attempt += 1;
                tracing::warn!(
                    role = agent.name(),
                    attempt,
                    error = %e,
                    "role reply failed to parse, retrying"
                );
            }
            Err(e) => {
                let preview: String = json_str.chars().take(200).collect();
                return Err(AgentError::ResponseParse {
                    message: format!(
                        "{} reply did not match its expected shape after {attempt} retries: {e}. \
                         Preview: {preview:?}",
                        agent.name(),
                    ),
                    content: reply.content,
                });
            }
        }
    }
}
