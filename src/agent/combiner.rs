//! Final-answer combiner role.
//!
//! Takes the whole session's question/answer ledger and the user's
//! current question, and produces the single consolidated answer.

use super::config::AgentConfig;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::{AnswerReply, LedgerRecord};
use crate::error::AgentError;

/// Combines per-device ledger answers into one final answer.
#[derive(Debug)]
pub struct AnswerCombiner {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl AnswerCombiner {
    /// Creates a combiner from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.answer_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Produces the final answer to `query` from the accumulated ledger.
    ///
    /// The ledger is serialized whole, so answers gathered for earlier
    /// questions in the session remain available as context.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures, or
    /// [`AgentError::Orchestration`] if the ledger cannot be serialized.
    pub async fn combine(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
        ledger: &[LedgerRecord],
    ) -> Result<String, AgentError> {
        let ledger_json =
            serde_json::to_string_pretty(ledger).map_err(|e| AgentError::Orchestration {
                message: format!("failed to serialize answer ledger: {e}"),
            })?;
        let user_msg = self
            .prompt
            .template
            .render(&[("query", query), ("subquestions_and_answers", &ledger_json)])?;
        let (parsed, _reply) = ask_structured::<AnswerReply>(
            self,
            provider,
            &[],
            &user_msg,
            self.parse_retries,
        )
        .await?;
        Ok(parsed.answer)
    }
}

impl RoleAgent for AnswerCombiner {
    fn name(&self) -> &'static str {
        "combiner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.prompt.system
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
