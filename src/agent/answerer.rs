//! Per-device answer synthesizer role.
//!
//! Combines the command documentation, the raw CLI output from one
//! device, and the question into a detailed per-device answer. Missing
//! output is presented as the literal `"None"` so the role can reason
//! about absent configuration instead of hallucinating it.

use super::config::AgentConfig;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::AnswerReply;
use crate::error::AgentError;

/// Synthesizes a per-device answer from documentation and CLI output.
#[derive(Debug)]
pub struct AnswerSynthesizer {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl AnswerSynthesizer {
    /// Creates an answerer from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.answer_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Answers `question` for one device from `documentation` and the
    /// device's `command_output` (absent output becomes `"None"`).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn answer(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        documentation: &str,
        command_output: Option<&str>,
    ) -> Result<String, AgentError> {
        let output = command_output.unwrap_or("None");
        let user_msg = self.prompt.template.render(&[
            ("question", question),
            ("documentation", documentation),
            ("command_output", output),
        ])?;
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

impl RoleAgent for AnswerSynthesizer {
    fn name(&self) -> &'static str {
        "answerer"
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
