//! Command validator role.
//!
//! Checks whether the selected command's documentation can definitively
//! answer the question. A strict gate: partial coverage, ambiguity, or
//! missing output fields all count as rejection.

use super::config::AgentConfig;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::{ValidationReply, Verdict};
use crate::error::AgentError;

/// Validates a command selection against its documentation.
#[derive(Debug)]
pub struct CommandValidator {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl CommandValidator {
    /// Creates a validator from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.reply_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Judges whether `documentation` lets the selected command answer
    /// `question`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn validate(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        documentation: &str,
    ) -> Result<Verdict, AgentError> {
        let user_msg = self
            .prompt
            .template
            .render(&[("question", question), ("documentation", documentation)])?;
        let (parsed, _reply) = ask_structured::<ValidationReply>(
            self,
            provider,
            &[],
            &user_msg,
            self.parse_retries,
        )
        .await?;

        let verdict = Verdict::from(parsed);
        tracing::debug!(role = self.name(), ?verdict, "command validated");
        Ok(verdict)
    }
}

impl RoleAgent for CommandValidator {
    fn name(&self) -> &'static str {
        "validator"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PromptSet;
    use crate::agent::testing::ScriptedProvider;

    fn validator() -> CommandValidator {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        CommandValidator::new(&config, PromptSet::defaults().validator)
    }

    #[tokio::test]
    async fn test_validate_accepts() {
        let provider = ScriptedProvider::new(vec![r#"{"valid_command": true}"#]);
        let verdict = validator()
            .validate(&provider, "uptime?", "show version displays system uptime")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(verdict, Verdict::Valid);
    }

    #[tokio::test]
    async fn test_validate_rejects() {
        let provider = ScriptedProvider::new(vec![r#"{"valid_command": false}"#]);
        let verdict = validator()
            .validate(&provider, "bgp neighbors?", "show clock displays the time")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(verdict, Verdict::Invalid);
    }

    #[tokio::test]
    async fn test_validate_sends_documentation() {
        let provider = ScriptedProvider::new(vec![r#"{"valid_command": true}"#]);
        validator()
            .validate(&provider, "q", "THE DOCS")
            .await
            .unwrap_or_else(|_| unreachable!());
        let requests = provider.requests.lock().unwrap_or_else(|_| unreachable!());
        let last = &requests[0].messages.last().unwrap_or_else(|| unreachable!());
        assert!(last.content.contains("THE DOCS"));
    }
}
