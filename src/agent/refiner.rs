//! Syntax refiner role.
//!
//! Turns a validated command plus its documentation into the exact
//! string to run on the device, with any options the question requires
//! filled in from the documentation alone.

use super::config::AgentConfig;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::PreciseCommandReply;
use crate::error::AgentError;

/// Produces the directly executable form of a validated command.
#[derive(Debug)]
pub struct SyntaxRefiner {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl SyntaxRefiner {
    /// Creates a refiner from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.reply_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Constructs the exact command string for `question` from the
    /// command's documentation.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn refine(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        documentation: &str,
    ) -> Result<String, AgentError> {
        let user_msg = self
            .prompt
            .template
            .render(&[("question", question), ("documentation", documentation)])?;
        let (parsed, _reply) = ask_structured::<PreciseCommandReply>(
            self,
            provider,
            &[],
            &user_msg,
            self.parse_retries,
        )
        .await?;

        let command = parsed.precise_command.trim().to_string();
        tracing::debug!(role = self.name(), command = %command, "command refined");
        Ok(command)
    }
}

impl RoleAgent for SyntaxRefiner {
    fn name(&self) -> &'static str {
        "refiner"
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

    fn refiner() -> SyntaxRefiner {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        SyntaxRefiner::new(&config, PromptSet::defaults().refiner)
    }

    #[tokio::test]
    async fn test_refine_returns_command() {
        let provider = ScriptedProvider::new(vec![
            r#"{"precise_command": "show ip ospf neighbor detail"}"#,
        ]);
        let command = refiner()
            .refine(&provider, "ospf neighbor state?", "show ip ospf neighbor [detail]")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(command, "show ip ospf neighbor detail");
    }

    #[tokio::test]
    async fn test_refine_trims_whitespace() {
        let provider =
            ScriptedProvider::new(vec![r#"{"precise_command": "  show version  "}"#]);
        let command = refiner()
            .refine(&provider, "uptime?", "show version")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(command, "show version");
    }
}
