//! Command finder role.
//!
//! Given a question and a list of candidate commands retrieved from the
//! knowledge store, the finder selects exactly one command verbatim, or
//! the `"None"` sentinel when nothing offered fits. The finder is the
//! only role that carries conversation history: rejected selections are
//! fed back as prior turns so it avoids repeating them.

use super::config::AgentConfig;
use super::message::ChatMessage;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::{CommandChoice, SelectedCommandReply};
use crate::error::AgentError;

/// One finder exchange, preserved so the caller can append it to the
/// finder's conversation history.
#[derive(Debug, Clone)]
pub struct FinderTurn {
    /// The parsed decision.
    pub choice: CommandChoice,
    /// The rendered user message that was sent.
    pub prompt: String,
    /// The raw assistant reply.
    pub reply: String,
}

/// Selects one command from the offered candidates.
#[derive(Debug)]
pub struct CommandFinder {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl CommandFinder {
    /// Creates a finder from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.reply_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Asks the finder to choose a command for `question` from `commands`.
    ///
    /// `history` carries the finder's prior turns for this question,
    /// including any rejection feedback.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn choose(
        &self,
        provider: &dyn LlmProvider,
        history: &[ChatMessage],
        question: &str,
        commands: &[String],
    ) -> Result<FinderTurn, AgentError> {
        let listing = format!("{commands:?}");
        let user_msg = self
            .prompt
            .template
            .render(&[("query", question), ("commands", &listing)])?;
        let (parsed, reply) = ask_structured::<SelectedCommandReply>(
            self,
            provider,
            history,
            &user_msg,
            self.parse_retries,
        )
        .await?;

        let choice = CommandChoice::from(parsed);
        tracing::debug!(role = self.name(), ?choice, offered = commands.len(), "command selected");

        Ok(FinderTurn {
            choice,
            prompt: user_msg,
            reply: reply.content,
        })
    }
}

impl RoleAgent for CommandFinder {
    fn name(&self) -> &'static str {
        "finder"
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
