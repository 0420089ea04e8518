//! Agent pipeline: roles, provider abstraction, and orchestration.
//!
//! Questions flow through six single-purpose roles, each a thin wrapper
//! over one LLM call with a fixed system prompt and a typed JSON reply
//! shape. The [`Orchestrator`] wires the roles to a knowledge store and
//! a device executor and drives the selection/validation loop.

pub mod answerer;
pub mod client;
pub mod combiner;
pub mod config;
pub mod conversation;
pub mod finder;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod refiner;
pub mod resolver;
pub mod traits;
pub mod validator;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use answerer::AnswerSynthesizer;
pub use client::{ProviderKind, create_provider};
pub use combiner::AnswerCombiner;
pub use config::{AgentConfig, AgentConfigBuilder, DeviceCredentials};
pub use conversation::Conversation;
pub use finder::{CommandFinder, FinderTurn};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Speaker, TokenUsage};
pub use orchestrator::{CandidatePool, Orchestrator};
pub use prompt::{PromptSet, PromptTemplate, RolePrompt};
pub use provider::LlmProvider;
pub use refiner::SyntaxRefiner;
pub use resolver::DeviceResolver;
pub use traits::{RoleAgent, RoleReply, ask_structured};
pub use validator::CommandValidator;
pub use wire::{
    AnsweredQuestion, CommandChoice, LedgerRecord, QuestionOutcome, SessionReport, Verdict,
};
