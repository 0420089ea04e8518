//! Question pipeline orchestration.
//!
//! For each question the orchestrator runs a selection loop over a
//! growing candidate pool: retrieve candidate commands from the
//! knowledge store, ask the finder to pick one, validate the pick
//! against its documentation, and feed rejections back into the
//! finder's history. Once a command survives validation it is refined,
//! resolved to devices, executed, answered per device, and combined
//! into a final answer. A question that exhausts the pool becomes a
//! typed [`QuestionOutcome::NoSuitableCommand`] and the session moves
//! on to the next question.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use super::answerer::AnswerSynthesizer;
use super::combiner::AnswerCombiner;
use super::config::AgentConfig;
use super::conversation::Conversation;
use super::finder::CommandFinder;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::refiner::SyntaxRefiner;
use super::resolver::DeviceResolver;
use super::validator::CommandValidator;
use super::wire::{
    AnsweredQuestion, CommandChoice, LedgerRecord, QuestionOutcome, SessionReport, Verdict,
};
use crate::device::{DeviceExecutor, Topology};
use crate::error::AgentError;
use crate::store::{ExactFilter, KnowledgeStore};

/// Metadata field naming the command a stored document describes.
const COMMAND_FIELD: &str = "command";

/// Growing window of candidate commands offered to the finder.
///
/// Starts at the floor and grows by one step per miss. Once the size
/// passes the ceiling the question is declared unanswerable.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePool {
    size: usize,
    step: usize,
    ceiling: usize,
}

impl CandidatePool {
    /// Creates a pool at the configured floor.
    #[must_use]
    pub const fn new(config: &AgentConfig) -> Self {
        Self {
            size: config.pool_floor,
            step: config.pool_step,
            ceiling: config.pool_ceiling,
        }
    }

    /// Current number of candidates to retrieve.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Grows the pool by one step.
    pub const fn grow(&mut self) {
        self.size += self.step;
    }

    /// Whether the pool has grown past its ceiling.
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.size > self.ceiling
    }
}

/// Drives questions through the six-role pipeline.
///
/// The orchestrator owns the per-device answer ledger for the session:
/// answers to earlier questions stay available as context for the
/// combiner on later ones.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn KnowledgeStore>,
    executor: DeviceExecutor,
    topology: Topology,
    config: AgentConfig,
    finder: CommandFinder,
    validator: CommandValidator,
    refiner: SyntaxRefiner,
    resolver: DeviceResolver,
    answerer: AnswerSynthesizer,
    combiner: AnswerCombiner,
    ledger: Vec<LedgerRecord>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("devices", &self.topology.len())
            .field("ledger_len", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator wiring the six roles to the given
    /// provider, store, and device executor.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn KnowledgeStore>,
        executor: DeviceExecutor,
        topology: Topology,
        config: AgentConfig,
    ) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            finder: CommandFinder::new(&config, prompts.finder),
            validator: CommandValidator::new(&config, prompts.validator),
            refiner: SyntaxRefiner::new(&config, prompts.refiner),
            resolver: DeviceResolver::new(&config, prompts.resolver),
            answerer: AnswerSynthesizer::new(&config, prompts.answerer),
            combiner: AnswerCombiner::new(&config, prompts.combiner),
            provider,
            store,
            executor,
            topology,
            config,
            ledger: Vec::new(),
        }
    }

    /// The accumulated per-device answer ledger.
    #[must_use]
    pub fn ledger(&self) -> &[LedgerRecord] {
        &self.ledger
    }

    /// Resolves a queue of questions in order.
    ///
    /// An unanswerable question is recorded in the report; it does not
    /// stop the session.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider, store, or prompt failures.
    pub async fn run(&mut self, questions: &[String]) -> Result<SessionReport, AgentError> {
        let mut queue: VecDeque<&str> = questions.iter().map(String::as_str).collect();
        let mut report = SessionReport::default();
        while let Some(question) = queue.pop_front() {
            let outcome = self.ask(question).await?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// Resolves a single question through the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on provider, store, or prompt failures.
    /// An exhausted candidate pool is not an error; it surfaces as
    /// [`QuestionOutcome::NoSuitableCommand`].
    pub async fn ask(&mut self, question: &str) -> Result<QuestionOutcome, AgentError> {
        tracing::info!(question = %question, "resolving question");
        let provider = Arc::clone(&self.provider);

        let mut pool = CandidatePool::new(&self.config);
        let mut history = Conversation::new(self.config.history_window);
        let mut attempts: u32 = 0;
        let mut sentinel_misses: u32 = 0;
        let mut rejections: u32 = 0;

        let (command, documentation) = loop {
            if pool.exhausted() {
                tracing::warn!(
                    question = %question,
                    attempts,
                    sentinel_misses,
                    rejections,
                    "candidate pool exhausted without a validated command"
                );
                return Ok(QuestionOutcome::NoSuitableCommand {
                    question: question.to_string(),
                    attempts,
                    sentinel_misses,
                    rejections,
                });
            }
            attempts += 1;

            let candidates = self.candidate_commands(question, pool.size()).await?;
            let turn = self
                .finder
                .choose(provider.as_ref(), history.turns(), question, &candidates)
                .await?;
            history.push_exchange(&turn.prompt, &turn.reply);

            let selected = match turn.choice {
                CommandChoice::Selected(cmd) => cmd,
                CommandChoice::NoneSuitable => {
                    sentinel_misses += 1;
                    pool.grow();
                    continue;
                }
            };

            let documentation = self.command_documentation(question, &selected).await?;
            match self
                .validator
                .validate(provider.as_ref(), question, &documentation)
                .await?
            {
                Verdict::Valid => break (selected, documentation),
                Verdict::Invalid => {
                    rejections += 1;
                    let feedback = format!(
                        "Your last response was incorrect, please say 'repeat' and I will \
                         repeat the question, DO NOT answer with {selected}"
                    );
                    history.push_exchange(&feedback, "repeat");
                    pool.grow();
                }
            }
        };
        history.clear();
        tracing::info!(command = %command, attempts, "command accepted");

        let precise = self
            .refiner
            .refine(provider.as_ref(), question, &documentation)
            .await?;
        let devices = self
            .resolver
            .resolve(provider.as_ref(), question, &self.topology)
            .await?;

        let mut records = Vec::new();
        let mut unreachable = Vec::new();
        for device in devices {
            let cli_output = match self.executor.run(&precise, &device) {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(
                        device = %device.hostname,
                        error = %e,
                        "skipping unreachable device"
                    );
                    unreachable.push(device);
                    continue;
                }
            };
            // Empty output is meaningful: the feature is absent, not the data.
            let cli_output = Some(cli_output.as_str()).filter(|o| !o.trim().is_empty());
            let answer = self
                .answerer
                .answer(provider.as_ref(), question, &documentation, cli_output)
                .await?;
            records.push(LedgerRecord {
                device: device.hostname.clone(),
                question: question.to_string(),
                answer,
            });
        }
        self.ledger.extend(records.iter().cloned());

        let answer = self
            .combiner
            .combine(provider.as_ref(), question, &self.ledger)
            .await?;

        Ok(QuestionOutcome::Answered(AnsweredQuestion {
            question: question.to_string(),
            command: precise,
            answer,
            records,
            unreachable,
            attempts,
        }))
    }

    /// Retrieves the deduplicated command names most similar to the
    /// question, up to the current pool size.
    async fn candidate_commands(
        &self,
        question: &str,
        count: usize,
    ) -> Result<Vec<String>, AgentError> {
        let documents = self.store.lookup(question, count, None).await?;
        let mut commands: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for document in &documents {
            if let Some(cmd) = document.metadata(COMMAND_FIELD)
                && seen.insert(cmd)
            {
                commands.push(cmd.to_string());
            }
        }
        Ok(commands)
    }

    /// Fetches the stored documentation for one selected command.
    async fn command_documentation(
        &self,
        question: &str,
        command: &str,
    ) -> Result<String, AgentError> {
        let documents = self
            .store
            .lookup(
                question,
                1,
                Some(ExactFilter {
                    key: COMMAND_FIELD,
                    value: command,
                }),
            )
            .await?;
        documents
            .into_iter()
            .next()
            .map(|d| d.text)
            .ok_or_else(|| AgentError::Orchestration {
                message: format!("no documentation stored for selected command {command:?}"),
            })
    }
}
