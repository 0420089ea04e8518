//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Commands return
//! their output as a string; the binary entry point prints it.

use std::fmt::Write as FmtWrite;
use std::io::{BufRead, Write as IoWrite};
use std::path::Path;
use std::sync::Arc;

use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::agent::wire::QuestionOutcome;
use crate::agent::create_provider;
use crate::cli::parser::{Cli, Commands, IngestCommands};
use crate::device::{DeviceExecutor, SshConnector, Topology};
use crate::error::{CommandError, Result};
use crate::store::{
    KnowledgeStore, OpenAiEmbedder, SqliteKnowledgeStore, load_command_refs, load_forum_state,
};

/// Greeting shown when the interactive session starts.
const REPL_GREETING: &str = "What can I tell you about your network today?";

/// Executes the CLI command.
///
/// # Errors
///
/// Returns [`CommandError`] if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let store_path = cli.store_path();

    match &cli.command {
        Commands::Ingest(IngestCommands::Qa { file }) => cmd_ingest_qa(file, &store_path).await,
        Commands::Ingest(IngestCommands::Commands { file }) => {
            cmd_ingest_commands(file, &store_path).await
        }
        Commands::Ask { question, topology } => cmd_ask(question, &store_path, topology).await,
        Commands::Repl { topology } => cmd_repl(&store_path, topology).await,
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref()),
    }
}

fn open_store(path: &Path, config: &AgentConfig) -> Result<Arc<SqliteKnowledgeStore>> {
    let embedder = Arc::new(OpenAiEmbedder::new(config));
    let store = SqliteKnowledgeStore::open(path, embedder).map_err(CommandError::Store)?;
    Ok(Arc::new(store))
}

fn build_orchestrator(store_path: &Path, topology_path: &Path) -> Result<Orchestrator> {
    let config = AgentConfig::from_env().map_err(CommandError::Agent)?;
    let provider = create_provider(&config).map_err(CommandError::Agent)?;
    let store = open_store(store_path, &config)?;
    let topology = Topology::load(topology_path)?;
    if topology.is_empty() {
        return Err(CommandError::InvalidInput {
            message: format!("topology file {} lists no devices", topology_path.display()),
        });
    }
    let credentials = config.credentials().map_err(CommandError::Agent)?;
    let executor = DeviceExecutor::new(
        Box::new(SshConnector::new()),
        credentials,
        config.command_timeout,
    );
    Ok(Orchestrator::new(
        provider,
        store as Arc<dyn KnowledgeStore>,
        executor,
        topology,
        config,
    ))
}

async fn cmd_ingest_qa(file: &Path, store_path: &Path) -> Result<String> {
    let documents = load_forum_state(file)?;
    let config = AgentConfig::from_env().map_err(CommandError::Agent)?;
    let store = open_store(store_path, &config)?;
    store
        .add(&documents)
        .await
        .map_err(CommandError::Store)?;
    Ok(format!(
        "Ingested {} Q&A documents from {} into {}",
        documents.len(),
        file.display(),
        store_path.display()
    ))
}

async fn cmd_ingest_commands(file: &Path, store_path: &Path) -> Result<String> {
    let documents = load_command_refs(file)?;
    let config = AgentConfig::from_env().map_err(CommandError::Agent)?;
    let store = open_store(store_path, &config)?;
    store
        .add(&documents)
        .await
        .map_err(CommandError::Store)?;
    Ok(format!(
        "Ingested {} command reference documents from {} into {}",
        documents.len(),
        file.display(),
        store_path.display()
    ))
}

async fn cmd_ask(question: &str, store_path: &Path, topology_path: &Path) -> Result<String> {
    let mut orchestrator = build_orchestrator(store_path, topology_path)?;
    let outcome = orchestrator
        .ask(question)
        .await
        .map_err(CommandError::Agent)?;
    Ok(format_outcome(&outcome))
}

async fn cmd_repl(store_path: &Path, topology_path: &Path) -> Result<String> {
    let mut orchestrator = build_orchestrator(store_path, topology_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "{REPL_GREETING}");
    let _ = writeln!(out, "(type 'exit' or 'quit' to leave)");

    let stdin = std::io::stdin();
    loop {
        let _ = write!(out, "> ");
        let _ = out.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match orchestrator.ask(question).await {
            Ok(outcome) => {
                let _ = writeln!(out, "{}", format_outcome(&outcome));
            }
            Err(e) => {
                let _ = writeln!(out, "Error: {e}");
            }
        }
    }
    Ok(String::new())
}

fn cmd_init_prompts(dir: Option<&Path>) -> Result<String> {
    let target = dir
        .map(std::path::PathBuf::from)
        .or_else(|| {
            std::env::var("NETRAG_PROMPT_DIR")
                .ok()
                .map(std::path::PathBuf::from)
        })
        .or_else(|| dirs::home_dir().map(|h| h.join(".config/netrag/prompts")))
        .ok_or_else(|| CommandError::InvalidInput {
            message: "could not resolve a prompt directory; pass --dir".to_string(),
        })?;

    let written = PromptSet::write_defaults(&target)?;
    let mut output = format!("Prompt templates in {}:\n", target.display());
    if written.is_empty() {
        output.push_str("  (all templates already present, nothing written)\n");
    } else {
        for path in written {
            let _ = writeln!(output, "  wrote {}", path.display());
        }
    }
    Ok(output)
}

/// Renders a question outcome for the terminal.
fn format_outcome(outcome: &QuestionOutcome) -> String {
    match outcome {
        QuestionOutcome::Answered(answered) => {
            let mut output = String::new();
            let _ = writeln!(output, "Command: {}", answered.command);
            let _ = writeln!(output, "\n{}", answered.answer);
            if !answered.unreachable.is_empty() {
                let names: Vec<&str> = answered
                    .unreachable
                    .iter()
                    .map(|d| d.hostname.as_str())
                    .collect();
                let _ = writeln!(
                    output,
                    "\nNote: could not reach {}; the answer excludes them.",
                    names.join(", ")
                );
            }
            output
        }
        QuestionOutcome::NoSuitableCommand {
            question, attempts, ..
        } => format!(
            "No validated command could answer {question:?} after {attempts} attempts. \
             Try rephrasing the question or ingesting more command references."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::wire::{AnsweredQuestion, LedgerRecord};
    use crate::device::DeviceRecord;

    fn answered() -> QuestionOutcome {
        QuestionOutcome::Answered(AnsweredQuestion {
            question: "uptime?".to_string(),
            command: "show version".to_string(),
            answer: "C8K1 has been up 3 weeks.".to_string(),
            records: vec![LedgerRecord {
                device: "C8K1".to_string(),
                question: "uptime?".to_string(),
                answer: "3 weeks".to_string(),
            }],
            unreachable: vec![],
            attempts: 1,
        })
    }

    #[test]
    fn test_format_answered() {
        let output = format_outcome(&answered());
        assert!(output.contains("Command: show version"));
        assert!(output.contains("up 3 weeks"));
        assert!(!output.contains("could not reach"));
    }

    #[test]
    fn test_format_answered_with_unreachable() {
        let QuestionOutcome::Answered(mut answered) = answered() else {
            unreachable!()
        };
        answered.unreachable.push(DeviceRecord {
            hostname: "C8K3".to_string(),
            address: "10.0.0.3".to_string(),
        });
        let output = format_outcome(&QuestionOutcome::Answered(answered));
        assert!(output.contains("could not reach C8K3"));
    }

    #[test]
    fn test_format_no_suitable_command() {
        let outcome = QuestionOutcome::NoSuitableCommand {
            question: "what color is it?".to_string(),
            attempts: 11,
            sentinel_misses: 5,
            rejections: 6,
        };
        let output = format_outcome(&outcome);
        assert!(output.contains("11 attempts"));
        assert!(output.contains("what color is it?"));
    }

    #[test]
    fn test_init_prompts_writes_templates() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let output =
            cmd_init_prompts(Some(dir.path())).unwrap_or_else(|_| unreachable!());
        assert!(output.contains("wrote"));
        assert!(dir.path().join("finder.md").exists());
    }
}
