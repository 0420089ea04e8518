//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default knowledge store location, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = ".netrag/commands.db";

/// Default topology inventory file.
pub const DEFAULT_TOPOLOGY_PATH: &str = "topology_config.json";

/// netrag: a RAG-backed assistant for IOS-XE networks.
///
/// Turns plain-language questions into validated show commands, runs
/// them on the devices the question targets, and synthesizes an answer.
#[derive(Parser, Debug)]
#[command(name = "netrag")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the knowledge store database.
    ///
    /// Defaults to `.netrag/commands.db` in the current directory.
    #[arg(short, long, env = "NETRAG_STORE")]
    pub store: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest source corpora into the knowledge store.
    #[command(subcommand)]
    Ingest(IngestCommands),

    /// Ask one question against the network.
    #[command(after_help = r#"Examples:
  netrag ask "what is the uptime on router 1?"
  netrag ask "do C8K2 and C8K3 have matching OSPF timers?" --topology lab.json
  OPENAI_API_KEY=sk-... DEVICE_USERNAME=admin DEVICE_PASSWORD=... netrag ask "..."
"#)]
    Ask {
        /// The question to answer.
        question: String,

        /// Path to the topology inventory file.
        #[arg(short, long, env = "NETRAG_TOPOLOGY", default_value = DEFAULT_TOPOLOGY_PATH)]
        topology: PathBuf,
    },

    /// Start an interactive question session.
    ///
    /// Answers accumulate as context: later questions can build on
    /// earlier ones within the session.
    Repl {
        /// Path to the topology inventory file.
        #[arg(short, long, env = "NETRAG_TOPOLOGY", default_value = DEFAULT_TOPOLOGY_PATH)]
        topology: PathBuf,
    },

    /// Write default prompt templates to disk for customization.
    #[command(name = "init-prompts")]
    #[command(after_help = r#"Examples:
  netrag init-prompts                    # Write to ~/.config/netrag/prompts/
  netrag init-prompts --dir ./prompts    # Write to a custom directory
"#)]
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/netrag/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Ingestion subcommands for populating the knowledge store.
#[derive(Subcommand, Debug)]
pub enum IngestCommands {
    /// Ingest a scraped community Q&A state file.
    #[command(after_help = r#"Examples:
  netrag ingest qa scraped_questions.json
  netrag --store ./lab.db ingest qa scraped_questions.json
"#)]
    Qa {
        /// Path to the Q&A state JSON file.
        file: PathBuf,
    },

    /// Ingest a command reference text file.
    ///
    /// Topic metadata is derived from the file path: the containing
    /// directory is the parent topic and the file stem the child topic.
    #[command(after_help = r#"Examples:
  netrag ingest commands refs/routing/ospf.txt
"#)]
    Commands {
        /// Path to the command reference file.
        file: PathBuf,
    },
}

impl Cli {
    /// Returns the store path, using the default if not specified.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_store_path() {
        let cli = Cli::try_parse_from(["netrag", "ask", "uptime?"])
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(cli.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_custom_store_path() {
        let cli = Cli::try_parse_from(["netrag", "--store", "/tmp/lab.db", "ask", "uptime?"])
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(cli.store_path(), PathBuf::from("/tmp/lab.db"));
    }

    #[test]
    fn test_ingest_qa_parses() {
        let cli = Cli::try_parse_from(["netrag", "ingest", "qa", "state.json"])
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            cli.command,
            Commands::Ingest(IngestCommands::Qa { .. })
        ));
    }

    #[test]
    fn test_ask_topology_default() {
        let cli = Cli::try_parse_from(["netrag", "ask", "uptime?"])
            .unwrap_or_else(|_| unreachable!());
        match cli.command {
            Commands::Ask { topology, .. } => {
                assert_eq!(topology, PathBuf::from(DEFAULT_TOPOLOGY_PATH));
            }
            _ => unreachable!(),
        }
    }
}
