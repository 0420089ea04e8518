//! netrag: a RAG-backed multi-agent assistant for IOS-XE networks.
//!
//! Plain-language questions are answered by a pipeline of six LLM
//! roles: a finder selects a candidate command from a knowledge store
//! of command references, a validator checks it against its
//! documentation, a refiner produces the exact syntax, a resolver maps
//! the question onto the device inventory, and per-device answers are
//! synthesized and combined into a final reply. Commands run over SSH
//! with per-session caching.
//!
//! # Modules
//!
//! - [`agent`]: the six roles, provider abstraction, and orchestration
//! - [`store`]: document storage, embeddings, and corpus ingestion
//! - [`device`]: topology inventory and SSH command execution
//! - [`cli`]: command-line interface
//! - [`error`]: error types for each layer

pub mod agent;
pub mod cli;
pub mod device;
pub mod error;
pub mod store;

pub use agent::{AgentConfig, Orchestrator, QuestionOutcome, SessionReport};
pub use device::{DeviceRecord, Topology};
pub use error::{AgentError, CommandError, Result, StoreError};
pub use store::{Document, KnowledgeStore, SqliteKnowledgeStore};
