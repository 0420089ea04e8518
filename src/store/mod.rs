//! Document storage, embeddings, and corpus ingestion.

pub mod embedding;
pub mod ingest;
pub mod knowledge;
pub mod sqlite;

pub use embedding::{Embedder, OpenAiEmbedder, cosine_similarity};
pub use ingest::{load_command_refs, load_forum_state, parse_command_refs};
pub use knowledge::{Document, ExactFilter, KnowledgeStore};
pub use sqlite::SqliteKnowledgeStore;
