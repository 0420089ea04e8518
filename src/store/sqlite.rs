//! SQLite-backed knowledge store.
//!
//! Documents live in a single table: text, JSON metadata, and the
//! embedding as a little-endian f32 blob. Similarity ranking happens in
//! process over the candidate rows; exact metadata filtering happens in
//! SQL via `json_extract`, backed by an expression index on the
//! `command` field.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use super::embedding::{Embedder, cosine_similarity};
use super::knowledge::{Document, ExactFilter, KnowledgeStore};
use crate::error::StoreError;

/// Knowledge store over a SQLite database file.
pub struct SqliteKnowledgeStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for SqliteKnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKnowledgeStore").finish_non_exhaustive()
    }
}

impl SqliteKnowledgeStore {
    /// Opens (or creates) a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if the database cannot be opened
    /// or migrated.
    pub fn open(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    /// Opens an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on database failures.
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                 id        INTEGER PRIMARY KEY,
                 text      TEXT NOT NULL,
                 metadata  TEXT NOT NULL,
                 embedding BLOB NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_documents_command
                 ON documents (json_extract(metadata, '$.command'));",
        )?;
        Ok(())
    }

    fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn parse_metadata(raw: &str) -> Result<BTreeMap<String, String>, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Malformed {
            message: format!("stored metadata is not a flat string map: {e}"),
        })
    }
}

#[async_trait]
impl KnowledgeStore for SqliteKnowledgeStore {
    async fn lookup(
        &self,
        query: &str,
        count: usize,
        filter: Option<ExactFilter<'_>>,
    ) -> Result<Vec<Document>, StoreError> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut rows: Vec<(Document, f32)> = Vec::new();

        let mut collect = |text: String, metadata: String, blob: Vec<u8>| -> Result<(), StoreError> {
            let embedding = Self::blob_to_embedding(&blob);
            let score = cosine_similarity(&query_embedding, &embedding);
            rows.push((
                Document {
                    text,
                    metadata: Self::parse_metadata(&metadata)?,
                },
                score,
            ));
            Ok(())
        };

        if let Some(f) = filter {
            let mut stmt = conn.prepare(
                "SELECT text, metadata, embedding FROM documents
                 WHERE json_extract(metadata, '$.' || ?1) = ?2",
            )?;
            let mut results = stmt.query((f.key, f.value))?;
            while let Some(row) = results.next()? {
                collect(row.get(0)?, row.get(1)?, row.get(2)?)?;
            }
        } else {
            let mut stmt = conn.prepare("SELECT text, metadata, embedding FROM documents")?;
            let mut results = stmt.query(())?;
            while let Some(row) = results.next()? {
                collect(row.get(0)?, row.get(1)?, row.get(2)?)?;
            }
        }

        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(rows.into_iter().take(count).map(|(doc, _)| doc).collect())
    }

    async fn add(&self, documents: &[Document]) -> Result<(), StoreError> {
        let mut prepared = Vec::with_capacity(documents.len());
        for document in documents {
            let embedding = self.embedder.embed(&document.text).await?;
            let metadata =
                serde_json::to_string(&document.metadata).map_err(|e| StoreError::Malformed {
                    message: format!("metadata failed to serialize: {e}"),
                })?;
            prepared.push((document.text.clone(), metadata, Self::embedding_to_blob(&embedding)));
        }

        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        for (text, metadata, blob) in prepared {
            tx.execute(
                "INSERT INTO documents (text, metadata, embedding) VALUES (?1, ?2, ?3)",
                (text, metadata, blob),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", (), |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
