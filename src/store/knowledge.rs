//! Knowledge store abstraction.
//!
//! A knowledge store holds text documents with string metadata and
//! answers similarity lookups, optionally constrained to documents whose
//! metadata field exactly matches a value. The orchestrator uses the
//! similarity path to gather candidate commands and the exact path to
//! fetch one command's documentation.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::StoreError;

/// A stored document: text plus flat string metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The document body.
    pub text: String,
    /// Flat metadata fields, e.g. `command`, `parent_topic`.
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document with no metadata.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata field.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reads a metadata field.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// An exact-match constraint on one metadata field.
#[derive(Debug, Clone, Copy)]
pub struct ExactFilter<'a> {
    /// The metadata field to match.
    pub key: &'a str,
    /// The value it must equal.
    pub value: &'a str,
}

/// Storage backend for documents with similarity search.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Returns up to `count` documents most similar to `query`, best
    /// first, restricted to documents matching `filter` when given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage or embedding failures.
    async fn lookup(
        &self,
        query: &str,
        count: usize,
        filter: Option<ExactFilter<'_>>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Adds documents to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage or embedding failures.
    async fn add(&self, documents: &[Document]) -> Result<(), StoreError>;

    /// Number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failures.
    async fn count(&self) -> Result<usize, StoreError>;
}
