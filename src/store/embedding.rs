//! Text embeddings for similarity lookup.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_trait::async_trait;

use crate::agent::config::AgentConfig;
use crate::error::StoreError;

/// Produces a dense vector for a piece of text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds one text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Embedding`] on API failures.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError>;
}

/// Embedder backed by the OpenAI embeddings endpoint.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiEmbedder {
    /// Creates an embedder from agent configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        Self {
            client: Client::with_config(openai_config),
            model: config.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text)
            .build()
            .map_err(|e| StoreError::Embedding {
                message: format!("failed to build embedding request: {e}"),
            })?;

        let response =
            self.client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| StoreError::Embedding {
                    message: format!("embedding request failed: {e}"),
                })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| StoreError::Embedding {
                message: "embedding response contained no vectors".to_string(),
            })
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
