//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use recall_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// A provider turns text into fixed-length vectors. It must be deterministic
/// for a fixed model and return exactly one vector per input, in input order.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }

    /// Identity of the vectors this provider produces.
    fn config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: self.provider_name().to_string(),
            model: self.model_name().to_string(),
            dimensions: self.dimensions(),
            endpoint: None,
        }
    }
}

/// Create an embedding provider based on configuration.
///
/// Fails with [`AppError::ModelUnavailable`] when the provider is unknown or
/// its backing model cannot be reached.
pub async fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::ModelUnavailable(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    tracing::debug!(
        "Creating embedding provider: provider={}, model={}, dimensions={}",
        config.provider,
        config.model,
        config.dimensions
    );

    match config.provider.as_str() {
        "trigram" => {
            let provider =
                super::providers::trigram::TrigramProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        "mock" => {
            let provider = super::providers::mock::MockProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(config.clone()).await?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::ModelUnavailable(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama, mock",
            config.provider
        ))),
    }
}
