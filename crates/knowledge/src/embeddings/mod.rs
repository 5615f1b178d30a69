//! Embedding layer.
//!
//! The engine treats embedding as an injected capability: anything that
//! implements [`EmbeddingProvider`] can back a knowledge base.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use recall_core::{AppError, AppResult};

/// Embed `texts` and check the provider honored its contract.
///
/// Every returned vector must have the provider's dimensionality and there
/// must be exactly one vector per text.
pub async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let embeddings = provider.embed_batch(texts).await?;

    if embeddings.len() != texts.len() {
        return Err(AppError::Embedding(format!(
            "Provider '{}' returned {} embeddings for {} texts",
            provider.provider_name(),
            embeddings.len(),
            texts.len()
        )));
    }

    let expected = provider.dimensions();
    if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
        return Err(AppError::DimensionMismatch {
            expected,
            actual: bad.len(),
        });
    }

    Ok(embeddings)
}
