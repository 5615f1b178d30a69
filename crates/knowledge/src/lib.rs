//! Question/answer knowledge base.
//!
//! Stores question/answer pairs, embeds the questions, and answers a new
//! question with the answer of the nearest stored one. Everything lives in two
//! local artifacts: a binary vector index and a JSON list of pairs.

pub mod config;
pub mod embeddings;
pub mod engine;
pub mod handle;
pub mod index;
pub mod persist;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::StoragePaths;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use engine::RetrievalEngine;
pub use handle::KnowledgeHandle;
pub use index::FlatIndex;
pub use store::AnswerStore;
pub use types::{
    EngineStats, IngestReport, MatchKind, Neighbor, QaPair, QueryResult, EMPTY_BASE_ANSWER,
    MISSING_ANSWER,
};
pub use vector_index::VectorIndex;

use recall_core::{AppConfig, AppResult};

/// Open the knowledge base described by `config`.
///
/// Creates the configured embedding provider and loads any persisted
/// artifacts. Fails only when the provider cannot be created or a stale index
/// cannot be re-derived.
pub async fn open(config: &AppConfig) -> AppResult<KnowledgeHandle> {
    let embedding = EmbeddingConfig::from_app_config(config);
    let provider = create_provider(&embedding).await?;
    let paths = StoragePaths::from_app_config(config);

    tracing::debug!(
        "Opening knowledge base: index={:?}, answers={:?}",
        paths.index,
        paths.answers
    );

    let engine = RetrievalEngine::open(provider, paths).await?;
    Ok(KnowledgeHandle::new(engine))
}
