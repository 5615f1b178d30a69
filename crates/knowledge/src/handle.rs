//! Shared, concurrency-safe access to one retrieval engine.

use crate::engine::RetrievalEngine;
use crate::types::{EngineStats, IngestReport, QaPair, QueryResult};
use recall_core::AppResult;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to a single knowledge base.
///
/// Queries share a read lock and run in parallel. Writes take the write lock
/// for the whole rebuild, so readers see either the old or the new state.
#[derive(Debug, Clone)]
pub struct KnowledgeHandle {
    engine: Arc<RwLock<RetrievalEngine>>,
}

impl KnowledgeHandle {
    pub fn new(engine: RetrievalEngine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    pub async fn add_one(&self, question: &str, answer: &str) -> AppResult<IngestReport> {
        self.engine.write().await.ingest_single(question, answer).await
    }

    pub async fn add_many(&self, pairs: Vec<QaPair>) -> AppResult<IngestReport> {
        let incoming = pairs.into_iter().map(|p| (p.question, p.answer));
        self.engine.write().await.ingest_bulk(incoming).await
    }

    pub async fn ask(&self, question: &str, k: usize) -> AppResult<QueryResult> {
        self.engine.read().await.query(question, k).await
    }

    /// Snapshot of all pairs in position order.
    pub async fn list(&self) -> Vec<QaPair> {
        self.engine.read().await.pairs().to_vec()
    }

    pub async fn stats(&self) -> EngineStats {
        self.engine.read().await.stats()
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.engine.write().await.clear().await
    }

    pub async fn persist(&self) -> AppResult<()> {
        self.engine.read().await.persist()
    }

    /// Re-read the artifacts from disk.
    pub async fn reload(&self) -> AppResult<()> {
        self.engine.write().await.load().await
    }
}
