//! Retrieval engine: embedder + flat index + answer store + persistence.
//!
//! The engine keeps the authoritative ordered list of question/answer pairs.
//! Every write re-embeds the complete question list, builds a fresh index and
//! answer store off to the side, persists both artifacts and only then swaps
//! them in. A failure anywhere before the swap leaves the engine untouched.

use crate::config::StoragePaths;
use crate::embeddings::{embed_checked, EmbeddingConfig, EmbeddingProvider};
use crate::index::FlatIndex;
use crate::persist::{self, Fingerprint, IndexArtifact};
use crate::store::AnswerStore;
use crate::types::{EngineStats, IngestReport, MatchKind, QaPair, QueryResult, MISSING_ANSWER};
use crate::vector_index::VectorIndex;
use recall_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Question/answer retrieval over a flat vector index.
#[derive(Debug)]
pub struct RetrievalEngine {
    provider: Arc<dyn EmbeddingProvider>,
    paths: StoragePaths,
    pairs: Vec<QaPair>,
    index: FlatIndex,
    answers: AnswerStore,
}

/// A fully built next state, not yet visible to queries.
struct Staged {
    pairs: Vec<QaPair>,
    index: FlatIndex,
    answers: AnswerStore,
    fingerprint: Fingerprint,
}

impl RetrievalEngine {
    /// Create an engine with no knowledge; nothing is read from disk.
    pub fn empty(provider: Arc<dyn EmbeddingProvider>, paths: StoragePaths) -> Self {
        let index = FlatIndex::new(provider.dimensions());
        Self {
            provider,
            paths,
            pairs: Vec::new(),
            index,
            answers: AnswerStore::new(),
        }
    }

    /// Create an engine and load whatever is persisted at `paths`.
    pub async fn open(provider: Arc<dyn EmbeddingProvider>, paths: StoragePaths) -> AppResult<Self> {
        let mut engine = Self::empty(provider, paths);
        engine.load().await?;
        Ok(engine)
    }

    /// Add or replace one pair, then rebuild.
    ///
    /// A question already present keeps its position and gets the new answer.
    pub async fn ingest_single(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> AppResult<IngestReport> {
        self.ingest_bulk([(question.into(), answer.into())]).await
    }

    /// Upsert every pair in input order, then rebuild once.
    ///
    /// New questions are appended in the order they are yielded. Empty input
    /// is a no-op: nothing is rebuilt or written.
    pub async fn ingest_bulk<I>(&mut self, incoming: I) -> AppResult<IngestReport>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut pairs = self.pairs.clone();
        let mut positions: HashMap<String, usize> = pairs
            .iter()
            .enumerate()
            .map(|(i, p)| (p.question.clone(), i))
            .collect();

        let mut report = IngestReport::default();
        let mut touched = false;

        for (question, answer) in incoming {
            touched = true;
            match positions.get(&question) {
                Some(&i) => {
                    pairs[i].answer = answer;
                    report.updated += 1;
                }
                None => {
                    positions.insert(question.clone(), pairs.len());
                    pairs.push(QaPair { question, answer });
                    report.added += 1;
                }
            }
        }

        if !touched {
            tracing::debug!("Bulk ingest with no pairs, skipping rebuild");
            report.total = self.pairs.len();
            return Ok(report);
        }

        self.rebuild(pairs).await?;
        report.total = self.pairs.len();
        report.rebuilt = true;

        tracing::info!(
            "Ingested {} new and {} updated pairs ({} total)",
            report.added,
            report.updated,
            report.total
        );
        Ok(report)
    }

    /// Replace the whole knowledge base with parallel question/answer lists.
    ///
    /// Duplicated questions are kept at distinct positions. Lists of different
    /// lengths are rejected before anything changes.
    pub async fn replace_pairs(
        &mut self,
        questions: Vec<String>,
        answers: Vec<String>,
    ) -> AppResult<IngestReport> {
        if questions.len() != answers.len() {
            return Err(AppError::InvalidInput(format!(
                "Questions and answers must be the same length ({} vs {})",
                questions.len(),
                answers.len()
            )));
        }

        let pairs: Vec<QaPair> = questions
            .into_iter()
            .zip(answers)
            .map(|(question, answer)| QaPair { question, answer })
            .collect();
        let total = pairs.len();

        self.rebuild(pairs).await?;

        Ok(IngestReport {
            added: total,
            updated: 0,
            total,
            rebuilt: true,
        })
    }

    /// Drop every pair and persist the empty knowledge base.
    pub async fn clear(&mut self) -> AppResult<()> {
        self.rebuild(Vec::new()).await?;
        tracing::info!("Knowledge base cleared");
        Ok(())
    }

    /// Answer `text` with the nearest indexed question's answer.
    ///
    /// `k` only sizes the candidate search; the single nearest answer is
    /// returned. An empty knowledge base yields the empty-base sentinel and a
    /// position without an answer yields a placeholder; neither is an error.
    pub async fn query(&self, text: &str, k: usize) -> AppResult<QueryResult> {
        if self.index.is_empty() || self.answers.is_empty() {
            tracing::debug!("Query on empty knowledge base");
            return Ok(QueryResult::empty_base());
        }

        let vector = self.provider.embed(text).await?;
        let neighbors = self.index.search(&vector, k.max(1))?;

        let Some(top) = neighbors.first() else {
            return Ok(QueryResult::empty_base());
        };

        let result = match self.answers.get(top.position) {
            Some(answer) => QueryResult {
                answer: answer.to_string(),
                distance: top.distance,
                position: top.position as i64,
                kind: MatchKind::Matched,
            },
            None => {
                tracing::warn!(
                    "Index position {} has no answer ({} answers stored)",
                    top.position,
                    self.answers.len()
                );
                QueryResult {
                    answer: MISSING_ANSWER.to_string(),
                    distance: top.distance,
                    position: top.position as i64,
                    kind: MatchKind::MissingAnswer,
                }
            }
        };

        tracing::debug!(
            "Query matched position {} at distance {:.4} ({} candidates)",
            result.position,
            result.distance,
            neighbors.len()
        );
        Ok(result)
    }

    /// Write both artifacts for the current state.
    pub fn persist(&self) -> AppResult<()> {
        persist::write_pairs(&self.paths.answers, &self.pairs)?;
        persist::write_index(&self.paths.index, &self.index_artifact(&self.index, self.fingerprint()))
    }

    /// Load persisted state, replacing the in-memory state.
    ///
    /// A missing or unreadable answers artifact resets to empty. When the
    /// answers are fine but the index artifact is missing, unreadable, or was
    /// built from other questions or another embedder, the index is re-derived
    /// by embedding the loaded questions.
    pub async fn load(&mut self) -> AppResult<()> {
        let pairs = match persist::read_pairs(&self.paths.answers) {
            Ok(Some(pairs)) => pairs,
            Ok(None) => {
                tracing::info!("No answers at {:?}, starting empty", self.paths.answers);
                self.reset();
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable answers artifact, starting empty: {}", e);
                self.reset();
                return Ok(());
            }
        };

        let fingerprint = persist::fingerprint(pairs.iter().map(|p| p.question.as_str()));

        match persist::read_index(&self.paths.index) {
            Ok(Some(artifact)) => match self.check_artifact(&artifact, &fingerprint, pairs.len()) {
                Ok(()) => {
                    let mut answers = AnswerStore::new();
                    answers.replace_all(pairs.iter().map(|p| p.answer.clone()));
                    self.index = artifact.index;
                    self.answers = answers;
                    self.pairs = pairs;
                    tracing::info!("Loaded {} pairs from {:?}", self.pairs.len(), self.paths.answers);
                    return Ok(());
                }
                Err(e) => tracing::warn!("Index artifact is stale, re-deriving: {}", e),
            },
            Ok(None) => tracing::warn!("No index artifact at {:?}, re-deriving", self.paths.index),
            Err(e) => tracing::warn!("Index artifact unreadable, re-deriving: {}", e),
        }

        let staged = self.stage(pairs).await?;
        if let Err(e) = persist::write_index(
            &self.paths.index,
            &self.index_artifact(&staged.index, staged.fingerprint),
        ) {
            tracing::warn!("Failed to rewrite index artifact: {}", e);
        }
        self.commit(staged);

        tracing::info!("Re-derived index for {} pairs", self.pairs.len());
        Ok(())
    }

    fn check_artifact(
        &self,
        artifact: &IndexArtifact,
        fingerprint: &Fingerprint,
        pairs: usize,
    ) -> AppResult<()> {
        let stored = EmbeddingConfig {
            provider: artifact.provider.clone(),
            model: artifact.model.clone(),
            dimensions: artifact.index.dimension(),
            endpoint: None,
        };
        self.provider.config().check_compatible(&stored)?;

        if artifact.index.len() != pairs {
            return Err(AppError::Index(format!(
                "{} rows for {} pairs",
                artifact.index.len(),
                pairs
            )));
        }

        if &artifact.fingerprint != fingerprint {
            return Err(AppError::Index(
                "rows were embedded from different questions".to_string(),
            ));
        }

        Ok(())
    }

    /// Stage, persist, then swap in a rebuild from `pairs`.
    async fn rebuild(&mut self, pairs: Vec<QaPair>) -> AppResult<()> {
        let start = Instant::now();

        let staged = self.stage(pairs).await?;

        persist::write_pairs(&self.paths.answers, &staged.pairs)?;
        persist::write_index(
            &self.paths.index,
            &self.index_artifact(&staged.index, staged.fingerprint),
        )?;

        self.commit(staged);

        tracing::debug!(
            "Rebuilt index with {} rows in {:.3}s",
            self.index.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    async fn stage(&self, pairs: Vec<QaPair>) -> AppResult<Staged> {
        let questions: Vec<String> = pairs.iter().map(|p| p.question.clone()).collect();
        let vectors = embed_checked(self.provider.as_ref(), &questions).await?;

        let mut index = FlatIndex::new(self.provider.dimensions());
        index.build(vectors)?;

        let mut answers = AnswerStore::new();
        answers.replace_all(pairs.iter().map(|p| p.answer.clone()));

        let fingerprint = persist::fingerprint(questions.iter().map(String::as_str));

        Ok(Staged {
            pairs,
            index,
            answers,
            fingerprint,
        })
    }

    fn commit(&mut self, staged: Staged) {
        self.pairs = staged.pairs;
        self.index = staged.index;
        self.answers = staged.answers;
    }

    fn reset(&mut self) {
        self.pairs.clear();
        self.index = FlatIndex::new(self.provider.dimensions());
        self.answers = AnswerStore::new();
    }

    fn fingerprint(&self) -> Fingerprint {
        persist::fingerprint(self.pairs.iter().map(|p| p.question.as_str()))
    }

    fn index_artifact(&self, index: &FlatIndex, fingerprint: Fingerprint) -> IndexArtifact {
        IndexArtifact {
            provider: self.provider.provider_name().to_string(),
            model: self.provider.model_name().to_string(),
            fingerprint,
            index: index.clone(),
        }
    }

    /// Authoritative pairs in position order.
    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Rows in the vector index.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Entries in the answer store.
    pub fn store_len(&self) -> usize {
        self.answers.len()
    }

    /// Answer stored at `position`.
    pub fn answer_at(&self, position: usize) -> Option<&str> {
        self.answers.get(position)
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Sizes and identity of the knowledge base.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            pairs_count: self.pairs.len(),
            dimensions: self.provider.dimensions(),
            provider: self.provider.provider_name().to_string(),
            model: self.provider.model_name().to_string(),
            index_size_bytes: persist::size_of(&self.paths.index),
            answers_size_bytes: persist::size_of(&self.paths.answers),
            last_rebuild_at: persist::modified_at(&self.paths.answers),
        }
    }
}
