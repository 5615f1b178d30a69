//! Mock embedding provider with pinnable vectors.

use crate::embeddings::provider::EmbeddingProvider;
use recall_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Mock provider for testing and development.
///
/// Texts pinned with [`MockProvider::with_vector`] embed to exactly that
/// vector, which lets tests control distances precisely. Any other text gets a
/// deterministic pseudo-random vector derived from its bytes.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
    pinned: RwLock<HashMap<String, Vec<f32>>>,
    failing: AtomicBool,
    embedded: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            pinned: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
            embedded: AtomicUsize::new(0),
        }
    }

    /// Pin the vector returned for `text`.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.pin(text, vector);
        self
    }

    /// Pin the vector returned for `text` on a shared provider.
    pub fn pin(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.pinned
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.into(), vector);
    }

    /// Make every following embedding call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of texts embedded so far.
    pub fn embedded_count(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }

    fn generate_mock_embedding(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self
            .pinned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
        {
            return vector.clone();
        }

        let seed = text
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });

        (0..self.dimensions)
            .map(|i| {
                let mixed = seed
                    .wrapping_add((i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
                    .rotate_left(17)
                    .wrapping_mul(0xbf58_476d_1ce4_e5b9);
                ((mixed >> 40) as f32 / (1u64 << 24) as f32) - 0.5
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Embedding(
                "mock provider configured to fail".to_string(),
            ));
        }

        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| self.generate_mock_embedding(text))
            .collect())
    }
}
