//! Trigram embedding provider using character trigram-based content-aware embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use recall_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: [&str; 32] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Weight of one stop-word occurrence relative to a content word.
const STOP_WORD_WEIGHT: f32 = 0.25;

/// Trigram-based embedding provider for local, offline operation.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. Not semantically accurate like a neural model, but consistent
/// and content-dependent, so identical questions always land on identical
/// vectors and questions sharing words land close together.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
    stop_words: HashSet<&'static str>,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Split into `(content words, stop words)`.
    fn tokens<'a>(&self, lower: &'a str) -> (Vec<&'a str>, Vec<&'a str>) {
        let (stop, content): (Vec<&str>, Vec<&str>) = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .partition(|w| self.stop_words.contains(w));

        // A question made only of stop words still needs content
        if content.is_empty() {
            (stop, Vec::new())
        } else {
            (content, stop)
        }
    }

    fn bucket(&self, text: &str, seed: u64) -> usize {
        let hash = text
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }

    /// Generate a trigram-based embedding for text.
    fn generate_trigram_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();

        let (content, stop) = self.tokens(&lower);

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in content {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Boundary markers give short words trigrams of their own
            let chars: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram, 7)] += (*freq as f32).sqrt();
            }

            // Also encode whole word
            embedding[self.bucket(word, 11)] += *freq as f32;
        }

        // Stop words get their own buckets at low weight, so "for" vs "from"
        // still separates otherwise identical questions
        for word in stop {
            embedding[self.bucket(word, 13)] += STOP_WORD_WEIGHT;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_trigram_embedding(text))
            .collect())
    }
}
