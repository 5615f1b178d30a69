//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer text returned when nothing has been indexed yet.
pub const EMPTY_BASE_ANSWER: &str = "No indexed questions available.";

/// Answer text returned when the nearest position has no stored answer.
pub const MISSING_ANSWER: &str = "I don't have an answer for that.";

/// A question and the answer it should retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One search hit from the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Row in the index (and the answer store)
    pub position: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// How a query result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Nearest question found and its answer returned
    Matched,
    /// Nothing indexed; sentinel answer
    EmptyBase,
    /// Nearest position has no answer; placeholder answer
    MissingAnswer,
}

/// Result of a knowledge base query.
///
/// Only the single nearest answer is exposed, regardless of how many
/// candidates were searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Answer text (or a sentinel/placeholder, see `kind`)
    pub answer: String,

    /// Squared Euclidean distance; `f32::INFINITY` for an empty base
    #[serde(with = "distance_serde")]
    pub distance: f32,

    /// Matched position; `-1` for an empty base
    pub position: i64,

    pub kind: MatchKind,
}

impl QueryResult {
    /// Sentinel returned when no questions are indexed.
    pub fn empty_base() -> Self {
        Self {
            answer: EMPTY_BASE_ANSWER.to_string(),
            distance: f32::INFINITY,
            position: -1,
            kind: MatchKind::EmptyBase,
        }
    }

    pub fn is_match(&self) -> bool {
        self.kind == MatchKind::Matched
    }
}

/// JSON has no infinity, so the empty-base distance is written as `null`.
mod distance_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::INFINITY))
    }
}

/// Outcome of an ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Questions that were not known before
    pub added: usize,

    /// Known questions whose answer was replaced
    pub updated: usize,

    /// Pairs in the knowledge base after the rebuild
    pub total: usize,

    /// Whether a rebuild actually ran
    pub rebuilt: bool,
}

/// Statistics for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Number of question/answer pairs
    pub pairs_count: usize,

    /// Embedding dimensions
    pub dimensions: usize,

    /// Embedding provider name
    pub provider: String,

    /// Embedding model name
    pub model: String,

    /// Size of the index artifact on disk
    pub index_size_bytes: u64,

    /// Size of the answers artifact on disk
    pub answers_size_bytes: u64,

    /// When the artifacts were last written
    pub last_rebuild_at: Option<DateTime<Utc>>,
}
