//! Vector index abstraction for question embeddings.
//!
//! Defines the trait the engine searches through. Rows are addressed by
//! position, the join key with the answer store.

use crate::types::Neighbor;
use recall_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Rebuilding from a full, ordered set of vectors
/// - Exact top-k search by squared Euclidean distance
/// - Reporting size and dimensionality
pub trait VectorIndex: Send + Sync {
    /// Replace the whole index with `vectors`; row `i` becomes position `i`.
    ///
    /// On error the previous content is kept.
    fn build(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()>;

    /// Search for the `k` nearest rows to `query`.
    ///
    /// Returns at most `k` neighbors ordered by ascending distance, ties
    /// broken by lower position. An empty index yields an empty vec.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor>>;

    /// Fixed dimensionality of every row.
    fn dimension(&self) -> usize;

    /// Number of rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
