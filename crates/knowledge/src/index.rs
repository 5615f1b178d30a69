//! Flat (brute-force) vector index over question embeddings.
//!
//! Every search compares the query against every stored row, so results are
//! exact nearest neighbors. Rows live in one contiguous `Vec<f32>`.

use crate::types::Neighbor;
use crate::vector_index::VectorIndex;
use recall_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Exact nearest-neighbor index using squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Build an index directly from `vectors`.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        let mut index = Self::new(dimension);
        index.build(vectors)?;
        Ok(index)
    }

    /// Rebuild from a flat row-major buffer, as stored in the index artifact.
    pub(crate) fn from_raw(dimension: usize, data: Vec<f32>) -> AppResult<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(AppError::Index(format!(
                "Buffer of {} values is not a whole number of {}-dimensional rows",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Row-major buffer of all vectors.
    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.dimension.max(1))
    }
}

impl VectorIndex for FlatIndex {
    fn build(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        let mut data = Vec::with_capacity(vectors.len() * self.dimension);
        for vector in vectors {
            data.extend_from_slice(&vector);
        }
        self.data = data;

        tracing::debug!(
            "Built flat index with {} rows of dimension {}",
            self.len(),
            self.dimension
        );
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor>> {
        if k == 0 {
            return Err(AppError::InvalidInput(
                "Number of neighbors must be at least 1".to_string(),
            ));
        }

        if query.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .rows()
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_euclidean(query, row),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }
}

/// Squared Euclidean distance between two equal-length vectors.
///
/// No normalization: vectors of different magnitude rank differently than
/// they would under cosine similarity.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
