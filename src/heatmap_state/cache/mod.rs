//! # Cache Store
//!
//! The per-slot density cache (`dimension -> chunk -> count`) and its on-disk JSON
//! persistence ([`CacheStore`]).
//!
//! Each slot owns exactly one [`DensityCache`], wrapped in its own
//! [`MtResource`](crate::core::MtResource) so the chunk-availability path and the tick
//! loop only contend when they touch the same slot.

mod persistence;

use std::collections::HashMap;

pub use persistence::{CacheError, CacheStore};

use super::coordinates::{ChunkKey, DimensionId};

/// Chunk counts for one dimension.
pub type DimensionCounts = HashMap<ChunkKey, u32>;

/// One slot's density counts, partitioned by dimension.
///
/// A chunk appears at most once per dimension: inserting an already-present key
/// overwrites the previous count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DensityCache {
    dimensions: HashMap<DimensionId, DimensionCounts>,
}

impl DensityCache {
    /// Wraps already-loaded dimension maps.
    pub fn from_dimensions(dimensions: HashMap<DimensionId, DimensionCounts>) -> Self {
        Self { dimensions }
    }

    /// The count recorded for `key`, if it has been scanned.
    pub fn get(&self, dimension: &DimensionId, key: ChunkKey) -> Option<u32> {
        self.dimensions
            .get(dimension)
            .and_then(|counts| counts.get(&key))
            .copied()
    }

    /// Returns `true` if `key` has a recorded count in `dimension`.
    pub fn contains(&self, dimension: &DimensionId, key: ChunkKey) -> bool {
        self.get(dimension, key).is_some()
    }

    /// Records (or overwrites) the count for `key`. Returns the previous count.
    pub fn insert(&mut self, dimension: &DimensionId, key: ChunkKey, count: u32) -> Option<u32> {
        self.dimensions
            .entry(dimension.clone())
            .or_default()
            .insert(key, count)
    }

    /// Copies the counts of one dimension so they can be iterated without holding the
    /// slot lock.
    pub fn snapshot(&self, dimension: &DimensionId) -> DimensionCounts {
        self.dimensions.get(dimension).cloned().unwrap_or_default()
    }

    /// The highest count recorded in `dimension`, or 0 if none.
    pub fn max_count(&self, dimension: &DimensionId) -> u32 {
        self.dimensions
            .get(dimension)
            .and_then(|counts| counts.values().max())
            .copied()
            .unwrap_or(0)
    }

    /// Number of chunks recorded for `dimension`.
    pub fn chunk_count(&self, dimension: &DimensionId) -> usize {
        self.dimensions.get(dimension).map_or(0, HashMap::len)
    }

    /// Number of chunks recorded across every dimension.
    pub fn total_chunks(&self) -> usize {
        self.dimensions.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no chunk has been recorded in any dimension.
    pub fn is_empty(&self) -> bool {
        self.dimensions.values().all(HashMap::is_empty)
    }

    /// All dimension maps.
    pub fn dimensions(&self) -> &HashMap<DimensionId, DimensionCounts> {
        &self.dimensions
    }

    /// Drops every recorded count.
    pub fn clear(&mut self) {
        self.dimensions.clear();
    }
}
