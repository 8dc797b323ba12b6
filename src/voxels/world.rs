//! # World Module
//!
//! This module provides the `VoxelWorld` struct, the demo world the heatmap scans.
//!
//! ## Architecture
//!
//! Columns are generated on demand around the observer and kept in a bounded
//! least-recently-used cache. A column that falls out of the cache is no longer
//! resident: the scanner reports it as unavailable until it is streamed in again.
//! Generation is deterministic, so a reloaded column yields the same counts.

use std::num::NonZeroUsize;
use std::ops::Range;

use cgmath::Point3;
use log::debug;
use lru::LruCache;
use noise::Perlin;

use super::block::{block_type, block_type::ALL_BLOCK_TYPES};
use super::chunk::{generation::generate_column, ChunkColumn};
use crate::heatmap_state::{
    coordinates::ChunkKey,
    scanning::WorldView,
    tracking::{ResourceId, TagLookup, TagRef},
};

/// The vertical extent of every demo column.
pub const DEFAULT_BUILD_HEIGHT: Range<i32> = -64..80;

/// A procedurally generated world of chunk columns with bounded residency.
pub struct VoxelWorld {
    seed: u64,
    perlin: Perlin,
    chunks: LruCache<ChunkKey, ChunkColumn>,
    /// Resource ids indexed by `BlockTypeSize`.
    palette: Vec<ResourceId>,
    build_height: Range<i32>,
}

impl VoxelWorld {
    /// Creates an empty world.
    ///
    /// # Arguments
    /// * `seed` - Seed for both the height field and the ore placement
    /// * `capacity` - The most columns kept resident at once
    pub fn new(seed: u64, capacity: NonZeroUsize) -> Self {
        let palette = ALL_BLOCK_TYPES
            .iter()
            .map(|block_type| {
                let name = block_type.resource_name();
                let (namespace, path) = name.split_once(':').unwrap_or(("minecraft", name));
                ResourceId::new(namespace, path)
            })
            .collect();

        Self {
            seed,
            perlin: Perlin::new(seed as u32),
            chunks: LruCache::new(capacity),
            palette,
            build_height: DEFAULT_BUILD_HEIGHT,
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of resident columns.
    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the resident column at `key`, if any.
    pub fn column(&self, key: ChunkKey) -> Option<&ChunkColumn> {
        self.chunks.peek(&key)
    }

    /// Makes the column at `key` resident, generating it when needed.
    ///
    /// # Returns
    /// `true` if the column was not resident before the call.
    pub fn load_chunk(&mut self, key: ChunkKey) -> bool {
        // `get` also marks the column as most recently used.
        if self.chunks.get(&key).is_some() {
            return false;
        }
        let column = generate_column(&self.perlin, self.seed, key, self.build_height.clone());
        if let Some((evicted, _)) = self.chunks.push(key, column) {
            debug!("Evicted column {} to make room for {}", evicted, key);
        }
        true
    }

    /// Streams in every column within `radius` of `center`, nearest first.
    ///
    /// # Returns
    /// The keys that became resident during this call.
    pub fn ensure_loaded(&mut self, center: ChunkKey, radius: u32) -> Vec<ChunkKey> {
        ChunkKey::disc(center, radius)
            .into_iter()
            .filter(|key| self.load_chunk(*key))
            .collect()
    }

    /// Drops the column at `key` from residency.
    ///
    /// # Returns
    /// `true` if the column was resident.
    pub fn unload_chunk(&mut self, key: ChunkKey) -> bool {
        self.chunks.pop(&key).is_some()
    }
}

impl TagLookup for VoxelWorld {
    fn has_tag(&self, resource: &ResourceId, tag: &TagRef) -> bool {
        block_type::has_tag(&resource.to_string(), &tag.id().to_string())
    }
}

impl WorldView for VoxelWorld {
    fn is_chunk_resident(&self, key: ChunkKey) -> bool {
        self.chunks.contains(&key)
    }

    fn resource_at(&self, position: Point3<i32>) -> Option<&ResourceId> {
        let key = ChunkKey::from_block_coordinates(position.x, position.z);
        let block = self.chunks.peek(&key)?.block_at_world(position)?;
        if block.block_type().is_air() {
            return None;
        }
        self.palette.get(block.block_type as usize)
    }

    fn build_height(&self) -> Range<i32> {
        self.build_height.clone()
    }
}
