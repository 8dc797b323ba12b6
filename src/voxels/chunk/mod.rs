//! # Chunk Module
//!
//! This module provides the `ChunkColumn` struct: one 16-wide, 16-deep column of
//! blocks spanning the whole build height of the demo world.
//!
//! ## Storage
//!
//! Blocks are stored densely in a single vector, one byte each, in row-major order
//! (x, then z, then y). A column of the default build height holds 32 KiB of block
//! data, which keeps lookups O(1) and the scanner's inner loop branch free.

use cgmath::Point3;

use super::block::{block_type::BlockType, Block};
use crate::heatmap_state::coordinates::{ChunkKey, CHUNK_DIMENSION};

pub mod generation;

/// The number of blocks in a single horizontal plane of a column.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;

/// A full-height column of blocks addressed by its chunk key.
#[derive(Clone, Debug)]
pub struct ChunkColumn {
    /// The horizontal chunk coordinates of this column.
    pub key: ChunkKey,
    min_y: i32,
    height: usize,
    blocks: Vec<Block>,
}

impl ChunkColumn {
    /// Creates a column filled with air.
    ///
    /// # Arguments
    /// * `key` - The chunk this column occupies
    /// * `min_y` - The lowest block Y coordinate stored
    /// * `height` - The number of block layers stored
    pub fn empty(key: ChunkKey, min_y: i32, height: usize) -> Self {
        Self {
            key,
            min_y,
            height,
            blocks: vec![Block::default(); CHUNK_PLANE_SIZE * height],
        }
    }

    /// The lowest block Y coordinate of this column.
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// The number of block layers in this column.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts local coordinates to an index into `blocks`.
    ///
    /// # Returns
    /// `None` if the position lies outside the column.
    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !(0..CHUNK_DIMENSION).contains(&x) || !(0..CHUNK_DIMENSION).contains(&z) {
            return None;
        }
        let layer = usize::try_from(y - self.min_y).ok()?;
        if layer >= self.height {
            return None;
        }
        Some(layer * CHUNK_PLANE_SIZE + (z * CHUNK_DIMENSION + x) as usize)
    }

    /// Returns the block at local coordinates `x`, `z` and world height `y`.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        self.index(x, y, z).map(|index| self.blocks[index])
    }

    /// Returns the block at a world-space block position.
    ///
    /// # Returns
    /// `None` if the position is not inside this column.
    pub fn block_at_world(&self, position: Point3<i32>) -> Option<Block> {
        if ChunkKey::from_block_coordinates(position.x, position.z) != self.key {
            return None;
        }
        self.block_at(
            position.x - self.key.min_block_x(),
            position.y,
            position.z - self.key.min_block_z(),
        )
    }

    /// Overwrites the block at local coordinates. Out-of-column writes are ignored.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        if let Some(index) = self.index(x, y, z) {
            self.blocks[index] = Block::new(block_type);
        }
    }

    /// Counts the blocks of one type, mainly for diagnostics and tests.
    pub fn count_of(&self, block_type: BlockType) -> usize {
        let raw = Block::new(block_type);
        self.blocks.iter().filter(|block| **block == raw).count()
    }
}
