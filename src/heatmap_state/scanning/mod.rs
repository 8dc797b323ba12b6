//! # Chunk Scanner
//!
//! Counts the positions inside one chunk column that match a slot's tracked set.
//!
//! The scanner is defined purely against the [`WorldView`] collaborator: residency,
//! per-position resource lookup, build-height bounds and tag membership.
//!
//! ## Cost
//! One scan visits `16 * 16 * build_height` positions. This is the dominant per-chunk
//! cost of the whole system, which is why every caller draws from the shared
//! [`ScanBudget`] before scanning.

mod budget;
mod trigger;

use std::{collections::HashMap, ops::Range};

use cgmath::Point3;
use thiserror::Error;

pub use budget::ScanBudget;
pub use trigger::{ChunkScanOutcome, ChunkScanTrigger};

use super::{
    coordinates::{ChunkKey, CHUNK_DIMENSION},
    tracking::{ResourceId, TagLookup, TrackedSet},
};

/// Read-only view of the voxel world the scanner runs against.
pub trait WorldView: TagLookup {
    /// Returns `true` if the chunk is currently loaded and readable.
    fn is_chunk_resident(&self, key: ChunkKey) -> bool;

    /// The resource occupying a block position, or `None` for empty space or
    /// positions outside resident chunks.
    fn resource_at(&self, position: Point3<i32>) -> Option<&ResourceId>;

    /// The vertical build range, lower bound inclusive and upper bound exclusive.
    fn build_height(&self) -> Range<i32>;
}

/// Reasons a scan could not produce a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The chunk is not loaded. This means "not yet available", never "zero".
    #[error("chunk {0} is not resident")]
    NotResident(ChunkKey),
}

/// Counts the positions in `key` whose resource matches `tracked`.
///
/// A position counts once even if it matches both an exact id and a tag. An
/// unconfigured set yields zero without touching the world.
///
/// # Errors
/// Returns [`ScanError::NotResident`] when the chunk is not loaded; callers must retry
/// later rather than record a zero.
pub fn scan_chunk<W: WorldView + ?Sized>(
    world: &W,
    key: ChunkKey,
    tracked: &TrackedSet,
) -> Result<u32, ScanError> {
    if !world.is_chunk_resident(key) {
        return Err(ScanError::NotResident(key));
    }
    if !tracked.is_configured() {
        return Ok(0);
    }

    let heights = world.build_height();
    let min_x = key.min_block_x();
    let min_z = key.min_block_z();

    // A chunk holds only a handful of distinct resources; resolve each once.
    let mut verdicts: HashMap<&ResourceId, bool> = HashMap::new();
    let mut last: Option<(&ResourceId, bool)> = None;
    let mut count = 0;

    for x in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            for y in heights.clone() {
                let Some(resource) = world.resource_at(Point3::new(min_x + x, y, min_z + z)) else {
                    continue;
                };
                let matched = match last {
                    Some((previous, matched)) if std::ptr::eq(previous, resource) => matched,
                    _ => {
                        let matched = *verdicts
                            .entry(resource)
                            .or_insert_with(|| tracked.matches(resource, world));
                        last = Some((resource, matched));
                        matched
                    }
                };
                if matched {
                    count += 1;
                }
            }
        }
    }

    Ok(count)
}
