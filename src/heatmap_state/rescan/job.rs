use std::collections::{HashSet, VecDeque};

use crate::heatmap_state::{
    coordinates::{ChunkKey, DimensionId},
    slot::SlotIndex,
};

/// Why a job was seeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescanMode {
    /// Scan only chunks the cache has no count for.
    Fill,
    /// Scan every chunk, overwriting existing counts.
    Rescan,
}

/// One chunk waiting to be scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingChunk {
    /// The chunk.
    pub key: ChunkKey,
    /// Scan attempts that found the chunk not resident.
    pub attempts: u32,
}

/// A tick-batched re-population of one slot's cache over a disc of chunks.
#[derive(Clone, Debug)]
pub struct RescanJob {
    pub(super) slot: SlotIndex,
    pub(super) dimension: DimensionId,
    pub(super) center: ChunkKey,
    pub(super) radius: u32,
    pub(super) mode: RescanMode,
    pub(super) pending: VecDeque<PendingChunk>,
    pub(super) scanned_count: usize,
    pub(super) dropped_count: usize,
    pub(super) active: bool,
}

impl RescanJob {
    /// Stages every chunk within `radius` of `center`, nearest first.
    pub fn new(
        slot: SlotIndex,
        dimension: DimensionId,
        center: ChunkKey,
        radius: u32,
        mode: RescanMode,
    ) -> Self {
        let pending = ChunkKey::disc(center, radius)
            .into_iter()
            .map(|key| PendingChunk { key, attempts: 0 })
            .collect();
        Self {
            slot,
            dimension,
            center,
            radius,
            mode,
            pending,
            scanned_count: 0,
            dropped_count: 0,
            active: true,
        }
    }

    /// The slot whose cache the job fills.
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// The dimension the job scans.
    pub fn dimension(&self) -> &DimensionId {
        &self.dimension
    }

    /// The chunk the disc is centered on.
    pub fn center(&self) -> ChunkKey {
        self.center
    }

    /// Disc radius in chunks.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Fill or full rescan.
    pub fn mode(&self) -> RescanMode {
        self.mode
    }

    /// Chunks still waiting, as a set.
    pub fn pending_keys(&self) -> HashSet<ChunkKey> {
        self.pending.iter().map(|pending| pending.key).collect()
    }

    /// Number of chunks still waiting.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Chunks scanned so far.
    pub fn scanned_count(&self) -> usize {
        self.scanned_count
    }

    /// Chunks given up on because they never became resident.
    pub fn dropped_count(&self) -> usize {
        self.dropped_count
    }

    /// `false` once the job has drained or been cancelled.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
