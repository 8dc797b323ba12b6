use std::sync::Arc;

use super::{scan_chunk, ScanError, WorldView};
use crate::heatmap_state::{
    coordinates::{ChunkKey, DimensionId},
    host::{WorldIdentity, WorldSource},
    shared::{DeferredScan, SharedState},
};

/// What happened to one chunk-availability event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkScanOutcome {
    /// Scanning is switched off or no world is loaded; the event was dropped.
    Ignored,
    /// Every configured slot now has a count for the chunk.
    Scanned {
        /// Number of slots that were scanned for this event.
        slots: usize,
    },
    /// The scan was postponed to a later tick.
    Deferred,
    /// The chunk turned out not to be resident.
    Unavailable,
}

enum SlotPass {
    Done(usize),
    OutOfBudget,
    Unavailable,
}

/// Entry point for "chunk became available" events.
///
/// Cheap to clone and `Send + Sync`, so the host can hand it to whatever thread raises
/// chunk events. It touches only the locks of [`SharedState`], always in the order
/// joined world, tracked set, cache.
#[derive(Clone)]
pub struct ChunkScanTrigger {
    shared: Arc<SharedState>,
}

impl ChunkScanTrigger {
    pub(crate) fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    /// Scans a freshly loaded chunk for every configured slot that has no count for it
    /// yet.
    ///
    /// Chunks already cached are trusted and left alone. The chunk is deferred instead
    /// while its world is not the joined one (no world yet, or a switch the tick has not
    /// picked up), and once this tick's scan budget is spent.
    ///
    /// # Arguments
    /// * `world` - The world view holding the chunk
    /// * `source` - The world the chunk was loaded into
    /// * `dimension` - The chunk's dimension
    /// * `key` - The chunk that became available
    pub fn on_chunk_available<W: WorldView + ?Sized>(
        &self,
        world: &W,
        source: &WorldSource,
        dimension: &DimensionId,
        key: ChunkKey,
    ) -> ChunkScanOutcome {
        if !self.shared.is_scanning() {
            return ChunkScanOutcome::Ignored;
        }
        let Some(identity) = WorldIdentity::from_source(source) else {
            log::debug!("Chunk {} arrived without a world, ignoring", key);
            return ChunkScanOutcome::Ignored;
        };

        let joined = self.shared.joined_world();
        if joined.as_ref() != Some(&identity) || self.shared.current_dimension().is_none() {
            log::debug!("World {} not joined yet, deferring chunk {}", identity, key);
            self.defer(identity, dimension, key);
            return ChunkScanOutcome::Deferred;
        }

        match self.scan_missing_slots(world, dimension, key) {
            SlotPass::Done(slots) => ChunkScanOutcome::Scanned { slots },
            SlotPass::OutOfBudget => {
                log::debug!("Scan budget spent, deferring chunk {}", key);
                self.defer(identity, dimension, key);
                ChunkScanOutcome::Deferred
            }
            SlotPass::Unavailable => ChunkScanOutcome::Unavailable,
        }
    }

    /// Works through postponed scans of the joined world in `current` while the budget
    /// lasts. Entries for other worlds or dimensions are discarded. Returns how many
    /// chunks were completed.
    pub fn drain_deferred<W: WorldView + ?Sized>(&self, world: &W, current: &DimensionId) -> usize {
        let joined = self.shared.joined_world();
        let Some(joined_world) = joined.as_ref() else {
            return 0;
        };

        let mut completed = 0;
        while self.shared.budget().remaining() > 0 {
            let Some(scan) = self.shared.pop_deferred() else {
                break;
            };
            if &scan.world != joined_world || &scan.dimension != current {
                continue;
            }
            match self.scan_missing_slots(world, &scan.dimension, scan.key) {
                SlotPass::Done(_) => completed += 1,
                SlotPass::OutOfBudget => {
                    self.shared.requeue_deferred_front(scan);
                    break;
                }
                SlotPass::Unavailable => {}
            }
        }
        completed
    }

    fn defer(&self, world: WorldIdentity, dimension: &DimensionId, key: ChunkKey) {
        self.shared.defer(DeferredScan {
            world,
            dimension: dimension.clone(),
            key,
        });
    }

    fn scan_missing_slots<W: WorldView + ?Sized>(
        &self,
        world: &W,
        dimension: &DimensionId,
        key: ChunkKey,
    ) -> SlotPass {
        let active = self.shared.selection().slot();
        let counts_toward_max =
            self.shared.current_dimension().as_ref() == Some(dimension);
        let mut scanned = 0;

        for (slot, data) in self.shared.slots() {
            let tracked = data.tracked.get();
            if !tracked.is_configured() || data.cache.get().contains(dimension, key) {
                continue;
            }
            if !self.shared.budget().try_acquire() {
                return SlotPass::OutOfBudget;
            }

            match scan_chunk(world, key, &tracked) {
                Ok(count) => {
                    data.cache.get_mut().insert(dimension, key, count);
                    if counts_toward_max && Some(slot) == active {
                        self.shared.running_max().observe(count);
                    }
                    log::debug!("Slot {} chunk {}: {} matches", slot, key, count);
                    scanned += 1;
                }
                Err(ScanError::NotResident(_)) => {
                    log::debug!("Chunk {} unloaded before it could be scanned", key);
                    return SlotPass::Unavailable;
                }
            }
        }

        SlotPass::Done(scanned)
    }
}
