//! # Shared Heatmap State
//!
//! The part of the heatmap touched by both the tick loop and the chunk-availability
//! trigger. Each slot's tracked set and cache sit behind their own lock so unrelated
//! slots never contend; the scalar switches are atomics.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
        RwLockReadGuard, RwLockWriteGuard,
    },
};

use super::{
    cache::DensityCache,
    coordinates::{ChunkKey, DimensionId},
    host::WorldIdentity,
    scanning::ScanBudget,
    slot::{SlotIndex, SlotSelection, SLOT_COUNT},
    tracking::TrackedSet,
};
use crate::core::MtResource;

/// One slot's tracked set and density cache.
#[derive(Clone, Default)]
pub struct SlotData {
    /// What the slot scans for.
    pub tracked: MtResource<TrackedSet>,
    /// What the slot has counted.
    pub cache: MtResource<DensityCache>,
}

impl SlotData {
    /// Returns `true` if the slot tracks anything.
    pub fn is_configured(&self) -> bool {
        self.tracked.get().is_configured()
    }
}

/// Highest count seen by the active slot in the current session. Never below 1.
#[derive(Debug)]
pub struct RunningMax(AtomicU32);

impl Default for RunningMax {
    fn default() -> Self {
        Self(AtomicU32::new(1))
    }
}

impl RunningMax {
    /// The current maximum.
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Raises the maximum to `count` if it is higher. Never lowers it.
    pub fn observe(&self, count: u32) {
        self.0.fetch_max(count.max(1), Ordering::AcqRel);
    }

    /// Starts a new session at `value` (at least 1).
    pub fn reset_to(&self, value: u32) {
        self.0.store(value.max(1), Ordering::Release);
    }
}

/// A chunk whose scan was postponed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeferredScan {
    /// World the chunk was loaded in.
    pub world: WorldIdentity,
    /// Dimension the chunk was loaded in.
    pub dimension: DimensionId,
    /// The chunk.
    pub key: ChunkKey,
}

/// Upper bound on postponed chunk scans. The oldest entries are dropped first.
pub const MAX_DEFERRED_SCANS: usize = 4096;

/// State shared between the tick loop and the chunk-availability trigger.
pub struct SharedState {
    slots: [SlotData; SLOT_COUNT],
    enabled: AtomicBool,
    active_slot: AtomicU8,
    joined_world: MtResource<Option<WorldIdentity>>,
    current_dimension: MtResource<Option<DimensionId>>,
    running_max: RunningMax,
    budget: ScanBudget,
    deferred: MtResource<VecDeque<DeferredScan>>,
}

impl SharedState {
    /// Creates the shared state with empty slots and a full scan budget.
    pub fn new(scans_per_tick: u32) -> Self {
        Self {
            slots: Default::default(),
            enabled: AtomicBool::new(false),
            active_slot: AtomicU8::new(0),
            joined_world: MtResource::new(None),
            current_dimension: MtResource::new(None),
            running_max: RunningMax::default(),
            budget: ScanBudget::new(scans_per_tick),
            deferred: MtResource::new(VecDeque::new()),
        }
    }

    /// The data of one slot.
    pub fn slot(&self, slot: SlotIndex) -> &SlotData {
        &self.slots[slot.index()]
    }

    /// Every slot with its index.
    pub fn slots(&self) -> impl Iterator<Item = (SlotIndex, &SlotData)> {
        SlotIndex::all().zip(self.slots.iter())
    }

    /// Whether the feature is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The slot currently selected for rendering.
    pub fn selection(&self) -> SlotSelection {
        SlotSelection::from_number(self.active_slot.load(Ordering::Acquire))
    }

    pub(crate) fn set_selection(&self, selection: SlotSelection) {
        self.active_slot.store(selection.number(), Ordering::Release);
    }

    /// Returns `true` when scanning should happen: enabled with a slot selected.
    pub fn is_scanning(&self) -> bool {
        self.is_enabled() && self.selection() != SlotSelection::Off
    }

    /// The world whose caches are loaded.
    ///
    /// Chunk scans hold this guard for their whole duration, so a world switch (which
    /// takes the write guard) never interleaves with a scan.
    pub fn joined_world(&self) -> RwLockReadGuard<'_, Option<WorldIdentity>> {
        self.joined_world.get()
    }

    pub(crate) fn joined_world_mut(&self) -> RwLockWriteGuard<'_, Option<WorldIdentity>> {
        self.joined_world.get_mut()
    }

    /// The observer's dimension, or `None` while no world is loaded.
    pub fn current_dimension(&self) -> Option<DimensionId> {
        self.current_dimension.get().clone()
    }

    pub(crate) fn set_current_dimension(&self, dimension: Option<DimensionId>) {
        *self.current_dimension.get_mut() = dimension;
    }

    /// The active slot's running maximum.
    pub fn running_max(&self) -> &RunningMax {
        &self.running_max
    }

    /// The per-tick scan budget.
    pub fn budget(&self) -> &ScanBudget {
        &self.budget
    }

    /// Recomputes the running maximum from the active slot's cache for the current
    /// dimension.
    pub fn recompute_running_max(&self) {
        let max = match (self.selection().slot(), self.current_dimension()) {
            (Some(slot), Some(dimension)) => self.slot(slot).cache.get().max_count(&dimension),
            _ => 1,
        };
        self.running_max.reset_to(max);
    }

    /// Queues a postponed scan, dropping the oldest entry when full.
    pub fn defer(&self, scan: DeferredScan) {
        let mut deferred = self.deferred.get_mut();
        if deferred.len() >= MAX_DEFERRED_SCANS {
            if let Some(dropped) = deferred.pop_front() {
                log::warn!(
                    "Deferred scan queue full, dropping chunk {} in {}",
                    dropped.key,
                    dropped.dimension
                );
            }
        }
        deferred.push_back(scan);
    }

    pub(crate) fn pop_deferred(&self) -> Option<DeferredScan> {
        self.deferred.get_mut().pop_front()
    }

    pub(crate) fn requeue_deferred_front(&self, scan: DeferredScan) {
        self.deferred.get_mut().push_front(scan);
    }

    /// Number of postponed scans.
    pub fn deferred_len(&self) -> usize {
        self.deferred.get().len()
    }

    /// Drops every postponed scan.
    pub fn clear_deferred(&self) {
        self.deferred.get_mut().clear();
    }

    /// Keeps only the postponed scans of `world`; `None` drops them all.
    pub fn retain_deferred_for(&self, world: Option<&WorldIdentity>) {
        self.deferred
            .get_mut()
            .retain(|scan| Some(&scan.world) == world);
    }
}
