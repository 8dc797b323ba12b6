//! # Heatmap State Module
//!
//! The ore-density heatmap: per-chunk scanning for five independently configured
//! tracked-resource slots, a persistent per-world cache, background rescans and the
//! overlay set handed to an external renderer.
//!
//! ## Key Components
//!
//! * `HeatmapState` - The slot controller; owns everything below and drives the tick
//! * `tracking` - Parses slot configuration into tracked sets
//! * `scanning` - Counts matches in one chunk, plus the chunk-availability trigger
//! * `cache` - Per-slot density maps and their JSON files
//! * `color` - Heat gradient and opacity
//! * `overlay` - Diffs density snapshots against rendered overlays
//! * `rescan` - Tick-batched background re-population
//! * `host` - What the heatmap reads from the game hosting it
//!
//! ## Two Entry Points
//!
//! The tick loop calls [`HeatmapState::tick`]; chunk-load events go through a
//! [`ChunkScanTrigger`] obtained from [`HeatmapState::scan_trigger`]. The two meet only
//! in [`shared::SharedState`], whose per-slot locks allow the trigger to run on any
//! thread at any time relative to the tick.
//!
//! ## Tick Order
//!
//! 1. Refill the scan budget
//! 2. Detect world switches (flush, reset, load) and dimension changes
//! 3. Drain deferred chunk scans, seed a pending fill job, run one rescan batch
//! 4. Every `update_interval_ticks`: save every `600 / interval` updates, then render

pub mod cache;
pub mod color;
pub mod config;
pub mod coordinates;
pub mod host;
pub mod overlay;
pub mod rescan;
pub mod scanning;
pub mod shared;
pub mod slot;
pub mod tracking;

use std::sync::Arc;

use cache::{CacheStore, DimensionCounts};
use config::{ConfigError, HeatmapConfig};
use coordinates::{ChunkKey, DimensionId};
use host::{HostEnvironment, WorldIdentity};
use overlay::{OverlayReconciler, OverlayRenderer};
use rescan::{RescanJob, RescanMode, RescanProgress, RescanScheduler};
use scanning::{ChunkScanTrigger, WorldView};
use shared::SharedState;
use slot::{SlotIndex, SlotSelection};
use tracking::{validate_entry, TrackedSet};

/// The slot controller and coordinator of every heatmap component.
///
/// # Examples
///
/// ```no_run
/// # use ore_heatmap::heatmap_state::{HeatmapState, config::HeatmapConfig};
/// # fn drive<H, W, R>(host: &H, world: &W, renderer: &mut R)
/// # where H: ore_heatmap::heatmap_state::host::HostEnvironment,
/// #       W: ore_heatmap::heatmap_state::scanning::WorldView,
/// #       R: ore_heatmap::heatmap_state::overlay::OverlayRenderer {
/// let mut heatmap = HeatmapState::new(HeatmapConfig::default());
/// let trigger = heatmap.scan_trigger();
///
/// // from the chunk-load event handler:
/// // trigger.on_chunk_available(world, &source, &dimension, key);
///
/// // every game tick:
/// heatmap.tick(host, world, renderer);
/// # }
/// ```
pub struct HeatmapState {
    config: HeatmapConfig,
    shared: Arc<SharedState>,
    trigger: ChunkScanTrigger,
    store: CacheStore,
    world_identity: Option<WorldIdentity>,
    reconciler: OverlayReconciler,
    rescan: RescanScheduler,
    observer_chunk: ChunkKey,
    minimap_zoom: Option<u32>,
    fill_requested: bool,
    tick_counter: u32,
    save_counter: u32,
}

impl HeatmapState {
    /// Builds the heatmap from its configuration.
    ///
    /// A persisted active slot that is not configured starts as OFF. Numeric settings
    /// outside their ranges are pulled back into range.
    pub fn new(mut config: HeatmapConfig) -> Self {
        config.clamp_to_ranges();
        let shared = Arc::new(SharedState::new(config.scans_per_tick));

        for (slot, data) in shared.slots() {
            *data.tracked.get_mut() = TrackedSet::from_entries(config.slot_entries(slot));
        }

        let selection = match config.active_selection() {
            SlotSelection::Slot(slot) if !shared.slot(slot).is_configured() => {
                log::warn!("Slot {} has nothing to track, starting OFF", slot);
                SlotSelection::Off
            }
            selection => selection,
        };
        shared.set_selection(selection);
        shared.set_enabled(config.enabled);
        config.active_slot = selection.number();

        log::info!(
            "Ore heatmap ready ({}, {})",
            if config.enabled { "enabled" } else { "disabled" },
            selection
        );

        Self {
            store: CacheStore::new(config.cache_dir.clone()),
            rescan: RescanScheduler::new(config.rescan_batch_size, config.rescan_retry),
            trigger: ChunkScanTrigger::new(shared.clone()),
            shared,
            config,
            world_identity: None,
            reconciler: OverlayReconciler::new(),
            observer_chunk: ChunkKey::new(0, 0),
            minimap_zoom: None,
            fill_requested: false,
            tick_counter: 0,
            save_counter: 0,
        }
    }

    /// A handle for the host's chunk-load event handler.
    pub fn scan_trigger(&self) -> ChunkScanTrigger {
        self.trigger.clone()
    }

    /// Runs one tick of the heatmap.
    ///
    /// Never fails: every error inside is logged and skipped.
    ///
    /// # Arguments
    /// * `host` - World identity, dimension and observer position
    /// * `world` - The world to scan
    /// * `renderer` - Receives overlay show/remove calls
    pub fn tick<H, W, R>(&mut self, host: &H, world: &W, renderer: &mut R)
    where
        H: HostEnvironment + ?Sized,
        W: WorldView + ?Sized,
        R: OverlayRenderer + ?Sized,
    {
        self.shared.budget().reset(self.config.scans_per_tick);

        self.sync_world(host, renderer);
        if self.world_identity.is_none() {
            return;
        }

        let Some(dimension) = host.dimension() else {
            if self.shared.current_dimension().is_some() {
                self.shared.set_current_dimension(None);
                self.reconciler.clear(renderer);
                self.rescan.cancel("no dimension");
            }
            return;
        };
        self.sync_dimension(&dimension, renderer);

        self.observer_chunk = ChunkKey::from_block_position(host.observer_position());
        self.minimap_zoom = host.minimap_zoom();

        if self.shared.is_scanning() {
            self.trigger.drain_deferred(world, &dimension);
            self.run_rescan(world, &dimension, renderer);
        } else if self.rescan.job().is_some() {
            self.rescan.cancel("scanning suspended");
        }

        self.tick_counter += 1;
        if self.tick_counter < self.config.update_interval_ticks {
            return;
        }
        self.tick_counter = 0;

        self.save_counter += 1;
        if self.save_counter >= self.config.save_every_updates() {
            self.save_counter = 0;
            self.save_all();
        }

        if self.shared.is_scanning() {
            self.render(&dimension, renderer);
        } else if !self.reconciler.is_empty() {
            self.reconciler.clear(renderer);
        }
    }

    /// Flips the global switch. Disabling retracts every overlay and stops the rescan
    /// at once. Returns the new state.
    pub fn toggle_enabled<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        let enabled = !self.shared.is_enabled();
        self.set_enabled(enabled, renderer);
        enabled
    }

    /// Advances `OFF -> 1 -> ... -> 5 -> OFF`, skipping unconfigured slots. Returns the
    /// new selection.
    pub fn cycle_slot<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) -> SlotSelection {
        let shared = &self.shared;
        let next = shared
            .selection()
            .next(|slot| shared.slot(slot).is_configured());
        self.enter_selection(next, renderer);
        next
    }

    /// Selects a slot directly. An unconfigured slot is refused and the current
    /// selection kept. Returns the selection in effect afterwards.
    pub fn select_slot<R: OverlayRenderer + ?Sized>(
        &mut self,
        selection: SlotSelection,
        renderer: &mut R,
    ) -> SlotSelection {
        if let SlotSelection::Slot(slot) = selection {
            if !self.shared.slot(slot).is_configured() {
                log::warn!("Slot {} has nothing to track, keeping {}", slot, self.selection());
                return self.selection();
            }
        }
        self.enter_selection(selection, renderer);
        selection
    }

    /// Wipes the active slot's cache in memory and on disk, then seeds a full rescan
    /// around the observer over the visible radius plus a margin.
    ///
    /// Returns the seeded job, or `None` when no slot is active or no world is joined.
    pub fn reset_active_slot<H, R>(&mut self, host: &H, renderer: &mut R) -> Option<&RescanJob>
    where
        H: HostEnvironment + ?Sized,
        R: OverlayRenderer + ?Sized,
    {
        let Some(slot) = self.shared.selection().slot() else {
            log::info!("No active slot to reset");
            return None;
        };

        self.invalidate_slot(slot);
        self.shared.running_max().reset_to(1);
        self.rescan.cancel("slot reset");
        log::info!("Reset slot {}", slot);

        let dimension = self.shared.current_dimension()?;
        self.refresh_overlays(renderer);

        self.observer_chunk = ChunkKey::from_block_position(host.observer_position());
        self.minimap_zoom = host.minimap_zoom();
        let radius = self.config.rescan_radius(self.minimap_zoom);
        self.fill_requested = false;
        Some(self.rescan.seed(
            slot,
            dimension,
            self.observer_chunk,
            radius,
            RescanMode::Rescan,
        ))
    }

    /// Replaces one slot's tracked entries.
    ///
    /// Every non-blank entry must follow the tracked-entry grammar, otherwise nothing
    /// changes. A changed set invalidates the slot's cache (memory and file); other
    /// slots are untouched. An active slot left with nothing to track switches the
    /// controller OFF.
    pub fn update_slot_configuration<R: OverlayRenderer + ?Sized>(
        &mut self,
        slot: SlotIndex,
        entries: Vec<String>,
        renderer: &mut R,
    ) -> Result<(), ConfigError> {
        for entry in entries.iter().filter(|entry| !entry.trim().is_empty()) {
            validate_entry(entry).map_err(|source| ConfigError::InvalidEntry {
                slot,
                entry: entry.clone(),
                source,
            })?;
        }

        let tracked = TrackedSet::from_entries(&entries);
        self.config.slots[slot.index()] = entries;

        let configured = tracked.is_configured();
        let tracked_len = tracked.len();
        {
            let data = self.shared.slot(slot);
            if *data.tracked.get() == tracked {
                return Ok(());
            }
            *data.tracked.get_mut() = tracked;
        }
        self.invalidate_slot(slot);
        log::info!("Slot {} now tracks {} entries", slot, tracked_len);

        if self.shared.selection().slot() == Some(slot) {
            self.rescan.cancel("slot reconfigured");
            if configured {
                self.shared.running_max().reset_to(1);
                self.fill_requested = true;
                self.refresh_overlays(renderer);
            } else {
                self.enter_selection(SlotSelection::Off, renderer);
            }
        }
        Ok(())
    }

    /// Applies a refreshed configuration.
    ///
    /// # Errors
    /// Returns the validation error and keeps the previous configuration if `config`
    /// is invalid.
    pub fn apply_config<R: OverlayRenderer + ?Sized>(
        &mut self,
        config: HeatmapConfig,
        renderer: &mut R,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        let selection = config.active_selection();
        let enabled = config.enabled;

        self.rescan
            .configure(config.rescan_batch_size, config.rescan_retry);
        self.config.scan_radius = config.scan_radius;
        self.config.update_interval_ticks = config.update_interval_ticks;
        self.config.overlay_opacity = config.overlay_opacity;
        self.config.rescan_batch_size = config.rescan_batch_size;
        self.config.scans_per_tick = config.scans_per_tick;
        self.config.rescan_retry = config.rescan_retry;

        for slot in SlotIndex::all() {
            let entries = config.slot_entries(slot).to_vec();
            if entries != self.config.slot_entries(slot) {
                self.update_slot_configuration(slot, entries, renderer)?;
            }
        }

        if config.cache_dir != self.config.cache_dir {
            self.save_all();
            self.store = CacheStore::new(config.cache_dir.clone());
            self.config.cache_dir = config.cache_dir;
        }

        self.select_slot(selection, renderer);
        self.set_enabled(enabled, renderer);

        log::info!("Applied heatmap config");
        Ok(())
    }

    /// Flushes every slot to disk, retracts every overlay and forgets the world.
    pub fn shutdown<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) {
        let shared = Arc::clone(&self.shared);
        let mut joined = shared.joined_world_mut();
        if let Some(identity) = self.world_identity.take() {
            self.save_all_for(&identity);
            log::info!("Left world {}", identity);
        }
        *joined = None;
        self.reset_all(renderer);
        shared.clear_deferred();
    }

    /// Writes every non-empty slot cache of the current world.
    pub fn save_all(&self) {
        if let Some(identity) = &self.world_identity {
            self.save_all_for(identity);
        }
    }

    /// Runs one overlay reconcile pass for the active slot right away.
    pub fn refresh_overlays<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if !self.shared.is_scanning() {
            return;
        }
        if let Some(dimension) = self.shared.current_dimension() {
            self.render(&dimension, renderer);
        }
    }

    /// The configuration in effect, including the written-back `active_slot`.
    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Whether the feature is switched on.
    pub fn is_enabled(&self) -> bool {
        self.shared.is_enabled()
    }

    /// The slot controller state.
    pub fn selection(&self) -> SlotSelection {
        self.shared.selection()
    }

    /// The active slot's running maximum.
    pub fn running_max(&self) -> u32 {
        self.shared.running_max().get()
    }

    /// The identity of the joined world.
    pub fn world_identity(&self) -> Option<&WorldIdentity> {
        self.world_identity.as_ref()
    }

    /// The observer's dimension.
    pub fn current_dimension(&self) -> Option<DimensionId> {
        self.shared.current_dimension()
    }

    /// A copy of one slot's counts in `dimension`.
    pub fn slot_counts(&self, slot: SlotIndex, dimension: &DimensionId) -> DimensionCounts {
        self.shared.slot(slot).cache.get().snapshot(dimension)
    }

    /// A copy of one slot's tracked set.
    pub fn tracked_set(&self, slot: SlotIndex) -> TrackedSet {
        self.shared.slot(slot).tracked.get().clone()
    }

    /// The staged rescan job.
    pub fn rescan_job(&self) -> Option<&RescanJob> {
        self.rescan.job()
    }

    /// The rendered overlays.
    pub fn overlays(&self) -> &OverlayReconciler {
        &self.reconciler
    }

    /// The cache file store.
    pub fn cache_store(&self) -> &CacheStore {
        &self.store
    }

    /// The chunk the observer stood in at the last tick.
    pub fn observer_chunk(&self) -> ChunkKey {
        self.observer_chunk
    }

    /// The radius currently rendered, in chunks.
    pub fn visible_radius(&self) -> u32 {
        self.config.visible_radius(self.minimap_zoom)
    }

    fn sync_world<H, R>(&mut self, host: &H, renderer: &mut R)
    where
        H: HostEnvironment + ?Sized,
        R: OverlayRenderer + ?Sized,
    {
        let identity = WorldIdentity::from_source(&host.world_source());
        if identity == self.world_identity {
            return;
        }

        // held until the new world's caches are in place so no scan lands in between
        let shared = Arc::clone(&self.shared);
        let mut joined = shared.joined_world_mut();

        if let Some(previous) = self.world_identity.take() {
            self.save_all_for(&previous);
            log::info!("Left world {}", previous);
            self.reset_all(renderer);
        }
        shared.retain_deferred_for(identity.as_ref());
        *joined = identity.clone();

        let Some(identity) = identity else {
            return;
        };

        for (slot, data) in self.shared.slots() {
            let loaded = if data.is_configured() {
                self.store.load(&identity, slot)
            } else {
                Default::default()
            };
            *data.cache.get_mut() = loaded;
        }
        log::info!("Joined world {}", identity);
        self.world_identity = Some(identity);
        self.fill_requested = true;
    }

    fn sync_dimension<R: OverlayRenderer + ?Sized>(&mut self, dimension: &DimensionId, renderer: &mut R) {
        if self.shared.current_dimension().as_ref() == Some(dimension) {
            return;
        }
        log::info!("Observer entered {}", dimension);
        self.shared.set_current_dimension(Some(dimension.clone()));
        self.shared.recompute_running_max();
        self.reconciler.clear(renderer);
        self.fill_requested = true;
    }

    fn run_rescan<W, R>(&mut self, world: &W, dimension: &DimensionId, renderer: &mut R)
    where
        W: WorldView + ?Sized,
        R: OverlayRenderer + ?Sized,
    {
        let Some(active) = self.shared.selection().slot() else {
            return;
        };

        if let Some(job) = self.rescan.job() {
            let reason = if job.slot() != active {
                Some("slot no longer active")
            } else if !self.shared.slot(active).is_configured() {
                Some("slot unconfigured")
            } else if job.dimension() != dimension {
                Some("dimension changed")
            } else {
                None
            };
            if let Some(reason) = reason {
                self.rescan.cancel(reason);
            }
        }

        if self.fill_requested {
            let replaceable = self
                .rescan
                .job()
                .map_or(true, |job| job.mode() == RescanMode::Fill);
            if replaceable && self.shared.slot(active).is_configured() {
                let radius = self.visible_radius();
                self.rescan.seed(
                    active,
                    dimension.clone(),
                    self.observer_chunk,
                    radius,
                    RescanMode::Fill,
                );
            }
            self.fill_requested = false;
        }

        let progress = self.rescan.process_batch(
            world,
            self.shared.slot(active),
            self.shared.budget(),
            Some(self.shared.running_max()),
        );

        if let RescanProgress::Completed { slot, .. } = progress {
            self.render(dimension, renderer);
            if let Some(identity) = &self.world_identity {
                let cache = self.shared.slot(slot).cache.get();
                if let Err(error) = self.store.save(identity, slot, &cache) {
                    log::error!("Saving slot {} after rescan failed: {}", slot, error);
                }
            }
        }
    }

    fn render<R: OverlayRenderer + ?Sized>(&mut self, dimension: &DimensionId, renderer: &mut R) {
        let Some(slot) = self.shared.selection().slot() else {
            return;
        };
        let radius = self.visible_radius();
        let center = self.observer_chunk;

        let visible: DimensionCounts = self
            .shared
            .slot(slot)
            .cache
            .get()
            .snapshot(dimension)
            .into_iter()
            .filter(|(key, _)| key.within_radius(&center, radius))
            .collect();

        let stats = self.reconciler.reconcile(
            dimension,
            &visible,
            self.shared.running_max().get(),
            self.config.overlay_opacity,
            renderer,
        );
        log::debug!(
            "Overlays: {} created, {} updated, {} removed",
            stats.created,
            stats.updated,
            stats.removed
        );
    }

    fn set_enabled<R: OverlayRenderer + ?Sized>(&mut self, enabled: bool, renderer: &mut R) {
        if enabled == self.shared.is_enabled() {
            return;
        }
        self.shared.set_enabled(enabled);
        self.config.enabled = enabled;

        if enabled {
            log::info!("Ore heatmap enabled ({})", self.selection());
            self.shared.recompute_running_max();
            self.fill_requested = true;
            self.refresh_overlays(renderer);
        } else {
            log::info!("Ore heatmap disabled");
            self.reconciler.clear(renderer);
            self.rescan.cancel("heatmap disabled");
            self.shared.clear_deferred();
        }
    }

    fn enter_selection<R: OverlayRenderer + ?Sized>(&mut self, next: SlotSelection, renderer: &mut R) {
        if next == self.shared.selection() {
            return;
        }
        self.shared.set_selection(next);
        self.config.active_slot = next.number();
        self.rescan.cancel("slot switched");
        log::info!("Heatmap switched to {}", next);

        match next {
            SlotSelection::Off => {
                self.reconciler.clear(renderer);
                self.shared.clear_deferred();
                self.shared.recompute_running_max();
            }
            SlotSelection::Slot(_) => {
                self.shared.recompute_running_max();
                self.fill_requested = true;
                self.refresh_overlays(renderer);
            }
        }
    }

    fn invalidate_slot(&mut self, slot: SlotIndex) {
        self.shared.slot(slot).cache.get_mut().clear();
        if let Some(identity) = &self.world_identity {
            if let Err(error) = self.store.delete(identity, slot) {
                log::error!("Could not delete slot {} cache file: {}", slot, error);
            }
        }
    }

    fn reset_all<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for (_, data) in self.shared.slots() {
            data.cache.get_mut().clear();
        }
        self.shared.set_current_dimension(None);
        self.shared.running_max().reset_to(1);
        self.reconciler.clear(renderer);
        self.rescan.cancel("world reset");
        self.fill_requested = false;
        self.tick_counter = 0;
        self.save_counter = 0;
    }

    fn save_all_for(&self, identity: &WorldIdentity) {
        for (slot, data) in self.shared.slots() {
            let cache = data.cache.get();
            if let Err(error) = self.store.save(identity, slot, &cache) {
                log::error!("Saving slot {} failed: {}", slot, error);
            }
        }
    }
}
