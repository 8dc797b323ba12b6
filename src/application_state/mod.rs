//! # Application State Management
//!
//! The headless application loop behind the binary:
//! - A wandering observer that drives chunk streaming
//! - Chunk-load events forwarded to the heatmap's scan trigger
//! - A fixed-rate tick loop that runs the heatmap against a logging renderer
//! - A short script of user commands (slot cycling, reset) so every code path runs

pub mod demo_host;
pub mod observer;
pub mod overlay_log;

use std::num::NonZeroUsize;

use cgmath::Point3;
use log::{info, warn};
use web_time::{Duration, Instant};

use crate::heatmap_state::{
    config::{HeatmapConfig, RESCAN_MARGIN},
    coordinates::ChunkKey,
    scanning::ChunkScanOutcome,
    HeatmapState,
};
use crate::voxels::VoxelWorld;
use demo_host::DemoHost;
use observer::Observer;
use overlay_log::LogOverlayRenderer;

/// Game ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;
/// Columns streamed in around the observer, in addition to the scan radius.
pub const LOAD_MARGIN: u32 = 4;
/// Tick at which the demo cycles to the next configured slot.
const CYCLE_SLOT_AT_TICK: u64 = 400;
/// Tick at which the demo resets the active slot.
const RESET_AT_TICK: u64 = 800;

/// Radius of the disc of columns kept resident around the observer.
///
/// Covers the widest visible disc plus the reset margin, so rescans rarely meet
/// columns that are not loaded.
pub fn load_radius(scan_radius: u32) -> u32 {
    scan_radius * 2 + RESCAN_MARGIN + LOAD_MARGIN
}

/// Everything the running application owns.
pub struct ApplicationState {
    /// The ore heatmap.
    pub heatmap: HeatmapState,
    /// The voxel world being scanned.
    pub world: VoxelWorld,
    /// The moving observer.
    pub observer: Observer,
    /// What the heatmap reads about the host.
    pub host: DemoHost,
    /// Receives overlays.
    pub renderer: LogOverlayRenderer,
    /// Ticks run so far.
    pub tick: u64,
    /// Timestamp of the last tick for pacing.
    pub last_tick: Instant,
}

impl ApplicationState {
    /// Builds the application around a configuration and a world seed.
    ///
    /// A disabled configuration is switched on, since the demo has nothing to show
    /// otherwise.
    pub fn new(config: HeatmapConfig, seed: u64) -> Self {
        let capacity = ChunkKey::disc(ChunkKey::new(0, 0), load_radius(config.scan_radius)).len() * 2;
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        let mut heatmap = HeatmapState::new(config);
        let mut renderer = LogOverlayRenderer::new();
        if !heatmap.is_enabled() {
            info!("Heatmap disabled in config, enabling for the demo");
            heatmap.toggle_enabled(&mut renderer);
        }

        Self {
            heatmap,
            world: VoxelWorld::new(seed, capacity),
            observer: Observer::new(Point3::new(0.0, 64.0, 0.0), seed),
            host: DemoHost::singleplayer(&format!("demo_{}", seed)),
            renderer,
            tick: 0,
            last_tick: Instant::now(),
        }
    }

    /// Runs one game tick: move, stream columns, fire chunk events, tick the heatmap.
    pub fn step(&mut self) {
        self.observer.advance();
        self.host.position = self.observer.position;

        let center = ChunkKey::from_block_position(self.observer.position);
        let loaded = self.world.ensure_loaded(center, load_radius(self.heatmap.config().scan_radius));
        if let Some(dimension) = self.host.dimension.as_ref() {
            let trigger = self.heatmap.scan_trigger();
            let deferred = loaded
                .into_iter()
                .map(|key| {
                    trigger.on_chunk_available(&self.world, &self.host.source, dimension, key)
                })
                .filter(|outcome| *outcome == ChunkScanOutcome::Deferred)
                .count();
            if deferred > 0 {
                log::debug!("{} chunk scans deferred past this tick's budget", deferred);
            }
        }

        self.heatmap.tick(&self.host, &self.world, &mut self.renderer);
        self.tick += 1;
        self.run_script();
    }

    /// The scripted user commands.
    fn run_script(&mut self) {
        match self.tick {
            CYCLE_SLOT_AT_TICK => {
                let selection = self.heatmap.cycle_slot(&mut self.renderer);
                info!("Cycled heatmap to {}", selection);
            }
            RESET_AT_TICK => {
                if let Some(job) = self.heatmap.reset_active_slot(&self.host, &mut self.renderer) {
                    info!(
                        "Reset {} around chunk {} ({} chunks queued)",
                        job.slot(),
                        job.center(),
                        job.pending_len()
                    );
                }
            }
            _ => {}
        }
    }

    /// Runs `ticks` ticks paced at [`TICKS_PER_SECOND`], then shuts the heatmap down.
    pub fn run_for(&mut self, ticks: u64) {
        let tick_length = Duration::from_secs(1) / TICKS_PER_SECOND;
        for _ in 0..ticks {
            let elapsed = self.last_tick.elapsed();
            if elapsed < tick_length {
                std::thread::sleep(tick_length - elapsed);
            } else if elapsed > tick_length * 4 {
                warn!("Tick took {:?}, running behind", elapsed);
            }
            self.last_tick = Instant::now();
            self.step();
        }

        info!(
            "Stopping after {} ticks: {} overlays, running max {}, {} columns resident",
            self.tick,
            self.renderer.len(),
            self.heatmap.running_max(),
            self.world.resident_count()
        );
        self.host.disconnect();
        self.heatmap.tick(&self.host, &self.world, &mut self.renderer);
        self.heatmap.shutdown(&mut self.renderer);
    }
}
