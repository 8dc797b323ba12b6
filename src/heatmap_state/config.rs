//! # Heatmap Configuration
//!
//! Read-only inputs supplied by the configuration layer. Loaded from JSON, with every
//! field defaulted so partial files work.

use std::{
    env, fs, io,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    slot::{SlotIndex, SlotSelection, SLOT_COUNT},
    tracking::{validate_entry, TrackingError},
};

/// Environment variable naming a JSON config file to load instead of the defaults.
pub const CONFIG_PATH_ENV: &str = "ORE_HEATMAP_CONFIG";

/// Chunks added around the visible radius when seeding a reset rescan.
pub const RESCAN_MARGIN: u32 = 2;

/// Allowed `scan_radius` values, in chunks.
pub const SCAN_RADIUS_RANGE: RangeInclusive<u32> = 1..=8;
/// Allowed `update_interval_ticks` values.
pub const UPDATE_INTERVAL_RANGE: RangeInclusive<u32> = 20..=200;
/// Allowed `overlay_opacity` values.
pub const OVERLAY_OPACITY_RANGE: RangeInclusive<f32> = 0.1..=1.0;
/// Allowed `rescan_batch_size` values.
pub const RESCAN_BATCH_RANGE: RangeInclusive<usize> = 1..=64;
/// Allowed `scans_per_tick` values.
pub const SCANS_PER_TICK_RANGE: RangeInclusive<u32> = 1..=256;

/// What a rescan batch does with a chunk that is not resident yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Drop the chunk from the job for good.
    Drop,
    /// Put the chunk back at the end of the queue, giving up after `max_attempts`
    /// scan attempts.
    Requeue {
        /// Scan attempts before the chunk is dropped. At least 1.
        max_attempts: u32,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Requeue { max_attempts: 8 }
    }
}

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read heatmap config from {path:?}: {source}")]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid JSON for [`HeatmapConfig`].
    #[error("failed to parse heatmap config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A numeric field is outside its allowed range.
    #[error("{field} = {value} is outside {range}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// The allowed range.
        range: String,
    },
    /// A slot entry does not follow the tracked-entry grammar.
    #[error("slot {slot} entry {entry:?} is invalid: {source}")]
    InvalidEntry {
        /// The slot holding the entry.
        slot: SlotIndex,
        /// The raw entry.
        entry: String,
        /// Why it was rejected.
        #[source]
        source: TrackingError,
    },
}

/// All configuration the heatmap reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Global on/off switch.
    pub enabled: bool,
    /// Base scan and render radius in chunks.
    pub scan_radius: u32,
    /// Ticks between overlay refreshes.
    pub update_interval_ticks: u32,
    /// Opacity of the densest chunk.
    pub overlay_opacity: f32,
    /// Chunks a rescan job attempts per tick.
    pub rescan_batch_size: usize,
    /// Upper bound on chunk scans per tick across every path.
    pub scans_per_tick: u32,
    /// How rescans treat chunks that are not loaded yet.
    pub rescan_retry: RetryPolicy,
    /// The rendered slot; 0 means off.
    pub active_slot: u8,
    /// Root directory for cache files.
    pub cache_dir: PathBuf,
    /// Tracked-resource entries of slots 1 to 5.
    pub slots: [Vec<String>; SLOT_COUNT],
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scan_radius: 3,
            update_interval_ticks: 40,
            overlay_opacity: 0.6,
            rescan_batch_size: 4,
            scans_per_tick: 16,
            rescan_retry: RetryPolicy::default(),
            active_slot: 1,
            cache_dir: PathBuf::from("ore_heatmap_cache"),
            slots: [
                vec!["#c:ores".to_string()],
                vec!["#c:ores/coal".to_string()],
                vec!["#c:ores/iron".to_string()],
                vec!["#c:ores/gold".to_string()],
                vec!["#c:ores/diamond".to_string()],
            ],
        }
    }
}

fn check_range<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Debug,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: format!("{value:?}"),
            range: format!("{range:?}"),
        })
    }
}

fn clamp_field<T>(field: &'static str, value: &mut T, range: &RangeInclusive<T>) -> bool
where
    T: PartialOrd + Copy + std::fmt::Debug,
{
    if range.contains(value) {
        return false;
    }
    let clamped = if *value > *range.end() {
        *range.end()
    } else {
        *range.start()
    };
    log::warn!("{} = {:?} is outside {:?}, using {:?}", field, value, range, clamped);
    *value = clamped;
    true
}

impl HeatmapConfig {
    /// Parses a config from JSON text. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], falling back to the defaults when the
    /// variable is unset or the file is unusable.
    pub fn load_from_env() -> Self {
        let Some(path) = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) else {
            log::info!("{} not set, using default heatmap config", CONFIG_PATH_ENV);
            return Self::default();
        };

        match Self::from_file(&path).and_then(|config| config.validate().map(|()| config)) {
            Ok(config) => {
                log::info!("Loaded heatmap config from {}", path.display());
                config
            }
            Err(error) => {
                log::warn!("Ignoring heatmap config {}: {}", path.display(), error);
                Self::default()
            }
        }
    }

    /// Checks every range and every slot entry.
    ///
    /// Blank entries are allowed; they are what an emptied editor field saves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("scan_radius", self.scan_radius, &SCAN_RADIUS_RANGE)?;
        check_range(
            "update_interval_ticks",
            self.update_interval_ticks,
            &UPDATE_INTERVAL_RANGE,
        )?;
        check_range("overlay_opacity", self.overlay_opacity, &OVERLAY_OPACITY_RANGE)?;
        check_range("rescan_batch_size", self.rescan_batch_size, &RESCAN_BATCH_RANGE)?;
        check_range("scans_per_tick", self.scans_per_tick, &SCANS_PER_TICK_RANGE)?;
        check_range("active_slot", self.active_slot, &(0..=SLOT_COUNT as u8))?;
        if let RetryPolicy::Requeue { max_attempts } = self.rescan_retry {
            check_range("rescan_retry.max_attempts", max_attempts, &(1..=u32::MAX))?;
        }

        for slot in SlotIndex::all() {
            for entry in self.slot_entries(slot) {
                if entry.trim().is_empty() {
                    continue;
                }
                validate_entry(entry).map_err(|source| ConfigError::InvalidEntry {
                    slot,
                    entry: entry.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Pulls every numeric field back into its allowed range, logging each change.
    ///
    /// Slot entries are left alone; invalid ones are dropped when the tracked sets are
    /// built. Returns `true` if anything changed.
    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = false;
        changed |= clamp_field("scan_radius", &mut self.scan_radius, &SCAN_RADIUS_RANGE);
        changed |= clamp_field(
            "update_interval_ticks",
            &mut self.update_interval_ticks,
            &UPDATE_INTERVAL_RANGE,
        );
        changed |= clamp_field("overlay_opacity", &mut self.overlay_opacity, &OVERLAY_OPACITY_RANGE);
        changed |= clamp_field("rescan_batch_size", &mut self.rescan_batch_size, &RESCAN_BATCH_RANGE);
        changed |= clamp_field("scans_per_tick", &mut self.scans_per_tick, &SCANS_PER_TICK_RANGE);
        if self.active_slot > SLOT_COUNT as u8 {
            log::warn!("active_slot = {} does not exist, starting OFF", self.active_slot);
            self.active_slot = 0;
            changed = true;
        }
        if let RetryPolicy::Requeue { max_attempts } = &mut self.rescan_retry {
            changed |= clamp_field("rescan_retry.max_attempts", max_attempts, &(1..=u32::MAX));
        }
        changed
    }

    /// The raw entries of one slot.
    pub fn slot_entries(&self, slot: SlotIndex) -> &[String] {
        &self.slots[slot.index()]
    }

    /// The persisted active slot as a selection.
    pub fn active_selection(&self) -> SlotSelection {
        SlotSelection::from_number(self.active_slot)
    }

    /// Radius, in chunks, of the area that is rendered and kept filled.
    ///
    /// With a minimap open the radius follows its zoom:
    /// `min(max(2, (128 >> zoom) / 16 + 1), scan_radius * 2)`.
    pub fn visible_radius(&self, minimap_zoom: Option<u32>) -> u32 {
        match minimap_zoom {
            Some(zoom) => {
                let view_blocks = 128u32.checked_shr(zoom).unwrap_or(0);
                (view_blocks / 16 + 1).max(2).min(self.scan_radius.saturating_mul(2))
            }
            None => self.scan_radius,
        }
    }

    /// Radius of a reset rescan: the visible radius plus [`RESCAN_MARGIN`].
    pub fn rescan_radius(&self, minimap_zoom: Option<u32>) -> u32 {
        self.visible_radius(minimap_zoom).saturating_add(RESCAN_MARGIN)
    }

    /// Update ticks between saves, so that saves happen roughly every 600 game ticks.
    pub fn save_every_updates(&self) -> u32 {
        (600 / self.update_interval_ticks.max(1)).max(1)
    }
}
