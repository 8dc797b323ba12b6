//! # Overlay Reconciler
//!
//! Keeps the external renderer's set of chunk overlays in step with a density
//! snapshot. The reconciler only ever calls [`OverlayRenderer::show`] and
//! [`OverlayRenderer::remove`]; what it last sent is remembered in its own records.

use std::{collections::HashMap, fmt};

use cgmath::Point3;
use thiserror::Error;

use super::{
    cache::DimensionCounts,
    color::{self, Rgb},
    coordinates::{ChunkKey, DimensionId},
};

/// Height at which chunk footprints are drawn.
pub const OVERLAY_Y: i32 = 64;
/// Outline width of every overlay.
pub const STROKE_WIDTH: f32 = 1.0;

/// A renderer-side failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("overlay {id} failed: {reason}")]
pub struct OverlayError {
    /// The overlay being shown or removed.
    pub id: OverlayId,
    /// Renderer-supplied description.
    pub reason: String,
}

/// Stable renderer handle for one chunk's overlay.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverlayId(String);

impl OverlayId {
    /// The overlay id of a chunk.
    pub fn for_chunk(key: ChunkKey) -> Self {
        Self(format!("ore_heatmap_{}_{}", key.x, key.z))
    }

    /// String form handed to the renderer.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an overlay is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayShape {
    /// Dimension the overlay belongs to.
    pub dimension: DimensionId,
    /// Footprint corners, counter-clockwise seen from above.
    pub polygon: [Point3<i32>; 4],
}

impl OverlayShape {
    /// The footprint of `key` at [`OVERLAY_Y`], spanning the chunk's full block extent.
    pub fn chunk_footprint(dimension: &DimensionId, key: ChunkKey) -> Self {
        let min_x = key.min_block_x();
        let min_z = key.min_block_z();
        let max_x = key.max_block_x() + 1;
        let max_z = key.max_block_z() + 1;
        Self {
            dimension: dimension.clone(),
            polygon: [
                Point3::new(min_x, OVERLAY_Y, max_z),
                Point3::new(max_x, OVERLAY_Y, max_z),
                Point3::new(max_x, OVERLAY_Y, min_z),
                Point3::new(min_x, OVERLAY_Y, min_z),
            ],
        }
    }
}

/// How an overlay is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    /// Fill color.
    pub fill_color: Rgb,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f32,
    /// Outline color.
    pub stroke_color: Rgb,
    /// Outline opacity in `[0, 1]`.
    pub stroke_opacity: f32,
    /// Outline width.
    pub stroke_width: f32,
    /// Hover label.
    pub label: String,
}

impl OverlayStyle {
    /// Styles a chunk holding `count` matches against the session's running max.
    pub fn for_count(count: u32, running_max: u32, max_opacity: f32) -> Self {
        let fill_color = color::heat_color(count, running_max);
        let fill_opacity = color::fill_opacity(count, running_max, max_opacity);
        Self {
            fill_color,
            fill_opacity,
            stroke_color: fill_color,
            stroke_opacity: color::stroke_opacity(fill_opacity),
            stroke_width: STROKE_WIDTH,
            label: format!("Ores: {} blocks", count),
        }
    }
}

/// The drawing collaborator.
pub trait OverlayRenderer {
    /// Creates the overlay `id`, or replaces its shape and style if it already exists.
    fn show(
        &mut self,
        id: &OverlayId,
        shape: &OverlayShape,
        style: &OverlayStyle,
    ) -> Result<(), OverlayError>;

    /// Retracts the overlay `id`.
    fn remove(&mut self, id: &OverlayId) -> Result<(), OverlayError>;
}

/// What was last handed to the renderer for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayRecord {
    /// Renderer handle.
    pub id: OverlayId,
    /// Last shape sent.
    pub shape: OverlayShape,
    /// Last style sent.
    pub style: OverlayStyle,
}

/// Side effects of one reconcile pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Overlays shown for the first time.
    pub created: usize,
    /// Existing overlays re-sent with fresh shape and style.
    pub updated: usize,
    /// Overlays retracted.
    pub removed: usize,
}

/// Diffs density snapshots against the overlays already rendered.
#[derive(Debug, Default)]
pub struct OverlayReconciler {
    records: HashMap<ChunkKey, OverlayRecord>,
}

impl OverlayReconciler {
    /// Creates a reconciler with nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the rendered overlays in line with `snapshot`.
    ///
    /// Chunks with a zero count have no overlay. Rendered chunks missing from the
    /// snapshot are retracted. Renderer failures are logged; a failed create leaves no
    /// record so the next pass tries again, a failed remove still forgets the record.
    ///
    /// # Arguments
    /// * `dimension` - The dimension the snapshot belongs to
    /// * `snapshot` - A detached copy of the visible chunk counts
    /// * `running_max` - Normalizer for color and opacity
    /// * `max_opacity` - Opacity of the densest chunk
    /// * `renderer` - The drawing collaborator
    pub fn reconcile<R: OverlayRenderer + ?Sized>(
        &mut self,
        dimension: &DimensionId,
        snapshot: &DimensionCounts,
        running_max: u32,
        max_opacity: f32,
        renderer: &mut R,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for (&key, &count) in snapshot {
            if count == 0 {
                if self.retract(key, renderer) {
                    stats.removed += 1;
                }
                continue;
            }

            let id = OverlayId::for_chunk(key);
            let shape = OverlayShape::chunk_footprint(dimension, key);
            let style = OverlayStyle::for_count(count, running_max, max_opacity);
            let existed = self.records.contains_key(&key);

            match renderer.show(&id, &shape, &style) {
                Ok(()) => {
                    if existed {
                        stats.updated += 1;
                    } else {
                        stats.created += 1;
                    }
                    self.records.insert(key, OverlayRecord { id, shape, style });
                }
                Err(error) if existed => {
                    log::debug!("Keeping previous overlay for chunk {}: {}", key, error);
                }
                Err(error) => {
                    log::error!("Could not create overlay for chunk {}: {}", key, error);
                }
            }
        }

        let stale: Vec<ChunkKey> = self
            .records
            .keys()
            .filter(|key| !snapshot.contains_key(key))
            .copied()
            .collect();
        for key in stale {
            if self.retract(key, renderer) {
                stats.removed += 1;
            }
        }

        stats
    }

    /// Retracts every rendered overlay. Returns how many were retracted.
    pub fn clear<R: OverlayRenderer + ?Sized>(&mut self, renderer: &mut R) -> usize {
        let keys: Vec<ChunkKey> = self.records.keys().copied().collect();
        keys.into_iter()
            .filter(|key| self.retract(*key, renderer))
            .count()
    }

    /// Number of overlays currently rendered.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record last sent for `key`.
    pub fn get(&self, key: ChunkKey) -> Option<&OverlayRecord> {
        self.records.get(&key)
    }

    fn retract<R: OverlayRenderer + ?Sized>(&mut self, key: ChunkKey, renderer: &mut R) -> bool {
        let Some(record) = self.records.remove(&key) else {
            return false;
        };
        if let Err(error) = renderer.remove(&record.id) {
            log::debug!("Dropping overlay record for chunk {}: {}", key, error);
        }
        true
    }
}
