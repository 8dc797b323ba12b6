#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::Path;

use cgmath::Point3;
use ore_heatmap::heatmap_state::{
    config::HeatmapConfig,
    coordinates::{ChunkKey, DimensionId},
    host::{HostEnvironment, WorldSource},
    overlay::{OverlayError, OverlayId, OverlayRenderer, OverlayShape, OverlayStyle},
    scanning::WorldView,
    slot::SlotIndex,
    tracking::{ResourceId, TagLookup, TagRef},
    HeatmapState,
};

pub const OVERWORLD: &str = "minecraft:overworld";
pub const NETHER: &str = "minecraft:the_nether";

pub fn overworld() -> DimensionId {
    DimensionId::new(OVERWORLD)
}

pub fn slot(number: u8) -> SlotIndex {
    SlotIndex::new(number).unwrap()
}

pub fn id(s: &str) -> ResourceId {
    s.parse().unwrap()
}

/// A hand-built world: explicit residency, sparse blocks and a tag table.
#[derive(Default)]
pub struct MockWorld {
    pub resident: HashSet<ChunkKey>,
    pub blocks: HashMap<Point3<i32>, ResourceId>,
    pub tags: HashMap<String, HashSet<ResourceId>>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, key: ChunkKey) -> &mut Self {
        self.resident.insert(key);
        self
    }

    pub fn unload(&mut self, key: ChunkKey) -> &mut Self {
        self.resident.remove(&key);
        self
    }

    /// Places `count` blocks of `resource` in distinct positions of `key`.
    pub fn fill(&mut self, key: ChunkKey, resource: &str, count: i32) -> &mut Self {
        for i in 0..count {
            let position = Point3::new(key.min_block_x() + i % 16, i / 16, key.min_block_z());
            self.blocks.insert(position, id(resource));
        }
        self
    }

    /// Places `count` blocks of `resource` one layer above whatever `fill` used.
    pub fn fill_layer(&mut self, key: ChunkKey, y: i32, resource: &str, count: i32) -> &mut Self {
        for i in 0..count {
            let position = Point3::new(key.min_block_x() + i % 16, y, key.min_block_z() + i / 16);
            self.blocks.insert(position, id(resource));
        }
        self
    }

    pub fn tag(&mut self, tag: &str, members: &[&str]) -> &mut Self {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .extend(members.iter().map(|member| id(member)));
        self
    }
}

impl TagLookup for MockWorld {
    fn has_tag(&self, resource: &ResourceId, tag: &TagRef) -> bool {
        self.tags
            .get(&tag.id().to_string())
            .is_some_and(|members| members.contains(resource))
    }
}

impl WorldView for MockWorld {
    fn is_chunk_resident(&self, key: ChunkKey) -> bool {
        self.resident.contains(&key)
    }

    fn resource_at(&self, position: Point3<i32>) -> Option<&ResourceId> {
        if !self.is_chunk_resident(ChunkKey::from_block_coordinates(position.x, position.z)) {
            return None;
        }
        self.blocks.get(&position)
    }

    fn build_height(&self) -> Range<i32> {
        -16..32
    }
}

/// Records every call and keeps the live overlay set.
#[derive(Default)]
pub struct RecordingRenderer {
    pub live: HashMap<OverlayId, (OverlayShape, OverlayStyle)>,
    pub shows: usize,
    pub removes: usize,
    pub failing: HashSet<OverlayId>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style_of(&self, key: ChunkKey) -> Option<&OverlayStyle> {
        self.live.get(&OverlayId::for_chunk(key)).map(|(_, style)| style)
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn show(
        &mut self,
        id: &OverlayId,
        shape: &OverlayShape,
        style: &OverlayStyle,
    ) -> Result<(), OverlayError> {
        self.shows += 1;
        if self.failing.contains(id) {
            return Err(OverlayError {
                id: id.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.live.insert(id.clone(), (shape.clone(), style.clone()));
        Ok(())
    }

    fn remove(&mut self, id: &OverlayId) -> Result<(), OverlayError> {
        self.removes += 1;
        self.live.remove(id);
        Ok(())
    }
}

/// A host whose every answer is set by the test.
#[derive(Clone, Debug)]
pub struct ScriptedHost {
    pub source: WorldSource,
    pub dimension: Option<DimensionId>,
    pub position: Point3<f64>,
    pub zoom: Option<u32>,
}

impl ScriptedHost {
    pub fn singleplayer(level_name: &str) -> Self {
        Self {
            source: WorldSource::Singleplayer {
                level_name: level_name.to_string(),
            },
            dimension: Some(overworld()),
            position: Point3::new(8.0, 64.0, 8.0),
            zoom: None,
        }
    }

    pub fn logged_out() -> Self {
        Self {
            source: WorldSource::None,
            dimension: None,
            position: Point3::new(0.0, 64.0, 0.0),
            zoom: None,
        }
    }
}

impl HostEnvironment for ScriptedHost {
    fn world_source(&self) -> WorldSource {
        self.source.clone()
    }

    fn dimension(&self) -> Option<DimensionId> {
        self.dimension.clone()
    }

    fn observer_position(&self) -> Point3<f64> {
        self.position
    }

    fn minimap_zoom(&self) -> Option<u32> {
        self.zoom
    }
}

/// Enabled, slot 1 active, shortest update interval, cache under `dir`.
pub fn config_in(dir: &Path) -> HeatmapConfig {
    HeatmapConfig {
        enabled: true,
        update_interval_ticks: 20,
        cache_dir: dir.to_path_buf(),
        ..HeatmapConfig::default()
    }
}

/// Sets one slot's entries in a config.
pub fn with_slot(mut config: HeatmapConfig, number: u8, entries: &[&str]) -> HeatmapConfig {
    config.slots[slot(number).index()] = entries.iter().map(|entry| entry.to_string()).collect();
    config
}

/// Runs ticks until the next overlay update has happened.
pub fn run_update<W: WorldView>(
    heatmap: &mut HeatmapState,
    host: &ScriptedHost,
    world: &W,
    renderer: &mut RecordingRenderer,
) {
    for _ in 0..heatmap.config().update_interval_ticks {
        heatmap.tick(host, world, renderer);
    }
}
