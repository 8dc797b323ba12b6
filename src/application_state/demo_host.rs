//! # Demo Host
//!
//! The `HostEnvironment` of the headless application: a fixed single-player world
//! whose observer position is fed in every tick.

use cgmath::Point3;

use crate::heatmap_state::{
    coordinates::DimensionId,
    host::{HostEnvironment, WorldSource},
};

/// Host state the application loop updates before each heatmap tick.
#[derive(Clone, Debug)]
pub struct DemoHost {
    /// The loaded world.
    pub source: WorldSource,
    /// The observer's dimension, `None` while no world is loaded.
    pub dimension: Option<DimensionId>,
    /// The observer's position.
    pub position: Point3<f64>,
    /// Minimap zoom, when a minimap is open.
    pub minimap_zoom: Option<u32>,
}

impl DemoHost {
    /// A single-player world named `level_name`, observer in the overworld.
    pub fn singleplayer(level_name: &str) -> Self {
        Self {
            source: WorldSource::Singleplayer {
                level_name: level_name.to_string(),
            },
            dimension: Some(DimensionId::new("minecraft:overworld")),
            position: Point3::new(0.0, 64.0, 0.0),
            minimap_zoom: None,
        }
    }

    /// Leaves the world.
    pub fn disconnect(&mut self) {
        self.source = WorldSource::None;
        self.dimension = None;
    }
}

impl HostEnvironment for DemoHost {
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
        self.minimap_zoom
    }
}
