//! # Host Environment
//!
//! What the heatmap needs to know about the game hosting it: which world is loaded,
//! which dimension the observer is in and where the observer stands.

use std::fmt;

use cgmath::Point3;

use super::coordinates::DimensionId;

/// Where the currently loaded world comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldSource {
    /// No world is loaded (title screen, disconnected).
    None,
    /// A local save, identified by its level folder name.
    Singleplayer {
        /// The save folder name.
        level_name: String,
    },
    /// A remote server, identified by its address.
    Multiplayer {
        /// The server address as entered by the player.
        address: String,
    },
}

/// Read-only view of the host the heatmap runs inside.
pub trait HostEnvironment {
    /// The source of the loaded world.
    fn world_source(&self) -> WorldSource;

    /// The observer's current dimension, or `None` while no world is loaded.
    fn dimension(&self) -> Option<DimensionId>;

    /// The observer's position in block coordinates.
    fn observer_position(&self) -> Point3<f64>;

    /// The minimap zoom level, when a minimap is open.
    fn minimap_zoom(&self) -> Option<u32> {
        None
    }
}

/// Namespaces the on-disk cache so unrelated worlds never share data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorldIdentity(String);

impl WorldIdentity {
    /// Wraps an already-sanitized identity string.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Derives the identity of `source`: `local_<level>` or `server_<address>`, with
    /// every character outside `[A-Za-z0-9]` replaced by `_`. No world has no identity.
    pub fn from_source(source: &WorldSource) -> Option<Self> {
        let raw = match source {
            WorldSource::None => return None,
            WorldSource::Singleplayer { level_name } => format!("local_{level_name}"),
            WorldSource::Multiplayer { address } => format!("server_{address}"),
        };
        let sanitized = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>();
        Some(Self(sanitized))
    }

    /// The identity as a path-safe string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
