//! # Coordinates
//!
//! Chunk and dimension addressing shared by every heatmap component.
//!
//! A chunk is a 16x16 column spanning the full build height. Its canonical string
//! form `"x,z"` is used both as an in-memory map key and as the key inside the
//! persisted cache file.

use std::{fmt, str::FromStr};

use cgmath::Point3;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The horizontal width and depth of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;

/// Identifies one chunk column by its horizontal chunk coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Chunk coordinate along the X axis.
    pub x: i32,
    /// Chunk coordinate along the Z axis.
    pub z: i32,
}

/// Error produced when a `"x,z"` chunk key string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chunk key {input:?}: expected \"<x>,<z>\"")]
pub struct ParseChunkKeyError {
    input: String,
}

impl ChunkKey {
    /// Creates a chunk key from chunk coordinates.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the chunk containing the given block position.
    ///
    /// Negative coordinates round towards negative infinity, so block `-1` lives in
    /// chunk `-1` rather than chunk `0`.
    pub fn from_block_position(position: Point3<f64>) -> Self {
        Self {
            x: (position.x / CHUNK_DIMENSION as f64).floor() as i32,
            z: (position.z / CHUNK_DIMENSION as f64).floor() as i32,
        }
    }

    /// Returns the chunk containing the given integer block coordinates.
    pub fn from_block_coordinates(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_DIMENSION),
            z: z.div_euclid(CHUNK_DIMENSION),
        }
    }

    /// Lowest block X coordinate inside this chunk.
    pub fn min_block_x(&self) -> i32 {
        self.x * CHUNK_DIMENSION
    }

    /// Lowest block Z coordinate inside this chunk.
    pub fn min_block_z(&self) -> i32 {
        self.z * CHUNK_DIMENSION
    }

    /// Highest block X coordinate inside this chunk.
    pub fn max_block_x(&self) -> i32 {
        self.min_block_x() + CHUNK_DIMENSION - 1
    }

    /// Highest block Z coordinate inside this chunk.
    pub fn max_block_z(&self) -> i32 {
        self.min_block_z() + CHUNK_DIMENSION - 1
    }

    /// Squared euclidean distance between two chunks, in chunk units.
    pub fn distance_squared(&self, other: &ChunkKey) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Returns `true` if this chunk lies inside the circular disc of `radius` chunks
    /// around `center`. The boundary is inclusive.
    pub fn within_radius(&self, center: &ChunkKey, radius: u32) -> bool {
        let radius = radius as i64;
        self.distance_squared(center) <= radius * radius
    }

    /// Enumerates every chunk inside the circular disc of `radius` chunks around
    /// `center`, nearest first. Ties keep a stable row-major order.
    pub fn disc(center: ChunkKey, radius: u32) -> Vec<ChunkKey> {
        let r = radius as i32;
        let mut keys = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
        for dz in -r..=r {
            for dx in -r..=r {
                let key = ChunkKey::new(center.x + dx, center.z + dz);
                if key.within_radius(&center, radius) {
                    keys.push(key);
                }
            }
        }
        keys.sort_by_key(|key| key.distance_squared(&center));
        keys
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

impl FromStr for ChunkKey {
    type Err = ParseChunkKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseChunkKeyError {
            input: s.to_string(),
        };
        let (x, z) = s.split_once(',').ok_or_else(error)?;
        let x = x.trim().parse().map_err(|_| error())?;
        let z = z.trim().parse().map_err(|_| error())?;
        Ok(ChunkKey { x, z })
    }
}

impl Serialize for ChunkKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChunkKeyVisitor;

        impl de::Visitor<'_> for ChunkKeyVisitor {
            type Value = ChunkKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a chunk key string such as \"3,-7\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ChunkKey, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ChunkKeyVisitor)
    }
}

/// Identifies a dimension (for example `minecraft:overworld`).
///
/// Dimensions are opaque to the heatmap; they only partition the density cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(String);

impl DimensionId {
    /// Creates a dimension id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of this dimension id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
