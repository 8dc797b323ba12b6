//! # Column Generation
//!
//! Deterministic terrain for the demo world: a Perlin height field covered in
//! grass and dirt over stone and deepslate, with ores scattered by a per-column
//! seeded generator. The same seed and key always produce the same column, so a
//! column evicted from memory and reloaded yields identical scan counts.

use std::ops::Range;

use noise::{NoiseFn, Perlin};

use super::ChunkColumn;
use crate::heatmap_state::coordinates::{ChunkKey, CHUNK_DIMENSION};
use crate::voxels::block::block_type::BlockType;

/// Scaling factor applied to block coordinates when sampling the height field.
pub const PERLIN_SCALE_FACTOR: f64 = 0.015;
/// The Y coordinate the height field oscillates around.
pub const SURFACE_BASE: i32 = 40;
/// How far the surface may rise above or fall below `SURFACE_BASE`.
pub const SURFACE_AMPLITUDE: f64 = 12.0;
/// Number of dirt layers between the grass and the stone.
const DIRT_DEPTH: i32 = 3;

/// Where and how often one ore is placed.
struct OreVein {
    ore: BlockType,
    heights: Range<i32>,
    attempts: u32,
}

const ORE_VEINS: [OreVein; 7] = [
    OreVein { ore: BlockType::COAL_ORE, heights: 0..48, attempts: 24 },
    OreVein { ore: BlockType::IRON_ORE, heights: -48..40, attempts: 20 },
    OreVein { ore: BlockType::COPPER_ORE, heights: -16..32, attempts: 14 },
    OreVein { ore: BlockType::LAPIS_ORE, heights: -32..16, attempts: 6 },
    OreVein { ore: BlockType::GOLD_ORE, heights: -56..0, attempts: 6 },
    OreVein { ore: BlockType::REDSTONE_ORE, heights: -60..-16, attempts: 10 },
    OreVein { ore: BlockType::DIAMOND_ORE, heights: -64..-40, attempts: 4 },
];

/// Derives the ore generator seed of one column.
fn column_seed(seed: u64, key: ChunkKey) -> u64 {
    let x = key.x as i64 as u64;
    let z = key.z as i64 as u64;
    seed ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ z.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Samples the surface height at a block column.
fn surface_height(perlin: &Perlin, x: i32, z: i32) -> i32 {
    let sample = perlin.get([x as f64 * PERLIN_SCALE_FACTOR, z as f64 * PERLIN_SCALE_FACTOR]);
    SURFACE_BASE + (sample * SURFACE_AMPLITUDE).round() as i32
}

/// Generates the column at `key`.
///
/// # Arguments
/// * `perlin` - The height field source, seeded with the world seed
/// * `seed` - The world seed, mixed with the key to place ores
/// * `key` - The chunk to generate
/// * `build_height` - The vertical extent of the column
///
/// # Returns
/// A fully populated `ChunkColumn`.
pub fn generate_column(
    perlin: &Perlin,
    seed: u64,
    key: ChunkKey,
    build_height: Range<i32>,
) -> ChunkColumn {
    let height = build_height.len();
    let mut column = ChunkColumn::empty(key, build_height.start, height);
    let top = build_height.end - 1;

    for x in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            let surface = surface_height(perlin, key.min_block_x() + x, key.min_block_z() + z).min(top);
            for y in build_height.start..=surface {
                let block_type = if y == surface {
                    BlockType::GRASS
                } else if y > surface - 1 - DIRT_DEPTH {
                    BlockType::DIRT
                } else if y >= 0 {
                    BlockType::STONE
                } else {
                    BlockType::DEEPSLATE
                };
                column.set_block(x, y, z, block_type);
            }
        }
    }

    let mut rng = fastrand::Rng::with_seed(column_seed(seed, key));
    for vein in &ORE_VEINS {
        let heights = vein.heights.start.max(build_height.start)..vein.heights.end.min(build_height.end);
        if heights.is_empty() {
            continue;
        }
        for _ in 0..vein.attempts {
            let x = rng.i32(0..CHUNK_DIMENSION);
            let z = rng.i32(0..CHUNK_DIMENSION);
            let y = rng.i32(heights.clone());
            let host_rock = column.block_at(x, y, z).map(|block| block.block_type());
            if matches!(host_rock, Some(BlockType::STONE | BlockType::DEEPSLATE)) {
                column.set_block(x, y, z, vein.ore);
            }
        }
    }

    column
}
