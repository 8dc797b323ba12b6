//! # Voxels Module
//!
//! The demo world the heatmap runs against: block types and their tags, chunk
//! columns with deterministic generation, and a bounded-residency world that
//! implements the scanner's world view.

pub mod block;
pub mod chunk;
pub mod world;

pub use world::VoxelWorld;
