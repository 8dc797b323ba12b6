//! # Block Type Module
//!
//! This module defines the different types of blocks in the demo world, their
//! namespaced resource names and the category tags they belong to.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types the demo world generates.
///
/// The `FromPrimitive` derive allows conversion from the compact `BlockTypeSize`
/// stored in chunks back to the rich enum type.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR,
    /// Bulk terrain above y = 0.
    STONE,
    /// Bulk terrain below y = 0.
    DEEPSLATE,
    /// The layers just under the surface.
    DIRT,
    /// The surface block.
    GRASS,
    /// Common, shallow ore.
    COAL_ORE,
    /// Common ore at every depth.
    IRON_ORE,
    /// Mid-depth ore.
    COPPER_ORE,
    /// Deep, uncommon ore.
    GOLD_ORE,
    /// Deep ore.
    REDSTONE_ORE,
    /// Uncommon mid-depth ore.
    LAPIS_ORE,
    /// Rare, deepest ore.
    DIAMOND_ORE,
}

/// Every block type in discriminant order.
pub const ALL_BLOCK_TYPES: [BlockType; 12] = [
    BlockType::AIR,
    BlockType::STONE,
    BlockType::DEEPSLATE,
    BlockType::DIRT,
    BlockType::GRASS,
    BlockType::COAL_ORE,
    BlockType::IRON_ORE,
    BlockType::COPPER_ORE,
    BlockType::GOLD_ORE,
    BlockType::REDSTONE_ORE,
    BlockType::LAPIS_ORE,
    BlockType::DIAMOND_ORE,
];

const ORES: &[&str] = &[
    "minecraft:coal_ore",
    "minecraft:iron_ore",
    "minecraft:copper_ore",
    "minecraft:gold_ore",
    "minecraft:redstone_ore",
    "minecraft:lapis_ore",
    "minecraft:diamond_ore",
];
const COAL_ORES: &[&str] = &["minecraft:coal_ore"];
const IRON_ORES: &[&str] = &["minecraft:iron_ore"];
const COPPER_ORES: &[&str] = &["minecraft:copper_ore"];
const GOLD_ORES: &[&str] = &["minecraft:gold_ore"];
const REDSTONE_ORES: &[&str] = &["minecraft:redstone_ore"];
const LAPIS_ORES: &[&str] = &["minecraft:lapis_ore"];
const DIAMOND_ORES: &[&str] = &["minecraft:diamond_ore"];
const STONES: &[&str] = &["minecraft:stone", "minecraft:deepslate"];

/// Category tags of the demo world, keyed by tag id (without the `#`).
///
/// Generated at compile time; lookups are a single perfect hash.
pub static BLOCK_TAGS: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "c:ores" => ORES,
    "c:ores/coal" => COAL_ORES,
    "c:ores/iron" => IRON_ORES,
    "c:ores/copper" => COPPER_ORES,
    "c:ores/gold" => GOLD_ORES,
    "c:ores/redstone" => REDSTONE_ORES,
    "c:ores/lapis" => LAPIS_ORES,
    "c:ores/diamond" => DIAMOND_ORES,
    "c:stones" => STONES,
};

impl BlockType {
    /// Converts a stored `BlockTypeSize` back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not name a block type
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(btype)
    }

    /// The namespaced resource name of this block, e.g. `minecraft:coal_ore`.
    pub fn resource_name(&self) -> &'static str {
        match self {
            BlockType::AIR => "minecraft:air",
            BlockType::STONE => "minecraft:stone",
            BlockType::DEEPSLATE => "minecraft:deepslate",
            BlockType::DIRT => "minecraft:dirt",
            BlockType::GRASS => "minecraft:grass_block",
            BlockType::COAL_ORE => "minecraft:coal_ore",
            BlockType::IRON_ORE => "minecraft:iron_ore",
            BlockType::COPPER_ORE => "minecraft:copper_ore",
            BlockType::GOLD_ORE => "minecraft:gold_ore",
            BlockType::REDSTONE_ORE => "minecraft:redstone_ore",
            BlockType::LAPIS_ORE => "minecraft:lapis_ore",
            BlockType::DIAMOND_ORE => "minecraft:diamond_ore",
        }
    }

    /// Whether this block is empty space.
    pub fn is_air(&self) -> bool {
        matches!(self, BlockType::AIR)
    }
}

/// Returns `true` if the block named `resource` carries the tag `tag`.
pub fn has_tag(resource: &str, tag: &str) -> bool {
    BLOCK_TAGS
        .get(tag)
        .is_some_and(|members| members.contains(&resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_round_trip() {
        for (index, block_type) in ALL_BLOCK_TYPES.iter().enumerate() {
            assert_eq!(BlockType::from_int(index as BlockTypeSize), Some(*block_type));
        }
        assert_eq!(BlockType::from_int(ALL_BLOCK_TYPES.len() as BlockTypeSize), None);
    }

    #[test]
    fn ores_carry_their_tags() {
        assert!(has_tag("minecraft:diamond_ore", "c:ores"));
        assert!(has_tag("minecraft:diamond_ore", "c:ores/diamond"));
        assert!(!has_tag("minecraft:diamond_ore", "c:ores/coal"));
        assert!(!has_tag("minecraft:stone", "c:ores"));
        assert!(!has_tag("minecraft:stone", "c:unknown"));
    }
}
