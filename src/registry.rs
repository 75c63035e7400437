use std::collections::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::block_state::BlockState;
use crate::identifier::{Identifier, DEFAULT_NAMESPACE};

/// Handle to a block type registered in a [`BlockRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockType(u32);

impl BlockType {
    pub const AIR: BlockType = BlockType(0);

    pub fn id(&self) -> u32 {
        self.0
    }

    pub fn is_air(&self) -> bool {
        *self == BlockType::AIR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    pub name: Identifier,
    pub has_block_entity: bool,
}

/// Maps palette keys and legacy numeric ids to block handles.
///
/// Implementations must never fail: anything unresolvable maps to a
/// designated placeholder handle.
pub trait BlockResolver {
    /// Properties are carried on `state` but the default variant is returned.
    fn resolve_state(&self, state: &BlockState) -> BlockType;

    fn resolve_legacy(&self, id: u16, data: u8) -> BlockType;

    fn empty_block(&self) -> BlockType {
        BlockType::AIR
    }

    fn fallback_block(&self) -> BlockType;

    fn resolve(&self, identifier: &str) -> BlockType {
        match BlockState::parse(identifier) {
            Ok(state) => self.resolve_state(&state),
            Err(e) => {
                warn!("Failed to parse block state '{}': {}", identifier, e);
                self.empty_block()
            }
        }
    }
}

const LEGACY_BLOCKS: [&str; 6] = ["air", "stone", "grass_block", "dirt", "cobblestone", "oak_planks"];

const COMMON_BLOCKS: &[&str] = &[
    "bedrock", "sand", "gravel", "glass", "water", "lava", "oak_log", "spruce_log", "birch_log",
    "oak_leaves", "spruce_planks", "birch_planks", "stone_bricks", "bricks", "smooth_stone",
    "andesite", "diorite", "granite", "deepslate", "obsidian", "iron_block", "gold_block",
    "glowstone", "sea_lantern", "white_wool", "white_concrete", "gray_concrete",
    "black_concrete", "oak_stairs", "oak_slab", "oak_fence", "oak_door", "torch", "ladder",
    "barrier", "light", "redstone_wire", "lever", "stone_button",
];

const BLOCK_ENTITY_BLOCKS: &[&str] = &[
    "chest", "trapped_chest", "barrel", "furnace", "blast_furnace", "smoker", "hopper",
    "dispenser", "dropper", "oak_sign", "oak_wall_sign", "spruce_sign", "lectern",
    "command_block", "spawner", "beacon", "shulker_box", "brewing_stand", "jukebox",
];

fn vanilla_id(path: &str) -> Identifier {
    Identifier {
        namespace: DEFAULT_NAMESPACE.to_string(),
        path: path.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BlockRegistry {
    definitions: Vec<BlockDefinition>,
    by_name: HashMap<Identifier, BlockType>,
    fallback: BlockType,
}

impl BlockRegistry {
    /// A registry holding only air; air is always `BlockType::AIR`.
    pub fn new() -> Self {
        let mut registry = BlockRegistry {
            definitions: Vec::new(),
            by_name: HashMap::new(),
            fallback: BlockType::AIR,
        };
        registry.register_minecraft("air", false);
        registry
    }

    pub fn vanilla() -> Self {
        let mut registry = BlockRegistry::new();
        for name in LEGACY_BLOCKS.iter().skip(1).chain(COMMON_BLOCKS) {
            registry.register_minecraft(name, false);
        }
        for name in BLOCK_ENTITY_BLOCKS {
            registry.register_minecraft(name, true);
        }
        if let Some(stone) = registry.get(&vanilla_id("stone")) {
            registry.fallback = stone;
        }
        registry
    }

    /// Registering an existing name returns the existing handle unchanged.
    pub fn register(&mut self, name: Identifier, has_block_entity: bool) -> BlockType {
        if let Some(existing) = self.by_name.get(&name) {
            return *existing;
        }
        let handle = BlockType(self.definitions.len() as u32);
        self.by_name.insert(name.clone(), handle);
        self.definitions.push(BlockDefinition { name, has_block_entity });
        handle
    }

    fn register_minecraft(&mut self, path: &str, has_block_entity: bool) -> BlockType {
        self.register(vanilla_id(path), has_block_entity)
    }

    pub fn set_fallback(&mut self, block: BlockType) {
        self.fallback = block;
    }

    pub fn get(&self, name: &Identifier) -> Option<BlockType> {
        self.by_name.get(name).copied()
    }

    pub fn definition(&self, block: BlockType) -> Option<&BlockDefinition> {
        self.definitions.get(block.0 as usize)
    }

    pub fn name(&self, block: BlockType) -> Option<&Identifier> {
        self.definition(block).map(|d| &d.name)
    }

    pub fn has_block_entity(&self, block: BlockType) -> bool {
        self.definition(block).map_or(false, |d| d.has_block_entity)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        BlockRegistry::vanilla()
    }
}

impl BlockResolver for BlockRegistry {
    fn resolve_state(&self, state: &BlockState) -> BlockType {
        // TODO: apply `state.properties` once block types carry variants.
        match self.get(&state.name) {
            Some(block) => block,
            None => {
                debug!("Unknown block '{}', using air", state.name);
                BlockType::AIR
            }
        }
    }

    fn resolve_legacy(&self, id: u16, data: u8) -> BlockType {
        let known = LEGACY_BLOCKS
            .get(id as usize)
            .and_then(|path| self.get(&vanilla_id(path)));
        match known {
            Some(block) => block,
            None => {
                warn!("Unknown legacy block ID: {} with data: {}", id, data);
                self.fallback
            }
        }
    }

    fn fallback_block(&self) -> BlockType {
        self.fallback
    }
}
