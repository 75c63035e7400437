use std::collections::HashMap;
use std::sync::Arc;
use quartz_nbt::{NbtCompound, NbtTag};
use crate::block_position::BlockPos;
use crate::identifier::Identifier;
use crate::registry::{BlockRegistry, BlockType};

pub const DEFAULT_MIN_Y: i32 = -64;
pub const DEFAULT_MAX_Y: i32 = 319;

/// A live, mutable block world a schematic can be pasted into.
///
/// Worlds are single-writer: callers must not paste two schematics into the
/// same world concurrently.
pub trait World {
    fn name(&self) -> &Identifier;

    fn get_block(&self, pos: BlockPos) -> BlockType;

    fn is_empty_block(&self, pos: BlockPos) -> bool {
        self.get_block(pos).is_air()
    }

    /// Returns `false` when the world rejects the write.
    fn set_block(&mut self, pos: BlockPos, block: BlockType) -> bool;

    /// Whether the block at `pos` currently owns a block entity.
    fn has_block_entity(&self, pos: BlockPos) -> bool;

    /// Loads `nbt` into the block entity already present at `pos`.
    fn load_block_entity(&mut self, pos: BlockPos, nbt: NbtCompound) -> bool;
}

/// Resolves target worlds by id for the importer.
pub trait WorldHost {
    fn world_mut(&mut self, name: &Identifier) -> Option<&mut dyn World>;

    fn world_names(&self) -> Vec<Identifier>;
}

/// Sparse in-memory world, bounded vertically. Air is never stored.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    name: Identifier,
    registry: Arc<BlockRegistry>,
    min_y: i32,
    max_y: i32,
    blocks: HashMap<BlockPos, BlockType>,
    block_entities: HashMap<BlockPos, NbtCompound>,
}

impl MemoryWorld {
    pub fn new(name: Identifier, registry: Arc<BlockRegistry>) -> Self {
        MemoryWorld::with_height_limits(name, registry, DEFAULT_MIN_Y, DEFAULT_MAX_Y)
    }

    /// `min_y` and `max_y` are both inclusive.
    pub fn with_height_limits(name: Identifier, registry: Arc<BlockRegistry>, min_y: i32, max_y: i32) -> Self {
        MemoryWorld {
            name,
            registry,
            min_y,
            max_y,
            blocks: HashMap::new(),
            block_entities: HashMap::new(),
        }
    }

    pub fn is_within_height(&self, y: i32) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn get_block_entity(&self, pos: BlockPos) -> Option<&NbtCompound> {
        self.block_entities.get(&pos)
    }

    pub fn block_entity_count(&self) -> usize {
        self.block_entities.len()
    }

    /// Number of non-air blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Every non-air block, for comparing world states.
    pub fn non_air_blocks(&self) -> HashMap<BlockPos, BlockType> {
        self.blocks.clone()
    }

    fn new_block_entity(&self, pos: BlockPos, block: BlockType) -> NbtCompound {
        let mut nbt = NbtCompound::new();
        if let Some(name) = self.registry.name(block) {
            nbt.insert("id", NbtTag::String(name.to_string()));
        }
        stamp_position(&mut nbt, pos);
        nbt
    }
}

fn stamp_position(nbt: &mut NbtCompound, pos: BlockPos) {
    nbt.insert("x", NbtTag::Int(pos.x));
    nbt.insert("y", NbtTag::Int(pos.y));
    nbt.insert("z", NbtTag::Int(pos.z));
}

impl World for MemoryWorld {
    fn name(&self) -> &Identifier {
        &self.name
    }

    fn get_block(&self, pos: BlockPos) -> BlockType {
        self.blocks.get(&pos).copied().unwrap_or(BlockType::AIR)
    }

    fn set_block(&mut self, pos: BlockPos, block: BlockType) -> bool {
        if !self.is_within_height(pos.y) {
            return false;
        }

        let previous = if block.is_air() {
            self.blocks.remove(&pos)
        } else {
            self.blocks.insert(pos, block)
        }
        .unwrap_or(BlockType::AIR);

        if previous != block {
            self.block_entities.remove(&pos);
            if self.registry.has_block_entity(block) {
                let nbt = self.new_block_entity(pos, block);
                self.block_entities.insert(pos, nbt);
            }
        }
        true
    }

    fn has_block_entity(&self, pos: BlockPos) -> bool {
        self.block_entities.contains_key(&pos)
    }

    fn load_block_entity(&mut self, pos: BlockPos, nbt: NbtCompound) -> bool {
        let block = self.get_block(pos);
        let id = self.registry.name(block).map(|name| name.to_string());
        let Some(existing) = self.block_entities.get_mut(&pos) else {
            return false;
        };

        for (key, value) in nbt.inner() {
            existing.insert(key.clone(), value.clone());
        }
        if let Some(id) = id {
            existing.insert("id", NbtTag::String(id));
        }
        stamp_position(existing, pos);
        true
    }
}

/// A set of [`MemoryWorld`]s addressed by id.
#[derive(Debug, Clone, Default)]
pub struct WorldSet {
    worlds: HashMap<Identifier, MemoryWorld>,
}

impl WorldSet {
    pub fn new() -> Self {
        WorldSet::default()
    }

    pub fn insert(&mut self, world: MemoryWorld) {
        self.worlds.insert(world.name().clone(), world);
    }

    pub fn get(&self, name: &Identifier) -> Option<&MemoryWorld> {
        self.worlds.get(name)
    }
}

impl WorldHost for WorldSet {
    fn world_mut(&mut self, name: &Identifier) -> Option<&mut dyn World> {
        self.worlds.get_mut(name).map(|world| world as &mut dyn World)
    }

    fn world_names(&self) -> Vec<Identifier> {
        let mut names: Vec<Identifier> = self.worlds.keys().cloned().collect();
        names.sort();
        names
    }
}
