use std::collections::HashMap;
use quartz_nbt::NbtCompound;
use crate::block_position::BlockPos;
use crate::bounding_box::BoundingBox;
use crate::registry::BlockType;

/// A decoded schematic: sparse blocks in schematic-relative coordinates plus
/// the raw block entity compounds read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    pub width: u32,
    pub height: u32,
    pub length: u32,
    /// Applied to the paste area only, never to block lookups.
    pub offset: BlockPos,
    blocks: HashMap<BlockPos, BlockType>,
    block_entities: Vec<NbtCompound>,
}

impl Schematic {
    pub fn new(width: u32, height: u32, length: u32, offset: BlockPos) -> Self {
        Schematic {
            width,
            height,
            length,
            offset,
            blocks: HashMap::new(),
            block_entities: Vec::new(),
        }
    }

    pub fn set_block(&mut self, pos: BlockPos, block: BlockType) {
        self.blocks.insert(pos, block);
    }

    /// `None` means the schematic does not set this position, which is
    /// different from an explicit air block.
    pub fn get_block(&self, pos: BlockPos) -> Option<BlockType> {
        self.blocks.get(&pos).copied()
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockPos, BlockType)> + '_ {
        self.blocks.iter().map(|(pos, block)| (*pos, *block))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn add_block_entity(&mut self, block_entity: NbtCompound) {
        self.block_entities.push(block_entity);
    }

    pub fn block_entities(&self) -> &[NbtCompound] {
        &self.block_entities
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.block_entities.is_empty()
    }

    pub fn get_dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.length)
    }

    pub fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.length as u64
    }

    /// Area a paste at `target` covers, offset included. `None` when the area
    /// leaves the `i32` coordinate range.
    pub fn bounding_box(&self, target: BlockPos) -> Option<BoundingBox> {
        BoundingBox::from_origin_and_size(target.checked_offset(self.offset)?, self.get_dimensions())
    }
}
