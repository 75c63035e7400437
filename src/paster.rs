use std::fmt;
use log::{debug, info, warn};
use quartz_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};
use crate::block_position::BlockPos;
use crate::schematic::Schematic;
use crate::utils::nbt::{get_i32, tag_as_position};
use crate::world::World;

/// How many individual placements and failures get their own log line.
const LOGGED_PLACEMENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteOptions {
    /// When false, blocks are only written into empty (air) positions.
    pub replace_existing: bool,
    pub include_block_entities: bool,
}

impl Default for PasteOptions {
    fn default() -> Self {
        PasteOptions {
            replace_existing: true,
            include_block_entities: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub placed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub block_entities_placed: usize,
}

impl PlacementResult {
    /// A paste that changed nothing is a failure, though not an error.
    pub fn is_success(&self) -> bool {
        self.placed > 0 || self.block_entities_placed > 0
    }

    pub fn total(&self) -> usize {
        self.placed + self.skipped + self.failed
    }
}

impl fmt::Display for PlacementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} placed, {} skipped, {} failed, {} block entities",
            self.placed, self.skipped, self.failed, self.block_entities_placed
        )
    }
}

/// Writes `schematic` into `world` with its origin at `target`.
///
/// Every write goes straight to the world; there is no rollback if the paste
/// stops part way.
pub fn paste_schematic<W: World + ?Sized>(
    world: &mut W,
    schematic: &Schematic,
    target: BlockPos,
    options: PasteOptions,
) -> PlacementResult {
    info!("=== PASTING SCHEMATIC ===");
    info!("Target position: {} in {}", target, world.name());
    info!(
        "Replace existing: {}, include block entities: {}",
        options.replace_existing, options.include_block_entities
    );
    info!(
        "Schematic size: {}x{}x{}, {} blocks to place",
        schematic.width,
        schematic.height,
        schematic.length,
        schematic.block_count()
    );

    let mut result = PlacementResult::default();

    for (relative, block) in schematic.blocks() {
        let Some(world_pos) = target.checked_offset(relative) else {
            result.failed += 1;
            continue;
        };

        if !options.replace_existing && !world.is_empty_block(world_pos) {
            result.skipped += 1;
            continue;
        }

        if world.set_block(world_pos, block) {
            result.placed += 1;
            if result.placed <= LOGGED_PLACEMENTS {
                debug!("Placed block {:?} at {} (relative: {})", block, world_pos, relative);
            }
        } else {
            result.failed += 1;
            if result.failed <= LOGGED_PLACEMENTS {
                warn!("Failed to place block {:?} at {}", block, world_pos);
            }
        }
    }

    if options.include_block_entities {
        info!("Placing {} block entities...", schematic.block_entities().len());
        for nbt in schematic.block_entities() {
            if place_block_entity(world, nbt, target) {
                result.block_entities_placed += 1;
            }
        }
    }

    info!("=== PASTE COMPLETE === {}", result);
    result
}

/// Reads a block entity's schematic-relative position: `Pos` when present,
/// otherwise separate `x`/`y`/`z` fields.
fn block_entity_position(nbt: &NbtCompound) -> Option<BlockPos> {
    if let Some(pos) = nbt.inner().get("Pos") {
        let parsed = tag_as_position(pos);
        if parsed.is_none() {
            warn!("Invalid Pos in block entity: {:?}", pos);
        }
        return parsed;
    }

    match (get_i32(nbt, "x"), get_i32(nbt, "y"), get_i32(nbt, "z")) {
        (Some(x), Some(y), Some(z)) => Some(BlockPos::new(x, y, z)),
        _ => {
            warn!("Block entity missing position data");
            None
        }
    }
}

fn place_block_entity<W: World + ?Sized>(world: &mut W, nbt: &NbtCompound, target: BlockPos) -> bool {
    let Some(relative) = block_entity_position(nbt) else {
        return false;
    };
    let Some(world_pos) = target.checked_offset(relative) else {
        warn!("Block entity at {} overflows the world from {}", relative, target);
        return false;
    };

    if !world.has_block_entity(world_pos) {
        debug!("Block at {} does not support block entities", world_pos);
        return false;
    }

    let mut placed = nbt.clone();
    placed.insert("x", NbtTag::Int(world_pos.x));
    placed.insert("y", NbtTag::Int(world_pos.y));
    placed.insert("z", NbtTag::Int(world_pos.z));
    placed.inner_mut().remove("Pos");

    world.load_block_entity(world_pos, placed)
}
