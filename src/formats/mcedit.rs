use log::info;
use quartz_nbt::NbtCompound;
use crate::block_position::BlockPos;
use crate::error::{Result, SchematicError};
use crate::registry::BlockResolver;
use crate::schematic::Schematic;
use crate::utils::nbt::{get_byte_array, get_compound_list};

/// MCEdit schematics store one byte per block in x, then z, then y order,
/// with `AddBlocks` nibbles carrying bits 8..12 of the id.
pub fn read_mcedit<R: BlockResolver + ?Sized>(root: &NbtCompound, resolver: &R) -> Result<Schematic> {
    let width = read_short(root, "Width")?;
    let height = read_short(root, "Height")?;
    let length = read_short(root, "Length")?;
    info!("MCEdit schematic dimensions: {}x{}x{}", width, height, length);

    let mut schematic = Schematic::new(
        width.max(0) as u32,
        height.max(0) as u32,
        length.max(0) as u32,
        BlockPos::ZERO,
    );

    let blocks = get_byte_array(root, "Blocks").unwrap_or(&[]);
    let data = get_byte_array(root, "Data").unwrap_or(&[]);
    let add_blocks = get_byte_array(root, "AddBlocks").unwrap_or(&[]);

    if !blocks.is_empty() && (width <= 0 || length <= 0) {
        return Err(SchematicError::InvalidSchematic(format!(
            "{} blocks in a schematic {} wide and {} long",
            blocks.len(),
            width,
            length
        )));
    }
    let width = width as usize;
    let length = length as usize;

    for (index, &low) in blocks.iter().enumerate() {
        let x = index % width;
        let z = (index / width) % length;
        let y = index / (width * length);

        let block_id = low as u8 as u16 | add_nibble(add_blocks, index);
        let block_data = data.get(index).map_or(0, |&d| d as u8);

        let block = resolver.resolve_legacy(block_id, block_data);
        schematic.set_block(BlockPos::new(x as i32, y as i32, z as i32), block);
    }

    for tile_entity in get_compound_list(root, "TileEntities") {
        schematic.add_block_entity(tile_entity);
    }

    info!("Loaded {} blocks from MCEdit schematic", schematic.block_count());
    Ok(schematic)
}

/// MCEdit dimensions are read as signed shorts, unlike Sponge.
fn read_short(root: &NbtCompound, key: &str) -> Result<i16> {
    root.get::<_, i16>(key)
        .map_err(|e| SchematicError::InvalidSchematic(format!("{}: {}", key, e)))
}

/// Even indices use the low nibble, odd indices the high nibble.
fn add_nibble(add_blocks: &[i8], index: usize) -> u16 {
    let Some(&packed) = add_blocks.get(index >> 1) else {
        return 0;
    };
    let packed = packed as u8 as u16;
    if index & 1 == 0 {
        (packed & 0x0F) << 8
    } else {
        (packed & 0xF0) << 4
    }
}
