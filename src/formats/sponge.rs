use std::collections::HashMap;
use log::{debug, info, warn};
use quartz_nbt::{NbtCompound, NbtTag};
use crate::block_position::BlockPos;
use crate::error::{Result, SchematicError};
use crate::registry::{BlockResolver, BlockType};
use crate::schematic::Schematic;
use crate::utils::nbt::{get_byte_array, get_compound, get_compound_list, tag_as_integral};

const MAX_VARINT_BYTES: usize = 5;

/// Sponge v1 and v2: palette, block data and `TileEntities` sit next to the
/// dimensions.
pub fn read_sponge_v1_v2<R: BlockResolver + ?Sized>(
    root: &NbtCompound,
    version: i32,
    resolver: &R,
) -> Result<Schematic> {
    let mut schematic = read_header(root)?;
    debug!("Reading Sponge v{} block data from root", version);
    read_blocks(&mut schematic, root, resolver);

    for block_entity in get_compound_list(root, "TileEntities") {
        schematic.add_block_entity(block_entity);
    }
    Ok(schematic)
}

/// Sponge v3: block keys and `BlockEntities` are nested under `Blocks`.
pub fn read_sponge_v3<R: BlockResolver + ?Sized>(
    root: &NbtCompound,
    version: i32,
    resolver: &R,
) -> Result<Schematic> {
    let mut schematic = read_header(root)?;
    debug!("Reading Sponge v{} block data from Blocks", version);

    let empty = NbtCompound::new();
    let blocks = match get_compound(root, "Blocks") {
        Some(blocks) => blocks,
        None => {
            warn!("Sponge v{} schematic has no Blocks compound", version);
            &empty
        }
    };
    read_blocks(&mut schematic, blocks, resolver);

    // Falls back to a root-level `BlockEntities` list.
    let block_entity_source = if blocks.contains_key("BlockEntities") { blocks } else { root };
    for block_entity in get_compound_list(block_entity_source, "BlockEntities") {
        schematic.add_block_entity(block_entity);
    }
    Ok(schematic)
}

fn read_header(root: &NbtCompound) -> Result<Schematic> {
    let width = read_unsigned_short(root, "Width")?;
    let height = read_unsigned_short(root, "Height")?;
    let length = read_unsigned_short(root, "Length")?;
    info!("Schematic dimensions: {}x{}x{}", width, height, length);

    let offset = match root.inner().get("Offset") {
        Some(NbtTag::IntArray(offset)) if offset.len() >= 3 => BlockPos::new(offset[0], offset[1], offset[2]),
        _ => BlockPos::ZERO,
    };

    Ok(Schematic::new(width, height, length, offset))
}

/// Dimensions are stored as signed shorts but mean unsigned values.
fn read_unsigned_short(root: &NbtCompound, key: &str) -> Result<u32> {
    let value = root
        .get::<_, i16>(key)
        .map_err(|e| SchematicError::InvalidSchematic(format!("{}: {}", key, e)))?;
    Ok(value as u16 as u32)
}

fn parse_palette<R: BlockResolver + ?Sized>(blocks: &NbtCompound, resolver: &R) -> HashMap<i32, BlockType> {
    let Ok(palette_compound) = blocks.get::<_, &NbtCompound>("Palette") else {
        warn!("Schematic has no Palette, no blocks will be set");
        return HashMap::new();
    };

    let mut palette = HashMap::new();
    for (key, value) in palette_compound.inner() {
        match tag_as_integral(value) {
            Some(index) => {
                let block = resolver.resolve(key);
                if palette.len() < 10 {
                    debug!("Palette entry {}: {} -> {:?}", index, key, block);
                }
                palette.insert(index as i32, block);
            }
            None => warn!("Ignoring palette entry '{}' with non-integer index", key),
        }
    }
    info!("Loaded palette with {} entries", palette.len());
    palette
}

fn read_blocks<R: BlockResolver + ?Sized>(schematic: &mut Schematic, blocks: &NbtCompound, resolver: &R) {
    let palette = parse_palette(blocks, resolver);

    let data = get_byte_array(blocks, "Data")
        .or_else(|| get_byte_array(blocks, "BlockData"))
        .unwrap_or(&[]);
    let raw: Vec<u8> = data.iter().map(|&b| b as u8).collect();

    let (width, height, length) = schematic.get_dimensions();
    let mut reader = VarIntReader::new(&raw);

    'decode: for y in 0..height {
        for z in 0..length {
            for x in 0..width {
                let Some(index) = reader.next_varint() else {
                    break 'decode;
                };
                if let Some(block) = palette.get(&(index as i32)) {
                    schematic.set_block(BlockPos::new(x as i32, y as i32, z as i32), *block);
                }
            }
        }
    }

    if reader.remaining() > 0 {
        debug!("{} trailing bytes after block data", reader.remaining());
    }
    info!("Loaded {} blocks from schematic", schematic.block_count());
}

/// Reads unsigned LEB128 values: 7 data bits per byte, low bits first, high
/// bit set while more bytes follow, at most five bytes per value.
pub struct VarIntReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> VarIntReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        VarIntReader { data, position: 0 }
    }

    /// `None` once the data is exhausted. A value cut off by the end of the
    /// data is returned with the bits read so far.
    pub fn next_varint(&mut self) -> Option<u32> {
        if self.position >= self.data.len() {
            return None;
        }
        let mut result: u32 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let Some(&byte) = self.data.get(self.position) else {
                break;
            };
            self.position += 1;
            result |= ((byte & 0b0111_1111) as u32) << (7 * i);
            if byte & 0b1000_0000 == 0 {
                break;
            }
        }
        Some(result)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl Iterator for VarIntReader<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.next_varint()
    }
}

pub fn encode_varint(value: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut val = value;
    loop {
        let mut byte = (val & 0b0111_1111) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0b1000_0000;
        }
        bytes.push(byte);
        if val == 0 {
            break;
        }
    }
    bytes
}

/// Encodes palette indices as a `BlockData`/`Data` byte array tag.
pub fn encode_block_data(indices: &[u32]) -> NbtTag {
    let bytes: Vec<i8> = indices
        .iter()
        .flat_map(|&index| encode_varint(index))
        .map(|b| b as i8)
        .collect();
    NbtTag::ByteArray(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartz_nbt::NbtList;
    use crate::registry::BlockRegistry;

    fn palette(entries: &[(&str, i32)]) -> NbtCompound {
        let mut compound = NbtCompound::new();
        for (name, index) in entries {
            compound.insert(*name, NbtTag::Int(*index));
        }
        compound
    }

    fn v2_root(width: i16, height: i16, length: i16, indices: &[u32]) -> NbtCompound {
        let mut root = NbtCompound::new();
        root.insert("Version", NbtTag::Int(2));
        root.insert("Width", NbtTag::Short(width));
        root.insert("Height", NbtTag::Short(height));
        root.insert("Length", NbtTag::Short(length));
        root.insert("Palette", palette(&[("minecraft:air", 0), ("minecraft:stone", 1), ("minecraft:dirt", 2)]));
        root.insert("BlockData", encode_block_data(indices));
        root
    }

    #[test]
    fn test_varint_examples() {
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(VarIntReader::new(&[0xAC, 0x02]).next_varint(), Some(300));
        assert_eq!(VarIntReader::new(&[0x00]).next_varint(), Some(0));
    }

    #[test]
    fn test_varint_stops_after_five_bytes() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x8F, 0x01];
        let mut reader = VarIntReader::new(&data);
        assert_eq!(reader.next_varint(), Some(u32::MAX));
        assert_eq!(reader.next_varint(), Some(1));
        assert_eq!(reader.next_varint(), None);
    }

    #[test]
    fn test_varint_truncated_value_keeps_partial_bits() {
        let reader = VarIntReader::new(&[0x05, 0x81]);
        assert_eq!(reader.collect::<Vec<_>>(), vec![5, 1]);
        assert_eq!(VarIntReader::new(&[]).next_varint(), None);
    }

    #[test]
    fn test_truncated_last_index_is_placed() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(2, 1, 1, &[]);
        root.insert("BlockData", NbtTag::ByteArray(vec![0x00, 0x81u8 as i8]));
        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.get_block(BlockPos::new(0, 0, 0)), Some(BlockType::AIR));
        assert_eq!(schematic.get_block(BlockPos::new(1, 0, 0)), Some(registry.resolve("minecraft:stone")));
    }

    #[test]
    fn test_full_grid_in_y_z_x_order() {
        let registry = BlockRegistry::vanilla();
        let (w, h, l) = (3u32, 2u32, 4u32);
        // Index encodes position so ordering mistakes show up as wrong blocks.
        let indices: Vec<u32> = (0..w * h * l).map(|i| i % 3).collect();
        let root = v2_root(w as i16, h as i16, l as i16, &indices);

        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.block_count(), (w * h * l) as usize);

        let ids = [
            registry.resolve("minecraft:air"),
            registry.resolve("minecraft:stone"),
            registry.resolve("minecraft:dirt"),
        ];
        let mut i = 0;
        for y in 0..h {
            for z in 0..l {
                for x in 0..w {
                    let pos = BlockPos::new(x as i32, y as i32, z as i32);
                    assert_eq!(schematic.get_block(pos), Some(ids[(i % 3) as usize]), "at {}", pos);
                    i += 1;
                }
            }
        }
    }

    #[test]
    fn test_short_data_leaves_rest_unset() {
        let registry = BlockRegistry::vanilla();
        let root = v2_root(2, 2, 2, &[1, 1, 1]);
        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.block_count(), 3);
        assert_eq!(schematic.get_block(BlockPos::new(0, 0, 1)), Some(registry.resolve("minecraft:stone")));
        assert_eq!(schematic.get_block(BlockPos::new(1, 0, 1)), None);
    }

    #[test]
    fn test_unknown_palette_index_is_skipped() {
        let registry = BlockRegistry::vanilla();
        let root = v2_root(3, 1, 1, &[1, 42, 2]);
        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.block_count(), 2);
        assert_eq!(schematic.get_block(BlockPos::new(1, 0, 0)), None);
    }

    #[test]
    fn test_multibyte_palette_index() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(2, 1, 1, &[300, 0]);
        root.insert("Palette", palette(&[("minecraft:air", 0), ("minecraft:glass", 300)]));
        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.get_block(BlockPos::new(0, 0, 0)), Some(registry.resolve("minecraft:glass")));
        assert_eq!(schematic.get_block(BlockPos::new(1, 0, 0)), Some(BlockType::AIR));
    }

    #[test]
    fn test_dimensions_are_unsigned() {
        let registry = BlockRegistry::vanilla();
        let width: u16 = 40000;
        let indices = vec![1u32; width as usize];
        let root = v2_root(width as i16, 1, 1, &indices);

        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.width, 40000);
        assert_eq!(schematic.block_count(), 40000);
        assert!(schematic.get_block(BlockPos::new(39999, 0, 0)).is_some());
    }

    #[test]
    fn test_offset_and_tile_entities() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(1, 1, 1, &[1]);
        root.insert("Offset", NbtTag::IntArray(vec![-3, 0, 7]));
        let mut chest = NbtCompound::new();
        chest.insert("Id", NbtTag::String("minecraft:chest".to_string()));
        chest.insert("Pos", NbtTag::IntArray(vec![0, 0, 0]));
        root.insert("TileEntities", NbtTag::List(NbtList::from(vec![NbtTag::Compound(chest.clone())])));

        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.offset, BlockPos::new(-3, 0, 7));
        assert_eq!(schematic.block_entities(), &[chest]);
    }

    #[test]
    fn test_data_key_takes_precedence() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(1, 1, 1, &[1]);
        root.insert("Data", encode_block_data(&[2]));
        let schematic = read_sponge_v1_v2(&root, 1, &registry).unwrap();
        assert_eq!(schematic.get_block(BlockPos::ZERO), Some(registry.resolve("minecraft:dirt")));
    }

    #[test]
    fn test_missing_dimension_is_invalid() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(1, 1, 1, &[1]);
        root.inner_mut().remove("Height");
        assert!(matches!(
            read_sponge_v1_v2(&root, 2, &registry),
            Err(SchematicError::InvalidSchematic(_))
        ));
    }

    #[test]
    fn test_v3_nested_blocks() {
        let registry = BlockRegistry::vanilla();
        let mut blocks = NbtCompound::new();
        blocks.insert("Palette", palette(&[("minecraft:barrel[facing=up]", 0), ("minecraft:stone", 1)]));
        blocks.insert("Data", encode_block_data(&[0, 1]));
        let mut barrel = NbtCompound::new();
        barrel.insert("Id", NbtTag::String("minecraft:barrel".to_string()));
        barrel.insert("Pos", NbtTag::IntArray(vec![0, 0, 0]));
        blocks.insert("BlockEntities", NbtTag::List(NbtList::from(vec![NbtTag::Compound(barrel.clone())])));

        let mut root = NbtCompound::new();
        root.insert("Version", NbtTag::Int(3));
        root.insert("Width", NbtTag::Short(2));
        root.insert("Height", NbtTag::Short(1));
        root.insert("Length", NbtTag::Short(1));
        root.insert("Blocks", NbtTag::Compound(blocks));
        // Root-level keys are not read for v3.
        root.insert("TileEntities", NbtTag::List(NbtList::from(vec![NbtTag::Compound(NbtCompound::new())])));

        let schematic = read_sponge_v3(&root, 3, &registry).unwrap();
        assert_eq!(schematic.get_block(BlockPos::new(0, 0, 0)), Some(registry.resolve("minecraft:barrel")));
        assert_eq!(schematic.get_block(BlockPos::new(1, 0, 0)), Some(registry.resolve("minecraft:stone")));
        assert_eq!(schematic.block_entities(), &[barrel]);
    }

    #[test]
    fn test_v3_without_blocks_is_empty() {
        let registry = BlockRegistry::vanilla();
        let mut root = NbtCompound::new();
        root.insert("Width", NbtTag::Short(2));
        root.insert("Height", NbtTag::Short(2));
        root.insert("Length", NbtTag::Short(2));
        let schematic = read_sponge_v3(&root, 3, &registry).unwrap();
        assert!(schematic.is_empty());
        assert_eq!(schematic.get_dimensions(), (2, 2, 2));
    }

    #[test]
    fn test_v3_block_entities_fall_back_to_root() {
        let registry = BlockRegistry::vanilla();
        let mut blocks = NbtCompound::new();
        blocks.insert("Palette", palette(&[("minecraft:chest", 0)]));
        blocks.insert("Data", encode_block_data(&[0]));
        let mut chest = NbtCompound::new();
        chest.insert("Id", NbtTag::String("minecraft:chest".to_string()));
        chest.insert("Pos", NbtTag::IntArray(vec![0, 0, 0]));

        let mut root = NbtCompound::new();
        root.insert("Width", NbtTag::Short(1));
        root.insert("Height", NbtTag::Short(1));
        root.insert("Length", NbtTag::Short(1));
        root.insert("Blocks", NbtTag::Compound(blocks.clone()));
        root.insert("BlockEntities", NbtTag::List(NbtList::from(vec![NbtTag::Compound(chest.clone())])));

        let schematic = read_sponge_v3(&root, 3, &registry).unwrap();
        assert_eq!(schematic.block_entities(), &[chest]);

        // Once `Blocks` carries its own list, the root one is ignored.
        blocks.insert("BlockEntities", NbtTag::List(NbtList::new()));
        root.insert("Blocks", NbtTag::Compound(blocks));
        let schematic = read_sponge_v3(&root, 3, &registry).unwrap();
        assert!(schematic.block_entities().is_empty());
    }

    #[test]
    fn test_extreme_offset_has_no_paste_area() {
        let registry = BlockRegistry::vanilla();
        let mut root = v2_root(1, 1, 1, &[1]);
        root.insert("Offset", NbtTag::IntArray(vec![i32::MAX, 0, 0]));
        let schematic = read_sponge_v1_v2(&root, 2, &registry).unwrap();
        assert_eq!(schematic.offset, BlockPos::new(i32::MAX, 0, 0));
        assert_eq!(schematic.bounding_box(BlockPos::new(1, 0, 0)), None);
    }
}
