use quartz_nbt::{NbtCompound, NbtTag};
use crate::block_position::BlockPos;

/// Reads any integral tag (byte, short, int or long) as `i64`.
pub fn get_integral(compound: &NbtCompound, key: &str) -> Option<i64> {
    tag_as_integral(compound.inner().get(key)?)
}

pub fn tag_as_integral(tag: &NbtTag) -> Option<i64> {
    match tag {
        NbtTag::Byte(v) => Some(*v as i64),
        NbtTag::Short(v) => Some(*v as i64),
        NbtTag::Int(v) => Some(*v as i64),
        NbtTag::Long(v) => Some(*v),
        _ => None,
    }
}

/// Integral tag truncated to `i32`, the width the schematic formats use.
pub fn get_i32(compound: &NbtCompound, key: &str) -> Option<i32> {
    get_integral(compound, key).map(|v| v as i32)
}

pub fn get_byte_array<'a>(compound: &'a NbtCompound, key: &str) -> Option<&'a [i8]> {
    match compound.inner().get(key)? {
        NbtTag::ByteArray(bytes) => Some(bytes.as_slice()),
        _ => None,
    }
}

pub fn get_compound<'a>(compound: &'a NbtCompound, key: &str) -> Option<&'a NbtCompound> {
    match compound.inner().get(key)? {
        NbtTag::Compound(inner) => Some(inner),
        _ => None,
    }
}

/// Compound elements of the list under `key`; other elements are skipped.
pub fn get_compound_list(compound: &NbtCompound, key: &str) -> Vec<NbtCompound> {
    match compound.inner().get(key) {
        Some(NbtTag::List(list)) => list
            .iter()
            .filter_map(|tag| match tag {
                NbtTag::Compound(inner) => Some(inner.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// A position stored either as an int array or as a list of integral tags,
/// using the first three elements.
pub fn tag_as_position(tag: &NbtTag) -> Option<BlockPos> {
    match tag {
        NbtTag::IntArray(arr) if arr.len() >= 3 => Some(BlockPos::new(arr[0], arr[1], arr[2])),
        NbtTag::List(list) if list.len() >= 3 => {
            let mut coords = list.iter().take(3).map(tag_as_integral);
            let x = coords.next()??;
            let y = coords.next()??;
            let z = coords.next()??;
            Some(BlockPos::new(x as i32, y as i32, z as i32))
        }
        _ => None,
    }
}

pub fn key_names(compound: &NbtCompound) -> Vec<String> {
    let mut keys: Vec<String> = compound.inner().keys().cloned().collect();
    keys.sort();
    keys
}
