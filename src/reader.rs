use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use flate2::read::{GzDecoder, ZlibDecoder};
use log::{debug, info};
use quartz_nbt::io::Flavor;
use quartz_nbt::NbtCompound;
use crate::error::{Result, SchematicError};
use crate::formats::{decode, detect_format};
use crate::registry::BlockResolver;
use crate::schematic::Schematic;
use crate::utils::nbt::key_names;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZLIB_DEFLATE: u8 = 8;
const ZLIB_MAX_WINDOW: u8 = 7;
const COMPOUND_TAG: u8 = 0x0a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zlib,
    None,
}

pub fn detect_compression(data: &[u8]) -> Option<Compression> {
    match data {
        [a, b, ..] if [*a, *b] == GZIP_MAGIC => Some(Compression::Gzip),
        [cmf, flg, ..]
            if *cmf & 0x0f == ZLIB_DEFLATE
                && *cmf >> 4 <= ZLIB_MAX_WINDOW
                && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 =>
        {
            Some(Compression::Zlib)
        }
        [COMPOUND_TAG, ..] => Some(Compression::None),
        _ => None,
    }
}

/// Strips the compression layer and parses the root compound.
pub fn read_nbt_document(data: &[u8]) -> Result<NbtCompound> {
    let compression = detect_compression(data).ok_or_else(|| {
        SchematicError::Decompression("data is neither gzip, zlib nor raw NBT".to_string())
    })?;
    debug!("Schematic compression: {:?}", compression);

    let mut decompressed = Vec::new();
    let source: &[u8] = match compression {
        Compression::Gzip => {
            GzDecoder::new(data)
                .read_to_end(&mut decompressed)
                .map_err(|e| SchematicError::Decompression(e.to_string()))?;
            &decompressed
        }
        Compression::Zlib => {
            ZlibDecoder::new(data)
                .read_to_end(&mut decompressed)
                .map_err(|e| SchematicError::Decompression(e.to_string()))?;
            &decompressed
        }
        Compression::None => data,
    };

    let (root, _) = quartz_nbt::io::read_nbt(&mut Cursor::new(source), Flavor::Uncompressed)?;
    Ok(root)
}

pub fn read_schematic<R: BlockResolver + ?Sized>(data: &[u8], resolver: &R) -> Result<Schematic> {
    let root = read_nbt_document(data)?;
    info!("NBT data loaded successfully");
    info!("Root NBT keys: {:?}", key_names(&root));

    let detected = detect_format(&root)?;
    let schematic = decode(detected, resolver)?;
    info!(
        "Schematic loaded: {}x{}x{} with {} blocks and {} block entities",
        schematic.width,
        schematic.height,
        schematic.length,
        schematic.block_count(),
        schematic.block_entities().len()
    );
    Ok(schematic)
}

pub fn read_schematic_file<R: BlockResolver + ?Sized>(path: &Path, resolver: &R) -> Result<Schematic> {
    if !path.is_file() {
        return Err(SchematicError::FileNotFound(path.display().to_string()));
    }
    let data = fs::read(path)?;
    info!("Reading schematic {} ({} bytes)", path.display(), data.len());
    read_schematic(&data, resolver)
}
