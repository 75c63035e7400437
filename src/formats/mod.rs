pub mod mcedit;
pub mod sponge;

use log::{error, info};
use quartz_nbt::NbtCompound;
use crate::error::{Result, SchematicError};
use crate::registry::BlockResolver;
use crate::schematic::Schematic;
use crate::utils::nbt::{get_compound, get_i32, key_names};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Sponge v1/v2: block keys at the effective root.
    SpongeV1V2 { version: i32 },
    /// Sponge v3 and later: block keys nested under `Blocks`.
    SpongeV3 { version: i32 },
    /// MCEdit `Materials = "Alpha"` schematics.
    LegacyLinear,
}

impl FormatKind {
    fn sponge(version: i32) -> Self {
        if version >= 3 {
            FormatKind::SpongeV3 { version }
        } else {
            FormatKind::SpongeV1V2 { version }
        }
    }
}

/// The detected format and the compound its decoder reads from.
#[derive(Debug, Clone, Copy)]
pub struct DetectedFormat<'a> {
    pub kind: FormatKind,
    pub root: &'a NbtCompound,
}

pub fn detect_format(root: &NbtCompound) -> Result<DetectedFormat<'_>> {
    if let Some(nested) = get_compound(root, "Schematic") {
        if let Some(version) = get_i32(nested, "Version") {
            info!("Detected Sponge Schematic v{} (nested)", version);
            return Ok(DetectedFormat { kind: FormatKind::sponge(version), root: nested });
        }
    }

    if let Some(version) = get_i32(root, "Version") {
        info!("Detected Sponge Schematic v{}", version);
        return Ok(DetectedFormat { kind: FormatKind::sponge(version), root });
    }

    if let Ok(materials) = root.get::<_, &str>("Materials") {
        if materials == "Alpha" {
            info!("Detected MCEdit schematic");
            return Ok(DetectedFormat { kind: FormatKind::LegacyLinear, root });
        }
        info!("Unsupported materials field: {}", materials);
    }

    let keys = key_names(root);
    error!("Unknown schematic format - NBT keys: {:?}", keys);
    Err(SchematicError::UnknownFormat { keys })
}

pub fn decode<R: BlockResolver + ?Sized>(detected: DetectedFormat<'_>, resolver: &R) -> Result<Schematic> {
    match detected.kind {
        FormatKind::SpongeV1V2 { version } => sponge::read_sponge_v1_v2(detected.root, version, resolver),
        FormatKind::SpongeV3 { version } => sponge::read_sponge_v3(detected.root, version, resolver),
        FormatKind::LegacyLinear => mcedit::read_mcedit(detected.root, resolver),
    }
}
