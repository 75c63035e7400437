//! Reads Sponge and MCEdit schematic files and pastes them into block worlds.

pub mod block_position;
pub mod block_state;
pub mod bounding_box;
pub mod config;
pub mod error;
pub mod formats;
pub mod identifier;
pub mod importer;
pub mod logging;
pub mod paster;
pub mod reader;
pub mod registry;
pub mod schematic;
pub mod utils;
pub mod world;

// Public re-exports
pub use block_position::BlockPos;
pub use block_state::BlockState;
pub use bounding_box::BoundingBox;
pub use config::{ImportConfig, SchematicImport};
pub use error::{ConfigError, IdentifierError, Result, SchematicError};
pub use formats::{detect_format, DetectedFormat, FormatKind};
pub use identifier::Identifier;
pub use importer::{ImportReport, JobOutcome, JobStatus, SchematicImporter};
pub use paster::{paste_schematic, PasteOptions, PlacementResult};
pub use reader::{read_schematic, read_schematic_file};
pub use registry::{BlockRegistry, BlockResolver, BlockType};
pub use schematic::Schematic;
pub use world::{MemoryWorld, World, WorldHost, WorldSet};
