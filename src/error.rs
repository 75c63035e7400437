use std::io;
use quartz_nbt::io::NbtIoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchematicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Schematic file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to decompress schematic: {0}")]
    Decompression(String),

    #[error("Malformed NBT document: {0}")]
    MalformedDocument(#[from] NbtIoError),

    #[error("Invalid schematic: {0}")]
    InvalidSchematic(String),

    #[error("Unknown schematic format (root keys: {keys:?})")]
    UnknownFormat { keys: Vec<String> },

    #[error("Target dimension not found: {0}")]
    TargetNotFound(String),
}

pub type Result<T> = std::result::Result<T, SchematicError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("empty identifier")]
    Empty,

    #[error("invalid character {1:?} in identifier '{0}'")]
    InvalidCharacter(String, char),

    #[error("unterminated property list in '{0}'")]
    UnterminatedProperties(String),

    #[error("malformed property '{1}' in '{0}'")]
    MalformedProperty(String, String),
}
