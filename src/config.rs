use std::fmt;
use std::fs;
use std::path::Path;
use log::{error, info};
use serde::{Deserialize, Serialize};
use crate::block_position::BlockPos;
use crate::error::ConfigError;
use crate::paster::PasteOptions;

pub const CONFIG_VERSION: &str = "1.0";

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

/// The JSON document listing every schematic to import and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub imports: Vec<SchematicImport>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            version: default_version(),
            enabled: true,
            imports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicImport {
    pub filename: String,
    /// Namespaced id of the target world, e.g. `minecraft:overworld`.
    pub dimension: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub z: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub replace_existing: bool,
    #[serde(default)]
    pub include_entities: bool,
}

impl SchematicImport {
    pub fn new(filename: impl Into<String>, dimension: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        SchematicImport {
            filename: filename.into(),
            dimension: dimension.into(),
            x,
            y,
            z,
            enabled: true,
            replace_existing: true,
            include_entities: false,
        }
    }

    pub fn target_origin(&self) -> BlockPos {
        BlockPos::new(self.x, self.y, self.z)
    }

    pub fn paste_options(&self) -> PasteOptions {
        PasteOptions {
            replace_existing: self.replace_existing,
            include_block_entities: self.include_entities,
        }
    }
}

impl fmt::Display for SchematicImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} at [{}, {}, {}] (enabled: {})",
            self.filename, self.dimension, self.x, self.y, self.z, self.enabled
        )
    }
}

impl ImportConfig {
    pub fn add_import(&mut self, import: SchematicImport) {
        self.imports.push(import);
    }

    /// The jobs to run, in document order. Empty when the document is disabled.
    pub fn enabled_imports(&self) -> Vec<&SchematicImport> {
        if !self.enabled {
            return Vec::new();
        }
        self.imports.iter().filter(|import| import.enabled).collect()
    }

    /// A starter document with two example jobs, both disabled.
    pub fn example() -> Self {
        let mut config = ImportConfig::default();
        config.add_import(SchematicImport::new("example_house.schem", "minecraft:overworld", 0, 64, 0));
        config.add_import(SchematicImport::new("spawn_platform.schem", "minecraft:the_end", 0, 100, 0));
        for import in &mut config.imports {
            import.enabled = false;
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = ImportConfig::from_json(&json)?;
        info!("Loaded schematic config with {} imports", config.imports.len());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Writes [`ImportConfig::example`] to `path` if nothing is there yet, then loads it.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Creating default schematic config at {}", path.display());
            ImportConfig::example().save(path)?;
        }
        ImportConfig::load(path)
    }

    /// Like [`ImportConfig::load_or_create`], but any failure yields an empty
    /// configuration instead of an error.
    pub fn load_or_default(path: &Path) -> Self {
        ImportConfig::load_or_create(path).unwrap_or_else(|e| {
            error!("Failed to load schematic config {}: {}", path.display(), e);
            ImportConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ImportConfig::from_json(
            r#"{"imports": [{"filename": "house", "dimension": "minecraft:overworld", "y": 70}]}"#,
        )
        .unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.enabled);

        let job = &config.imports[0];
        assert!(job.enabled);
        assert!(job.replace_existing);
        assert!(!job.include_entities);
        assert_eq!(job.target_origin(), BlockPos::new(0, 70, 0));
        assert_eq!(job.paste_options(), PasteOptions::default());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(ImportConfig::from_json("{}").unwrap(), ImportConfig::default());
    }

    #[test]
    fn test_enabled_imports_filters_and_keeps_order() {
        let mut config = ImportConfig::default();
        config.add_import(SchematicImport::new("a.schem", "minecraft:overworld", 0, 0, 0));
        let mut disabled = SchematicImport::new("b.schem", "minecraft:overworld", 0, 0, 0);
        disabled.enabled = false;
        config.add_import(disabled);
        config.add_import(SchematicImport::new("c.schem", "minecraft:overworld", 0, 0, 0));

        let names: Vec<&str> = config.enabled_imports().iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["a.schem", "c.schem"]);

        config.enabled = false;
        assert!(config.enabled_imports().is_empty());
    }

    #[test]
    fn test_wire_names() {
        let mut job = SchematicImport::new("tower.schem", "minecraft:overworld", 1, 2, 3);
        job.include_entities = true;
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["replace_existing"], true);
        assert_eq!(value["include_entities"], true);
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn test_example_jobs_are_disabled() {
        let config = ImportConfig::example();
        assert_eq!(config.imports.len(), 2);
        assert!(config.enabled_imports().is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(ImportConfig::from_json("{not json"), Err(ConfigError::Json(_))));
    }
}
