use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use crate::config::{ImportConfig, SchematicImport};
use crate::error::{Result, SchematicError};
use crate::identifier::Identifier;
use crate::paster::{paste_schematic, PlacementResult};
use crate::reader::read_schematic_file;
use crate::registry::BlockResolver;
use crate::world::WorldHost;

/// Tried in order when a job names a file without an extension.
pub const SCHEMATIC_EXTENSIONS: [&str; 3] = ["schem", "schematic", "nbt"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Imported(PlacementResult),
    /// The paste ran but changed nothing in the world.
    NothingPlaced(PlacementResult),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub filename: String,
    pub dimension: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<JobOutcome>,
}

impl ImportReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Imported(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs import jobs against schematic files kept in one directory.
pub struct SchematicImporter<R: BlockResolver> {
    schematics_dir: PathBuf,
    resolver: R,
}

impl<R: BlockResolver> SchematicImporter<R> {
    pub fn new(schematics_dir: impl Into<PathBuf>, resolver: R) -> Self {
        SchematicImporter {
            schematics_dir: schematics_dir.into(),
            resolver,
        }
    }

    pub fn schematics_dir(&self) -> &Path {
        &self.schematics_dir
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn find_schematic_file(&self, filename: &str) -> Option<PathBuf> {
        let exact = self.schematics_dir.join(filename);
        if exact.is_file() {
            return Some(exact);
        }

        if filename.contains('.') {
            return None;
        }
        SCHEMATIC_EXTENSIONS
            .iter()
            .map(|ext| self.schematics_dir.join(format!("{}.{}", filename, ext)))
            .find(|candidate| candidate.is_file())
    }

    /// File names in the schematics directory with a known extension, sorted.
    pub fn available_schematics(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.schematics_dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_schematic_extension(path))
            .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }

    pub fn execute_import<H: WorldHost + ?Sized>(&self, job: &SchematicImport, host: &mut H) -> Result<PlacementResult> {
        info!("Target dimension: {}", job.dimension);
        info!("Target position: {}", job.target_origin());

        let Some(path) = self.find_schematic_file(&job.filename) else {
            error!("Checked in directory: {}", self.schematics_dir.display());
            for name in self.available_schematics() {
                info!("  - {}", name);
            }
            return Err(SchematicError::FileNotFound(job.filename.clone()));
        };
        info!("Found schematic file: {}", path.display());

        let dimension = Identifier::parse(&job.dimension)
            .map_err(|_| SchematicError::TargetNotFound(job.dimension.clone()))?;
        let available = host.world_names();
        let Some(world) = host.world_mut(&dimension) else {
            info!("Available dimensions: {:?}", available.iter().map(|n| n.to_string()).collect::<Vec<_>>());
            return Err(SchematicError::TargetNotFound(job.dimension.clone()));
        };

        let schematic = read_schematic_file(&path, &self.resolver)?;
        Ok(paste_schematic(world, &schematic, job.target_origin(), job.paste_options()))
    }

    /// Runs every enabled job in order. A failing job is recorded in the report
    /// and never stops the jobs after it.
    pub fn execute_imports<H: WorldHost + ?Sized>(&self, config: &ImportConfig, host: &mut H) -> ImportReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::new();

        if !config.enabled {
            info!("Schematic imports are disabled in config");
        }
        let jobs = config.enabled_imports();
        if config.enabled && jobs.is_empty() {
            info!("No enabled schematic imports found - nothing to do");
        }
        if !jobs.is_empty() {
            info!("Starting execution of {} schematic imports", jobs.len());
        }

        for (index, job) in jobs.iter().enumerate() {
            let span = tracing::info_span!("import", filename = %job.filename, dimension = %job.dimension);
            let _guard = span.enter();
            info!("Processing import {}/{}: {}", index + 1, jobs.len(), job.filename);

            let status = match self.execute_import(job, host) {
                Ok(result) if result.is_success() => {
                    info!("Imported schematic '{}' to {} at {}: {}", job.filename, job.dimension, job.target_origin(), result);
                    JobStatus::Imported(result)
                }
                Ok(result) => {
                    warn!("Schematic '{}' placed nothing: {}", job.filename, result);
                    JobStatus::NothingPlaced(result)
                }
                Err(e) => {
                    error!("Error executing schematic import '{}': {}", job.filename, e);
                    JobStatus::Failed { error: e.to_string() }
                }
            };
            outcomes.push(JobOutcome {
                filename: job.filename.clone(),
                dimension: job.dimension.clone(),
                status,
            });
        }

        let report = ImportReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!("Schematic imports finished: {} succeeded, {} failed", report.succeeded(), report.failed());
        report
    }
}

fn has_schematic_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            SCHEMATIC_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
        })
}
