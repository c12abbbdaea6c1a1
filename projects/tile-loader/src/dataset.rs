use crate::error::{Error, Result};
use crate::pipeline::counter::{count_tiles_per_directory, get_number_of_tiles};
use crate::pipeline::stream::{load_and_tile, TileStream};
use crate::pipeline::types::{Label, LabeledDirectory, TileOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A labeled dataset as described in a JSON file:
///
/// ```json
/// {
///   "directories": [
///     { "path": "cats", "label": 0 },
///     { "path": "dogs", "label": 1 }
///   ],
///   "tiling": { "tile_size": { "width": 64, "height": 64 }, "extension": ".png" }
/// }
/// ```
///
/// Relative directory paths are resolved against the config file's directory.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DatasetConfig {
    pub directories: Vec<LabeledDirectory>,
    pub tiling: TileOptions,
}

impl DatasetConfig {
    pub fn new(directories: Vec<LabeledDirectory>, tiling: TileOptions) -> Self {
        Self {
            directories,
            tiling,
        }
    }

    /// Builds a config from the parallel path/label lists the pipeline takes.
    pub fn from_parallel(
        paths: Vec<PathBuf>,
        labels: Vec<Label>,
        tiling: TileOptions,
    ) -> Result<Self> {
        if paths.len() != labels.len() {
            return Err(Error::MismatchedInput {
                directories: paths.len(),
                labels: labels.len(),
            });
        }
        let directories = paths
            .into_iter()
            .zip(labels)
            .map(|(path, label)| LabeledDirectory { path, label })
            .collect();
        Ok(Self::new(directories, tiling))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: DatasetConfig =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.directories.is_empty() {
            return Err(Error::Config {
                path: path.to_path_buf(),
                reason: "no directories listed".to_string(),
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for dir in &mut config.directories {
            if dir.path.is_relative() {
                dir.path = base.join(&dir.path);
            }
        }

        tracing::info!(
            "Loaded dataset config {:?} with {} directories",
            path,
            config.directories.len()
        );
        Ok(config)
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.directories.iter().map(|d| d.path.as_path()).collect()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.directories.iter().map(|d| d.label).collect()
    }

    pub fn stream(&self) -> Result<TileStream<Label>> {
        load_and_tile(&self.paths(), &self.labels(), &self.tiling)
    }

    pub fn count(&self) -> Result<usize> {
        get_number_of_tiles(&self.paths(), &self.tiling)
    }

    pub fn count_per_directory(&self) -> Result<Vec<usize>> {
        count_tiles_per_directory(&self.paths(), &self.tiling)
    }
}
