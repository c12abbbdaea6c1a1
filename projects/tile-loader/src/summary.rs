// Dataset reports
//
// Serializable results of a counting pass or a full tiling pass, printed as
// JSON by the command line tool.

use crate::pipeline::types::{Label, Tile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Tile count of one labeled directory
#[derive(Serialize, Debug, Clone)]
pub struct DirectoryCount {
    pub path: PathBuf,
    pub label: Label,
    pub tiles: usize,
}

/// Result of counting tiles without extracting them
#[derive(Serialize, Debug, Clone)]
pub struct CountReport {
    pub total_tiles: usize,
    pub directories: Vec<DirectoryCount>,
}

/// Statistics gathered while draining a tile stream
#[derive(Serialize, Debug, Clone, Default)]
pub struct DatasetSummary {
    pub total_tiles: usize,
    /// Keyed by the label's display form
    pub tiles_per_label: BTreeMap<String, usize>,
    /// `[height, width, channels]` of the first tile
    pub tile_shape: Option<[usize; 3]>,
    pub min_value: Option<f32>,
    pub max_value: Option<f32>,
    pub mean_value: Option<f64>,
    #[serde(skip)]
    value_sum: f64,
    #[serde(skip)]
    value_count: usize,
}

impl DatasetSummary {
    pub fn record(&mut self, tile: &Tile, label: &Label) {
        self.total_tiles += 1;
        *self.tiles_per_label.entry(label.to_string()).or_insert(0) += 1;

        if self.tile_shape.is_none() {
            let shape = tile.shape();
            self.tile_shape = Some([shape[0], shape[1], shape[2]]);
        }

        for &v in tile.iter() {
            self.min_value = Some(self.min_value.map_or(v, |m| m.min(v)));
            self.max_value = Some(self.max_value.map_or(v, |m| m.max(v)));
            self.value_sum += f64::from(v);
        }
        self.value_count += tile.len();
        if self.value_count > 0 {
            self.mean_value = Some(self.value_sum / self.value_count as f64);
        }
    }
}
