//! Job description shared by all tiles of one terrain model.

use std::path::PathBuf;

use config::constants::{DEFAULT_MAX_CELLS_FOR_MEMORY_ONLY, DEFAULT_SPILL_CHUNK_TRIANGLES};
use serde::{Deserialize, Serialize};
use terrain_mesh::{Centering, OutputFormat};

use crate::error::TileError;

/// Everything needed to turn one full raster into a set of tiles.
///
/// Per-tile values (pixel size, scale, tile numbers, spill path) are
/// derived from this by [`crate::split_tiles`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainJob {
    /// Base of every output file name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Model width of one tile.
    pub tile_width_mm: f64,
    /// Real-world size of one raster cell in metres.
    pub cell_size_m: f64,
    #[serde(default = "one")]
    pub ntiles_x: u32,
    #[serde(default = "one")]
    pub ntiles_y: u32,
    #[serde(default = "default_z_scale")]
    pub z_scale: f64,
    #[serde(default = "default_base_thickness")]
    pub base_thickness_mm: f64,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default)]
    pub centering: Centering,
    #[serde(default)]
    pub no_bottom: bool,
    #[serde(default = "yes")]
    pub no_normals: bool,
    #[serde(default = "yes")]
    pub smooth_borders: bool,
    #[serde(default)]
    pub clean_diags: bool,
    /// Keep the dilated ring around holes instead of cutting it off.
    #[serde(default)]
    pub dirty_triangles: bool,
    /// Two-triangle bottom for tiles without holes.
    #[serde(default = "yes")]
    pub flat_bottom: bool,

    /// Full-raster cell count above which tiles spill to disk.
    #[serde(default = "default_max_cells")]
    pub max_cells_for_memory_only: usize,
    /// Directory for spill files; `None` keeps every tile in memory.
    #[serde(default)]
    pub spill_dir: Option<PathBuf>,
    #[serde(default = "default_chunk")]
    pub spill_chunk_triangles: usize,

    /// Build only this tile (`[x, y]`, 1-based).
    #[serde(default)]
    pub only: Option<[u32; 2]>,
    /// Worker threads; `None` or 0 uses every core.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_name() -> String {
    "terrain".to_string()
}

fn default_z_scale() -> f64 {
    1.0
}

fn default_base_thickness() -> f64 {
    1.0
}

fn default_format() -> OutputFormat {
    OutputFormat::BinaryStl
}

fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS_FOR_MEMORY_ONLY
}

fn default_chunk() -> usize {
    DEFAULT_SPILL_CHUNK_TRIANGLES
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

impl TerrainJob {
    /// A single-tile job with default flags.
    pub fn new(name: impl Into<String>, tile_width_mm: f64, cell_size_m: f64) -> Self {
        Self {
            name: name.into(),
            tile_width_mm,
            cell_size_m,
            ntiles_x: 1,
            ntiles_y: 1,
            z_scale: default_z_scale(),
            base_thickness_mm: default_base_thickness(),
            format: default_format(),
            centering: Centering::default(),
            no_bottom: false,
            no_normals: true,
            smooth_borders: true,
            clean_diags: false,
            dirty_triangles: false,
            flat_bottom: true,
            max_cells_for_memory_only: DEFAULT_MAX_CELLS_FOR_MEMORY_ONLY,
            spill_dir: None,
            spill_chunk_triangles: DEFAULT_SPILL_CHUNK_TRIANGLES,
            only: None,
            threads: None,
        }
    }

    /// Parses a job from JSON.
    pub fn from_json(json: &str) -> Result<Self, TileError> {
        serde_json::from_str(json).map_err(|e| TileError::config(e.to_string()))
    }

    /// Checks the job-level values; per-tile values are checked by the
    /// mesh core.
    pub fn validate(&self) -> Result<(), TileError> {
        if !(self.tile_width_mm.is_finite() && self.tile_width_mm > 0.0) {
            return Err(TileError::config(format!(
                "tile_width_mm must be positive, got {}",
                self.tile_width_mm
            )));
        }
        if !(self.cell_size_m.is_finite() && self.cell_size_m > 0.0) {
            return Err(TileError::config(format!(
                "cell_size_m must be positive, got {}",
                self.cell_size_m
            )));
        }
        if self.ntiles_x == 0 || self.ntiles_y == 0 {
            return Err(TileError::config("tile counts must be at least 1"));
        }
        if let Some([x, y]) = self.only {
            if !(1..=self.ntiles_x).contains(&x) || !(1..=self.ntiles_y).contains(&y) {
                return Err(TileError::config(format!(
                    "only tile ({}, {}) outside {}x{} tiles",
                    x, y, self.ntiles_x, self.ntiles_y
                )));
            }
        }
        Ok(())
    }

    /// Whether a full raster of `cells` cells is built through spill files.
    pub fn spills(&self, cells: usize) -> bool {
        self.spill_dir.is_some() && cells > self.max_cells_for_memory_only
    }

    /// Output file name of tile `(x, y)`.
    pub fn tile_file_name(&self, tile_no_x: u32, tile_no_y: u32) -> String {
        format!(
            "{}_tile_{}_{}.{}",
            self.name,
            tile_no_x,
            tile_no_y,
            self.format.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let job = TerrainJob::from_json(
            r#"{"tile_width_mm": 100.0, "cell_size_m": 10.0, "format": "obj"}"#,
        )
        .unwrap();
        assert_eq!(job.name, "terrain");
        assert_eq!(job.ntiles_x, 1);
        assert_eq!(job.format, OutputFormat::Obj);
        assert_eq!(job.centering, Centering::Global);
        assert!(job.no_normals);
        assert!(job.flat_bottom);
        assert!(!job.dirty_triangles);
        assert_eq!(job.spill_chunk_triangles, DEFAULT_SPILL_CHUNK_TRIANGLES);
    }

    #[test]
    fn test_from_json_reads_hole_flags() {
        let job = TerrainJob::from_json(
            r#"{"tile_width_mm": 80.0, "cell_size_m": 5.0,
                "dirty_triangles": true, "flat_bottom": false}"#,
        )
        .unwrap();
        assert!(job.dirty_triangles);
        assert!(!job.flat_bottom);
    }

    #[test]
    fn test_from_json_missing_field() {
        let err = TerrainJob::from_json(r#"{"tile_width_mm": 100.0}"#).unwrap_err();
        assert!(matches!(err, TileError::Config { .. }));
    }

    #[test]
    fn test_validate_only_range() {
        let mut job = TerrainJob::new("t", 100.0, 10.0);
        job.ntiles_x = 2;
        job.only = Some([2, 1]);
        assert!(job.validate().is_ok());
        job.only = Some([3, 1]);
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        assert!(TerrainJob::new("t", 0.0, 10.0).validate().is_err());
        assert!(TerrainJob::new("t", 100.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_spills_needs_dir_and_size() {
        let mut job = TerrainJob::new("t", 100.0, 10.0);
        job.max_cells_for_memory_only = 10;
        assert!(!job.spills(100));
        job.spill_dir = Some(PathBuf::from("/tmp"));
        assert!(job.spills(100));
        assert!(!job.spills(10));
    }

    #[test]
    fn test_tile_file_name() {
        let mut job = TerrainJob::new("everest", 100.0, 10.0);
        assert_eq!(job.tile_file_name(2, 3), "everest_tile_2_3.stl");
        job.format = OutputFormat::Obj;
        assert_eq!(job.tile_file_name(1, 1), "everest_tile_1_1.obj");
    }
}
