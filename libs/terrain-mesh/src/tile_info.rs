//! # Tile Configuration
//!
//! [`TileInfo`] is the per-tile configuration record handed to
//! [`crate::build_tile`]. The caller fills the inputs; the build writes
//! derived results into [`TileInfo::stats`].
//!
//! ## JSON
//!
//! ```rust
//! use terrain_mesh::{OutputFormat, TileInfo};
//!
//! let info = TileInfo::from_json(r#"{
//!     "pixel_mm": 0.5, "scale": 1000.0,
//!     "min_elev": 100.0, "max_elev": 250.0,
//!     "tile_width_mm": 80.0, "tile_height_mm": 60.0,
//!     "format": "STLb"
//! }"#).unwrap();
//! assert_eq!(info.format, OutputFormat::BinaryStl);
//! assert_eq!(info.tile_no_x, 1);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use config::constants::DEFAULT_SPILL_CHUNK_TRIANGLES;

use crate::error::MeshError;

// =============================================================================
// OUTPUT FORMAT
// =============================================================================

/// Serialized mesh format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Binary STL.
    #[serde(rename = "STLb")]
    BinaryStl,
    /// ASCII STL.
    #[serde(rename = "STLa")]
    AsciiStl,
    /// Wavefront OBJ with an indexed vertex list.
    #[serde(rename = "obj")]
    Obj,
}

impl OutputFormat {
    /// True for formats that reference pooled vertices by index.
    #[inline]
    pub fn is_indexed(self) -> bool {
        matches!(self, OutputFormat::Obj)
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::BinaryStl | OutputFormat::AsciiStl => "stl",
            OutputFormat::Obj => "obj",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::BinaryStl => "STLb",
            OutputFormat::AsciiStl => "STLa",
            OutputFormat::Obj => "obj",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stlb" | "stl" | "binary" => Ok(OutputFormat::BinaryStl),
            "stla" | "ascii" => Ok(OutputFormat::AsciiStl),
            "obj" => Ok(OutputFormat::Obj),
            _ => Err(MeshError::UnknownFormat(s.to_string())),
        }
    }
}

// =============================================================================
// CENTERING
// =============================================================================

/// Where a tile is placed in model space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Centering {
    /// Each tile centered on the origin.
    Tile,
    /// All tiles offset by tile index so they reassemble into one footprint.
    #[default]
    Global,
}

// =============================================================================
// STATS
// =============================================================================

/// Results recorded by the tile build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileStats {
    /// Top raster contained undefined cells.
    pub have_nan: bool,
    /// Bottom raster contained undefined cells.
    pub have_bottom_nan: bool,
    /// Lowest model height of the top surface (mm).
    pub min_height_mm: Option<f64>,
    /// Highest model height of the top surface (mm).
    pub max_height_mm: Option<f64>,
    pub triangle_count: u64,
    pub byte_size: u64,
}

// =============================================================================
// TILE INFO
// =============================================================================

/// Configuration of one tile build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    /// Cell size in model millimetres.
    pub pixel_mm: f64,
    /// Horizontal scale (real metres per model metre).
    pub scale: f64,
    /// Elevation mapped to `base_thickness_mm` (tile-set minimum).
    pub min_elev: f64,
    pub max_elev: f64,
    /// Minimum of an elevation bottom raster.
    #[serde(default)]
    pub min_bottom_elev: Option<f64>,
    #[serde(default = "default_z_scale")]
    pub z_scale: f64,
    #[serde(default = "default_base_thickness")]
    pub base_thickness_mm: f64,

    /// 1-based tile column.
    #[serde(default = "one")]
    pub tile_no_x: u32,
    /// 1-based tile row, counted from the north.
    #[serde(default = "one")]
    pub tile_no_y: u32,
    #[serde(default = "one")]
    pub ntiles_x: u32,
    #[serde(default = "one")]
    pub ntiles_y: u32,
    pub tile_width_mm: f64,
    pub tile_height_mm: f64,
    #[serde(default)]
    pub centering: Centering,

    pub format: OutputFormat,
    #[serde(default)]
    pub no_bottom: bool,
    #[serde(default = "yes")]
    pub no_normals: bool,
    #[serde(default = "yes")]
    pub smooth_borders: bool,
    #[serde(default)]
    pub clean_diags: bool,
    /// Skip and wall tests use the dilated raster instead of the mask.
    #[serde(default)]
    pub dirty_triangles: bool,
    /// Allow the two-triangle bottom for tiles without undefined cells.
    #[serde(default = "yes")]
    pub flat_bottom: bool,

    /// Spill file path; `None` keeps the whole tile in memory.
    #[serde(default)]
    pub spill_file: Option<PathBuf>,
    #[serde(default = "default_chunk")]
    pub spill_chunk_triangles: usize,

    #[serde(default)]
    pub stats: TileStats,
}

fn default_z_scale() -> f64 {
    1.0
}

fn default_base_thickness() -> f64 {
    1.0
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

impl TileInfo {
    /// Creates a single-tile record with default flags.
    pub fn new(
        pixel_mm: f64,
        scale: f64,
        min_elev: f64,
        max_elev: f64,
        tile_width_mm: f64,
        tile_height_mm: f64,
        format: OutputFormat,
    ) -> Self {
        Self {
            pixel_mm,
            scale,
            min_elev,
            max_elev,
            min_bottom_elev: None,
            z_scale: default_z_scale(),
            base_thickness_mm: default_base_thickness(),
            tile_no_x: 1,
            tile_no_y: 1,
            ntiles_x: 1,
            ntiles_y: 1,
            tile_width_mm,
            tile_height_mm,
            centering: Centering::default(),
            format,
            no_bottom: false,
            no_normals: true,
            smooth_borders: true,
            clean_diags: false,
            dirty_triangles: false,
            flat_bottom: true,
            spill_file: None,
            spill_chunk_triangles: DEFAULT_SPILL_CHUNK_TRIANGLES,
            stats: TileStats::default(),
        }
    }

    /// Parses a record from JSON.
    ///
    /// A missing required field is a configuration error.
    pub fn from_json(json: &str) -> Result<Self, MeshError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the record for values no build can work with.
    pub fn validate(&self) -> Result<(), MeshError> {
        if !(self.pixel_mm.is_finite() && self.pixel_mm > 0.0) {
            return Err(MeshError::config(format!(
                "pixel_mm must be positive, got {}",
                self.pixel_mm
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MeshError::config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.min_elev.is_finite() {
            return Err(MeshError::config("min_elev must be finite"));
        }
        if !self.z_scale.is_finite() {
            return Err(MeshError::config("z_scale must be finite"));
        }
        if !self.base_thickness_mm.is_finite() {
            return Err(MeshError::config("base_thickness_mm must be finite"));
        }
        if self.spill_chunk_triangles == 0 {
            return Err(MeshError::config("spill_chunk_triangles must be positive"));
        }
        if self.ntiles_x == 0 || self.ntiles_y == 0 {
            return Err(MeshError::config("tile counts must be at least 1"));
        }
        if !(1..=self.ntiles_x).contains(&self.tile_no_x)
            || !(1..=self.ntiles_y).contains(&self.tile_no_y)
        {
            return Err(MeshError::config(format!(
                "tile ({}, {}) outside {}x{} tiles",
                self.tile_no_x, self.tile_no_y, self.ntiles_x, self.ntiles_y
            )));
        }
        Ok(())
    }
}
