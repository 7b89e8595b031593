//! # Tile Placement
//!
//! Maps raster positions to model-space millimetres.
//!
//! - [`HeightMapping`]: source elevation to model height.
//! - [`Placement`]: grid corner to `(x, y)`, in one of two offset modes.
//!
//! In global mode every coordinate is an integer grid index times the
//! pixel size, so corners on the seam between two tiles come out
//! bit-identical no matter which tile computes them.

use config::constants::mm_per_source_unit;

use crate::raster::Raster;
use crate::tile_info::{Centering, TileInfo};

// =============================================================================
// HEIGHT MAPPING
// =============================================================================

/// Linear elevation to model height mapping.
///
/// `height = (elev - min_elev) * (1000 / scale) * z_scale + base_thickness`
///
/// # Example
///
/// ```rust
/// use terrain_mesh::placement::HeightMapping;
///
/// let m = HeightMapping::new(100.0, 1000.0, 2.0, 1.5);
/// assert_eq!(m.height(100.0), 1.5);
/// assert_eq!(m.height(110.0), 21.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightMapping {
    pub min_elev: f64,
    /// Model millimetres per source unit, vertical exaggeration included.
    pub factor: f64,
    pub base_thickness_mm: f64,
}

impl HeightMapping {
    pub fn new(min_elev: f64, scale: f64, z_scale: f64, base_thickness_mm: f64) -> Self {
        Self {
            min_elev,
            factor: mm_per_source_unit(scale) * z_scale,
            base_thickness_mm,
        }
    }

    /// Mapping for the top surface of a tile.
    pub fn for_top(info: &TileInfo) -> Self {
        Self::new(info.min_elev, info.scale, info.z_scale, info.base_thickness_mm)
    }

    #[inline]
    pub fn height(&self, elev: f64) -> f64 {
        (elev - self.min_elev) * self.factor + self.base_thickness_mm
    }

    /// Maps every defined cell in place.
    pub fn apply(&self, raster: &mut Raster) {
        raster.map_defined(|e| self.height(e));
    }
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// Axis-aligned rectangle in model millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Corner coordinates of one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pixel_mm: f64,
    rows: usize,
    cols: usize,
    mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Centered { half_width: f64, half_height: f64 },
    Global { col_offset: usize, row_offset: usize, total_rows: usize },
}

impl Placement {
    /// Placement for a tile of `rows x cols` interior cells.
    ///
    /// Tiles of one job must all have the same interior size for global
    /// offsets to line up.
    pub fn new(info: &TileInfo, rows: usize, cols: usize) -> Self {
        let pixel_mm = info.pixel_mm;
        let mode = match info.centering {
            Centering::Tile => Mode::Centered {
                half_width: cols as f64 * pixel_mm / 2.0,
                half_height: rows as f64 * pixel_mm / 2.0,
            },
            Centering::Global => Mode::Global {
                col_offset: (info.tile_no_x.max(1) as usize - 1) * cols,
                row_offset: (info.tile_no_y.max(1) as usize - 1) * rows,
                total_rows: info.ntiles_y.max(1) as usize * rows,
            },
        };
        Self {
            pixel_mm,
            rows,
            cols,
            mode,
        }
    }

    /// X of the vertical grid line `k` (0 = western edge of the tile).
    #[inline]
    pub fn corner_x(&self, k: usize) -> f64 {
        match self.mode {
            Mode::Centered { half_width, .. } => k as f64 * self.pixel_mm - half_width,
            Mode::Global { col_offset, .. } => (col_offset + k) as f64 * self.pixel_mm,
        }
    }

    /// Y of the horizontal grid line `k` (0 = northern edge of the tile).
    #[inline]
    pub fn corner_y(&self, k: usize) -> f64 {
        match self.mode {
            Mode::Centered { half_height, .. } => half_height - k as f64 * self.pixel_mm,
            Mode::Global {
                row_offset,
                total_rows,
                ..
            } => total_rows.saturating_sub(row_offset + k) as f64 * self.pixel_mm,
        }
    }

    /// Bounds of interior cell `(row, col)` (0-based).
    pub fn cell_bounds(&self, row: usize, col: usize) -> Bounds {
        Bounds {
            west: self.corner_x(col),
            east: self.corner_x(col + 1),
            north: self.corner_y(row),
            south: self.corner_y(row + 1),
        }
    }

    /// Bounds of the whole tile.
    pub fn footprint(&self) -> Bounds {
        Bounds {
            west: self.corner_x(0),
            east: self.corner_x(self.cols),
            north: self.corner_y(0),
            south: self.corner_y(self.rows),
        }
    }
}
