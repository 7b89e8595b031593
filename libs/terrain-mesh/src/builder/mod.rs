//! # Cell Topology Builder
//!
//! Scans a padded, height-mapped raster and produces one [`Cell`] (or
//! none) per interior position.
//!
//! ## Steps per position
//!
//! 1. Skip if the center is undefined in the mask.
//! 2. Flag walls on the tile fringe and, when the raster has undefined
//!    cells, towards undefined neighbours.
//! 3. Average the four corner heights. Skip if any corner is undefined.
//! 4. Build top, optional bottom and walls.
//! 5. Collapse adjacent border pairs into tri-cells when enabled.
//!
//! Positions are addressed by interior `(row, col)`; the padded raster is
//! indexed at `(row + 1, col + 1)`.


use crate::cell::{Borders, Cell, CellCorners, Corner, Direction};
use crate::error::MeshError;
use crate::placement::Placement;
use crate::raster::Raster;
use crate::vertex::{Vertex, VertexPool};

// =============================================================================
// BOTTOM SURFACE
// =============================================================================

/// Height source for the lower corners of a cell, in model millimetres.
#[derive(Debug, Clone, PartialEq)]
pub enum BottomSurface {
    /// Same height everywhere.
    Constant(f64),
    /// Per-position heights, padded like the top raster.
    Raster(Raster),
}

impl BottomSurface {
    /// Returns true for a per-position bottom.
    #[inline]
    pub fn is_raster(&self) -> bool {
        matches!(self, BottomSurface::Raster(_))
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Switches that shape the cells of one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// The top raster has undefined cells: use NaN-aware corner means and
    /// wall off undefined neighbours.
    pub have_nan: bool,
    /// Emit a bottom quad per cell.
    pub per_cell_bottom: bool,
    /// Collapse adjacent border pairs into tri-cells.
    pub tri_cells: bool,
}

// =============================================================================
// CELL GRID
// =============================================================================

/// Fully materialized cells of a tile in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Cell>>,
}

impl CellGrid {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at interior `(row, col)`, `None` for dropped positions.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row * self.cols + col)?.as_ref()
    }

    /// Present cells in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Number of present cells.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total triangles of all cells.
    pub fn triangle_count(&self) -> usize {
        self.iter().map(Cell::triangle_count).sum()
    }
}

// =============================================================================
// CELL BUILDER
// =============================================================================

/// Builds cells from a prepared tile.
#[derive(Debug, Clone)]
pub struct CellBuilder {
    /// Heights used for corner interpolation (dilated when the tile has holes).
    surface: Raster,
    /// Definedness used for skipping and wall inference; `surface` if absent.
    mask: Option<Raster>,
    bottom: BottomSurface,
    bottom_nan_aware: bool,
    placement: Placement,
    options: BuildOptions,
    rows: usize,
    cols: usize,
}

impl CellBuilder {
    /// Creates a builder.
    ///
    /// `surface`, `mask` and a raster bottom must share one padded shape of
    /// at least 3x3.
    pub fn new(
        surface: Raster,
        mask: Option<Raster>,
        bottom: BottomSurface,
        placement: Placement,
        options: BuildOptions,
    ) -> Result<Self, MeshError> {
        if surface.rows() < 3 || surface.cols() < 3 {
            return Err(MeshError::invalid_raster(format!(
                "padded raster must be at least 3x3, got {}x{}",
                surface.rows(),
                surface.cols()
            )));
        }
        let check = |other: &Raster| {
            if other.same_shape(&surface) {
                Ok(())
            } else {
                Err(MeshError::ShapeMismatch {
                    top_rows: surface.rows(),
                    top_cols: surface.cols(),
                    bottom_rows: other.rows(),
                    bottom_cols: other.cols(),
                })
            }
        };
        if let Some(mask) = &mask {
            check(mask)?;
        }
        let bottom_nan_aware = match &bottom {
            BottomSurface::Raster(b) => {
                check(b)?;
                b.has_undefined()
            }
            BottomSurface::Constant(_) => false,
        };
        let rows = surface.rows() - 2;
        let cols = surface.cols() - 2;
        Ok(Self {
            surface,
            mask,
            bottom,
            bottom_nan_aware,
            placement,
            options,
            rows,
            cols,
        })
    }

    /// Interior rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Interior columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[inline]
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    #[inline]
    fn mask(&self) -> &Raster {
        self.mask.as_ref().unwrap_or(&self.surface)
    }

    /// Walls needed at interior `(row, col)`.
    pub fn borders(&self, row: usize, col: usize) -> Borders {
        let mut borders = Borders::NONE;
        let (pr, pc) = (row + 1, col + 1);
        let mask = self.mask();
        for dir in Direction::ALL {
            let fringe = match dir {
                Direction::North => row == 0,
                Direction::South => row + 1 == self.rows,
                Direction::East => col + 1 == self.cols,
                Direction::West => col == 0,
            };
            let open = self.options.have_nan && {
                let (dr, dc) = dir.offset();
                let nr = pr.wrapping_add_signed(dr);
                let nc = pc.wrapping_add_signed(dc);
                !mask.is_defined(nr, nc)
            };
            if fringe || open {
                borders.insert(dir);
            }
        }
        borders
    }

    /// Corner heights of interior `(row, col)` in NW, NE, SE, SW order.
    fn corner_heights(&self, raster: &Raster, nan_aware: bool, row: usize, col: usize) -> Option<[f64; 4]> {
        let mut out = [0.0; 4];
        for corner in Corner::ALL {
            let (dr, dc) = corner.grid_offset();
            let h = corner_mean(raster, row + 1 + dr, col + 1 + dc, nan_aware);
            if h.is_nan() {
                return None;
            }
            out[corner.index()] = h;
        }
        Some(out)
    }

    /// Builds the cell at interior `(row, col)` and registers its vertices.
    ///
    /// Returns `None` when the position is dropped.
    pub fn build_cell(&self, row: usize, col: usize, pool: &mut VertexPool) -> Option<Cell> {
        if !self.mask().is_defined(row + 1, col + 1) {
            return None;
        }
        let top_h = self.corner_heights(&self.surface, self.options.have_nan, row, col)?;
        let bottom_h = match &self.bottom {
            BottomSurface::Constant(h) => [*h; 4],
            BottomSurface::Raster(b) => self.corner_heights(b, self.bottom_nan_aware, row, col)?,
        };

        let bounds = self.placement.cell_bounds(row, col);
        let xy = |corner: Corner| match corner {
            Corner::NorthWest => (bounds.west, bounds.north),
            Corner::NorthEast => (bounds.east, bounds.north),
            Corner::SouthEast => (bounds.east, bounds.south),
            Corner::SouthWest => (bounds.west, bounds.south),
        };
        let at = |corner: Corner, z: f64| {
            let (x, y) = xy(corner);
            Vertex::new(x, y, z)
        };
        let corners = CellCorners {
            top: Corner::ALL.map(|c| at(c, top_h[c.index()])),
            bottom: Corner::ALL.map(|c| at(c, bottom_h[c.index()])),
        };

        let borders = self.borders(row, col);
        let mut cell = Cell::new(&corners, borders, self.options.per_cell_bottom);
        if self.options.tri_cells {
            cell.collapse_tri_cell(&corners, borders);
        }
        pool.register_all(cell.vertices());
        Some(cell)
    }

    /// Builds every cell of one interior row.
    pub fn build_row(&self, row: usize, pool: &mut VertexPool) -> Vec<Option<Cell>> {
        (0..self.cols)
            .map(|col| self.build_cell(row, col, pool))
            .collect()
    }

    /// Builds all cells of the tile.
    pub fn build_grid(&self, pool: &mut VertexPool) -> CellGrid {
        let mut cells = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            cells.extend(self.build_row(row, pool));
        }
        CellGrid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }
}

/// Mean of the four cells meeting at grid point `(gr, gc)` of a padded
/// raster.
///
/// The cells are summed NW, NE, SW, SE of the point, whichever cell asks.
/// The NaN-aware form skips undefined cells and is undefined only if all
/// four are; with four defined values both forms agree bit for bit.
pub fn corner_mean(raster: &Raster, gr: usize, gc: usize, nan_aware: bool) -> f64 {
    let values = [
        raster.get(gr - 1, gc - 1),
        raster.get(gr - 1, gc),
        raster.get(gr, gc - 1),
        raster.get(gr, gc),
    ];
    if !nan_aware {
        return (values[0] + values[1] + values[2] + values[3]) / 4.0;
    }
    let mut sum = 0.0;
    let mut n = 0u32;
    for v in values {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / f64::from(n)
    }
}
