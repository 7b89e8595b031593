//! # Tile Build
//!
//! Entry point that turns one padded tile raster into a serialized mesh.
//!
//! ## Pipeline
//!
//! ```text
//! prepare_surfaces:   validate -> bottom handling -> hole preprocessing -> height mapping
//! tile_from_surfaces: window options -> CellBuilder
//! build_tile:         rows of cells -> TriangleWriter -> MemorySink | SpillSink
//! ```
//!
//! A single tile goes through all three in [`build_tile`]. A tiled job runs
//! [`prepare_surfaces`] once on the whole padded raster and hands each tile
//! its window through [`build_tile_from_surfaces`].
//!
//! The sink is chosen once per tile from [`TileInfo::spill_file`].

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use config::constants::{
    COINCIDENT_ELEVATION_TOLERANCE, DEFAULT_FILL_HOLE_ITERATIONS, DEFAULT_FILL_HOLE_NEIGHBORS,
};

use crate::builder::{BottomSurface, BuildOptions, CellBuilder, CellGrid};
use crate::error::MeshError;
use crate::geometry::Triangle;
use crate::placement::{HeightMapping, Placement};
use crate::preprocess::{clean_up_diagonals, dilate, dilate_pair, fill_holes};
use crate::raster::Raster;
use crate::sink::{MemorySink, Sink, SpillSink, TileOutput, TriangleWriter};
use crate::tile_info::{OutputFormat, TileInfo};
use crate::vertex::{Vertex, VertexPool};

// =============================================================================
// BOTTOM
// =============================================================================

/// Lower surface of a tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Bottom {
    /// Flat at height 0.
    #[default]
    Flat,
    /// Flat at the given model height (mm).
    Constant(f64),
    /// Per-cell bottom heights already in model millimetres, padded like
    /// the top. Ignored when the top has undefined cells.
    Relief(Raster),
    /// Per-cell bottom elevations in source units, padded like the top.
    /// Undefined cells under a defined top go all the way through.
    Elevation(Raster),
}

impl Bottom {
    fn raster(&self) -> Option<&Raster> {
        match self {
            Bottom::Relief(r) | Bottom::Elevation(r) => Some(r),
            Bottom::Flat | Bottom::Constant(_) => None,
        }
    }
}

// =============================================================================
// SURFACES
// =============================================================================

/// Preprocessed, height-mapped surfaces of a padded raster.
///
/// Produced once for a whole raster by [`prepare_surfaces`] and cut into
/// tile windows with [`Surfaces::window`], so hole filling and the height
/// mapping never depend on where a tile boundary falls.
#[derive(Debug, Clone, PartialEq)]
pub struct Surfaces {
    /// Top heights in millimetres, holes dilated by one ring.
    pub top: Raster,
    /// Undilated top marking which positions exist. `None` if every
    /// position of `top` does.
    pub mask: Option<Raster>,
    /// Bottom heights in millimetres.
    pub bottom: BottomSurface,
}

impl Surfaces {
    /// Cuts the `rows x cols` window at `(row, col)` out of every surface.
    pub fn window(
        &self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Surfaces, MeshError> {
        let mask = match &self.mask {
            Some(m) => Some(m.window(row, col, rows, cols)?),
            None => None,
        };
        let bottom = match &self.bottom {
            BottomSurface::Raster(b) => BottomSurface::Raster(b.window(row, col, rows, cols)?),
            BottomSurface::Constant(h) => BottomSurface::Constant(*h),
        };
        Ok(Surfaces {
            top: self.top.window(row, col, rows, cols)?,
            mask,
            bottom,
        })
    }
}

fn check_padded(top: &Raster) -> Result<(), MeshError> {
    if top.rows() < 3 || top.cols() < 3 {
        return Err(MeshError::invalid_raster(format!(
            "padded tile must be at least 3x3, got {}x{}",
            top.rows(),
            top.cols()
        )));
    }
    Ok(())
}

/// Validates a padded raster, fills or dilates its holes and maps both
/// surfaces to model millimetres.
///
/// Uses the mapping parameters and hole switches of `info`; tile number,
/// extent and `dirty_triangles` play no part here. Records `have_nan` and
/// `have_bottom_nan` in `info.stats`.
pub fn prepare_surfaces(
    top: Raster,
    bottom: Bottom,
    info: &mut TileInfo,
) -> Result<Surfaces, MeshError> {
    info.validate()?;
    check_padded(&top)?;
    if let Some(b) = bottom.raster() {
        if !b.same_shape(&top) {
            return Err(MeshError::ShapeMismatch {
                top_rows: top.rows(),
                top_cols: top.cols(),
                bottom_rows: b.rows(),
                bottom_cols: b.cols(),
            });
        }
    }

    let have_nan = top.has_undefined();
    info.stats.have_nan = have_nan;
    info.stats.have_bottom_nan = false;

    let bottom = match bottom {
        Bottom::Relief(_) if have_nan => {
            warn!(
                tile_x = info.tile_no_x,
                tile_y = info.tile_no_y,
                "Top has undefined cells, relief bottom ignored"
            );
            Bottom::Flat
        }
        other => other,
    };

    Ok(match bottom {
        Bottom::Elevation(b) => prepare_elevation_bottom(top, b, info),
        Bottom::Relief(relief) => prepare_relief_bottom(top, relief, info),
        Bottom::Flat => prepare_flat(top, 0.0, info),
        Bottom::Constant(h) => prepare_flat(top, h, info),
    })
}

/// Flat or constant bottom: hole preprocessing on the top only.
fn prepare_flat(mut top: Raster, bottom_height: f64, info: &TileInfo) -> Surfaces {
    let mut mask = None;
    if top.has_undefined() {
        if info.clean_diags {
            let filled = fill_holes(
                &mut top,
                DEFAULT_FILL_HOLE_ITERATIONS,
                DEFAULT_FILL_HOLE_NEIGHBORS,
            );
            let passes = clean_up_diagonals(&mut top);
            debug!(filled, passes, "Cleaned up diagonal holes");
        }
        if top.has_undefined() {
            let dilated = dilate(&top, None);
            mask = Some(std::mem::replace(&mut top, dilated));
        }
    }
    HeightMapping::for_top(info).apply(&mut top);
    Surfaces {
        top,
        mask,
        bottom: BottomSurface::Constant(bottom_height),
    }
}

/// Relief bottom (model millimetres) under a fully defined top.
fn prepare_relief_bottom(mut top: Raster, relief: Raster, info: &TileInfo) -> Surfaces {
    HeightMapping::for_top(info).apply(&mut top);
    for row in 0..top.rows() {
        for col in 0..top.cols() {
            let b = relief.get(row, col);
            if top.get(row, col) < b {
                top.set(row, col, b);
            }
        }
    }
    Surfaces {
        top,
        mask: None,
        bottom: BottomSurface::Raster(relief),
    }
}

/// Elevation bottom: through holes, coincident surfaces and shared mapping.
fn prepare_elevation_bottom(mut top: Raster, mut bottom: Raster, info: &mut TileInfo) -> Surfaces {
    info.stats.have_bottom_nan = bottom.has_undefined();

    let mut through = Vec::new();
    let mut coincident = Vec::new();
    for row in 0..top.rows() {
        for col in 0..top.cols() {
            let (t, b) = (top.get(row, col), bottom.get(row, col));
            if t.is_nan() {
                continue;
            }
            if b.is_nan() {
                through.push((row, col));
            } else if (t - b).abs() <= COINCIDENT_ELEVATION_TOLERANCE {
                coincident.push((row, col));
            }
        }
    }

    let mut mask = None;
    if !coincident.is_empty() {
        let top_pre = top.clone();
        for &(r, c) in &coincident {
            top.set(r, c, f64::NAN);
            bottom.set(r, c, f64::NAN);
        }
        let bottom_fallback = through.is_empty().then_some(&top_pre);
        let (t, b) = dilate_pair(&top, &bottom, Some(&top_pre), bottom_fallback);
        mask = Some(std::mem::replace(&mut top, t));
        bottom = b;
        debug!(cells = coincident.len(), "Removed coincident top and bottom cells");
    }

    let mapping = if through.is_empty() {
        let min_bottom = info
            .min_bottom_elev
            .or_else(|| bottom.nan_min())
            .unwrap_or(info.min_elev);
        HeightMapping::new(min_bottom, info.scale, info.z_scale, info.base_thickness_mm)
    } else {
        debug!(cells = through.len(), "Bottom goes through under undefined cells");
        HeightMapping::for_top(info)
    };
    mapping.apply(&mut top);
    mapping.apply(&mut bottom);
    for &(r, c) in &through {
        bottom.set(r, c, 0.0);
    }

    Surfaces {
        top,
        mask,
        bottom: BottomSurface::Raster(bottom),
    }
}

// =============================================================================
// PREPARED TILE
// =============================================================================

/// A tile ready for cell building.
#[derive(Debug, Clone)]
pub struct PreparedTile {
    builder: CellBuilder,
    format: OutputFormat,
    normals: bool,
    /// Height of the two-triangle bottom, if it applies.
    flat_bottom: Option<f64>,
    spill: Option<(PathBuf, usize)>,
}

/// Validates and preprocesses a padded tile raster.
///
/// Records `have_nan`, `have_bottom_nan` and the model height range in
/// `info.stats`.
pub fn prepare_tile(
    top: Raster,
    bottom: Bottom,
    info: &mut TileInfo,
) -> Result<PreparedTile, MeshError> {
    let surfaces = prepare_surfaces(top, bottom, info)?;
    tile_from_surfaces(surfaces, info)
}

/// Sets up the cell builder of one tile window of prepared surfaces.
///
/// `info.stats.have_nan` is raised if the window has missing positions
/// and never cleared.
pub fn tile_from_surfaces(
    surfaces: Surfaces,
    info: &mut TileInfo,
) -> Result<PreparedTile, MeshError> {
    info.validate()?;
    check_padded(&surfaces.top)?;
    let Surfaces {
        top,
        mut mask,
        bottom,
    } = surfaces;

    let have_nan = mask.as_ref().unwrap_or(&top).has_undefined();
    info.stats.have_nan |= have_nan;

    let raster_bottom = bottom.is_raster();
    let fast_path = !raster_bottom && !info.no_bottom && !have_nan && info.flat_bottom;
    let options = BuildOptions {
        have_nan,
        per_cell_bottom: !info.no_bottom && !fast_path,
        tri_cells: !raster_bottom && have_nan && info.smooth_borders,
    };
    let flat_bottom = match &bottom {
        BottomSurface::Constant(h) if fast_path => Some(*h),
        _ => None,
    };
    if info.dirty_triangles {
        mask = None;
    }

    info.stats.min_height_mm = top.nan_min();
    info.stats.max_height_mm = top.nan_max();

    let placement = Placement::new(info, top.rows() - 2, top.cols() - 2);
    let builder = CellBuilder::new(top, mask, bottom, placement, options)?;
    debug!(
        tile_x = info.tile_no_x,
        tile_y = info.tile_no_y,
        have_nan,
        tri_cells = options.tri_cells,
        flat_bottom = flat_bottom.is_some(),
        "Prepared tile"
    );
    Ok(PreparedTile {
        builder,
        format: info.format,
        normals: !info.no_normals,
        flat_bottom,
        spill: info
            .spill_file
            .clone()
            .map(|p| (p, info.spill_chunk_triangles)),
    })
}

impl PreparedTile {
    #[inline]
    pub fn builder(&self) -> &CellBuilder {
        &self.builder
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The two bottom triangles of the flat-bottom fast path, if it applies.
    ///
    /// They span the four outer corners of the tile: `(SW, NE, SE)` and
    /// `(SW, NW, NE)`.
    pub fn flat_bottom_triangles(&self) -> Option<[Triangle; 2]> {
        let z = self.flat_bottom?;
        let f = self.builder.placement().footprint();
        let sw = Vertex::new(f.west, f.south, z);
        let se = Vertex::new(f.east, f.south, z);
        let ne = Vertex::new(f.east, f.north, z);
        let nw = Vertex::new(f.west, f.north, z);
        Some([Triangle::new(sw, ne, se), Triangle::new(sw, nw, ne)])
    }

    fn register_flat_bottom(&self, pool: &mut VertexPool) {
        if let Some(tris) = self.flat_bottom_triangles() {
            pool.register_all(tris.iter().flat_map(|t| t.vertices));
        }
    }

    /// Builds every cell and registers the flat bottom, if any.
    pub fn build_grid(&self, pool: &mut VertexPool) -> CellGrid {
        let grid = self.builder.build_grid(pool);
        self.register_flat_bottom(pool);
        grid
    }

    /// Serializes a built grid followed by the flat bottom.
    pub fn write_grid<S: Sink>(
        &self,
        grid: &CellGrid,
        pool: &VertexPool,
        writer: &mut TriangleWriter<S>,
    ) -> Result<(), MeshError> {
        for cell in grid.iter() {
            writer.write_cell(cell, pool)?;
        }
        self.write_flat_bottom(pool, writer)
    }

    fn write_flat_bottom<S: Sink>(
        &self,
        pool: &VertexPool,
        writer: &mut TriangleWriter<S>,
    ) -> Result<(), MeshError> {
        if let Some(tris) = self.flat_bottom_triangles() {
            for t in &tris {
                writer.write_triangle(t, pool)?;
            }
        }
        Ok(())
    }

    /// Builds and writes cells row by row without keeping them.
    pub fn stream<S: Sink>(
        &self,
        pool: &mut VertexPool,
        writer: &mut TriangleWriter<S>,
    ) -> Result<(), MeshError> {
        let rows = self.builder.rows();
        let step = rows / 10 + 1;
        for row in 0..rows {
            if row > 0 && row % step == 0 {
                debug!(
                    progress = row * 100 / rows,
                    triangles = writer.triangle_count(),
                    pending_bytes = writer.bytes_pending(),
                    "Building cells"
                );
            }
            for col in 0..self.builder.cols() {
                if let Some(cell) = self.builder.build_cell(row, col, pool) {
                    writer.write_cell(&cell, pool)?;
                }
            }
        }
        self.register_flat_bottom(pool);
        self.write_flat_bottom(pool, writer)
    }

    /// Streams the tile into `sink` and finalizes it.
    ///
    /// The sink is discarded if writing fails.
    pub fn run<S: Sink>(
        &self,
        pool: &mut VertexPool,
        sink: S,
    ) -> Result<(TileOutput, u64), MeshError> {
        let mut writer = TriangleWriter::new(sink, self.format, self.normals)?;
        if let Err(e) = self.stream(pool, &mut writer) {
            writer.discard();
            return Err(e);
        }
        let count = writer.triangle_count();
        let output = writer.finish(pool)?;
        Ok((output, count))
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Builds and serializes one tile.
///
/// `top` (and a raster `bottom`) must carry one ring of edge-replicated
/// padding. Writes the triangle count and byte size into `info.stats`.
/// A tile without any triangle yields [`TileOutput::Empty`].
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{build_tile, Bottom, OutputFormat, Raster, TileInfo};
///
/// let top = Raster::filled(2, 2, 100.0).pad_edge();
/// let mut info = TileInfo::new(1.0, 1000.0, 100.0, 100.0, 2.0, 2.0, OutputFormat::BinaryStl);
/// let out = build_tile(top, Bottom::Flat, &mut info).unwrap();
/// assert_eq!(info.stats.triangle_count, 26);
/// assert_eq!(out.byte_len().unwrap(), 84 + 50 * 26);
/// ```
pub fn build_tile(
    top: Raster,
    bottom: Bottom,
    info: &mut TileInfo,
) -> Result<TileOutput, MeshError> {
    let prepared = prepare_tile(top, bottom, info)?;
    build_prepared(&prepared, info)
}

/// Builds and serializes one tile window of [`Surfaces`] prepared for a
/// whole raster.
pub fn build_tile_from_surfaces(
    surfaces: Surfaces,
    info: &mut TileInfo,
) -> Result<TileOutput, MeshError> {
    let prepared = tile_from_surfaces(surfaces, info)?;
    build_prepared(&prepared, info)
}

fn build_prepared(prepared: &PreparedTile, info: &mut TileInfo) -> Result<TileOutput, MeshError> {
    let mut pool = VertexPool::for_format(info.format);
    info!(
        tile_x = info.tile_no_x,
        tile_y = info.tile_no_y,
        rows = prepared.builder.rows(),
        cols = prepared.builder.cols(),
        format = %info.format,
        "Building tile"
    );

    let (output, triangles) = match &prepared.spill {
        None => prepared.run(&mut pool, MemorySink::new())?,
        Some((path, chunk)) => prepared.run(&mut pool, SpillSink::create(path, *chunk)?)?,
    };

    let bytes = output.byte_len()?;
    info.stats.triangle_count = triangles;
    info.stats.byte_size = bytes;
    if output.is_empty() {
        info!(tile_x = info.tile_no_x, tile_y = info.tile_no_y, "Tile is empty");
    } else {
        info!(
            tile_x = info.tile_no_x,
            tile_y = info.tile_no_y,
            triangles,
            bytes,
            vertices = pool.len(),
            "Finished tile"
        );
    }
    Ok(output)
}
