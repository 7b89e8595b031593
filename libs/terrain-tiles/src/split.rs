//! Cutting a full raster into per-tile build tasks.

use config::constants::MM_PER_METER;
use terrain_mesh::{prepare_surfaces, Bottom, Raster, Surfaces, TileInfo};
use tracing::{debug, warn};

use crate::error::TileError;
use crate::job::TerrainJob;
use crate::layout::TileLayout;

/// Input of one tile build.
#[derive(Debug, Clone)]
pub struct TileTask {
    pub tile_no_x: u32,
    pub tile_no_y: u32,
    /// Padded window of the preprocessed job surfaces.
    pub surfaces: Surfaces,
    pub info: TileInfo,
}

/// Splits `full` into one task per tile.
pub fn split_tiles(full: &Raster, job: &TerrainJob) -> Result<Vec<TileTask>, TileError> {
    split_tiles_with_bottom(full, None, job)
}

/// Splits `full` and an optional bottom elevation raster of the same
/// shape into one task per tile.
///
/// Both rasters are padded once by edge replication, then hole filling,
/// dilation and height mapping run over the whole padded raster. Each
/// tile gets the `(cells + 2)` window around its cells, so the padding
/// ring of a tile holds its neighbours' edge cells and shared corners
/// interpolate from the same values on both sides of a seam.
pub fn split_tiles_with_bottom(
    full: &Raster,
    bottom: Option<&Raster>,
    job: &TerrainJob,
) -> Result<Vec<TileTask>, TileError> {
    job.validate()?;
    if let Some(b) = bottom {
        if !b.same_shape(full) {
            return Err(terrain_mesh::MeshError::ShapeMismatch {
                top_rows: full.rows(),
                top_cols: full.cols(),
                bottom_rows: b.rows(),
                bottom_cols: b.cols(),
            }
            .into());
        }
    }

    let layout = TileLayout::new(full.rows(), full.cols(), job.ntiles_x, job.ntiles_y)?;
    if layout.dropped_cols() > 0 || layout.dropped_rows() > 0 {
        debug!(
            dropped_cols = layout.dropped_cols(),
            dropped_rows = layout.dropped_rows(),
            "Raster does not divide evenly into tiles"
        );
    }

    let (min_elev, max_elev) = match (full.nan_min(), full.nan_max()) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            warn!("Raster has no defined cells");
            (0.0, 0.0)
        }
    };

    let spill = job.spills(full.rows() * full.cols());
    let pixel_mm = job.tile_width_mm / layout.cells_x as f64;
    // real metres per model metre
    let scale = layout.cells_x as f64 * job.cell_size_m * MM_PER_METER / job.tile_width_mm;

    let mut shared = TileInfo::new(
        pixel_mm,
        scale,
        min_elev,
        max_elev,
        job.tile_width_mm,
        layout.cells_y as f64 * pixel_mm,
        job.format,
    );
    shared.min_bottom_elev = bottom.and_then(Raster::nan_min);
    shared.z_scale = job.z_scale;
    shared.base_thickness_mm = job.base_thickness_mm;
    shared.ntiles_x = job.ntiles_x;
    shared.ntiles_y = job.ntiles_y;
    shared.centering = job.centering;
    shared.no_bottom = job.no_bottom;
    shared.no_normals = job.no_normals;
    shared.smooth_borders = job.smooth_borders;
    shared.clean_diags = job.clean_diags;
    shared.dirty_triangles = job.dirty_triangles;
    shared.flat_bottom = job.flat_bottom;
    shared.spill_chunk_triangles = job.spill_chunk_triangles;

    let padded_top = full.pad_edge();
    let padded_bottom = bottom.map(Raster::pad_edge);
    let source = match &padded_bottom {
        Some(b) => Bottom::Elevation(b.clone()),
        None => Bottom::Flat,
    };
    let mut whole = shared.clone();
    let surfaces = prepare_surfaces(padded_top.clone(), source, &mut whole)?;

    let (rows, cols) = (layout.window_rows(), layout.window_cols());
    let mut tasks = Vec::with_capacity(layout.tile_count());
    for (x, y) in layout.tiles() {
        if let Some(only) = job.only {
            if only != [x, y] {
                continue;
            }
        }
        let (row, col) = layout.window_origin(x, y);

        let mut info = shared.clone();
        info.tile_no_x = x;
        info.tile_no_y = y;
        info.stats.have_nan = window_has_undefined(&padded_top, row, col, rows, cols);
        info.stats.have_bottom_nan = padded_bottom
            .as_ref()
            .is_some_and(|b| window_has_undefined(b, row, col, rows, cols));
        if spill {
            info.spill_file = job
                .spill_dir
                .as_ref()
                .map(|dir| dir.join(job.tile_file_name(x, y)));
        }

        tasks.push(TileTask {
            tile_no_x: x,
            tile_no_y: y,
            surfaces: surfaces.window(row, col, rows, cols)?,
            info,
        });
    }

    debug!(
        tiles = tasks.len(),
        cells_x = layout.cells_x,
        cells_y = layout.cells_y,
        pixel_mm,
        scale,
        spill,
        "Split raster into tiles"
    );
    Ok(tasks)
}

fn window_has_undefined(
    raster: &Raster,
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> bool {
    (row..row + rows).any(|r| (col..col + cols).any(|c| raster.get(r, c).is_nan()))
}
