//! Parallel tile builds.
//!
//! One rayon task per tile. Tasks share nothing: each one owns its
//! windows, its `TileInfo`, its vertex pool and its sink. A failing tile
//! is reported in its [`TileResult`] and never stops its siblings.
//!
//! A tile that fails while writing leaves no spill file behind. A tile
//! that fails before its sink exists never touches the spill path.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use terrain_mesh::{build_tile_from_surfaces, MeshError, Raster, TileInfo, TileOutput};
use tracing::{info, warn};

use crate::error::TileError;
use crate::job::TerrainJob;
use crate::split::{split_tiles_with_bottom, TileTask};

/// Outcome of one tile build.
#[derive(Debug)]
pub struct TileResult {
    pub tile_no_x: u32,
    pub tile_no_y: u32,
    /// Tile configuration with `stats` filled in by the build.
    pub info: TileInfo,
    pub outcome: Result<TileOutput, MeshError>,
}

impl TileResult {
    /// `{name}_tile_{x}_{y}.{stl|obj}`
    pub fn file_name(&self, name: &str) -> String {
        format!(
            "{}_tile_{}_{}.{}",
            name,
            self.tile_no_x,
            self.tile_no_y,
            self.info.format.extension()
        )
    }

    /// True if the tile built without producing any triangle.
    pub fn is_empty(&self) -> bool {
        matches!(self.outcome, Ok(TileOutput::Empty))
    }

    pub fn is_err(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Totals over a finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub tiles: usize,
    pub empty: usize,
    pub failed: usize,
    pub triangles: u64,
    pub bytes: u64,
}

impl JobSummary {
    pub fn from_results(results: &[TileResult]) -> Self {
        let mut summary = Self {
            tiles: results.len(),
            ..Self::default()
        };
        for r in results {
            match &r.outcome {
                Err(_) => summary.failed += 1,
                Ok(TileOutput::Empty) => summary.empty += 1,
                Ok(_) => {
                    summary.triangles += r.info.stats.triangle_count;
                    summary.bytes += r.info.stats.byte_size;
                }
            }
        }
        summary
    }
}

/// Splits `full` and builds every tile of `job`.
///
/// Results come back in tile order (row by row from the north-west),
/// whatever order the workers finish in.
pub fn process_tiles(full: &Raster, job: &TerrainJob) -> Result<Vec<TileResult>, TileError> {
    process_tiles_with_bottom(full, None, job)
}

/// Like [`process_tiles`], with a bottom elevation raster.
pub fn process_tiles_with_bottom(
    full: &Raster,
    bottom: Option<&Raster>,
    job: &TerrainJob,
) -> Result<Vec<TileResult>, TileError> {
    let tasks = split_tiles_with_bottom(full, bottom, job)?;
    let results = run_tasks(tasks, job.threads)?;

    let summary = JobSummary::from_results(&results);
    info!(
        name = %job.name,
        tiles = summary.tiles,
        empty = summary.empty,
        failed = summary.failed,
        triangles = summary.triangles,
        bytes = summary.bytes,
        "Finished terrain job"
    );
    Ok(results)
}

/// Builds prepared tasks on a dedicated worker pool.
///
/// `threads` of `None` or 0 uses one worker per core.
pub fn run_tasks(
    tasks: Vec<TileTask>,
    threads: Option<usize>,
) -> Result<Vec<TileResult>, TileError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or(0))
        .build()?;
    info!(
        tiles = tasks.len(),
        threads = pool.current_num_threads(),
        "Building tiles"
    );
    Ok(pool.install(|| tasks.into_par_iter().map(run_task).collect()))
}

fn run_task(task: TileTask) -> TileResult {
    let TileTask {
        tile_no_x,
        tile_no_y,
        surfaces,
        mut info,
    } = task;

    let outcome = build_tile_from_surfaces(surfaces, &mut info);
    if let Err(e) = &outcome {
        warn!(tile_x = tile_no_x, tile_y = tile_no_y, error = %e, "Tile failed");
    }
    TileResult {
        tile_no_x,
        tile_no_y,
        info,
        outcome,
    }
}
