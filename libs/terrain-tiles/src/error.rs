//! # Tiling Errors
//!
//! Errors that stop a whole job before any tile is built. Failures of a
//! single tile are reported per tile in [`crate::TileResult::outcome`].

use terrain_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while planning or scheduling a tiled job.
#[derive(Debug, Error)]
pub enum TileError {
    /// Invalid job description
    #[error("Invalid job: {message}")]
    Config { message: String },

    /// Raster has fewer cells than tiles along an axis
    #[error("Raster of {rows}x{cols} cells cannot be split into {ntiles_x}x{ntiles_y} tiles")]
    RasterTooSmall {
        rows: usize,
        cols: usize,
        ntiles_x: u32,
        ntiles_y: u32,
    },

    /// Worker pool could not be started
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Error from the mesh core
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl TileError {
    /// Creates a job configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
