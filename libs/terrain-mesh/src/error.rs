//! # Mesh Errors
//!
//! Error types for tile tessellation.
//!
//! Geometry gaps (cells whose corners cannot be resolved) are not errors:
//! such cells are silently omitted. Everything here is fatal for the tile.

use thiserror::Error;

/// Errors that can occur while building or serializing one tile.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Invalid or inconsistent configuration value
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Output format selector not recognized
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// Bottom raster does not have the top raster's shape
    #[error("Bottom raster is {bottom_rows}x{bottom_cols}, top raster is {top_rows}x{top_cols}")]
    ShapeMismatch {
        top_rows: usize,
        top_cols: usize,
        bottom_rows: usize,
        bottom_cols: usize,
    },

    /// Raster data does not describe a usable grid
    #[error("Invalid raster: {message}")]
    InvalidRaster { message: String },

    /// Spill file could not be created, written or finalized
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration record could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary STL triangle count does not fit the 32-bit header field
    #[error("Too many triangles for binary STL: {count} (max: {max})")]
    TooManyTriangles { count: u64, max: u64 },

    /// Indexed output referenced a vertex that was never registered
    #[error("Vertex ({x}, {y}, {z}) is not registered in the vertex pool")]
    UnregisteredVertex { x: f64, y: f64, z: f64 },
}

impl MeshError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid raster error.
    pub fn invalid_raster(message: impl Into<String>) -> Self {
        Self::InvalidRaster {
            message: message.into(),
        }
    }
}
