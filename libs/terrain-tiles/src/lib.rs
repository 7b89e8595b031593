//! # Terrain Tiles
//!
//! Map phase of a tiled terrain build: one full elevation raster becomes
//! `ntiles_x * ntiles_y` independent tile builds.
//!
//! ## Architecture
//!
//! ```text
//! full Raster ─> pad once ─> prepare_surfaces ─> TileLayout windows ─> TileTask per tile
//!                                                                          │
//!                                     rayon pool ─> build_tile_from_surfaces ─> TileResult
//! ```
//!
//! Holes are filled and dilated and heights are mapped once for the whole
//! raster. Neighbouring windows overlap by one cell, so each tile's padding
//! ring holds the same preprocessed data as the tile next to it and seams
//! line up exactly.
//!
//! ## Usage
//!
//! ```rust
//! use terrain_mesh::Raster;
//! use terrain_tiles::{process_tiles, JobSummary, TerrainJob};
//!
//! let full = Raster::filled(4, 6, 120.0);
//! let mut job = TerrainJob::new("demo", 60.0, 30.0);
//! job.ntiles_x = 2;
//! job.threads = Some(2);
//!
//! let results = process_tiles(&full, &job).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[1].file_name(&job.name), "demo_tile_2_1.stl");
//! assert_eq!(JobSummary::from_results(&results).failed, 0);
//! ```

pub mod error;
pub mod job;
pub mod layout;
pub mod process;
pub mod split;

pub use error::TileError;
pub use job::TerrainJob;
pub use layout::TileLayout;
pub use process::{process_tiles, process_tiles_with_bottom, run_tasks, JobSummary, TileResult};
pub use split::{split_tiles, split_tiles_with_bottom, TileTask};
