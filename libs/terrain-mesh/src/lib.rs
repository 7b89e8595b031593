//! # Terrain Mesh
//!
//! Tessellates padded elevation rasters (DEMs) into printable terrain
//! blocks and serializes them as binary STL, ASCII STL or OBJ.
//!
//! ## Architecture
//!
//! ```text
//! Raster ─> preprocess ─> CellBuilder ─> TriangleWriter ─> Sink
//!               (dilate,       │  ▲            │
//!                diagonals)    │  └ Placement  └ MemorySink | SpillSink
//!                              └──> VertexPool <── (OBJ indices)
//! ```
//!
//! ## Invariants
//!
//! - A cell exists only if its center and all four corner heights are
//!   defined. Dropped positions produce no geometry and no error.
//! - Corner heights are a function of the corner's grid position, so
//!   cells (and tiles) sharing a corner produce bit-identical vertices.
//! - Every vertex pool belongs to one tile build.
//!
//! ## Usage
//!
//! ```rust
//! use terrain_mesh::{build_tile, Bottom, OutputFormat, Raster, TileInfo};
//!
//! let dem = Raster::from_rows(vec![
//!     vec![410.0, 412.0, 415.0],
//!     vec![409.0, 411.0, 413.0],
//! ]).unwrap();
//! let mut info = TileInfo::new(1.0, 1000.0, 409.0, 415.0, 3.0, 2.0, OutputFormat::Obj);
//! let out = build_tile(dem.pad_edge(), Bottom::Flat, &mut info).unwrap();
//! assert!(!out.is_empty());
//! assert_eq!(info.stats.triangle_count, 6 * 2 + 10 * 2 + 2);
//! ```

pub mod builder;
pub mod cell;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod preprocess;
pub mod raster;
pub mod sink;
pub mod tessellate;
pub mod tile_info;
pub mod vertex;

pub use builder::{BottomSurface, BuildOptions, CellBuilder, CellGrid};
pub use cell::{Borders, Cell, CellCorners, Corner, Direction};
pub use error::MeshError;
pub use geometry::{Quad, Triangle};
pub use placement::{Bounds, HeightMapping, Placement};
pub use raster::Raster;
pub use sink::{MemorySink, Sink, SpillSink, TileOutput, TriangleWriter};
pub use tessellate::{
    build_tile, build_tile_from_surfaces, prepare_surfaces, prepare_tile, tile_from_surfaces,
    Bottom, PreparedTile, Surfaces,
};
pub use tile_info::{Centering, OutputFormat, TileInfo, TileStats};
pub use vertex::{Vertex, VertexPool};
