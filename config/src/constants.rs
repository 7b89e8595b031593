//! # Configuration Constants
//!
//! Centralized constants for the terrain pipeline. File layout values,
//! streaming thresholds and elevation tolerances are defined here.
//!
//! ## Categories
//!
//! - **File Layout**: Binary/ASCII STL and OBJ framing
//! - **Streaming**: Spill-file chunking and memory-only thresholds
//! - **Elevation**: Unit conversion and coincidence tolerances
//! - **Preprocessing**: Hole filling defaults

// =============================================================================
// FILE LAYOUT CONSTANTS
// =============================================================================

/// Size of the fixed binary STL header in bytes.
///
/// The header is free text that must not start with `solid`, otherwise some
/// readers mistake the file for ASCII STL.
pub const STL_HEADER_BYTES: usize = 80;

/// Size of one binary STL facet record in bytes.
///
/// 12 little-endian `f32` values (normal + 3 vertices) and a `u16`
/// attribute byte count.
///
/// # Example
///
/// ```rust
/// use config::constants::STL_FACET_BYTES;
///
/// assert_eq!(STL_FACET_BYTES, 12 * 4 + 2);
/// ```
pub const STL_FACET_BYTES: usize = 50;

/// Text placed at the start of every binary STL header.
pub const BINARY_STL_HEADER_TEXT: &str = "Binary STL Writer";

/// Name used in `solid <name>` / `endsolid <name>` of ASCII STL files.
pub const ASCII_STL_SOLID_NAME: &str = "digital_elevation_model";

/// OBJ group name of the vertex section.
pub const OBJ_VERTEX_GROUP: &str = "vert";

/// OBJ group name of the face section.
pub const OBJ_FACE_GROUP: &str = "tris";

// =============================================================================
// STREAMING CONSTANTS
// =============================================================================

/// Default number of triangles buffered before a spill-file flush.
///
/// Bounds peak memory of the output buffer to roughly
/// `DEFAULT_SPILL_CHUNK_TRIANGLES * STL_FACET_BYTES` for binary STL.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SPILL_CHUNK_TRIANGLES;
///
/// let user_chunk: Option<usize> = None;
/// assert_eq!(user_chunk.unwrap_or(DEFAULT_SPILL_CHUNK_TRIANGLES), 100_000);
/// ```
pub const DEFAULT_SPILL_CHUNK_TRIANGLES: usize = 100_000;

/// Full-raster cell count above which tiles are written through spill files.
pub const DEFAULT_MAX_CELLS_FOR_MEMORY_ONLY: usize = 500 * 500 * 4;

/// Suffix appended to a spill file while its header is synthesized.
pub const SPILL_BODY_SUFFIX: &str = "body";

// =============================================================================
// ELEVATION CONSTANTS
// =============================================================================

/// Millimetres per metre, used to turn the horizontal scale number into a
/// metre to model-millimetre factor.
pub const MM_PER_METER: f64 = 1000.0;

/// Absolute tolerance (source elevation units) under which a top and a bottom
/// elevation are considered the same surface.
///
/// Such cells carry no material and are removed from both surfaces.
pub const COINCIDENT_ELEVATION_TOLERANCE: f64 = 0.001;

// =============================================================================
// PREPROCESSING CONSTANTS
// =============================================================================

/// Hole filling passes run before diagonal cleanup.
pub const DEFAULT_FILL_HOLE_ITERATIONS: usize = 1;

/// Defined 8-neighbours an undefined cell needs before it is filled.
///
/// 8 means only fully enclosed single-cell holes are filled.
pub const DEFAULT_FILL_HOLE_NEIGHBORS: usize = 8;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Returns the exact byte size of a binary STL file with `triangles` facets.
///
/// # Example
///
/// ```rust
/// use config::constants::binary_stl_size;
///
/// assert_eq!(binary_stl_size(0), 84);
/// assert_eq!(binary_stl_size(12), 84 + 600);
/// ```
#[inline]
pub fn binary_stl_size(triangles: u64) -> u64 {
    (STL_HEADER_BYTES + 4) as u64 + triangles * STL_FACET_BYTES as u64
}

/// Converts a horizontal scale number (1:scale) into the factor that turns
/// metres of real elevation into model millimetres.
///
/// # Example
///
/// ```rust
/// use config::constants::mm_per_source_unit;
///
/// // 1:1000 -> 1 m real is 1 mm in the model
/// assert_eq!(mm_per_source_unit(1000.0), 1.0);
/// ```
#[inline]
pub fn mm_per_source_unit(scale: f64) -> f64 {
    MM_PER_METER / scale
}
