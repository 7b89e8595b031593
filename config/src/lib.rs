//! # Config Crate
//!
//! Centralized configuration constants for the terrain tessellation pipeline.
//! All magic numbers and tunable parameters are defined here so the mesh core
//! and the tiling driver agree on file layouts and thresholds.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{STL_FACET_BYTES, STL_HEADER_BYTES, binary_stl_size};
//!
//! // A binary STL with 2 triangles: 80 byte header + 4 byte count + 2 records
//! assert_eq!(binary_stl_size(2), (STL_HEADER_BYTES + 4 + 2 * STL_FACET_BYTES) as u64);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Slicer Compatible**: File layout constants match the STL/OBJ conventions
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
