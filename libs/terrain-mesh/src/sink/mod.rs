//! # Triangle Sinks
//!
//! Byte destinations for serialized triangles.
//!
//! ## Architecture
//!
//! ```text
//! Cell -> TriangleWriter (format encoding) -> Sink (bytes)
//!                                              ├─ MemorySink (Vec<u8>)
//!                                              └─ SpillSink  (chunked file)
//! ```
//!
//! Binary STL and OBJ both need a prefix that is only known once every
//! triangle has been seen (the triangle count, the vertex list). Sinks
//! therefore take the prefix at [`Sink::finish`] and place it in front of
//! the body.

mod memory;
mod spill;
mod writer;


use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub use memory::MemorySink;
pub use spill::SpillSink;
pub use writer::TriangleWriter;

use crate::error::MeshError;

/// Writes a prefix into the final output.
pub type PrefixFn<'a> = Box<dyn FnOnce(&mut dyn Write) -> io::Result<()> + 'a>;

// =============================================================================
// TILE OUTPUT
// =============================================================================

/// Result of a finished tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutput {
    /// Complete file contents.
    Buffer(Vec<u8>),
    /// Complete file written to this path.
    File(PathBuf),
    /// No triangles were produced; nothing to package.
    Empty,
}

impl TileOutput {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, TileOutput::Empty)
    }

    /// Size of the serialized tile in bytes.
    pub fn byte_len(&self) -> Result<u64, MeshError> {
        match self {
            TileOutput::Buffer(b) => Ok(b.len() as u64),
            TileOutput::File(path) => Ok(fs::metadata(path)?.len()),
            TileOutput::Empty => Ok(0),
        }
    }

    /// Reads the full contents into memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MeshError> {
        match self {
            TileOutput::Buffer(b) => Ok(b.clone()),
            TileOutput::File(path) => Ok(fs::read(path)?),
            TileOutput::Empty => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Destination of serialized triangle records.
pub trait Sink {
    /// Writes bytes that are not a record (format preamble).
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), MeshError>;

    /// Writes one triangle record.
    fn write_record(&mut self, record: &[u8]) -> Result<(), MeshError>;

    /// Records written so far.
    fn records(&self) -> u64;

    /// Bytes held in memory and not yet on disk.
    fn bytes_pending(&self) -> usize;

    /// Completes the output: `prefix` goes before everything written so
    /// far, `suffix` after it.
    ///
    /// Returns [`TileOutput::Empty`] if no record was written.
    fn finish(self, prefix: Option<PrefixFn<'_>>, suffix: &[u8]) -> Result<TileOutput, MeshError>;

    /// Drops everything written, removing any file.
    fn discard(self);
}
