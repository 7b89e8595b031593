//! Format encoding of triangles into a [`Sink`].

use std::io::Write;

use glam::DVec3;

use config::constants::{
    ASCII_STL_SOLID_NAME, BINARY_STL_HEADER_TEXT, OBJ_FACE_GROUP, OBJ_VERTEX_GROUP,
    STL_FACET_BYTES, STL_HEADER_BYTES,
};

use super::{PrefixFn, Sink, TileOutput};
use crate::cell::Cell;
use crate::error::MeshError;
use crate::geometry::Triangle;
use crate::tile_info::OutputFormat;
use crate::vertex::{Vertex, VertexPool};

/// Encodes triangles in one output format and feeds them to a sink.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::sink::{MemorySink, TriangleWriter};
/// use terrain_mesh::{OutputFormat, Triangle, Vertex, VertexPool};
///
/// let pool = VertexPool::disabled();
/// let mut w = TriangleWriter::new(MemorySink::new(), OutputFormat::BinaryStl, false).unwrap();
/// let t = Triangle::new(
///     Vertex::new(0.0, 0.0, 0.0),
///     Vertex::new(1.0, 0.0, 0.0),
///     Vertex::new(0.0, 1.0, 0.0),
/// );
/// w.write_triangle(&t, &pool).unwrap();
/// let bytes = w.finish(&pool).unwrap().to_bytes().unwrap();
/// assert_eq!(bytes.len(), 84 + 50);
/// ```
#[derive(Debug)]
pub struct TriangleWriter<S: Sink> {
    sink: S,
    format: OutputFormat,
    normals: bool,
    triangles: u64,
    record: Vec<u8>,
}

impl<S: Sink> TriangleWriter<S> {
    /// Wraps `sink` and writes the format preamble.
    ///
    /// The sink is discarded if the preamble cannot be written.
    pub fn new(mut sink: S, format: OutputFormat, normals: bool) -> Result<Self, MeshError> {
        let preamble = match format {
            OutputFormat::AsciiStl => format!("solid {}\n", ASCII_STL_SOLID_NAME),
            OutputFormat::Obj => format!("g {}\n", OBJ_FACE_GROUP),
            OutputFormat::BinaryStl => String::new(),
        };
        if !preamble.is_empty() {
            if let Err(e) = sink.write_raw(preamble.as_bytes()) {
                sink.discard();
                return Err(e);
            }
        }
        Ok(Self {
            sink,
            format,
            normals,
            triangles: 0,
            record: Vec::with_capacity(STL_FACET_BYTES),
        })
    }

    /// Triangles written so far.
    #[inline]
    pub fn triangle_count(&self) -> u64 {
        self.triangles
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Bytes the sink holds in memory.
    #[inline]
    pub fn bytes_pending(&self) -> usize {
        self.sink.bytes_pending()
    }

    fn normal(&self, t: &Triangle) -> DVec3 {
        if self.normals {
            t.normal()
        } else {
            DVec3::ZERO
        }
    }

    /// Encodes and writes one triangle.
    pub fn write_triangle(&mut self, t: &Triangle, pool: &VertexPool) -> Result<(), MeshError> {
        self.record.clear();
        match self.format {
            OutputFormat::BinaryStl => {
                if self.triangles >= u64::from(u32::MAX) {
                    return Err(MeshError::TooManyTriangles {
                        count: self.triangles + 1,
                        max: u64::from(u32::MAX),
                    });
                }
                let n = self.normal(t);
                for c in [n.x, n.y, n.z] {
                    self.record.extend_from_slice(&(c as f32).to_le_bytes());
                }
                for v in &t.vertices {
                    for c in [v.x, v.y, v.z] {
                        self.record.extend_from_slice(&(c as f32).to_le_bytes());
                    }
                }
                self.record.extend_from_slice(&0u16.to_le_bytes());
            }
            OutputFormat::AsciiStl => {
                let n = self.normal(t);
                writeln!(self.record, "facet normal {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
                writeln!(self.record, "outer loop")?;
                for v in &t.vertices {
                    writeln!(self.record, "vertex {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
                }
                writeln!(self.record, "endloop")?;
                writeln!(self.record, "endfacet")?;
            }
            OutputFormat::Obj => {
                let [a, b, c] = [
                    obj_index(pool, &t.vertices[0])?,
                    obj_index(pool, &t.vertices[1])?,
                    obj_index(pool, &t.vertices[2])?,
                ];
                writeln!(self.record, "f {} {} {}", a, b, c)?;
            }
        }
        self.sink.write_record(&self.record)?;
        self.triangles += 1;
        Ok(())
    }

    /// Writes every triangle of a cell in emission order.
    pub fn write_cell(&mut self, cell: &Cell, pool: &VertexPool) -> Result<(), MeshError> {
        for t in cell.triangles() {
            self.write_triangle(&t, pool)?;
        }
        Ok(())
    }

    /// Adds the format prefix/suffix and completes the sink.
    pub fn finish(self, pool: &VertexPool) -> Result<TileOutput, MeshError> {
        let count = self.triangles;
        match self.format {
            OutputFormat::BinaryStl => {
                let prefix: PrefixFn<'_> = Box::new(move |out: &mut dyn Write| {
                    let mut header = [0u8; STL_HEADER_BYTES];
                    let text = BINARY_STL_HEADER_TEXT.as_bytes();
                    header[..text.len()].copy_from_slice(text);
                    out.write_all(&header)?;
                    // count was checked against u32::MAX on every write
                    out.write_all(&(count as u32).to_le_bytes())
                });
                self.sink.finish(Some(prefix), &[])
            }
            OutputFormat::AsciiStl => {
                let suffix = format!("endsolid {}", ASCII_STL_SOLID_NAME);
                self.sink.finish(None, suffix.as_bytes())
            }
            OutputFormat::Obj => {
                let prefix: PrefixFn<'_> = Box::new(move |out: &mut dyn Write| {
                    writeln!(out, "g {}", OBJ_VERTEX_GROUP)?;
                    for v in pool.iter() {
                        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
                    }
                    Ok(())
                });
                self.sink.finish(Some(prefix), &[])
            }
        }
    }

    /// Drops the output.
    pub fn discard(self) {
        self.sink.discard();
    }
}

/// 1-based OBJ index of a pooled vertex.
fn obj_index(pool: &VertexPool, v: &Vertex) -> Result<u64, MeshError> {
    pool.index_of(v)
        .map(|id| u64::from(id) + 1)
        .ok_or(MeshError::UnregisteredVertex {
            x: v.x,
            y: v.y,
            z: v.z,
        })
}
