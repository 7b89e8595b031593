//! # Vertices and the Vertex Pool
//!
//! A [`Vertex`] is an immutable 3D point. The [`VertexPool`] gives every
//! distinct coordinate triple a stable id in insertion order, which the OBJ
//! writer uses for its `v` and `f` records.
//!
//! A pool belongs to exactly one tile build. It is created by the caller,
//! passed by `&mut` to the cell builder (registration) and by `&` to the
//! triangle writer (lookup), and dropped with the tile.

use std::collections::HashMap;

use glam::DVec3;

use crate::tile_info::OutputFormat;

// =============================================================================
// VERTEX
// =============================================================================

/// A point of the mesh in model millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate (west to east).
    pub x: f64,
    /// Y coordinate (south to north).
    pub y: f64,
    /// Z coordinate (height).
    pub z: f64,
}

impl Vertex {
    /// Creates a vertex.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the vertex as a glam vector.
    #[inline]
    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Exact-equality identity key.
    ///
    /// `-0.0` is folded onto `0.0` so the key agrees with `==` on coordinates.
    #[inline]
    pub fn key(&self) -> [u64; 3] {
        [fold_zero(self.x), fold_zero(self.y), fold_zero(self.z)]
    }
}

#[inline]
fn fold_zero(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl From<DVec3> for Vertex {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

// =============================================================================
// VERTEX POOL
// =============================================================================

/// Deduplicating vertex registry for indexed output formats.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{Vertex, VertexPool};
///
/// let mut pool = VertexPool::indexed();
/// let a = pool.register(Vertex::new(0.0, 0.0, 1.0));
/// let b = pool.register(Vertex::new(1.0, 0.0, 1.0));
/// let again = pool.register(Vertex::new(0.0, 0.0, 1.0));
/// assert_eq!((a, b, again), (Some(0), Some(1), Some(0)));
/// assert_eq!(pool.len(), 2);
///
/// let mut off = VertexPool::disabled();
/// assert_eq!(off.register(Vertex::new(0.0, 0.0, 1.0)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexPool {
    enabled: bool,
    ids: HashMap<[u64; 3], u32>,
    order: Vec<Vertex>,
}

impl VertexPool {
    /// Creates a pool that assigns ids.
    pub fn indexed() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Creates a pool whose `register` is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Creates the pool matching an output format.
    pub fn for_format(format: OutputFormat) -> Self {
        if format.is_indexed() {
            Self::indexed()
        } else {
            Self::disabled()
        }
    }

    /// Returns true if ids are assigned.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registers a vertex and returns its id.
    ///
    /// Returns `None` for a disabled pool.
    pub fn register(&mut self, vertex: Vertex) -> Option<u32> {
        if !self.enabled {
            return None;
        }
        let next = self.order.len() as u32;
        let id = *self.ids.entry(vertex.key()).or_insert(next);
        if id == next {
            self.order.push(vertex);
        }
        Some(id)
    }

    /// Registers every vertex of an iterator, in order.
    pub fn register_all(&mut self, vertices: impl IntoIterator<Item = Vertex>) {
        if !self.enabled {
            return;
        }
        for v in vertices {
            self.register(v);
        }
    }

    /// Looks up the id of a registered vertex.
    #[inline]
    pub fn index_of(&self, vertex: &Vertex) -> Option<u32> {
        self.ids.get(&vertex.key()).copied()
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing was registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered vertices in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.order.iter()
    }
}
