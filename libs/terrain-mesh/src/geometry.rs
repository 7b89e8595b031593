//! # Quad and Triangle Primitives
//!
//! Building blocks of a cell. A [`Quad`] is 3 or 4 vertices wound so that
//! the triangles it decomposes into face outward.

use glam::DVec3;

use crate::vertex::Vertex;

// =============================================================================
// TRIANGLE
// =============================================================================

/// Three vertices in counter-clockwise order seen from outside the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    /// Creates a triangle.
    #[inline]
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unit normal of `(v1 - v0) x (v2 - v0)`.
    ///
    /// Degenerate triangles yield the zero vector.
    ///
    /// # Example
    ///
    /// ```rust
    /// use terrain_mesh::{Triangle, Vertex};
    ///
    /// let t = Triangle::new(
    ///     Vertex::new(0.0, 0.0, 0.0),
    ///     Vertex::new(1.0, 0.0, 0.0),
    ///     Vertex::new(0.0, 1.0, 0.0),
    /// );
    /// assert_eq!(t.normal().z, 1.0);
    /// ```
    pub fn normal(&self) -> DVec3 {
        let [a, b, c] = self.vertices.map(Vertex::to_dvec3);
        (b - a).cross(c - a).normalize_or_zero()
    }
}

// =============================================================================
// QUAD
// =============================================================================

/// A wound polygon of 3 or 4 vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quad {
    Tri([Vertex; 3]),
    Quad([Vertex; 4]),
}

impl Quad {
    /// Creates a four-vertex quad.
    #[inline]
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex, v3: Vertex) -> Self {
        Quad::Quad([v0, v1, v2, v3])
    }

    /// Creates a three-vertex quad (a collapsed tri-cell surface).
    #[inline]
    pub fn tri(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Quad::Tri([v0, v1, v2])
    }

    /// Vertices in winding order.
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            Quad::Tri(v) => v,
            Quad::Quad(v) => v,
        }
    }

    /// Number of triangles this quad decomposes into.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        match self {
            Quad::Tri(_) => 1,
            Quad::Quad(_) => 2,
        }
    }

    /// Decomposes into `(v0, v1, v2)` and, for four vertices, `(v0, v2, v3)`.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> {
        let (first, second) = match *self {
            Quad::Tri([a, b, c]) => (Triangle::new(a, b, c), None),
            Quad::Quad([a, b, c, d]) => (Triangle::new(a, b, c), Some(Triangle::new(a, c, d))),
        };
        std::iter::once(first).chain(second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f64, y: f64, z: f64) -> Vertex {
        Vertex::new(x, y, z)
    }

    #[test]
    fn test_normal_is_unit_length() {
        let t = Triangle::new(v(0.0, 0.0, 0.0), v(3.0, 0.0, 0.0), v(0.0, 0.0, 2.0));
        let n = t.normal();
        assert_relative_eq!(n.length(), 1.0);
        assert_relative_eq!(n.y, -1.0);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let t = Triangle::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), v(2.0, 2.0, 2.0));
        assert_eq!(t.normal(), DVec3::ZERO);
    }

    #[test]
    fn test_quad_splits_along_first_diagonal() {
        let q = Quad::new(v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0));
        let tris: Vec<_> = q.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].vertices[2], v(1.0, 0.0, 0.0));
        assert_eq!(tris[1].vertices, [v(0.0, 1.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0)]);
        for t in tris {
            assert_relative_eq!(t.normal().z, 1.0);
        }
    }

    #[test]
    fn test_tri_yields_one_triangle() {
        let q = Quad::tri(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        assert_eq!(q.triangle_count(), 1);
        assert_eq!(q.triangles().count(), 1);
        assert_eq!(q.vertices().len(), 3);
    }
}
