//! # Cell
//!
//! The unit of tessellation for one raster position: a top surface, an
//! optional bottom surface and up to four walls.
//!
//! ## Winding
//!
//! ```text
//!   NW ---- NE        top:    NW SW SE NE   (normal up)
//!   |        |        bottom: NW NE SE SW   (normal down)
//!   |        |        walls face away from the cell
//!   SW ---- SE
//! ```
//!
//! A cell with exactly two adjacent borders is collapsed into a tri-cell
//! by [`Cell::collapse_tri_cell`], driven by [`rules::TRI_CELL_RULES`].

pub mod rules;


use crate::geometry::{Quad, Triangle};
use crate::vertex::Vertex;

pub use rules::{TriCellRule, TRI_CELL_RULES};

// =============================================================================
// DIRECTION / CORNER
// =============================================================================

/// Compass direction of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in emission order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Slot of the direction in [`Cell::walls`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row/column step towards the neighbour in this direction.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Corner of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
    ];

    /// Slot of the corner in [`CellCorners`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Grid offset of the corner relative to the cell's north-west corner.
    #[inline]
    pub const fn grid_offset(self) -> (usize, usize) {
        match self {
            Corner::NorthWest => (0, 0),
            Corner::NorthEast => (0, 1),
            Corner::SouthEast => (1, 1),
            Corner::SouthWest => (1, 0),
        }
    }
}

// =============================================================================
// BORDERS
// =============================================================================

/// Set of directions that need a wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Borders(u8);

impl Borders {
    /// No walls.
    pub const NONE: Borders = Borders(0);

    /// All four walls.
    pub const ALL: Borders = Borders(0b1111);

    /// Creates a set from a list of directions.
    pub fn from_directions(dirs: &[Direction]) -> Self {
        let mut b = Borders::NONE;
        for &d in dirs {
            b.insert(d);
        }
        b
    }

    #[inline]
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    #[inline]
    pub fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    /// Number of directions in the set.
    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Directions in emission order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

// =============================================================================
// CORNERS
// =============================================================================

/// Top and bottom vertex of every corner, indexed by [`Corner::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCorners {
    pub top: [Vertex; 4],
    pub bottom: [Vertex; 4],
}

impl CellCorners {
    #[inline]
    pub fn top(&self, corner: Corner) -> Vertex {
        self.top[corner.index()]
    }

    #[inline]
    pub fn bottom(&self, corner: Corner) -> Vertex {
        self.bottom[corner.index()]
    }

    /// Wall on the given side of the cell.
    pub fn side_wall(&self, dir: Direction) -> Quad {
        use Corner::*;
        let (t, b) = (|c: Corner| self.top(c), |c: Corner| self.bottom(c));
        match dir {
            Direction::North => Quad::new(b(NorthWest), t(NorthWest), t(NorthEast), b(NorthEast)),
            Direction::South => Quad::new(b(SouthEast), t(SouthEast), t(SouthWest), b(SouthWest)),
            Direction::East => Quad::new(t(NorthEast), t(SouthEast), b(SouthEast), b(NorthEast)),
            Direction::West => Quad::new(t(SouthWest), t(NorthWest), b(NorthWest), b(SouthWest)),
        }
    }

    /// Diagonal wall whose top edge runs from `from` to `to`.
    ///
    /// The outside of the wall lies to the left of that edge seen from above.
    pub fn diagonal_wall(&self, from: Corner, to: Corner) -> Quad {
        Quad::new(self.top(from), self.top(to), self.bottom(to), self.bottom(from))
    }
}

// =============================================================================
// CELL
// =============================================================================

/// Geometry of one raster position.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Upper surface.
    pub top: Quad,
    /// Lower surface, absent with the flat-bottom fast path or no-bottom mode.
    pub bottom: Option<Quad>,
    /// Walls indexed by [`Direction::index`].
    pub walls: [Option<Quad>; 4],
    /// True once collapsed by a tri-cell rule.
    pub tri_cell: bool,
}

impl Cell {
    /// Builds a full (square) cell.
    pub fn new(corners: &CellCorners, borders: Borders, with_bottom: bool) -> Self {
        use Corner::*;
        let top = Quad::new(
            corners.top(NorthWest),
            corners.top(SouthWest),
            corners.top(SouthEast),
            corners.top(NorthEast),
        );
        let bottom = with_bottom.then(|| {
            Quad::new(
                corners.bottom(NorthWest),
                corners.bottom(NorthEast),
                corners.bottom(SouthEast),
                corners.bottom(SouthWest),
            )
        });
        let mut walls = [None; 4];
        for dir in borders.iter() {
            walls[dir.index()] = Some(corners.side_wall(dir));
        }
        Self {
            top,
            bottom,
            walls,
            tri_cell: false,
        }
    }

    /// Collapses the cell into a tri-cell when `borders` is one of the four
    /// adjacent pairs. Returns true if a rule applied.
    pub fn collapse_tri_cell(&mut self, corners: &CellCorners, borders: Borders) -> bool {
        let Some(rule) = rules::rule_for(borders) else {
            return false;
        };
        let [a, b, c] = rule.top.map(|k| corners.top(k));
        self.top = Quad::tri(a, b, c);
        if self.bottom.is_some() {
            let [a, b, c] = rule.bottom.map(|k| corners.bottom(k));
            self.bottom = Some(Quad::tri(a, b, c));
        }
        let (from, to) = rule.diagonal;
        self.walls[rule.keep.index()] = Some(corners.diagonal_wall(from, to));
        self.walls[rule.clear.index()] = None;
        self.tri_cell = true;
        true
    }

    /// Wall in the given direction.
    #[inline]
    pub fn wall(&self, dir: Direction) -> Option<&Quad> {
        self.walls[dir.index()].as_ref()
    }

    /// Quads in emission order: top, bottom, then walls N, S, E, W.
    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        std::iter::once(&self.top)
            .chain(self.bottom.as_ref())
            .chain(self.walls.iter().flatten())
    }

    /// Triangles in emission order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.quads().flat_map(Quad::triangles)
    }

    /// Number of triangles this cell emits.
    pub fn triangle_count(&self) -> usize {
        self.quads().map(Quad::triangle_count).sum()
    }

    /// Vertices of every emitted quad in emission order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.quads().flat_map(|q| q.vertices().iter().copied())
    }
}
