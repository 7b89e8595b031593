//! # Tri-Cell Rules
//!
//! A cell whose open sides are two adjacent directions touches its
//! diagonal neighbour only at one corner. That corner is cut off: the
//! surfaces become triangles and the two walls become one diagonal wall.
//!
//! Opposite pairs (N+S, E+W) and any other border count are left alone.

use super::{Borders, Corner, Direction};

/// Collapse rule for one adjacent border pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriCellRule {
    /// The two open sides.
    pub borders: [Direction; 2],
    /// Top triangle corners (normal up).
    pub top: [Corner; 3],
    /// Bottom triangle corners (normal down).
    pub bottom: [Corner; 3],
    /// Top edge of the diagonal wall, `(from, to)`.
    pub diagonal: (Corner, Corner),
    /// Wall slot that receives the diagonal wall.
    pub keep: Direction,
    /// Wall slot that is emptied.
    pub clear: Direction,
}

impl TriCellRule {
    /// The corner that is cut away.
    pub fn removed_corner(&self) -> Option<Corner> {
        Corner::ALL.into_iter().find(|c| !self.top.contains(c))
    }
}

use Corner::{NorthEast as NE, NorthWest as NW, SouthEast as SE, SouthWest as SW};
use Direction::{East, North, South, West};

/// The four adjacent-pair configurations.
pub const TRI_CELL_RULES: [TriCellRule; 4] = [
    TriCellRule {
        borders: [North, West],
        top: [NE, SW, SE],
        bottom: [NE, SE, SW],
        diagonal: (SW, NE),
        keep: North,
        clear: West,
    },
    TriCellRule {
        borders: [North, East],
        top: [NW, SW, SE],
        bottom: [NW, SE, SW],
        diagonal: (NW, SE),
        keep: North,
        clear: East,
    },
    TriCellRule {
        borders: [South, East],
        top: [NE, NW, SW],
        bottom: [SW, NW, NE],
        diagonal: (NE, SW),
        keep: South,
        clear: East,
    },
    TriCellRule {
        borders: [South, West],
        top: [SE, NE, NW],
        bottom: [NW, NE, SE],
        diagonal: (SE, NW),
        keep: South,
        clear: West,
    },
];

/// Returns the rule for `borders`, if it is exactly one adjacent pair.
pub fn rule_for(borders: Borders) -> Option<&'static TriCellRule> {
    if borders.count() != 2 {
        return None;
    }
    TRI_CELL_RULES
        .iter()
        .find(|r| r.borders.iter().all(|d| borders.contains(*d)))
}
