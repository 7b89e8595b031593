//! Diagonal (checkerboard) cleanup.
//!
//! Hit-or-miss matching with the two 2x2 structuring elements
//!
//! ```text
//!   1 0        0 1
//!   0 1        1 0
//! ```
//!
//! where `1` is defined and `0` undefined. A match means two defined
//! cells touch only at a corner.

use tracing::debug;

use crate::raster::Raster;

/// Boolean defined/undefined view of a raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedMask {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl DefinedMask {
    pub fn from_raster(raster: &Raster) -> Self {
        Self {
            rows: raster.rows(),
            cols: raster.cols(),
            bits: raster.values().iter().map(|v| !v.is_nan()).collect(),
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.cols + col]
    }

    /// Cells to clear, one per matched 2x2 block, in row-major order.
    ///
    /// The defined member in the lower (southern) row of each match is
    /// picked.
    pub fn matches(&self) -> Vec<(usize, usize)> {
        let mut hits = Vec::new();
        for r in 0..self.rows.saturating_sub(1) {
            for c in 0..self.cols.saturating_sub(1) {
                let nw = self.get(r, c);
                let ne = self.get(r, c + 1);
                let sw = self.get(r + 1, c);
                let se = self.get(r + 1, c + 1);
                if nw && se && !ne && !sw {
                    hits.push((r + 1, c + 1));
                } else if ne && sw && !nw && !se {
                    hits.push((r + 1, c));
                }
            }
        }
        hits
    }

    /// Returns true if any 2x2 block is a checkerboard.
    pub fn has_checkerboard(&self) -> bool {
        !self.matches().is_empty()
    }
}

/// Clears checkerboard members until no 2x2 block matches.
///
/// Returns the number of passes run, including the final pass that found
/// nothing.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{preprocess::{clean_up_diagonals, DefinedMask}, Raster};
///
/// let nan = f64::NAN;
/// let mut r = Raster::from_rows(vec![
///     vec![1.0, nan],
///     vec![nan, 1.0],
/// ]).unwrap();
/// assert_eq!(clean_up_diagonals(&mut r), 2);
/// assert!(!DefinedMask::from_raster(&r).has_checkerboard());
/// assert!(r.is_defined(0, 0));
/// ```
pub fn clean_up_diagonals(raster: &mut Raster) -> usize {
    let mut passes = 0;
    loop {
        passes += 1;
        let hits = DefinedMask::from_raster(raster).matches();
        if hits.is_empty() {
            break;
        }
        debug!(pass = passes, cleared = hits.len(), "Diagonal cleanup pass");
        for (r, c) in hits {
            raster.set(r, c, f64::NAN);
        }
    }
    passes
}
