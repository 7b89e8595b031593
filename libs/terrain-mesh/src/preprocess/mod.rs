//! # Raster Preprocessors
//!
//! Filters applied once per tile before cells are built, only when the
//! raster contains undefined cells.
//!
//! - [`dilate`] / [`dilate_pair`]: grow the defined region by one ring so
//!   corner interpolation at the boundary has values to average.
//! - [`fill_holes`]: close small enclosed holes.
//! - [`clean_up_diagonals`]: remove 2x2 checkerboard adjacency until the
//!   defined region is 4-connected.

mod diagonals;
mod dilate;


pub use diagonals::{clean_up_diagonals, DefinedMask};
pub use dilate::{dilate, dilate_pair, fill_holes};

use crate::raster::Raster;

/// Mean of the defined cells in the 3x3 window around `(row, col)`.
///
/// Returns the mean and the number of defined cells, excluding the center
/// from the count when `skip_center` is set.
pub(crate) fn window_mean(
    raster: &Raster,
    row: usize,
    col: usize,
    skip_center: bool,
) -> (f64, usize) {
    let r0 = row.saturating_sub(1);
    let c0 = col.saturating_sub(1);
    let r1 = (row + 1).min(raster.rows().saturating_sub(1));
    let c1 = (col + 1).min(raster.cols().saturating_sub(1));
    let mut sum = 0.0;
    let mut n = 0;
    for r in r0..=r1 {
        for c in c0..=c1 {
            if skip_center && r == row && c == col {
                continue;
            }
            let v = raster.get(r, c);
            if !v.is_nan() {
                sum += v;
                n += 1;
            }
        }
    }
    if n == 0 {
        (f64::NAN, 0)
    } else {
        (sum / n as f64, n)
    }
}
