//! Dilation and hole filling.

use tracing::debug;

use super::window_mean;
use crate::raster::Raster;

/// Grows the defined region by exactly one ring.
///
/// Every undefined cell with at least one defined 8-neighbour becomes
/// defined. Its value comes from `fallback` where that is defined, else
/// from the mean of the defined cells around it. Growth is computed from
/// the input only, so cells defined in this pass do not feed each other.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{preprocess::dilate, Raster};
///
/// let nan = f64::NAN;
/// let r = Raster::from_rows(vec![
///     vec![nan, nan, nan, nan],
///     vec![nan, 2.0, 4.0, nan],
///     vec![nan, nan, nan, nan],
/// ]).unwrap();
/// let d = dilate(&r, None);
/// assert!(!d.has_undefined());
/// assert_eq!(d.get(0, 0), 2.0);
/// assert_eq!(d.get(2, 1), 3.0);
/// ```
pub fn dilate(raster: &Raster, fallback: Option<&Raster>) -> Raster {
    let mut out = raster.clone();
    let mut grown = 0usize;
    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            if raster.is_defined(row, col) {
                continue;
            }
            let (mean, n) = window_mean(raster, row, col, true);
            if n == 0 {
                continue;
            }
            let value = fallback
                .map(|f| f.get(row, col))
                .filter(|v| !v.is_nan())
                .unwrap_or(mean);
            out.set(row, col, value);
            grown += 1;
        }
    }
    debug!(grown, "Dilated raster");
    out
}

/// Dilates a top and a bottom raster together.
///
/// After both have grown, any top value below its bottom value is lifted
/// to the bottom so walls along the new boundary are never inverted.
pub fn dilate_pair(
    top: &Raster,
    bottom: &Raster,
    top_fallback: Option<&Raster>,
    bottom_fallback: Option<&Raster>,
) -> (Raster, Raster) {
    let mut top = dilate(top, top_fallback);
    let bottom = dilate(bottom, bottom_fallback);
    for row in 0..top.rows().min(bottom.rows()) {
        for col in 0..top.cols().min(bottom.cols()) {
            let (t, b) = (top.get(row, col), bottom.get(row, col));
            if t < b {
                top.set(row, col, b);
            }
        }
    }
    (top, bottom)
}

/// Fills undefined cells with at least `min_neighbors` defined 8-neighbours.
///
/// Runs `iterations` passes; each pass reads the result of the previous
/// one. Returns the total number of filled cells.
pub fn fill_holes(raster: &mut Raster, iterations: usize, min_neighbors: usize) -> usize {
    let mut total = 0;
    for pass in 0..iterations {
        let src = raster.clone();
        let mut filled = 0;
        for row in 0..src.rows() {
            for col in 0..src.cols() {
                if src.is_defined(row, col) {
                    continue;
                }
                let (mean, n) = window_mean(&src, row, col, true);
                if n > 0 && n >= min_neighbors {
                    raster.set(row, col, mean);
                    filled += 1;
                }
            }
        }
        debug!(pass, filled, "Filled holes");
        total += filled;
        if filled == 0 {
            break;
        }
    }
    total
}
