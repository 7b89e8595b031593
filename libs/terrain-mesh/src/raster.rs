//! # Elevation Raster
//!
//! Row-major 2D grid of `f64` elevations. `NaN` marks an undefined
//! ("no-data") cell. Row 0 is the northern edge, column 0 the western edge.

use crate::error::MeshError;

/// A 2D elevation grid.
///
/// Tiles handed to the builder carry one ring of edge-replicated padding
/// (see [`Raster::pad_edge`]), so a tile with `n x m` cells is stored as
/// `(n + 2) x (m + 2)`.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::Raster;
///
/// let r = Raster::from_rows(vec![vec![1.0, 2.0], vec![3.0, f64::NAN]]).unwrap();
/// assert_eq!(r.rows(), 2);
/// assert!(r.has_undefined());
/// assert_eq!(r.nan_max(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Raster {
    /// Creates a raster from row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, MeshError> {
        if data.len() != rows * cols {
            return Err(MeshError::invalid_raster(format!(
                "{} values do not fill a {}x{} grid",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a raster from a list of equally long rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MeshError> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(MeshError::invalid_raster("rows have different lengths"));
        }
        let n = rows.len();
        Self::new(n, cols, rows.into_iter().flatten().collect())
    }

    /// Creates a raster with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if `other` has the same dimensions.
    #[inline]
    pub fn same_shape(&self, other: &Raster) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Returns the value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Sets the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Returns true if the cell holds a defined (non-NaN) value.
    #[inline]
    pub fn is_defined(&self, row: usize, col: usize) -> bool {
        !self.get(row, col).is_nan()
    }

    /// Raw row-major values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Returns true if any cell is undefined.
    pub fn has_undefined(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }

    /// Returns true if every cell is undefined (or the raster is empty).
    pub fn all_undefined(&self) -> bool {
        self.data.iter().all(|v| v.is_nan())
    }

    /// Smallest defined value, `None` if nothing is defined.
    pub fn nan_min(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
    }

    /// Largest defined value, `None` if nothing is defined.
    pub fn nan_max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    /// Applies `f` to every defined cell. Undefined cells stay undefined.
    pub fn map_defined(&mut self, f: impl Fn(f64) -> f64) {
        for v in self.data.iter_mut().filter(|v| !v.is_nan()) {
            *v = f(*v);
        }
    }

    /// Returns a copy with one ring of edge-replicated padding.
    ///
    /// Undefined edge cells are replicated as undefined.
    ///
    /// # Example
    ///
    /// ```rust
    /// use terrain_mesh::Raster;
    ///
    /// let r = Raster::from_rows(vec![vec![1.0, 2.0]]).unwrap();
    /// let p = r.pad_edge();
    /// assert_eq!((p.rows(), p.cols()), (3, 4));
    /// assert_eq!(p.get(0, 0), 1.0);
    /// assert_eq!(p.get(2, 3), 2.0);
    /// ```
    pub fn pad_edge(&self) -> Raster {
        let rows = self.rows + 2;
        let cols = self.cols + 2;
        if self.data.is_empty() {
            return Raster::filled(rows, cols, f64::NAN);
        }
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let src_r = r.saturating_sub(1).min(self.rows.saturating_sub(1));
            for c in 0..cols {
                let src_c = c.saturating_sub(1).min(self.cols.saturating_sub(1));
                data.push(self.get(src_r, src_c));
            }
        }
        Raster { rows, cols, data }
    }

    /// Copies the `rows x cols` sub-rectangle starting at `(row, col)`.
    pub fn window(
        &self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Raster, MeshError> {
        if row + rows > self.rows || col + cols > self.cols {
            return Err(MeshError::invalid_raster(format!(
                "window {}x{} at ({}, {}) exceeds {}x{} raster",
                rows, cols, row, col, self.rows, self.cols
            )));
        }
        let mut data = Vec::with_capacity(rows * cols);
        for r in row..row + rows {
            let start = r * self.cols + col;
            data.extend_from_slice(&self.data[start..start + cols]);
        }
        Ok(Raster { rows, cols, data })
    }
}
