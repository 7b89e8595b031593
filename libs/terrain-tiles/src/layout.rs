//! Division of a full raster into equally sized tiles.

use crate::error::TileError;

/// Cells per tile along each axis.
///
/// Tiles all have the same interior size; columns and rows that do not
/// fill a whole tile are dropped at the east and south edges.
///
/// # Example
///
/// ```rust
/// use terrain_tiles::TileLayout;
///
/// let layout = TileLayout::new(10, 7, 2, 3).unwrap();
/// assert_eq!((layout.cells_x, layout.cells_y), (3, 3));
/// assert_eq!(layout.dropped_cols(), 1);
/// assert_eq!(layout.window_origin(2, 1), (0, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub full_rows: usize,
    pub full_cols: usize,
    pub ntiles_x: u32,
    pub ntiles_y: u32,
    pub cells_x: usize,
    pub cells_y: usize,
}

impl TileLayout {
    pub fn new(
        full_rows: usize,
        full_cols: usize,
        ntiles_x: u32,
        ntiles_y: u32,
    ) -> Result<Self, TileError> {
        if ntiles_x == 0 || ntiles_y == 0 {
            return Err(TileError::config("tile counts must be at least 1"));
        }
        let cells_x = full_cols / ntiles_x as usize;
        let cells_y = full_rows / ntiles_y as usize;
        if cells_x == 0 || cells_y == 0 {
            return Err(TileError::RasterTooSmall {
                rows: full_rows,
                cols: full_cols,
                ntiles_x,
                ntiles_y,
            });
        }
        Ok(Self {
            full_rows,
            full_cols,
            ntiles_x,
            ntiles_y,
            cells_x,
            cells_y,
        })
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.ntiles_x as usize * self.ntiles_y as usize
    }

    pub fn dropped_cols(&self) -> usize {
        self.full_cols - self.cells_x * self.ntiles_x as usize
    }

    pub fn dropped_rows(&self) -> usize {
        self.full_rows - self.cells_y * self.ntiles_y as usize
    }

    /// All `(tile_no_x, tile_no_y)` pairs, row by row from the north-west.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> {
        let nx = self.ntiles_x;
        (1..=self.ntiles_y).flat_map(move |y| (1..=nx).map(move |x| (x, y)))
    }

    /// Top-left of tile `(x, y)`'s window in the padded full raster.
    ///
    /// The window is [`window_rows`](Self::window_rows) by
    /// [`window_cols`](Self::window_cols) and includes the neighbouring
    /// tiles' edge cells as padding.
    #[inline]
    pub fn window_origin(&self, tile_no_x: u32, tile_no_y: u32) -> (usize, usize) {
        (
            (tile_no_y as usize - 1) * self.cells_y,
            (tile_no_x as usize - 1) * self.cells_x,
        )
    }

    #[inline]
    pub fn window_rows(&self) -> usize {
        self.cells_y + 2
    }

    #[inline]
    pub fn window_cols(&self) -> usize {
        self.cells_x + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_split() {
        let l = TileLayout::new(6, 8, 2, 3).unwrap();
        assert_eq!((l.cells_x, l.cells_y), (4, 2));
        assert_eq!(l.dropped_cols(), 0);
        assert_eq!(l.dropped_rows(), 0);
        assert_eq!(l.tile_count(), 6);
    }

    #[test]
    fn test_remainder_is_dropped() {
        let l = TileLayout::new(7, 9, 2, 2).unwrap();
        assert_eq!((l.cells_x, l.cells_y), (4, 3));
        assert_eq!(l.dropped_cols(), 1);
        assert_eq!(l.dropped_rows(), 1);
    }

    #[test]
    fn test_too_small() {
        let err = TileLayout::new(1, 10, 1, 2).unwrap_err();
        assert!(matches!(err, TileError::RasterTooSmall { rows: 1, .. }));
        assert!(matches!(
            TileLayout::new(5, 5, 0, 1),
            Err(TileError::Config { .. })
        ));
    }

    #[test]
    fn test_tile_order() {
        let l = TileLayout::new(4, 4, 2, 2).unwrap();
        let tiles: Vec<_> = l.tiles().collect();
        assert_eq!(tiles, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_windows_overlap_neighbours() {
        let l = TileLayout::new(4, 6, 2, 1).unwrap();
        let (_, west) = l.window_origin(1, 1);
        let (_, east) = l.window_origin(2, 1);
        // west window covers padded cols 0..5, east starts two before its end
        assert_eq!(west + l.window_cols() - east, 2);
        assert_eq!(l.window_rows(), 6);
    }
}
