//! Fixed 3x3 board: cell addressing, mark assignment and per-cell placement.

use crate::{CoreError, CoreResult, Mat4, Vec3};

/// Cells per board side.
pub const BOARD_SIZE: usize = 3;

/// Distance between neighbouring cell centres, in world units.
pub const TILE_SPACING: f32 = 1.1;

/// Which mesh occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

/// A board position, `row` top to bottom and `col` left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> CoreResult<Self> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(CoreError::CellOutOfRange {
                row,
                col,
                size: BOARD_SIZE,
            });
        }
        Ok(Self { row, col })
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn col(&self) -> usize {
        self.col
    }

    /// The diagonal holds O, everything else X.
    #[inline]
    pub fn mark(&self) -> Mark {
        if self.row == self.col { Mark::O } else { Mark::X }
    }

    /// Cell centre in world space; the middle cell sits at the origin.
    pub fn offset(&self) -> Vec3 {
        Vec3::new(
            -TILE_SPACING + self.col as f32 * TILE_SPACING,
            TILE_SPACING - self.row as f32 * TILE_SPACING,
            0.0,
        )
    }

    /// Model matrix placing a mesh at this cell.
    #[inline]
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.offset())
    }
}

/// All cells in row-major order.
pub fn cells() -> impl Iterator<Item = Cell> {
    (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Cell { row, col }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn o_exactly_on_the_diagonal() {
        for cell in cells() {
            let expected = if cell.row() == cell.col() { Mark::O } else { Mark::X };
            assert_eq!(cell.mark(), expected, "{cell:?}");
        }
        assert_eq!(cells().filter(|c| c.mark() == Mark::O).count(), 3);
    }

    #[test]
    fn corner_offsets() {
        let top_left = Cell::new(0, 0).unwrap();
        let bottom_right = Cell::new(2, 2).unwrap();
        assert!(approx(top_left.offset(), Vec3::new(-1.1, 1.1, 0.0)));
        assert!(approx(bottom_right.offset(), Vec3::new(1.1, -1.1, 0.0)));
        assert!(approx(Cell::new(1, 1).unwrap().offset(), Vec3::ZERO));
    }

    #[test]
    fn model_is_pure_translation() {
        let cell = Cell::new(0, 2).unwrap();
        let m = cell.model().to_cols_array();
        assert!((m[12] - 1.1).abs() < 1e-6);
        assert!((m[13] - 1.1).abs() < 1e-6);
        assert_eq!(m[14], 0.0);
        assert_eq!([m[0], m[5], m[10], m[15]], [1.0; 4]);
    }

    #[test]
    fn cells_are_row_major() {
        let order: Vec<_> = cells().map(|c| (c.row(), c.col())).collect();
        assert_eq!(order.len(), 9);
        assert_eq!(order[0], (0, 0));
        assert_eq!(order[1], (0, 1));
        assert_eq!(order[3], (1, 0));
        assert_eq!(order[8], (2, 2));
        assert!(cells().enumerate().all(|(i, c)| c.row() * BOARD_SIZE + c.col() == i));
    }

    #[test]
    fn out_of_range_cell_is_rejected() {
        assert_eq!(
            Cell::new(3, 0),
            Err(CoreError::CellOutOfRange { row: 3, col: 0, size: 3 })
        );
        assert!(Cell::new(1, 5).is_err());
    }
}
