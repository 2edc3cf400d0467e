//! Padded occupancy rasterization of a group's footprint.

use passblock_core::{Bounds, Rect, CELL_SIZE};

/// Width of the always-empty ring surrounding the footprint.
const PADDING: i32 = 1;

/// Boolean cell grid covering `[-1, columns + 1) x [-1, rows + 1)`.
///
/// The outer ring is never occupied, so neighbor lookups from any real tile
/// stay in range without bounds checks at the call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    columns: i32,
    rows: i32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Rasterizes the member regions relative to `bounds`.
    ///
    /// A cell is occupied when some region fully covers its square at
    /// `bounds.min() + (column, row) * CELL_SIZE`.
    #[must_use]
    pub fn rasterize(bounds: Bounds, regions: &[Rect]) -> Self {
        let columns = bounds.width().div_euclid(CELL_SIZE).max(0);
        let rows = bounds.height().div_euclid(CELL_SIZE).max(0);
        let stride = padded(columns);
        let mut grid = Self {
            columns,
            rows,
            cells: vec![false; stride * padded(rows)],
        };

        let origin = bounds.min();
        for region in regions {
            let left = region.left() - origin.x();
            let top = region.top() - origin.y();
            let first_column = (left + CELL_SIZE - 1).div_euclid(CELL_SIZE).max(0);
            let first_row = (top + CELL_SIZE - 1).div_euclid(CELL_SIZE).max(0);
            let end_column = (left + region.width()).div_euclid(CELL_SIZE).min(columns);
            let end_row = (top + region.height()).div_euclid(CELL_SIZE).min(rows);

            for row in first_row..end_row {
                for column in first_column..end_column {
                    if let Some(index) = grid.index(column, row) {
                        grid.cells[index] = true;
                    }
                }
            }
        }

        grid
    }

    /// Number of real columns, excluding the padding ring.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of real rows, excluding the padding ring.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Reports whether the cell is covered. Anything outside the real area reads as empty.
    #[must_use]
    pub fn is_occupied(&self, column: i32, row: i32) -> bool {
        self.index(column, row)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns)
                .filter(move |&column| self.is_occupied(column, row))
                .map(move |column| (column, row))
        })
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub(crate) fn index(&self, column: i32, row: i32) -> Option<usize> {
        let padded_column = column + PADDING;
        let padded_row = row + PADDING;
        if padded_column < 0 || padded_row < 0 {
            return None;
        }
        let stride = padded(self.columns);
        let padded_column = usize::try_from(padded_column).ok()?;
        let padded_row = usize::try_from(padded_row).ok()?;
        if padded_column >= stride || padded_row >= padded(self.rows) {
            return None;
        }
        Some(padded_row * stride + padded_column)
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.cells.len()
    }
}

fn padded(extent: i32) -> usize {
    usize::try_from(extent + PADDING * 2).unwrap_or(0)
}
