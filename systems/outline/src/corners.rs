//! Decorative corner classification.

use passblock_core::{Corner, CornerKinds, Point, CELL_SIZE};

use crate::raster::OccupancyGrid;

/// Classifies outer and inner corners of every occupied tile.
///
/// Corners carry no collision meaning; they only tell a renderer where to
/// draw accents at grid vertices. Tiles with no flag set are skipped.
#[must_use]
pub fn classify(grid: &OccupancyGrid) -> Vec<Corner> {
    grid.occupied()
        .filter_map(|(column, row)| {
            let kinds = tile_kinds(grid, column, row);
            (!kinds.is_empty()).then(|| {
                Corner::new(Point::new(column * CELL_SIZE, row * CELL_SIZE), kinds)
            })
        })
        .collect()
}

fn tile_kinds(grid: &OccupancyGrid, column: i32, row: i32) -> CornerKinds {
    let at = |dx: i32, dy: i32| grid.is_occupied(column + dx, row + dy);
    let north = at(0, -1);
    let east = at(1, 0);
    let south = at(0, 1);
    let west = at(-1, 0);
    let north_east = at(1, -1);
    let north_west = at(-1, -1);
    let south_east = at(1, 1);
    let south_west = at(-1, 1);

    let mut kinds = CornerKinds::empty();
    kinds.set(CornerKinds::OUTER_NORTH_WEST, !north && !west);
    kinds.set(CornerKinds::OUTER_NORTH_EAST, !north && !east);
    kinds.set(CornerKinds::OUTER_SOUTH_EAST, !south && !east);
    kinds.set(CornerKinds::OUTER_SOUTH_WEST, !south && !west);
    kinds.set(CornerKinds::INNER_NORTH_WEST, north && west && !north_west);
    kinds.set(CornerKinds::INNER_NORTH_EAST, north && east && !north_east);
    kinds.set(CornerKinds::INNER_SOUTH_EAST, south && east && !south_east);
    kinds.set(CornerKinds::INNER_SOUTH_WEST, south && west && !south_west);
    kinds
}
