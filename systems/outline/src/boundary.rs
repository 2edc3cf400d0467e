//! Merged boundary edges derived from an occupancy grid.
//!
//! Tiles are visited in row-major order and sides in [`Side::ALL`] order. An
//! exposed side either extends the edge already owned by the preceding tile
//! of the same run (the west neighbor for north/south sides, the north
//! neighbor for east/west sides) or opens a new edge in the arena. Runs are
//! therefore merged in a single pass, and every tile along a run records the
//! same [`EdgeHandle`].

use std::f32::consts::TAU;

use passblock_core::{Edge, Point, Side, CELL_SIZE};

use crate::raster::OccupancyGrid;

/// Initial wobble phase per side, indexed by [`Side::index`].
const SIDE_PHASE_SEED: [f32; 4] = [0.0, 0.7, 1.4, 2.1];

/// Extra length given to an east/west run that ends against an inner turn.
const SEAM_OVERLAP: i32 = 1;

/// Stable index of an edge inside a [`Boundary`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeHandle(usize);

impl EdgeHandle {
    /// Position of the edge in [`Boundary::edges`].
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Edge arena plus the per-tile side slots that reference it.
#[derive(Clone, Debug)]
pub struct Boundary {
    edges: Vec<Edge>,
    slots: Vec<[Option<EdgeHandle>; 4]>,
}

impl Boundary {
    /// Extracts the merged boundary of every occupied tile.
    #[must_use]
    pub fn extract(grid: &OccupancyGrid) -> Self {
        let mut boundary = Self {
            edges: Vec::new(),
            slots: vec![[None; 4]; grid.slot_count()],
        };

        for (column, row) in grid.occupied() {
            for side in Side::ALL {
                let (dx, dy) = side.step();
                if grid.is_occupied(column + dx, row + dy) {
                    continue;
                }

                let (previous_column, previous_row) = run_predecessor(side, column, row);
                let handle = match boundary.slot(grid, previous_column, previous_row, side) {
                    Some(handle) => {
                        let increment = run_increment(grid, side, column, row);
                        boundary.edges[handle.index()].extend(increment);
                        handle
                    }
                    None => boundary.open(side, column, row),
                };
                boundary.set_slot(grid, column, row, side, handle);
            }
        }

        boundary.spread_phases(grid);
        log::trace!(
            "extracted {} edges from {} occupied tiles",
            boundary.edges.len(),
            grid.occupied_count()
        );
        boundary
    }

    /// Every merged edge, in creation order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up an edge by handle.
    #[must_use]
    pub fn edge(&self, handle: EdgeHandle) -> Option<&Edge> {
        self.edges.get(handle.index())
    }

    /// Handle of the edge covering `side` of the tile, if that side is exposed.
    #[must_use]
    pub fn tile_edge(
        &self,
        grid: &OccupancyGrid,
        column: i32,
        row: i32,
        side: Side,
    ) -> Option<EdgeHandle> {
        self.slot(grid, column, row, side)
    }

    /// Consumes the boundary, keeping only the edge arena.
    #[must_use]
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    fn open(&mut self, side: Side, column: i32, row: i32) -> EdgeHandle {
        let x = column * CELL_SIZE;
        let y = row * CELL_SIZE;
        let (start, end) = match side {
            Side::North => (Point::new(x, y), Point::new(x + CELL_SIZE, y)),
            Side::East => (
                Point::new(x + CELL_SIZE, y),
                Point::new(x + CELL_SIZE, y + CELL_SIZE),
            ),
            Side::South => (
                Point::new(x, y + CELL_SIZE),
                Point::new(x + CELL_SIZE, y + CELL_SIZE),
            ),
            Side::West => (Point::new(x, y), Point::new(x, y + CELL_SIZE)),
        };

        let handle = EdgeHandle(self.edges.len());
        let phase = SIDE_PHASE_SEED[side.index()];
        self.edges.push(Edge::new(start, end, side, phase));
        handle
    }

    fn slot(&self, grid: &OccupancyGrid, column: i32, row: i32, side: Side) -> Option<EdgeHandle> {
        grid.index(column, row)
            .and_then(|index| self.slots.get(index))
            .and_then(|slots| slots[side.index()])
    }

    fn set_slot(
        &mut self,
        grid: &OccupancyGrid,
        column: i32,
        row: i32,
        side: Side,
        handle: EdgeHandle,
    ) {
        if let Some(slots) = grid
            .index(column, row)
            .and_then(|index| self.slots.get_mut(index))
        {
            slots[side.index()] = Some(handle);
        }
    }

    /// Re-seeds each phase from the angle between the footprint's center and
    /// the edge midpoint, so the wobble sweeps outwards radially.
    fn spread_phases(&mut self, grid: &OccupancyGrid) {
        let center_x = (grid.columns() * CELL_SIZE) as f32 / 2.0;
        let center_y = (grid.rows() * CELL_SIZE) as f32 / 2.0;
        for edge in &mut self.edges {
            let (mid_x, mid_y) = edge.midpoint();
            let angle = (mid_y - center_y).atan2(mid_x - center_x);
            edge.set_wobble_phase(angle.rem_euclid(TAU));
        }
    }
}

fn run_predecessor(side: Side, column: i32, row: i32) -> (i32, i32) {
    if side.is_horizontal() {
        (column - 1, row)
    } else {
        (column, row - 1)
    }
}

/// Length added when a tile continues an existing run.
///
/// An east/west run grows one unit past the tile when the tile below it and
/// that tile's outward neighbor are both occupied, closing the visible seam
/// where the run meets the perpendicular edge.
fn run_increment(grid: &OccupancyGrid, side: Side, column: i32, row: i32) -> i32 {
    if side.is_horizontal() {
        return CELL_SIZE;
    }

    let (dx, _) = side.step();
    if grid.is_occupied(column, row + 1) && grid.is_occupied(column + dx, row + 1) {
        CELL_SIZE + SEAM_OVERLAP
    } else {
        CELL_SIZE
    }
}
