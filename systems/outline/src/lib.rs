#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives a group's merged outline and corner accents.
//!
//! The member regions are first rasterized onto a padded occupancy grid
//! ([`raster`]); the grid then feeds the boundary extractor ([`boundary`])
//! and the corner classifier ([`corners`]). The result is computed once when
//! a group forms and cached; every coordinate is relative to the group's
//! bounding-box minimum.

pub mod boundary;
pub mod corners;
pub mod raster;

use passblock_core::{Bounds, Corner, Edge, Rect};

pub use boundary::{Boundary, EdgeHandle};
pub use raster::OccupancyGrid;

/// Cached outline of a group expressed in the group frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    columns: i32,
    rows: i32,
    edges: Vec<Edge>,
    corners: Vec<Corner>,
}

impl Outline {
    /// Rasterizes `regions` inside `bounds` and extracts edges and corners.
    #[must_use]
    pub fn build(bounds: Bounds, regions: &[Rect]) -> Self {
        let grid = OccupancyGrid::rasterize(bounds, regions);
        Self::from_grid(&grid)
    }

    /// Extracts edges and corners from an existing occupancy grid.
    #[must_use]
    pub fn from_grid(grid: &OccupancyGrid) -> Self {
        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            edges: Boundary::extract(grid).into_edges(),
            corners: corners::classify(grid),
        }
    }

    /// Occupancy grid width in cells, excluding padding.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Occupancy grid height in cells, excluding padding.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Merged boundary edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Corner accents.
    #[must_use]
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    /// Total number of convex corner orientations.
    #[must_use]
    pub fn outer_corner_count(&self) -> u32 {
        self.corners.iter().map(Corner::outer_count).sum()
    }

    /// Total number of concave corner orientations.
    #[must_use]
    pub fn inner_corner_count(&self) -> u32 {
        self.corners.iter().map(Corner::inner_count).sum()
    }
}
