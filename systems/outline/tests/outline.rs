use std::collections::BTreeSet;
use std::f32::consts::{FRAC_PI_2, PI};

use passblock_core::{Bounds, CornerKinds, Edge, Offset, Point, Rect, Side, CELL_SIZE};
use passblock_system_outline::Outline;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn outline_of(regions: &[Rect]) -> Outline {
    let bounds = Bounds::enclosing(regions.iter()).expect("regions present");
    Outline::build(bounds, regions)
}

fn cell_rect(column: i32, row: i32) -> Rect {
    Rect::new(column * CELL_SIZE, row * CELL_SIZE, CELL_SIZE, CELL_SIZE)
}

fn cell_regions(cells: &BTreeSet<(i32, i32)>) -> Vec<Rect> {
    cells
        .iter()
        .map(|&(column, row)| cell_rect(column, row))
        .collect()
}

fn edge_with(outline: &Outline, facing: Side, start: Point) -> Edge {
    *outline
        .edges()
        .iter()
        .find(|edge| edge.facing() == facing && edge.start() == start)
        .unwrap_or_else(|| panic!("no {facing:?} edge starting at {start:?}"))
}

fn length_of(outline: &Outline, facing: Side, x: i32, y: i32) -> i32 {
    edge_with(outline, facing, Point::new(x, y)).length()
}

type EdgeKey = (usize, i32, i32, i32, i32);

fn edge_key(facing: Side, start: Point, end: Point) -> EdgeKey {
    (facing.index(), start.x(), start.y(), end.x(), end.y())
}

fn sorted_keys(edges: &[Edge]) -> Vec<EdgeKey> {
    let mut keys: Vec<_> = edges
        .iter()
        .map(|edge| edge_key(edge.facing(), edge.start(), edge.end()))
        .collect();
    keys.sort_unstable();
    keys
}

/// Emits one unit edge per exposed tile side and merges consecutive ones.
///
/// East/west runs of two or more tiles gain one unit when the cell below the
/// run's last tile and its outward neighbor are both occupied.
fn reference_edges(cells: &BTreeSet<(i32, i32)>) -> Vec<EdgeKey> {
    let occupied = |column: i32, row: i32| cells.contains(&(column, row));
    let exposed = |column: i32, row: i32, side: Side| {
        let (dx, dy) = side.step();
        occupied(column, row) && !occupied(column + dx, row + dy)
    };

    let mut keys = Vec::new();
    for &(column, row) in cells {
        for side in Side::ALL {
            if !exposed(column, row, side) {
                continue;
            }
            let x = column * CELL_SIZE;
            let y = row * CELL_SIZE;
            if side.is_horizontal() {
                if exposed(column - 1, row, side) {
                    continue;
                }
                let mut last = column;
                while exposed(last + 1, row, side) {
                    last += 1;
                }
                let y = if side == Side::South { y + CELL_SIZE } else { y };
                let end = Point::new((last + 1) * CELL_SIZE, y);
                keys.push(edge_key(side, Point::new(x, y), end));
            } else {
                if exposed(column, row - 1, side) {
                    continue;
                }
                let mut last = row;
                while exposed(column, last + 1, side) {
                    last += 1;
                }
                let (dx, _) = side.step();
                let turns = occupied(column, last + 1) && occupied(column + dx, last + 1);
                let seam = last > row && turns;
                let x = if side == Side::East { x + CELL_SIZE } else { x };
                let end_y = (last + 1) * CELL_SIZE + i32::from(seam);
                keys.push(edge_key(side, Point::new(x, y), Point::new(x, end_y)));
            }
        }
    }
    keys.sort_unstable();
    keys
}

/// Grows a connected shape from the origin inside a small square.
fn random_shape(rng: &mut ChaCha8Rng) -> BTreeSet<(i32, i32)> {
    const SIDE: i32 = 7;
    let target = rng.gen_range(1..=24);
    let mut cells = BTreeSet::from([(0, 0)]);
    while cells.len() < target {
        let pick = rng.gen_range(0..cells.len());
        let &(column, row) = cells.iter().nth(pick).expect("pick in range");
        let (dx, dy) = Side::ALL[rng.gen_range(0..4)].step();
        let next = (column + dx, row + dy);
        if (0..SIDE).contains(&next.0) && (0..SIDE).contains(&next.1) {
            let _ = cells.insert(next);
        }
    }
    cells
}

#[test]
fn square_block_has_four_full_length_edges() {
    let outline = outline_of(&[Rect::new(0, 0, 64, 64)]);

    assert_eq!(outline.edges().len(), 4);
    assert!(outline.edges().iter().all(|edge| edge.length() == 64));
    assert_eq!(outline.outer_corner_count(), 4);
    assert_eq!(outline.inner_corner_count(), 0);
}

#[test]
fn side_by_side_cells_merge_into_one_rectangle() {
    let outline = outline_of(&[Rect::new(0, 0, 8, 8), Rect::new(8, 0, 8, 8)]);

    assert_eq!((outline.columns(), outline.rows()), (2, 1));
    let mut lengths: Vec<_> = outline.edges().iter().map(Edge::length).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![8, 8, 16, 16]);
}

#[test]
fn l_shape_has_one_inner_corner() {
    let outline = outline_of(&[Rect::new(0, 0, 8, 16), Rect::new(8, 8, 8, 8)]);

    assert_eq!(outline.edges().len(), 6);
    assert_eq!(outline.inner_corner_count(), 1);
    assert_eq!(outline.outer_corner_count(), 5);

    let inner = outline
        .corners()
        .iter()
        .find(|corner| corner.inner_count() == 1)
        .expect("inner corner present");
    assert_eq!(inner.vertex(), Point::new(0, 8));
    assert!(inner.kinds().contains(CornerKinds::INNER_NORTH_EAST));

    assert_eq!(length_of(&outline, Side::West, 0, 0), 16);
    assert_eq!(length_of(&outline, Side::South, 0, 16), 16);
    assert_eq!(length_of(&outline, Side::East, 8, 0), 8);
}

#[test]
fn vertical_run_overlaps_the_seam_at_an_inner_turn() {
    // Column of three cells with a foot to the east on the last row.
    let outline = outline_of(&[Rect::new(0, 0, 8, 24), Rect::new(8, 16, 8, 8)]);

    let east = edge_with(&outline, Side::East, Point::new(8, 0));
    assert_eq!(east.end(), Point::new(8, 17));
    assert_eq!(length_of(&outline, Side::West, 0, 0), 24);
    assert_eq!(length_of(&outline, Side::East, 16, 16), 8);
    assert_eq!(outline.edges().len(), 6);
}

#[test]
fn wobble_phase_points_away_from_the_center() {
    let outline = outline_of(&[Rect::new(0, 0, 64, 64)]);
    let phase = |side: Side| {
        let start = match side {
            Side::East => Point::new(64, 0),
            Side::South => Point::new(0, 64),
            Side::North | Side::West => Point::new(0, 0),
        };
        edge_with(&outline, side, start).wobble_phase()
    };

    assert!((phase(Side::North) - 3.0 * FRAC_PI_2).abs() < 1e-5);
    assert!(phase(Side::East).abs() < 1e-5);
    assert!((phase(Side::South) - FRAC_PI_2).abs() < 1e-5);
    assert!((phase(Side::West) - PI).abs() < 1e-5);
}

#[test]
fn flip_marks_south_and_west_edges() {
    let outline = outline_of(&[Rect::new(0, 0, 16, 16)]);

    for edge in outline.edges() {
        let expected = matches!(edge.facing(), Side::South | Side::West);
        assert_eq!(edge.flip(), expected, "{:?}", edge.facing());
    }
}

#[test]
fn merged_edges_match_the_unit_edge_reference() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_b10c);

    for _ in 0..200 {
        let cells = random_shape(&mut rng);
        let outline = outline_of(&cell_regions(&cells));

        assert_eq!(
            sorted_keys(outline.edges()),
            reference_edges(&cells),
            "edge sets differ for {cells:?}"
        );
    }
}

#[test]
fn outline_ignores_where_the_group_sits() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..50 {
        let cells = random_shape(&mut rng);
        let regions = cell_regions(&cells);
        let delta = Offset::new(
            rng.gen_range(-8..8) * CELL_SIZE + rng.gen_range(-3..3),
            rng.gen_range(-8..8) * CELL_SIZE,
        );
        let moved: Vec<_> = regions
            .iter()
            .filter_map(|region| region.translated(delta))
            .collect();

        assert_eq!(moved.len(), regions.len());
        assert_eq!(outline_of(&regions), outline_of(&moved));
    }
}

#[test]
fn corners_are_symmetric_under_a_half_turn() {
    let mut rng = ChaCha8Rng::seed_from_u64(180);

    for _ in 0..100 {
        let cells = random_shape(&mut rng);
        let outline = outline_of(&cell_regions(&cells));
        let (columns, rows) = (outline.columns(), outline.rows());

        let rotated_cells: BTreeSet<_> = cells
            .iter()
            .map(|&(column, row)| (columns - 1 - column, rows - 1 - row))
            .collect();
        let rotated = outline_of(&cell_regions(&rotated_cells));

        let expected: BTreeSet<_> = outline
            .corners()
            .iter()
            .map(|corner| {
                let column = corner.vertex().x() / CELL_SIZE;
                let row = corner.vertex().y() / CELL_SIZE;
                (
                    columns - 1 - column,
                    rows - 1 - row,
                    corner.kinds().rotated_half_turn().bits(),
                )
            })
            .collect();
        let actual: BTreeSet<_> = rotated
            .corners()
            .iter()
            .map(|corner| {
                (
                    corner.vertex().x() / CELL_SIZE,
                    corner.vertex().y() / CELL_SIZE,
                    corner.kinds().bits(),
                )
            })
            .collect();

        assert_eq!(actual, expected, "corners differ for {cells:?}");
        assert_eq!(rotated.outer_corner_count(), outline.outer_corner_count());
        assert_eq!(rotated.inner_corner_count(), outline.inner_corner_count());
    }
}
