use std::collections::BTreeSet;

use passblock_core::{
    BlockId, Bounds, Command, Corner, Event, GroupError, GroupingKey, Offset, PlatformId, Point,
    Rect,
};
use passblock_world::{self as world, query, World};

fn l_shaped_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for region in [
        Rect::new(0, 0, 8, 16),
        Rect::new(8, 8, 8, 8),
        Rect::new(40, 0, 8, 8),
    ] {
        world::apply(
            &mut world,
            Command::SpawnBlock {
                region,
                key: GroupingKey::default(),
            },
            &mut events,
        );
    }
    world
}

fn activate(world: &mut World, block: u32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ActivateBlock {
            block: BlockId::new(block),
        },
        &mut events,
    );
}

fn translate(world: &mut World, block: u32, dx: i32, dy: i32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::TranslateBlock {
            block: BlockId::new(block),
            delta: Offset::new(dx, dy),
        },
        &mut events,
    );
    events
}

fn region_of(world: &World, block: u32) -> Rect {
    let snapshot = query::block(world, BlockId::new(block)).expect("alive");
    snapshot.region
}

fn bounds_of_group(world: &World, block: u32) -> Bounds {
    let block = BlockId::new(block);
    let group = query::group_of(world, block).expect("grouped");
    query::group(world, group).expect("live group").bounds()
}

#[test]
fn l_shape_group_outline_is_cached_at_activation() {
    let mut world = l_shaped_world();
    activate(&mut world, 1);

    let group = query::group_of(&world, BlockId::new(0)).expect("grouped");
    let view = query::group(&world, group).expect("live group");
    assert_eq!(view.members(), &[BlockId::new(1), BlockId::new(0)]);
    assert_eq!(view.grid_size(), (2, 2));
    assert_eq!(view.edges().len(), 6);
    let inner: u32 = view.corners().iter().map(Corner::inner_count).sum();
    let outer: u32 = view.corners().iter().map(Corner::outer_count).sum();
    assert_eq!((inner, outer), (1, 5));
    assert_eq!(query::group_of(&world, BlockId::new(2)), None);
}

#[test]
fn translations_compose_into_their_sum() {
    let mut stepwise = l_shaped_world();
    let mut direct = l_shaped_world();
    activate(&mut stepwise, 0);
    activate(&mut direct, 0);

    let _ = translate(&mut stepwise, 0, 3, -5);
    let _ = translate(&mut stepwise, 1, -11, 2);
    let events = translate(&mut direct, 1, -8, -3);

    let expected = Bounds::of(&Rect::new(-8, -3, 16, 16));
    assert_eq!(bounds_of_group(&stepwise, 0), expected);
    assert_eq!(bounds_of_group(&direct, 0), expected);
    let group = query::group_of(&direct, BlockId::new(0)).expect("grouped");
    assert_eq!(
        events,
        vec![Event::GroupTranslated {
            group,
            delta: Offset::new(-8, -3),
            bounds: expected,
        }]
    );

    for block in [0, 1] {
        assert_eq!(region_of(&stepwise, block), region_of(&direct, block));
    }
}

#[test]
fn bounds_track_the_union_of_member_regions() {
    let mut world = l_shaped_world();
    activate(&mut world, 0);
    let _ = translate(&mut world, 1, 17, 9);

    let regions = [region_of(&world, 0), region_of(&world, 1)];
    assert_eq!(
        Some(bounds_of_group(&world, 0)),
        Bounds::enclosing(regions.iter())
    );
    assert_eq!(bounds_of_group(&world, 0).min(), Point::new(17, 9));
    assert_eq!(region_of(&world, 2), Rect::new(40, 0, 8, 8));
}

#[test]
fn translation_leaves_the_group_frame_untouched() {
    let mut world = l_shaped_world();
    activate(&mut world, 0);
    let group = query::group_of(&world, BlockId::new(0)).expect("grouped");
    let view = query::group(&world, group).expect("live");
    let edges = view.edges().to_vec();
    let corners = view.corners().to_vec();

    let _ = translate(&mut world, 0, 64, -32);

    let view = query::group(&world, group).expect("live");
    assert_eq!(view.edges(), edges.as_slice());
    assert_eq!(view.corners(), corners.as_slice());
}

#[test]
fn regrouping_from_any_member_yields_the_same_outline() {
    let layouts = [0, 1].map(|seed| {
        let mut world = l_shaped_world();
        activate(&mut world, seed);
        let group = query::group_of(&world, BlockId::new(0)).expect("grouped");
        let view = query::group(&world, group).expect("live");
        let edges: BTreeSet<_> = view
            .edges()
            .iter()
            .map(|edge| (edge.facing(), edge.start(), edge.end()))
            .collect();
        let corners: BTreeSet<_> = view
            .corners()
            .iter()
            .map(|corner| (corner.vertex(), corner.kinds().bits()))
            .collect();
        let members: BTreeSet<_> = view.members().iter().copied().collect();
        (view.bounds(), edges, corners, members)
    });

    assert_eq!(layouts[0], layouts[1]);
}

#[test]
fn overflowing_translation_is_rejected_without_moving_anything() {
    let mut world = l_shaped_world();
    activate(&mut world, 0);
    let before = bounds_of_group(&world, 0);

    let events = translate(&mut world, 1, i32::MAX, 0);

    assert_eq!(
        events,
        vec![Event::TranslateRejected {
            block: BlockId::new(1),
            reason: GroupError::OutOfRange,
        }]
    );
    assert_eq!(bounds_of_group(&world, 0), before);
    assert_eq!(region_of(&world, 0), Rect::new(0, 0, 8, 16));
    assert_eq!(region_of(&world, 1), Rect::new(8, 8, 8, 8));
}

#[test]
fn absorbed_platforms_limit_how_far_a_group_may_move() {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in [
        Command::ConfigureGrouping {
            absorb_platforms: true,
        },
        Command::SpawnBlock {
            region: Rect::new(0, 0, 16, 8),
            key: GroupingKey::default(),
        },
        Command::SpawnPlatform {
            region: Rect::new(16, 0, 32, 8),
        },
        Command::ActivateBlock {
            block: BlockId::new(0),
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }
    let platform = PlatformId::new(0);
    let group = query::group_of(&world, BlockId::new(0)).expect("grouped");
    let view = query::group(&world, group).expect("live group");
    assert_eq!(view.platforms(), &[platform]);

    let rejected = translate(&mut world, 0, i32::MAX - 16, 0);
    assert_eq!(
        rejected,
        vec![Event::TranslateRejected {
            block: BlockId::new(0),
            reason: GroupError::OutOfRange,
        }]
    );
    assert_eq!(region_of(&world, 0), Rect::new(0, 0, 16, 8));

    let moved = translate(&mut world, 0, i32::MAX - 48, 0);
    assert_eq!(moved.len(), 1);
    let snapshot = query::platform(&world, platform).expect("alive");
    assert_eq!(snapshot.region, Rect::new(i32::MAX - 32, 0, 32, 8));
}
