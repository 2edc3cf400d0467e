#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for pass-through blocks and their groups.

mod bodies;
mod groups;

use std::time::Duration;

use passblock_core::{
    BlockId, Bounds, Command, Effect, EntityRef, Event, GroupError, GroupId, Offset, Rect,
    ShatterConfig,
};
use passblock_system_destruction::Signal;
use passblock_system_grouping::{Config as GroupingConfig, GroupAssembler, SpatialIndex};

use bodies::BodyRegistry;
use groups::GroupRegistry;

/// Represents the authoritative pass-through block world.
#[derive(Debug)]
pub struct World {
    bodies: BodyRegistry,
    groups: GroupRegistry,
    assembler: GroupAssembler,
    grouping: GroupingConfig,
    shatter: ShatterConfig,
    tick_index: u64,
}

impl World {
    /// Creates an empty world with default grouping and shatter settings.
    #[must_use]
    pub fn new() -> Self {
        let grouping = GroupingConfig::default();
        Self {
            bodies: BodyRegistry::new(),
            groups: GroupRegistry::new(),
            assembler: GroupAssembler::new(grouping),
            grouping,
            shatter: ShatterConfig::default(),
            tick_index: 0,
        }
    }

    fn group_of(&self, block: BlockId) -> Result<GroupId, GroupError> {
        let state = self.bodies.block(block).ok_or(GroupError::MissingBlock)?;
        state.group.ok_or(GroupError::Ungrouped)
    }

    fn activate(&mut self, block: BlockId, out_events: &mut Vec<Event>) {
        let Some(assembly) = self.assembler.assemble(block, &self.bodies) else {
            log::debug!("activation of {block:?} left grouping unchanged");
            return;
        };

        let group = self.groups.insert(&assembly);
        for member in assembly.members() {
            self.bodies.assign_group(EntityRef::Block(*member), group);
        }
        for platform in assembly.platforms() {
            self.bodies.assign_group(EntityRef::Platform(*platform), group);
        }

        out_events.push(Event::GroupFormed {
            group,
            master: assembly.master(),
            members: assembly.members().to_vec(),
            platforms: assembly.platforms().to_vec(),
        });
    }

    /// Moves the block's whole group. Edges and corners live in the group
    /// frame and stay untouched.
    fn translate(&mut self, block: BlockId, delta: Offset, out_events: &mut Vec<Event>) {
        let plan = match self.plan_move(block, delta) {
            Ok(plan) => plan,
            Err(reason) => {
                out_events.push(Event::TranslateRejected { block, reason });
                return;
            }
        };

        for (entity, region) in plan.regions {
            self.bodies.set_region(entity, region);
        }
        if let Some(state) = self.groups.get_mut(plan.group) {
            state.bounds = plan.bounds;
        }
        out_events.push(Event::GroupTranslated {
            group: plan.group,
            delta,
            bounds: plan.bounds,
        });
    }

    /// Computes every moved extent up front. Nothing is mutated when any of
    /// them would leave the coordinate range.
    fn plan_move(&self, block: BlockId, delta: Offset) -> Result<MovePlan, GroupError> {
        let group = self.group_of(block)?;
        let state = self.groups.get(group).ok_or(GroupError::Ungrouped)?;
        let bounds = state
            .bounds
            .translated(delta)
            .ok_or(GroupError::OutOfRange)?;

        let mut regions = Vec::new();
        for entity in state.participants() {
            let Some(region) = self.bodies.region(entity) else {
                continue;
            };
            let moved = region.translated(delta).ok_or(GroupError::OutOfRange)?;
            regions.push((entity, moved));
        }
        Ok(MovePlan {
            group,
            bounds,
            regions,
        })
    }

    fn trigger_shatter(&mut self, block: BlockId, out_events: &mut Vec<Event>) {
        let group = match self.group_of(block) {
            Ok(group) => group,
            Err(reason) => {
                out_events.push(Event::ShatterRejected { block, reason });
                return;
            }
        };
        let config = self.shatter;
        let Some(state) = self.groups.get_mut(group) else {
            return;
        };

        let mut signals = Vec::new();
        if !state.destruction.trigger(config, &mut signals) {
            log::debug!("ignoring repeated trigger of {group:?}");
            return;
        }

        log::info!(
            "shatter started for {group:?} via {block:?} ({} members)",
            state.members.len()
        );
        out_events.push(Event::ShatterStarted {
            group,
            quick: config.quick_destroy,
        });
        self.dispatch(group, signals, out_events);
    }

    fn advance_destruction(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut signals = Vec::new();
        for group in self.groups.ids() {
            let Some(state) = self.groups.get_mut(group) else {
                continue;
            };
            state.destruction.advance(dt, &mut signals);
            if !signals.is_empty() {
                self.dispatch(group, std::mem::take(&mut signals), out_events);
            }
        }
    }

    /// Applies destruction signals to body state and broadcasts them.
    fn dispatch(&mut self, group: GroupId, signals: Vec<Signal>, out_events: &mut Vec<Event>) {
        for signal in signals {
            match signal {
                Signal::CollisionDisabled(entity) => {
                    self.bodies.disable_collision(entity);
                    out_events.push(Event::CollisionDisabled { entity });
                }
                Signal::Shattered { entity, intensity } => {
                    let center = self.bodies.region(entity).map(|region| region.center());
                    self.bodies.shatter(entity);
                    out_events.push(Event::BodyShattered { entity });
                    out_events.push(Event::AttachmentsDisabled { entity });
                    if let Some(position) = center {
                        out_events.push(Event::EffectRequested {
                            effect: Effect::ParticleBurst {
                                position,
                                intensity,
                            },
                        });
                    }
                }
                Signal::Finale { shake, distortion } => {
                    if let Some(state) = self.groups.get(group) {
                        out_events.push(Event::EffectRequested {
                            effect: Effect::Shake {
                                position: state.bounds.center(),
                                amplitude: shake,
                            },
                        });
                    }
                    out_events.push(Event::DistortionChanged {
                        group,
                        value: distortion,
                    });
                }
                Signal::Distortion(value) => {
                    out_events.push(Event::DistortionChanged { group, value });
                }
                Signal::Retire => self.retire(group, out_events),
            }
        }
    }

    fn retire(&mut self, group: GroupId, out_events: &mut Vec<Event>) {
        let Some(state) = self.groups.remove(group) else {
            return;
        };
        for entity in state.participants() {
            if self.bodies.remove(entity) {
                out_events.push(Event::EntityRemoved { entity });
            }
        }
        log::info!("retired {group:?} after shatter");
        out_events.push(Event::GroupRetired { group });
    }
}

/// Validated outcome of a group move.
#[derive(Debug)]
struct MovePlan {
    group: GroupId,
    bounds: Bounds,
    regions: Vec<(EntityRef, Rect)>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnBlock { region, key } => match world.bodies.spawn_block(region, key) {
            Ok(block) => out_events.push(Event::BlockSpawned { block, region }),
            Err(reason) => out_events.push(Event::BlockRejected { region, reason }),
        },
        Command::SpawnPlatform { region } => match world.bodies.spawn_platform(region) {
            Ok(platform) => out_events.push(Event::PlatformSpawned { platform, region }),
            Err(reason) => out_events.push(Event::PlatformRejected { region, reason }),
        },
        Command::ConfigureGrouping { absorb_platforms } => {
            world.grouping = GroupingConfig::new(absorb_platforms);
            world.assembler.configure(world.grouping);
        }
        Command::ConfigureShatter { config } => {
            world.shatter = config;
        }
        Command::ActivateBlock { block } => world.activate(block, out_events),
        Command::TranslateBlock { block, delta } => world.translate(block, delta, out_events),
        Command::TriggerShatter { block } => world.trigger_shatter(block, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_destruction(dt, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use passblock_core::{
        BlockId, Bounds, Corner, Edge, EntityRef, GroupId, GroupingKey, PlatformId, Rect,
        ShatterConfig, ShatterPhase,
    };

    use super::{bodies::BlockState, groups::GroupState, World};

    /// Identifiers of every live group in ascending order.
    #[must_use]
    pub fn groups(world: &World) -> Vec<GroupId> {
        world.groups.ids()
    }

    /// Read-only view of a live group.
    #[must_use]
    pub fn group(world: &World, group: GroupId) -> Option<GroupView<'_>> {
        world
            .groups
            .get(group)
            .map(|state| GroupView { id: group, state })
    }

    /// Group the block belongs to, if it was activated.
    #[must_use]
    pub fn group_of(world: &World, block: BlockId) -> Option<GroupId> {
        world.bodies.block(block).and_then(|state| state.group)
    }

    /// Captures a snapshot of a single block.
    #[must_use]
    pub fn block(world: &World, block: BlockId) -> Option<BlockSnapshot> {
        world
            .bodies
            .block(block)
            .map(|state| snapshot_block(world, block, state))
    }

    /// Captures snapshots of every live block in ascending identifier order.
    #[must_use]
    pub fn blocks(world: &World) -> Vec<BlockSnapshot> {
        world
            .bodies
            .blocks()
            .map(|(id, state)| snapshot_block(world, id, state))
            .collect()
    }

    /// Captures a snapshot of a single platform.
    #[must_use]
    pub fn platform(world: &World, platform: PlatformId) -> Option<PlatformSnapshot> {
        world.bodies.platform(platform).map(|state| PlatformSnapshot {
            id: platform,
            region: state.region,
            group: state.group,
            collidable: state.collidable,
            visible: state.visible,
        })
    }

    /// Identifiers of every live platform in ascending order.
    #[must_use]
    pub fn platforms(world: &World) -> Vec<PlatformId> {
        world.bodies.platforms().map(|(id, _)| id).collect()
    }

    /// Shatter parameters applied to the next triggered group.
    #[must_use]
    pub fn shatter_config(world: &World) -> ShatterConfig {
        world.shatter
    }

    /// Whether group assembly absorbs adjacent platforms.
    #[must_use]
    pub fn absorbs_platforms(world: &World) -> bool {
        world.grouping.absorb_platforms()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    fn snapshot_block(world: &World, id: BlockId, state: &BlockState) -> BlockSnapshot {
        let entity = EntityRef::Block(id);
        let destruction = state
            .group
            .and_then(|group| world.groups.get(group))
            .map(|group| &group.destruction);
        BlockSnapshot {
            id,
            region: state.region,
            key: state.key,
            group: state.group,
            collidable: state.collidable,
            visible: state.visible,
            attachments_enabled: state.attachments_enabled,
            phase: destruction
                .and_then(|destruction| destruction.phase_of(entity))
                .unwrap_or(ShatterPhase::Idle),
            intensity: destruction
                .and_then(|destruction| destruction.intensity_of(entity))
                .unwrap_or(0.0),
        }
    }

    /// Read-only accessors over a group, consumed once per frame by renderers.
    #[derive(Clone, Copy, Debug)]
    pub struct GroupView<'a> {
        id: GroupId,
        state: &'a GroupState,
    }

    impl<'a> GroupView<'a> {
        /// Identifier of the group.
        #[must_use]
        pub fn id(&self) -> GroupId {
            self.id
        }

        /// Block owning the group's authoritative state.
        #[must_use]
        pub fn master(&self) -> BlockId {
            self.state.master
        }

        /// Member blocks in discovery order.
        #[must_use]
        pub fn members(&self) -> &'a [BlockId] {
            &self.state.members
        }

        /// Absorbed platforms in discovery order.
        #[must_use]
        pub fn platforms(&self) -> &'a [PlatformId] {
            &self.state.platforms
        }

        /// Current bounding box in world space.
        #[must_use]
        pub fn bounds(&self) -> Bounds {
            self.state.bounds
        }

        /// Occupancy grid dimensions in cells.
        #[must_use]
        pub fn grid_size(&self) -> (i32, i32) {
            (self.state.outline.columns(), self.state.outline.rows())
        }

        /// Merged edges in the group frame.
        #[must_use]
        pub fn edges(&self) -> &'a [Edge] {
            self.state.outline.edges()
        }

        /// Corner accents in the group frame.
        #[must_use]
        pub fn corners(&self) -> &'a [Corner] {
            self.state.outline.corners()
        }

        /// Whether the destruction sequence was triggered.
        #[must_use]
        pub fn is_shattering(&self) -> bool {
            self.state.destruction.is_shattering()
        }

        /// Highest shatter intensity across every participant.
        #[must_use]
        pub fn intensity(&self) -> f32 {
            self.state.destruction.peak_intensity()
        }

        /// Current distortion value while the finale runs.
        #[must_use]
        pub fn distortion(&self) -> Option<f32> {
            self.state.destruction.distortion()
        }
    }

    /// Read-only snapshot of a pass-through block.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BlockSnapshot {
        /// Identifier of the block.
        pub id: BlockId,
        /// Current footprint in world units.
        pub region: Rect,
        /// Attribute deciding which blocks it may group with.
        pub key: GroupingKey,
        /// Group the block belongs to, if any.
        pub group: Option<GroupId>,
        /// Whether the block still takes part in collision.
        pub collidable: bool,
        /// Whether the block is still drawn.
        pub visible: bool,
        /// Whether externally owned attachments are still live.
        pub attachments_enabled: bool,
        /// Coarse destruction phase.
        pub phase: ShatterPhase,
        /// Current shatter intensity.
        pub intensity: f32,
    }

    /// Read-only snapshot of an auxiliary platform.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlatformSnapshot {
        /// Identifier of the platform.
        pub id: PlatformId,
        /// Current footprint in world units.
        pub region: Rect,
        /// Group the platform was absorbed into, if any.
        pub group: Option<GroupId>,
        /// Whether the platform still takes part in collision.
        pub collidable: bool,
        /// Whether the platform is still drawn.
        pub visible: bool,
    }
}
