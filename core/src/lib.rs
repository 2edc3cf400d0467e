#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pass-through block engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure grouping, outline and destruction
//! systems. Adapters submit [`Command`] values describing desired mutations,
//! the world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values that stand in for every external collaborator
//! (attachment teardown, visual effects, removal from the simulation).
//!
//! All geometry is expressed in whole world units on a Y-down plane. Block
//! footprints are aligned to [`CELL_SIZE`].

use std::{ops::Add, time::Duration};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of a single occupancy cell measured in world units.
pub const CELL_SIZE: i32 = 8;

/// Location on the world plane measured in whole units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Origin of the world plane.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing towards the east.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing towards the south.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the point shifted by the provided offset, or `None` when a
    /// coordinate would leave the `i32` range.
    #[must_use]
    pub const fn checked_offset(self, delta: Offset) -> Option<Self> {
        match (self.x.checked_add(delta.dx), self.y.checked_add(delta.dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Offset that carries `origin` onto this point.
    #[must_use]
    pub const fn relative_to(self, origin: Point) -> Offset {
        Offset::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Whole-unit displacement applied to rigid moves.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Offset {
    dx: i32,
    dy: i32,
}

impl Offset {
    /// Displacement that leaves positions untouched.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component of the displacement.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component of the displacement.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the displacement moves nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    origin: Point,
    width: i32,
    height: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// Creates a rectangle from an anchor point and dimensions.
    #[must_use]
    pub const fn from_origin(origin: Point, width: i32, height: i32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Horizontal extent in world units.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Vertical extent in world units.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.origin.x
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.origin.y
    }

    /// Exclusive horizontal bound.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.origin.x + self.width
    }

    /// Exclusive vertical bound.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.origin.y + self.height
    }

    /// Exclusive bottom-right corner.
    #[must_use]
    pub const fn far_corner(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Center of the rectangle rounded towards the origin.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2,
            self.origin.y + self.height / 2,
        )
    }

    /// Reports whether the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Reports whether position and size are whole multiples of [`CELL_SIZE`].
    #[must_use]
    pub const fn is_cell_aligned(&self) -> bool {
        self.origin.x % CELL_SIZE == 0
            && self.origin.y % CELL_SIZE == 0
            && self.width % CELL_SIZE == 0
            && self.height % CELL_SIZE == 0
    }

    /// Exclusive bottom-right corner, or `None` when it lies outside the
    /// `i32` range.
    #[must_use]
    pub const fn checked_far_corner(&self) -> Option<Point> {
        let size = Offset::new(self.width, self.height);
        self.origin.checked_offset(size)
    }

    /// Grows the rectangle by `amount` units on every side, clamping at the
    /// edges of the `i32` range.
    #[must_use]
    pub const fn expanded(&self, amount: i32) -> Self {
        Self::new(
            self.origin.x.saturating_sub(amount),
            self.origin.y.saturating_sub(amount),
            self.width.saturating_add(amount.saturating_mul(2)),
            self.height.saturating_add(amount.saturating_mul(2)),
        )
    }

    /// Returns the rectangle shifted by the provided offset, or `None` when
    /// either corner would leave the `i32` range.
    #[must_use]
    pub const fn translated(&self, delta: Offset) -> Option<Self> {
        let Some(origin) = self.origin.checked_offset(delta) else {
            return None;
        };
        let moved = Self::from_origin(origin, self.width, self.height);
        match moved.checked_far_corner() {
            Some(_) => Some(moved),
            None => None,
        }
    }

    /// Reports whether the two rectangles share a region of positive area.
    #[must_use]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Reports whether `other` lies entirely within this rectangle.
    #[must_use]
    pub const fn contains(&self, other: &Rect) -> bool {
        self.left() <= other.left()
            && self.top() <= other.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Inclusive-exclusive bounding box spanning a group's member extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Bounding box that exactly covers a single rectangle.
    #[must_use]
    pub const fn of(rect: &Rect) -> Self {
        Self {
            min: rect.origin(),
            max: rect.far_corner(),
        }
    }

    /// Bounding box covering every provided rectangle, if any.
    #[must_use]
    pub fn enclosing<'a, I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects.into_iter().fold(None, |bounds, rect| match bounds {
            None => Some(Self::of(rect)),
            Some(bounds) => Some(bounds.union(rect)),
        })
    }

    /// Grows the bounding box so it also covers `rect`.
    #[must_use]
    pub fn union(&self, rect: &Rect) -> Self {
        Self {
            min: Point::new(self.min.x.min(rect.left()), self.min.y.min(rect.top())),
            max: Point::new(self.max.x.max(rect.right()), self.max.y.max(rect.bottom())),
        }
    }

    /// Top-left corner, the origin of the group frame.
    #[must_use]
    pub const fn min(&self) -> Point {
        self.min
    }

    /// Exclusive bottom-right corner.
    #[must_use]
    pub const fn max(&self) -> Point {
        self.max
    }

    /// Horizontal extent in world units.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Vertical extent in world units.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Center of the box rounded towards the origin.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Returns the box shifted by the provided offset, or `None` when either
    /// corner would leave the `i32` range.
    #[must_use]
    pub const fn translated(&self, delta: Offset) -> Option<Self> {
        let Some(min) = self.min.checked_offset(delta) else {
            return None;
        };
        match self.max.checked_offset(delta) {
            Some(max) => Some(Self { min, max }),
            None => None,
        }
    }
}

/// Unique identifier assigned to a pass-through block.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new block identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an auxiliary platform.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlatformId(u32);

impl PlatformId {
    /// Creates a new platform identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a group by the world registry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a new group identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to any simulation body that can belong to a group.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EntityRef {
    /// A pass-through block.
    Block(BlockId),
    /// An auxiliary platform absorbed into a group.
    Platform(PlatformId),
}

/// Attribute that decides which blocks may join the same group.
///
/// Only blocks sharing a key are ever merged, e.g. feather-mode blocks never
/// connect to regular ones.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GroupingKey(u32);

impl GroupingKey {
    /// Creates a new grouping key.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the key.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side of a tile or the outward facing of a boundary edge.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Side {
    /// Towards decreasing y.
    North,
    /// Towards increasing x.
    East,
    /// Towards increasing y.
    South,
    /// Towards decreasing x.
    West,
}

impl Side {
    /// Every side in extraction order.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Slot used by per-tile side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Unit step from a tile towards its neighbor on this side.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Reports whether edges on this side run horizontally.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// Whether decorations on this side are drawn mirrored.
    #[must_use]
    pub const fn flips(self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

/// Merged, axis-aligned boundary segment of a group's footprint.
///
/// Coordinates are stored in the group frame, relative to the group's
/// bounding-box minimum, so rigid translation never touches them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    start: Point,
    end: Point,
    facing: Side,
    wobble_phase: f32,
    flip: bool,
}

impl Edge {
    /// Creates an edge facing `facing` between the two points.
    #[must_use]
    pub const fn new(start: Point, end: Point, facing: Side, wobble_phase: f32) -> Self {
        Self {
            start,
            end,
            facing,
            wobble_phase,
            flip: facing.flips(),
        }
    }

    /// First endpoint in the group frame.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Second endpoint in the group frame.
    #[must_use]
    pub const fn end(&self) -> Point {
        self.end
    }

    /// Outward facing of the edge.
    #[must_use]
    pub const fn facing(&self) -> Side {
        self.facing
    }

    /// Animation phase offset of the edge's wobble.
    #[must_use]
    pub const fn wobble_phase(&self) -> f32 {
        self.wobble_phase
    }

    /// Whether decorations are drawn mirrored along this edge.
    #[must_use]
    pub const fn flip(&self) -> bool {
        self.flip
    }

    /// Length of the edge along its varying axis.
    #[must_use]
    pub const fn length(&self) -> i32 {
        if self.facing.is_horizontal() {
            self.end.x - self.start.x
        } else {
            self.end.y - self.start.y
        }
    }

    /// Midpoint of the edge in the group frame.
    #[must_use]
    pub fn midpoint(&self) -> (f32, f32) {
        (
            (self.start.x + self.end.x) as f32 / 2.0,
            (self.start.y + self.end.y) as f32 / 2.0,
        )
    }

    /// Moves the end point further along the run by `amount` units.
    pub fn extend(&mut self, amount: i32) {
        if self.facing.is_horizontal() {
            self.end.x += amount;
        } else {
            self.end.y += amount;
        }
    }

    /// Replaces the wobble phase.
    pub fn set_wobble_phase(&mut self, phase: f32) {
        self.wobble_phase = phase;
    }
}

bitflags! {
    /// Outer and inner corner orientations present at a tile.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CornerKinds: u8 {
        /// Convex corner at the tile's north-west vertex.
        const OUTER_NORTH_WEST = 1 << 0;
        /// Convex corner at the tile's north-east vertex.
        const OUTER_NORTH_EAST = 1 << 1;
        /// Convex corner at the tile's south-east vertex.
        const OUTER_SOUTH_EAST = 1 << 2;
        /// Convex corner at the tile's south-west vertex.
        const OUTER_SOUTH_WEST = 1 << 3;
        /// Concave corner at the tile's north-west vertex.
        const INNER_NORTH_WEST = 1 << 4;
        /// Concave corner at the tile's north-east vertex.
        const INNER_NORTH_EAST = 1 << 5;
        /// Concave corner at the tile's south-east vertex.
        const INNER_SOUTH_EAST = 1 << 6;
        /// Concave corner at the tile's south-west vertex.
        const INNER_SOUTH_WEST = 1 << 7;

        /// Every convex orientation.
        const OUTER = Self::OUTER_NORTH_WEST.bits()
            | Self::OUTER_NORTH_EAST.bits()
            | Self::OUTER_SOUTH_EAST.bits()
            | Self::OUTER_SOUTH_WEST.bits();
        /// Every concave orientation.
        const INNER = Self::INNER_NORTH_WEST.bits()
            | Self::INNER_NORTH_EAST.bits()
            | Self::INNER_SOUTH_EAST.bits()
            | Self::INNER_SOUTH_WEST.bits();
    }
}

impl CornerKinds {
    /// Maps each orientation onto the one it becomes after a half turn.
    #[must_use]
    pub fn rotated_half_turn(self) -> Self {
        const PAIRS: [(CornerKinds, CornerKinds); 8] = [
            (CornerKinds::OUTER_NORTH_WEST, CornerKinds::OUTER_SOUTH_EAST),
            (CornerKinds::OUTER_NORTH_EAST, CornerKinds::OUTER_SOUTH_WEST),
            (CornerKinds::OUTER_SOUTH_EAST, CornerKinds::OUTER_NORTH_WEST),
            (CornerKinds::OUTER_SOUTH_WEST, CornerKinds::OUTER_NORTH_EAST),
            (CornerKinds::INNER_NORTH_WEST, CornerKinds::INNER_SOUTH_EAST),
            (CornerKinds::INNER_NORTH_EAST, CornerKinds::INNER_SOUTH_WEST),
            (CornerKinds::INNER_SOUTH_EAST, CornerKinds::INNER_NORTH_WEST),
            (CornerKinds::INNER_SOUTH_WEST, CornerKinds::INNER_NORTH_EAST),
        ];

        PAIRS
            .iter()
            .filter(|(from, _)| self.contains(*from))
            .fold(CornerKinds::empty(), |rotated, (_, to)| rotated | *to)
    }
}

/// Decorative corner features found at one occupied tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Corner {
    vertex: Point,
    kinds: CornerKinds,
}

impl Corner {
    /// Creates a corner record anchored at the tile's top-left vertex.
    #[must_use]
    pub const fn new(vertex: Point, kinds: CornerKinds) -> Self {
        Self { vertex, kinds }
    }

    /// Top-left vertex of the tile in the group frame.
    #[must_use]
    pub const fn vertex(&self) -> Point {
        self.vertex
    }

    /// Orientations flagged at this tile.
    #[must_use]
    pub const fn kinds(&self) -> CornerKinds {
        self.kinds
    }

    /// Number of convex orientations flagged.
    #[must_use]
    pub fn outer_count(&self) -> u32 {
        self.kinds
            .intersection(CornerKinds::OUTER)
            .bits()
            .count_ones()
    }

    /// Number of concave orientations flagged.
    #[must_use]
    pub fn inner_count(&self) -> u32 {
        self.kinds
            .intersection(CornerKinds::INNER)
            .bits()
            .count_ones()
    }
}

/// Timing and effect parameters of the shatter sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShatterConfig {
    /// Wait before the intensity ramp starts. Ignored under quick destroy.
    pub pre_delay: Duration,
    /// Time the intensity ramp takes to reach its maximum.
    pub ramp_duration: Duration,
    /// Clamp applied to the ramped intensity.
    pub max_intensity: f32,
    /// Skips the pre-delay and disables collision at trigger time.
    pub quick_destroy: bool,
    /// Camera shake amplitude requested when the whole group is destroyed.
    pub shake_amplitude: f32,
    /// Distortion value applied when the whole group is destroyed.
    pub distortion_start: f32,
    /// Linear decay applied to the distortion value per simulated second.
    pub distortion_decay_per_second: f32,
}

impl ShatterConfig {
    /// Time between trigger and destruction of a single participant.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        let pre_delay = self.effective_pre_delay();
        pre_delay.saturating_add(self.ramp_duration)
    }

    /// Pre-delay after accounting for quick destroy.
    #[must_use]
    pub fn effective_pre_delay(&self) -> Duration {
        if self.quick_destroy {
            Duration::ZERO
        } else {
            self.pre_delay
        }
    }
}

impl Default for ShatterConfig {
    fn default() -> Self {
        Self {
            pre_delay: Duration::from_millis(400),
            ramp_duration: Duration::from_millis(500),
            max_intensity: 1.0,
            quick_destroy: false,
            shake_amplitude: 0.3,
            distortion_start: 0.22,
            distortion_decay_per_second: 0.5,
        }
    }
}

/// Coarse destruction phase exposed to queries and renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShatterPhase {
    /// No shatter has been triggered.
    Idle,
    /// Waiting out the pre-delay.
    Delaying,
    /// Ramping colour and intensity towards the maximum.
    Ramping,
    /// Collision and visibility are gone; awaiting removal.
    Destroyed,
}

/// Fire-and-forget requests for the visual-effect sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Particle burst emitted when a body finishes shattering.
    ParticleBurst {
        /// World position of the burst.
        position: Point,
        /// Strength of the burst.
        intensity: f32,
    },
    /// Camera shake emitted once per destroyed group.
    Shake {
        /// World position the shake originates from.
        position: Point,
        /// Amplitude of the shake.
        amplitude: f32,
    },
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SpawnError {
    /// The requested region has no area.
    #[error("region has no area")]
    Empty,
    /// The requested region is not aligned to the cell grid.
    #[error("region is not aligned to the 8-unit cell grid")]
    Misaligned,
    /// The requested region reaches past the representable coordinates.
    #[error("region extends past the representable world")]
    OutOfRange,
}

/// Reasons a group-wide request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum GroupError {
    /// No block with the provided identifier exists.
    #[error("block does not exist")]
    MissingBlock,
    /// The block was never activated and belongs to no group.
    #[error("block has not been assigned to a group")]
    Ungrouped,
    /// The move would carry the group past the representable coordinates.
    #[error("move would leave the representable world")]
    OutOfRange,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers a pass-through block.
    SpawnBlock {
        /// Footprint of the block.
        region: Rect,
        /// Attribute deciding which blocks it may group with.
        key: GroupingKey,
    },
    /// Registers an auxiliary platform that groups may absorb.
    SpawnPlatform {
        /// Footprint of the platform.
        region: Rect,
    },
    /// Toggles whether group assembly absorbs adjacent platforms.
    ConfigureGrouping {
        /// Enables platform absorption.
        absorb_platforms: bool,
    },
    /// Replaces the shatter timing used for subsequently triggered groups.
    ConfigureShatter {
        /// New shatter parameters.
        config: ShatterConfig,
    },
    /// Activates a block, assembling its group if it has none yet.
    ActivateBlock {
        /// Block being activated.
        block: BlockId,
    },
    /// Rigidly moves the block's group by a whole-unit displacement.
    TranslateBlock {
        /// Any member of the group being moved.
        block: BlockId,
        /// Displacement applied to the whole group.
        delta: Offset,
    },
    /// Starts the destruction sequence of the block's group.
    TriggerShatter {
        /// Any member of the group being shattered.
        block: BlockId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a block was registered.
    BlockSpawned {
        /// Identifier allocated to the block.
        block: BlockId,
        /// Footprint of the block.
        region: Rect,
    },
    /// Reports that a block spawn request was rejected.
    BlockRejected {
        /// Footprint provided in the request.
        region: Rect,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a platform was registered.
    PlatformSpawned {
        /// Identifier allocated to the platform.
        platform: PlatformId,
        /// Footprint of the platform.
        region: Rect,
    },
    /// Reports that a platform spawn request was rejected.
    PlatformRejected {
        /// Footprint provided in the request.
        region: Rect,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Announces a freshly assembled group.
    GroupFormed {
        /// Identifier allocated to the group.
        group: GroupId,
        /// Block owning the group's authoritative state.
        master: BlockId,
        /// Member blocks in discovery order.
        members: Vec<BlockId>,
        /// Absorbed platforms in discovery order.
        platforms: Vec<PlatformId>,
    },
    /// Confirms that a group moved rigidly.
    GroupTranslated {
        /// Group that moved.
        group: GroupId,
        /// Displacement that was applied.
        delta: Offset,
        /// Bounding box after the move.
        bounds: Bounds,
    },
    /// Reports that a translation request was rejected.
    TranslateRejected {
        /// Block named in the request.
        block: BlockId,
        /// Specific reason the move failed.
        reason: GroupError,
    },
    /// Announces that a group entered its destruction sequence.
    ShatterStarted {
        /// Group being destroyed.
        group: GroupId,
        /// Whether the pre-delay was skipped.
        quick: bool,
    },
    /// Reports that a shatter request was rejected.
    ShatterRejected {
        /// Block named in the request.
        block: BlockId,
        /// Specific reason the shatter was refused.
        reason: GroupError,
    },
    /// A body stopped taking part in collision.
    CollisionDisabled {
        /// Body that became non-collidable.
        entity: EntityRef,
    },
    /// A body finished its ramp and became invisible.
    BodyShattered {
        /// Body that finished shattering.
        entity: EntityRef,
    },
    /// Request to tear down the attachments owned by a body.
    AttachmentsDisabled {
        /// Body whose attachments must be disabled.
        entity: EntityRef,
    },
    /// Request for the visual-effect sink.
    EffectRequested {
        /// Effect to play.
        effect: Effect,
    },
    /// Current value of a destroyed group's decaying distortion.
    DistortionChanged {
        /// Group the distortion belongs to.
        group: GroupId,
        /// Distortion after this step's decay.
        value: f32,
    },
    /// Request to remove a body from the simulation.
    EntityRemoved {
        /// Body being removed.
        entity: EntityRef,
    },
    /// Confirms that a group and all of its bodies were torn down.
    GroupRetired {
        /// Group that was retired.
        group: GroupId,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BlockId, Bounds, CornerKinds, Edge, GroupError, GroupingKey, Offset, Point, Rect,
        ShatterConfig, Side, SpawnError,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn rect_round_trips_through_bincode() {
        assert_round_trip(&Rect::new(-16, 24, 32, 8));
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&BlockId::new(42));
        assert_round_trip(&GroupingKey::new(3));
    }

    #[test]
    fn shatter_config_round_trips_through_bincode() {
        let config = ShatterConfig {
            quick_destroy: true,
            ..ShatterConfig::default()
        };
        assert_round_trip(&config);
    }

    #[test]
    fn errors_round_trip_through_bincode() {
        assert_round_trip(&SpawnError::Misaligned);
        assert_round_trip(&GroupError::Ungrouped);
    }

    #[test]
    fn side_by_side_rects_intersect_only_after_expansion() {
        let left = Rect::new(0, 0, 8, 8);
        let right = Rect::new(8, 0, 8, 8);

        assert!(!left.intersects(&right));
        assert!(left.expanded(1).intersects(&right));
    }

    #[test]
    fn distant_rects_stay_apart_after_expansion() {
        let left = Rect::new(0, 0, 8, 8);
        let right = Rect::new(16, 0, 8, 8);

        assert!(!left.expanded(1).intersects(&right));
    }

    #[test]
    fn alignment_requires_every_component_on_the_grid() {
        assert!(Rect::new(8, -16, 24, 8).is_cell_aligned());
        assert!(!Rect::new(4, 0, 8, 8).is_cell_aligned());
        assert!(!Rect::new(0, 0, 8, 12).is_cell_aligned());
    }

    #[test]
    fn bounds_enclose_every_rect() {
        let rects = [Rect::new(0, 0, 8, 8), Rect::new(16, -8, 8, 24)];
        let bounds = Bounds::enclosing(rects.iter()).expect("non-empty input");

        assert_eq!(bounds.min(), Point::new(0, -8));
        assert_eq!(bounds.max(), Point::new(24, 16));
        assert_eq!(bounds.width(), 24);
        assert_eq!(bounds.height(), 24);
    }

    #[test]
    fn bounds_translation_composes() {
        let bounds = Bounds::of(&Rect::new(0, 0, 16, 8));
        let a = Offset::new(3, -2);
        let b = Offset::new(-7, 5);

        let stepwise = bounds.translated(a).and_then(|moved| moved.translated(b));
        assert_eq!(stepwise, bounds.translated(a + b));
        assert_eq!(stepwise.map(|moved| moved.min()), Some(Point::new(-4, 3)));
    }

    #[test]
    fn translation_past_the_coordinate_range_is_refused() {
        let rect = Rect::new(0, 0, 8, 8);
        let far = Offset::new(i32::MAX, 0);
        let edge = Rect::new(i32::MAX - 7, 0, 8, 8);

        assert_eq!(rect.translated(far), None);
        assert_eq!(Bounds::of(&rect).translated(far), None);
        assert_eq!(edge.checked_far_corner(), None);
        assert_eq!(
            rect.translated(Offset::new(i32::MAX - 8, 0)),
            Some(Rect::new(i32::MAX - 8, 0, 8, 8))
        );
    }

    #[test]
    fn expansion_clamps_at_the_coordinate_range() {
        let grown = Rect::new(i32::MIN, 0, 8, 8).expanded(1);

        assert_eq!(grown.left(), i32::MIN);
        assert_eq!(grown.width(), 10);
    }

    #[test]
    fn edge_extension_follows_its_axis() {
        let mut north = Edge::new(Point::new(0, 0), Point::new(8, 0), Side::North, 0.0);
        north.extend(8);
        assert_eq!(north.end(), Point::new(16, 0));
        assert_eq!(north.length(), 16);
        assert!(!north.flip());

        let mut west = Edge::new(Point::new(0, 0), Point::new(0, 8), Side::West, 0.0);
        west.extend(9);
        assert_eq!(west.end(), Point::new(0, 17));
        assert!(west.flip());
    }

    #[test]
    fn half_turn_swaps_opposite_corners() {
        let kinds = CornerKinds::OUTER_NORTH_WEST | CornerKinds::INNER_NORTH_EAST;
        assert_eq!(
            kinds.rotated_half_turn(),
            CornerKinds::OUTER_SOUTH_EAST | CornerKinds::INNER_SOUTH_WEST
        );
    }

    #[test]
    fn quick_destroy_drops_the_pre_delay() {
        let config = ShatterConfig {
            pre_delay: Duration::from_millis(300),
            ramp_duration: Duration::from_millis(200),
            quick_destroy: true,
            ..ShatterConfig::default()
        };

        assert_eq!(config.total_duration(), Duration::from_millis(200));
    }
}
