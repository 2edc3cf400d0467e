#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for pass-through block adapters.
//!
//! Groups cache their outline in the group frame. Capturing a frame adds the
//! group's current bounding-box minimum to every stroke and accent so that
//! backends only ever deal with absolute world positions.

use anyhow::Result as AnyResult;
use glam::Vec2;
use passblock_core::{BlockId, CornerKinds, Edge, GroupId, Point, Side, CELL_SIZE};
use passblock_world::{query, World};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn to_vec2(point: Point) -> Vec2 {
    Vec2::new(point.x() as f32, point.y() as f32)
}

fn outward(side: Side) -> Vec2 {
    let (dx, dy) = side.step();
    Vec2::new(dx as f32, dy as f32)
}

/// Boundary edge positioned in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStroke {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
    /// Unit vector pointing away from the footprint.
    pub normal: Vec2,
    /// Unit vector decorations advance along. Mirrored on flipped edges so
    /// that every stroke runs clockwise around the footprint.
    pub tangent: Vec2,
    /// Animation phase offset of the wobble.
    pub wobble_phase: f32,
}

impl EdgeStroke {
    /// Positions a group-frame edge relative to the group's origin.
    #[must_use]
    pub fn from_edge(edge: &Edge, origin: Vec2) -> Self {
        let start = origin + to_vec2(edge.start());
        let end = origin + to_vec2(edge.end());
        let along = (end - start).normalize_or_zero();
        Self {
            start,
            end,
            normal: outward(edge.facing()),
            tangent: if edge.flip() { -along } else { along },
            wobble_phase: edge.wobble_phase(),
        }
    }

    /// Length of the stroke in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Corner decoration anchored at a tile of the footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerAccent {
    /// Top-left vertex of the tile in world space.
    pub tile: Vec2,
    /// Orientations to decorate.
    pub kinds: CornerKinds,
}

impl CornerAccent {
    /// World-space vertices of every flagged orientation.
    #[must_use]
    pub fn anchors(&self) -> Vec<(CornerKinds, Vec2)> {
        let cell = CELL_SIZE as f32;
        let north_west = self.tile;
        let north_east = self.tile + Vec2::new(cell, 0.0);
        let south_east = self.tile + Vec2::new(cell, cell);
        let south_west = self.tile + Vec2::new(0.0, cell);

        [
            (CornerKinds::OUTER_NORTH_WEST, north_west),
            (CornerKinds::OUTER_NORTH_EAST, north_east),
            (CornerKinds::OUTER_SOUTH_EAST, south_east),
            (CornerKinds::OUTER_SOUTH_WEST, south_west),
            (CornerKinds::INNER_NORTH_WEST, north_west),
            (CornerKinds::INNER_NORTH_EAST, north_east),
            (CornerKinds::INNER_SOUTH_EAST, south_east),
            (CornerKinds::INNER_SOUTH_WEST, south_west),
        ]
        .into_iter()
        .filter(|(kind, _)| self.kinds.contains(*kind))
        .collect()
    }
}

/// Samples the radial wobble animation of a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleSampler {
    /// Peak displacement in world units.
    pub amplitude: f32,
    /// Angular speed in radians per second.
    pub angular_speed: f32,
}

impl WobbleSampler {
    /// Creates a new sampler.
    #[must_use]
    pub const fn new(amplitude: f32, angular_speed: f32) -> Self {
        Self {
            amplitude,
            angular_speed,
        }
    }

    /// Displacement of the stroke along its normal at `seconds`.
    #[must_use]
    pub fn offset(&self, stroke: &EdgeStroke, seconds: f32) -> Vec2 {
        let wave = (seconds * self.angular_speed + stroke.wobble_phase).sin();
        stroke.normal * (self.amplitude * wave)
    }
}

impl Default for WobbleSampler {
    fn default() -> Self {
        Self::new(0.5, std::f32::consts::TAU)
    }
}

/// Everything a backend needs to draw one group.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineFrame {
    /// Group the frame was captured from.
    pub group: GroupId,
    /// Member blocks in discovery order; the first one is the master.
    pub members: Vec<BlockId>,
    /// Current bounding-box minimum in world space.
    pub origin: Vec2,
    /// Bounding-box size in world units.
    pub size: Vec2,
    /// Boundary strokes.
    pub strokes: Vec<EdgeStroke>,
    /// Corner decorations.
    pub accents: Vec<CornerAccent>,
    /// Fill tint lightened by the group's shatter intensity.
    pub tint: Color,
    /// Screen distortion requested by the shatter finale.
    pub distortion: f32,
}

impl OutlineFrame {
    /// Captures the current state of a group.
    #[must_use]
    pub fn capture(view: &query::GroupView<'_>, base: Color) -> Self {
        let bounds = view.bounds();
        let origin = to_vec2(bounds.min());
        Self {
            group: view.id(),
            members: view.members().to_vec(),
            origin,
            size: Vec2::new(bounds.width() as f32, bounds.height() as f32),
            strokes: view
                .edges()
                .iter()
                .map(|edge| EdgeStroke::from_edge(edge, origin))
                .collect(),
            accents: view
                .corners()
                .iter()
                .map(|corner| CornerAccent {
                    tile: origin + to_vec2(corner.vertex()),
                    kinds: corner.kinds(),
                })
                .collect(),
            tint: base.lighten(view.intensity()),
            distortion: view.distortion().unwrap_or(0.0),
        }
    }
}

/// Frames of every live group in ascending group order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Captured group frames.
    pub frames: Vec<OutlineFrame>,
}

impl Scene {
    /// Captures every live group in the world.
    #[must_use]
    pub fn capture(world: &World, base: Color) -> Self {
        let frames = query::groups(world)
            .into_iter()
            .filter_map(|group| query::group(world, group))
            .map(|view| OutlineFrame::capture(&view, base))
            .collect();
        Self { frames }
    }
}

/// Backend capable of presenting captured outline scenes.
pub trait OutlineRenderer {
    /// Draws the provided scene.
    fn render(&mut self, scene: &Scene) -> AnyResult<()>;
}
