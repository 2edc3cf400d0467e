#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flood-fills mutually adjacent blocks into one group.
//!
//! Assembly starts from a seed block and repeatedly asks a [`SpatialIndex`]
//! for unclaimed blocks sharing the seed's [`GroupingKey`] whose region
//! touches a 1-unit expansion of an already collected member. Every candidate
//! is claimed before the search descends into it, so no block is visited
//! twice and the search terminates once the unclaimed pool is exhausted.

use std::{collections::BTreeSet, vec::IntoIter};

use passblock_core::{BlockId, Bounds, EntityRef, GroupingKey, PlatformId, Rect};

/// Distance by which member regions are grown before testing adjacency.
const ADJACENCY_MARGIN: i32 = 1;

/// Selects which kind of body a spatial query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindFilter {
    /// Blocks carrying the provided grouping key.
    Blocks(GroupingKey),
    /// Auxiliary platforms of any kind.
    Platforms,
}

/// Read-only spatial lookups the assembler depends on.
pub trait SpatialIndex {
    /// Bodies matching `filter` whose region intersects `area`, in a stable order.
    fn query_overlapping(&self, area: Rect, filter: KindFilter) -> Vec<EntityRef>;

    /// Footprint of the body, if it exists.
    fn region(&self, entity: EntityRef) -> Option<Rect>;

    /// Grouping key of the block, if it exists.
    fn grouping_key(&self, block: BlockId) -> Option<GroupingKey>;

    /// Reports whether the body already belongs to a group.
    fn is_grouped(&self, entity: EntityRef) -> bool;
}

/// Configuration parameters required to construct the assembler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    absorb_platforms: bool,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(absorb_platforms: bool) -> Self {
        Self { absorb_platforms }
    }

    /// Whether adjacent platforms join the group.
    #[must_use]
    pub const fn absorb_platforms(&self) -> bool {
        self.absorb_platforms
    }
}

/// Bodies collected by a single assembly run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    members: Vec<BlockId>,
    regions: Vec<Rect>,
    platforms: Vec<PlatformId>,
    bounds: Bounds,
}

impl Assembly {
    /// Member blocks in discovery order. The seed always comes first.
    #[must_use]
    pub fn members(&self) -> &[BlockId] {
        &self.members
    }

    /// Regions of the member blocks, parallel to [`Assembly::members`].
    #[must_use]
    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    /// Absorbed platforms in discovery order.
    #[must_use]
    pub fn platforms(&self) -> &[PlatformId] {
        &self.platforms
    }

    /// Union of the member regions.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Block elected to own the group's state.
    #[must_use]
    pub fn master(&self) -> BlockId {
        self.members[0]
    }
}

/// Flood-fill assembler with reusable scratch buffers.
#[derive(Debug, Default)]
pub struct GroupAssembler {
    config: Config,
    claimed: BTreeSet<EntityRef>,
    frames: Vec<IntoIter<EntityRef>>,
}

impl GroupAssembler {
    /// Creates a new assembler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            claimed: BTreeSet::new(),
            frames: Vec::new(),
        }
    }

    /// Replaces the configuration used by later runs.
    pub fn configure(&mut self, config: Config) {
        self.config = config;
    }

    /// Collects every body connected to `seed`.
    ///
    /// Returns `None` when the seed does not exist or already belongs to a
    /// group, which makes re-running assembly on a grouped block a no-op.
    pub fn assemble<I>(&mut self, seed: BlockId, index: &I) -> Option<Assembly>
    where
        I: SpatialIndex + ?Sized,
    {
        let seed_ref = EntityRef::Block(seed);
        if index.is_grouped(seed_ref) {
            return None;
        }
        let key = index.grouping_key(seed)?;
        let seed_region = index.region(seed_ref)?;

        self.claimed.clear();
        self.frames.clear();
        let _ = self.claimed.insert(seed_ref);

        let mut members = vec![seed];
        let mut regions = vec![seed_region];
        let mut platforms = Vec::new();
        let mut bounds = Bounds::of(&seed_region);
        let frame = self.neighbors(seed_region, key, index);
        self.frames.push(frame);

        loop {
            let next = match self.frames.last_mut() {
                Some(frame) => frame.next(),
                None => break,
            };
            let Some(candidate) = next else {
                let _ = self.frames.pop();
                continue;
            };

            if self.claimed.contains(&candidate) || index.is_grouped(candidate) {
                continue;
            }
            let Some(region) = index.region(candidate) else {
                continue;
            };
            let _ = self.claimed.insert(candidate);

            match candidate {
                EntityRef::Block(block) => {
                    members.push(block);
                    regions.push(region);
                    bounds = bounds.union(&region);
                    let frame = self.neighbors(region, key, index);
                    self.frames.push(frame);
                }
                EntityRef::Platform(platform) => platforms.push(platform),
            }
        }

        log::debug!(
            "assembled group from {:?}: {} members, {} platforms, {}x{} bounds",
            seed,
            members.len(),
            platforms.len(),
            bounds.width(),
            bounds.height()
        );

        Some(Assembly {
            members,
            regions,
            platforms,
            bounds,
        })
    }

    fn neighbors<I>(&self, region: Rect, key: GroupingKey, index: &I) -> IntoIter<EntityRef>
    where
        I: SpatialIndex + ?Sized,
    {
        let area = region.expanded(ADJACENCY_MARGIN);
        let mut found = index.query_overlapping(area, KindFilter::Blocks(key));
        if self.config.absorb_platforms {
            found.extend(index.query_overlapping(area, KindFilter::Platforms));
        }
        found.into_iter()
    }
}
