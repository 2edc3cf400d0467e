//! Authoritative block and platform state.

use std::collections::BTreeMap;

use passblock_core::{BlockId, EntityRef, GroupId, GroupingKey, PlatformId, Rect, SpawnError};
use passblock_system_grouping::{KindFilter, SpatialIndex};

/// Snapshot of a pass-through block stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BlockState {
    /// Footprint of the block in world units.
    pub(crate) region: Rect,
    /// Attribute deciding which blocks it may group with.
    pub(crate) key: GroupingKey,
    /// Group the block was claimed by, if any.
    pub(crate) group: Option<GroupId>,
    pub(crate) collidable: bool,
    pub(crate) visible: bool,
    /// Whether externally owned attachments are still live.
    pub(crate) attachments_enabled: bool,
}

/// Snapshot of an auxiliary platform stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlatformState {
    pub(crate) region: Rect,
    pub(crate) group: Option<GroupId>,
    pub(crate) collidable: bool,
    pub(crate) visible: bool,
}

/// Registry that stores bodies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct BodyRegistry {
    blocks: BTreeMap<BlockId, BlockState>,
    platforms: BTreeMap<PlatformId, PlatformState>,
    next_block_id: BlockId,
    next_platform_id: PlatformId,
}

impl BodyRegistry {
    /// Creates an empty registry with reset identifier counters.
    pub(crate) fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
            platforms: BTreeMap::new(),
            next_block_id: BlockId::new(0),
            next_platform_id: PlatformId::new(0),
        }
    }

    pub(crate) fn spawn_block(
        &mut self,
        region: Rect,
        key: GroupingKey,
    ) -> Result<BlockId, SpawnError> {
        validate(region)?;
        let id = self.next_block_id;
        self.next_block_id = BlockId::new(id.get().saturating_add(1));
        let _ = self.blocks.insert(
            id,
            BlockState {
                region,
                key,
                group: None,
                collidable: true,
                visible: true,
                attachments_enabled: true,
            },
        );
        Ok(id)
    }

    pub(crate) fn spawn_platform(&mut self, region: Rect) -> Result<PlatformId, SpawnError> {
        validate(region)?;
        let id = self.next_platform_id;
        self.next_platform_id = PlatformId::new(id.get().saturating_add(1));
        let _ = self.platforms.insert(
            id,
            PlatformState {
                region,
                group: None,
                collidable: true,
                visible: true,
            },
        );
        Ok(id)
    }

    pub(crate) fn block(&self, id: BlockId) -> Option<&BlockState> {
        self.blocks.get(&id)
    }

    pub(crate) fn platform(&self, id: PlatformId) -> Option<&PlatformState> {
        self.platforms.get(&id)
    }

    pub(crate) fn blocks(&self) -> impl Iterator<Item = (BlockId, &BlockState)> {
        self.blocks.iter().map(|(id, state)| (*id, state))
    }

    pub(crate) fn platforms(&self) -> impl Iterator<Item = (PlatformId, &PlatformState)> {
        self.platforms.iter().map(|(id, state)| (*id, state))
    }

    pub(crate) fn assign_group(&mut self, entity: EntityRef, group: GroupId) {
        match entity {
            EntityRef::Block(id) => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.group = Some(group);
                }
            }
            EntityRef::Platform(id) => {
                if let Some(platform) = self.platforms.get_mut(&id) {
                    platform.group = Some(group);
                }
            }
        }
    }

    pub(crate) fn set_region(&mut self, entity: EntityRef, region: Rect) {
        match entity {
            EntityRef::Block(id) => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.region = region;
                }
            }
            EntityRef::Platform(id) => {
                if let Some(platform) = self.platforms.get_mut(&id) {
                    platform.region = region;
                }
            }
        }
    }

    pub(crate) fn disable_collision(&mut self, entity: EntityRef) {
        match entity {
            EntityRef::Block(id) => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.collidable = false;
                }
            }
            EntityRef::Platform(id) => {
                if let Some(platform) = self.platforms.get_mut(&id) {
                    platform.collidable = false;
                }
            }
        }
    }

    /// Hides the body and tears down its attachments.
    pub(crate) fn shatter(&mut self, entity: EntityRef) {
        match entity {
            EntityRef::Block(id) => {
                if let Some(block) = self.blocks.get_mut(&id) {
                    block.collidable = false;
                    block.visible = false;
                    block.attachments_enabled = false;
                }
            }
            EntityRef::Platform(id) => {
                if let Some(platform) = self.platforms.get_mut(&id) {
                    platform.collidable = false;
                    platform.visible = false;
                }
            }
        }
    }

    /// Removes the body from the simulation, reporting whether it existed.
    pub(crate) fn remove(&mut self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Block(id) => self.blocks.remove(&id).is_some(),
            EntityRef::Platform(id) => self.platforms.remove(&id).is_some(),
        }
    }
}

impl SpatialIndex for BodyRegistry {
    fn query_overlapping(&self, area: Rect, filter: KindFilter) -> Vec<EntityRef> {
        match filter {
            KindFilter::Blocks(key) => self
                .blocks
                .iter()
                .filter(|(_, block)| block.key == key)
                .filter(|(_, block)| area.intersects(&block.region))
                .map(|(id, _)| EntityRef::Block(*id))
                .collect(),
            KindFilter::Platforms => self
                .platforms
                .iter()
                .filter(|(_, platform)| area.intersects(&platform.region))
                .map(|(id, _)| EntityRef::Platform(*id))
                .collect(),
        }
    }

    fn region(&self, entity: EntityRef) -> Option<Rect> {
        match entity {
            EntityRef::Block(id) => self.blocks.get(&id).map(|block| block.region),
            EntityRef::Platform(id) => self.platforms.get(&id).map(|platform| platform.region),
        }
    }

    fn grouping_key(&self, block: BlockId) -> Option<GroupingKey> {
        self.blocks.get(&block).map(|state| state.key)
    }

    fn is_grouped(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Block(id) => self
                .blocks
                .get(&id)
                .map_or(false, |block| block.group.is_some()),
            EntityRef::Platform(id) => self
                .platforms
                .get(&id)
                .map_or(false, |platform| platform.group.is_some()),
        }
    }
}

fn validate(region: Rect) -> Result<(), SpawnError> {
    if region.is_empty() {
        return Err(SpawnError::Empty);
    }
    if !region.is_cell_aligned() {
        return Err(SpawnError::Misaligned);
    }
    if region.checked_far_corner().is_none() {
        return Err(SpawnError::OutOfRange);
    }
    Ok(())
}
