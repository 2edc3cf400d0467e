//! Authoritative group state management.

use std::collections::BTreeMap;

use passblock_core::{BlockId, Bounds, EntityRef, GroupId, PlatformId};
use passblock_system_destruction::GroupDestruction;
use passblock_system_grouping::Assembly;
use passblock_system_outline::Outline;

/// Snapshot of a group stored inside the world.
///
/// The state is reached through the group's master block; members hold
/// nothing but the group identifier.
#[derive(Clone, Debug)]
pub(crate) struct GroupState {
    pub(crate) master: BlockId,
    /// Member blocks in discovery order.
    pub(crate) members: Vec<BlockId>,
    pub(crate) platforms: Vec<PlatformId>,
    /// Union of the current member extents.
    pub(crate) bounds: Bounds,
    /// Edges and corners in the group frame, computed once at formation.
    pub(crate) outline: Outline,
    pub(crate) destruction: GroupDestruction,
}

impl GroupState {
    fn from_assembly(assembly: &Assembly) -> Self {
        let members = assembly.members().to_vec();
        let platforms = assembly.platforms().to_vec();
        let destruction = GroupDestruction::new(participants(&members, &platforms));
        Self {
            master: assembly.master(),
            members,
            platforms,
            bounds: assembly.bounds(),
            outline: Outline::build(assembly.bounds(), assembly.regions()),
            destruction,
        }
    }

    /// Members followed by absorbed platforms.
    pub(crate) fn participants(&self) -> impl Iterator<Item = EntityRef> + '_ {
        participants(&self.members, &self.platforms)
    }
}

fn participants<'a>(
    members: &'a [BlockId],
    platforms: &'a [PlatformId],
) -> impl Iterator<Item = EntityRef> + 'a {
    members
        .iter()
        .copied()
        .map(EntityRef::Block)
        .chain(platforms.iter().copied().map(EntityRef::Platform))
}

/// Registry that stores groups and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct GroupRegistry {
    entries: BTreeMap<GroupId, GroupState>,
    next_group_id: GroupId,
}

impl GroupRegistry {
    /// Creates an empty group registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_group_id: GroupId::new(0),
        }
    }

    /// Registers a freshly assembled group and derives its outline.
    pub(crate) fn insert(&mut self, assembly: &Assembly) -> GroupId {
        let id = self.next_group_id;
        self.next_group_id = GroupId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, GroupState::from_assembly(assembly));
        id
    }

    pub(crate) fn get(&self, id: GroupId) -> Option<&GroupState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: GroupId) -> Option<&mut GroupState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: GroupId) -> Option<GroupState> {
        self.entries.remove(&id)
    }

    pub(crate) fn ids(&self) -> Vec<GroupId> {
        self.entries.keys().copied().collect()
    }
}
