//! Authoritative unit state management utilities.

use std::collections::BTreeMap;

use skirmish_core::{CellCoord, MovementProfile, PlayerId, UnitId, UnitSnapshot};

/// Movement-relevant state of a unit stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct UnitState {
    pub(crate) id: UnitId,
    pub(crate) owner: PlayerId,
    pub(crate) cell: CellCoord,
    pub(crate) target: CellCoord,
    pub(crate) moves_left: u32,
    pub(crate) profile: MovementProfile,
}

impl UnitState {
    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            owner: self.owner,
            cell: self.cell,
            target: self.target,
            moves_left: self.moves_left,
            profile: self.profile.clone(),
        }
    }

    /// Renews the per-turn budget.
    pub(crate) fn refresh_moves(&mut self) {
        self.moves_left = self.profile.move_speed();
    }

    /// Drops any pending destination.
    pub(crate) fn clear_target(&mut self) {
        self.target = self.cell;
    }
}

/// Registry that stores units and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, UnitState>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    /// Creates an empty unit registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    /// Registers a unit with a full budget and no pending destination.
    pub(crate) fn spawn(
        &mut self,
        owner: PlayerId,
        cell: CellCoord,
        profile: MovementProfile,
    ) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        let moves_left = profile.move_speed();
        let _ = self.entries.insert(
            id,
            UnitState {
                id,
                owner,
                cell,
                target: cell,
                moves_left,
                profile,
            },
        );
        id
    }

    pub(crate) fn get(&self, unit: UnitId) -> Option<&UnitState> {
        self.entries.get(&unit)
    }

    pub(crate) fn get_mut(&mut self, unit: UnitId) -> Option<&mut UnitState> {
        self.entries.get_mut(&unit)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut UnitState> {
        self.entries.values_mut()
    }
}
