//! Immutable route records and the enumeration table built from them.

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Least-cost route from an origin to a single target.
///
/// `steps` lists every tile entered after leaving the origin, ending with the
/// target; the origin itself is excluded. A changed route is always a new
/// record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathToTile {
    target: CellCoord,
    steps: Vec<CellCoord>,
    cost: u32,
}

impl PathToTile {
    /// Zero-cost record describing a unit that stays where it is.
    #[must_use]
    pub fn stationary(origin: CellCoord) -> Self {
        Self {
            target: origin,
            steps: Vec::new(),
            cost: 0,
        }
    }

    /// Assembles a record from an explicit step list.
    ///
    /// The target is the last step, or `origin` when `steps` is empty.
    #[must_use]
    pub fn from_steps(origin: CellCoord, steps: Vec<CellCoord>, cost: u32) -> Self {
        let target = steps.last().copied().unwrap_or(origin);
        Self {
            target,
            steps,
            cost,
        }
    }

    /// New record that continues this route into `cell`.
    #[must_use]
    pub fn extended(&self, cell: CellCoord, entry_cost: u32) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(cell);
        Self {
            target: cell,
            steps,
            cost: self.cost.saturating_add(entry_cost),
        }
    }

    /// Destination of the route.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Tiles entered in order, origin excluded and target included.
    #[must_use]
    pub fn steps(&self) -> &[CellCoord] {
        &self.steps
    }

    /// Total budget consumed by walking the whole route.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of tiles entered along the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the route stays on the origin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Best known route to every reachable tile, anchored at one origin.
///
/// The table is only valid for the board snapshot it was generated from and
/// for a unit standing on [`PathTable::origin`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTable {
    origin: CellCoord,
    entries: BTreeMap<CellCoord, PathToTile>,
}

impl PathTable {
    /// Creates a table holding only the zero-cost origin entry.
    #[must_use]
    pub fn anchored_at(origin: CellCoord) -> Self {
        let mut entries = BTreeMap::new();
        let _ = entries.insert(origin, PathToTile::stationary(origin));
        Self { origin, entries }
    }

    /// Coordinate the table was generated from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Reports whether the table may be used for a unit standing on `cell`.
    #[must_use]
    pub fn is_anchored_at(&self, cell: CellCoord) -> bool {
        self.origin == cell
    }

    /// Records `path` when its target has no entry yet or the path is strictly cheaper.
    ///
    /// Returns `true` when the table changed.
    pub fn offer(&mut self, path: PathToTile) -> bool {
        match self.entries.entry(path.target()) {
            Entry::Vacant(slot) => {
                let _ = slot.insert(path);
                true
            }
            Entry::Occupied(mut slot) => {
                if path.cost() < slot.get().cost() {
                    let _ = slot.insert(path);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Best route to `target`; `None` means the target cannot be reached at all.
    #[must_use]
    pub fn shortest_path(&self, target: CellCoord) -> Option<&PathToTile> {
        self.entries.get(&target)
    }

    /// Cost of the best route to `target`, if any.
    #[must_use]
    pub fn cost_to(&self, target: CellCoord) -> Option<u32> {
        self.shortest_path(target).map(PathToTile::cost)
    }

    /// Every coordinate whose best route costs at most `budget`.
    #[must_use]
    pub fn reachable_within(&self, budget: u32) -> BTreeSet<CellCoord> {
        self.entries
            .iter()
            .filter(|(_, path)| path.cost() <= budget)
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Reports whether the table holds a route to `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Iterates over routes ordered by target coordinate.
    pub fn iter(&self) -> impl Iterator<Item = &PathToTile> {
        self.entries.values()
    }

    /// Number of reachable coordinates, origin included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the table holds no entries.
    ///
    /// Tables built through [`PathTable::anchored_at`] keep their origin entry,
    /// so only a deserialized table can be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
