#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Least-cost route search over the board.
//!
//! A [`Pathfinder`] binds a board snapshot to one unit's movement profile and
//! offers two strategies over the same cost and passability rules:
//! [`Pathfinder::enumerate_all`] builds the full [`PathTable`] used for
//! movement highlighting and turn resolution, while [`Pathfinder::find_one`]
//! runs a heuristic search when only a single destination matters.
//!
//! Tiles held by a unit other than the mover are treated as impassable by both
//! strategies, so every step of a returned route can be entered under the
//! snapshot it was computed from.
//!
//! Queries naming a coordinate off the board fail with
//! [`GridError::OutOfBounds`] instead of reporting an empty result.

mod best_first;
mod enumerate;

use skirmish_core::{
    BoardView, CellCoord, GridError, MovementProfile, PathTable, PathToTile, UnitId,
    UnitSnapshot,
};

/// Selects how [`Pathfinder::route`] answers a single-destination query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Enumerate the whole board and look the target up in the resulting table.
    EnumerateAll,
    /// Run the best-first search toward the target only.
    FindOne,
}

/// Route search bound to one board snapshot and one movement profile.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder<'a> {
    board: BoardView<'a>,
    profile: &'a MovementProfile,
    mover: Option<UnitId>,
    cheapest_step: u32,
}

impl<'a> Pathfinder<'a> {
    /// Creates a pathfinder for an anonymous mover; every occupied tile blocks it.
    #[must_use]
    pub fn new(board: BoardView<'a>, profile: &'a MovementProfile) -> Self {
        let cheapest_step = board
            .rules()
            .iter()
            .filter_map(|(terrain, _)| profile.step_cost(terrain, board.rules()))
            .min()
            .unwrap_or(0);

        Self {
            board,
            profile,
            mover: None,
            cheapest_step,
        }
    }

    /// Creates a pathfinder for a unit; only tiles held by other units block it.
    #[must_use]
    pub fn for_unit(board: BoardView<'a>, unit: &'a UnitSnapshot) -> Self {
        Self {
            mover: Some(unit.id),
            ..Self::new(board, &unit.profile)
        }
    }

    /// Board snapshot the pathfinder searches.
    #[must_use]
    pub const fn board(&self) -> BoardView<'a> {
        self.board
    }

    /// Best route from `origin` to every tile it can reach, without a budget cutoff.
    ///
    /// The origin is always present with cost zero, even when its own terrain
    /// or occupancy would otherwise forbid entering it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when `origin` is off the board.
    pub fn enumerate_all(&self, origin: CellCoord) -> Result<PathTable, GridError> {
        let _ = self.board.tile_at(origin)?;
        Ok(enumerate::enumerate_all(self, origin))
    }

    /// Best route from `origin` to `target`, or `None` when no route exists.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when either coordinate is off the board.
    pub fn find_one(
        &self,
        origin: CellCoord,
        target: CellCoord,
    ) -> Result<Option<PathToTile>, GridError> {
        let _ = self.board.tile_at(origin)?;
        let _ = self.board.tile_at(target)?;
        Ok(best_first::find_one(self, origin, target))
    }

    /// Answers a single-destination query with the chosen strategy.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when either coordinate is off the board.
    pub fn route(
        &self,
        strategy: SearchStrategy,
        origin: CellCoord,
        target: CellCoord,
    ) -> Result<Option<PathToTile>, GridError> {
        match strategy {
            SearchStrategy::EnumerateAll => {
                let _ = self.board.tile_at(target)?;
                Ok(self.enumerate_all(origin)?.shortest_path(target).cloned())
            }
            SearchStrategy::FindOne => self.find_one(origin, target),
        }
    }

    /// Cost of stepping onto `cell` right now, `None` when it cannot be entered.
    fn entry_cost(&self, cell: CellCoord) -> Option<u32> {
        let cost = self.board.step_cost(cell, self.profile)?;
        let free = match self.mover {
            Some(mover) => self.board.is_free_for(cell, mover),
            None => self.board.occupant(cell).is_none(),
        };
        free.then_some(cost)
    }

    /// Lower bound on the cost of travelling from `from` to `to`.
    fn estimate(&self, from: CellCoord, to: CellCoord) -> u32 {
        from.manhattan_distance(to).saturating_mul(self.cheapest_step)
    }
}
