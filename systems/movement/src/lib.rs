#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that resolves how far units advance each turn.
//!
//! At the start of a player's turn every unit owned by that player walks its
//! cheapest route toward its target for as long as its remaining budget pays
//! for the next tile. The system never mutates the world; it emits
//! [`Command::MoveUnit`] and [`Command::ClearTarget`] for the world to apply.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::{
    BoardView, CellCoord, Command, Event, GridError, MovementProfile, PathTable, PathToTile,
    PlayerId, UnitId, UnitSnapshot, UnitView,
};
use skirmish_system_pathfinding::Pathfinder;
use tracing::{debug, warn};

/// Outcome of resolving a single unit's pending move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The unit already stands on its target.
    AtTarget,
    /// Another unit holds the target tile, so the target should be reset.
    TargetBlocked {
        /// Unit standing on the target.
        by: UnitId,
    },
    /// No route leads to the target under the current board.
    Unreachable {
        /// Path table computed from the unit's position.
        table: PathTable,
    },
    /// A route exists but the first step costs more than the remaining budget.
    Stalled {
        /// Path table computed from the unit's position.
        table: PathTable,
    },
    /// The unit can advance along its route.
    Advanced {
        /// Furthest affordable tile on the route.
        to: CellCoord,
        /// Movement points spent to reach `to`.
        cost: u32,
        /// Whether `to` is the unit's target.
        arrived: bool,
        /// Path table computed from the unit's position.
        table: PathTable,
    },
}

impl Resolution {
    /// Path table computed while resolving, when a search was needed.
    #[must_use]
    pub fn table(&self) -> Option<&PathTable> {
        match self {
            Self::AtTarget | Self::TargetBlocked { .. } => None,
            Self::Unreachable { table }
            | Self::Stalled { table }
            | Self::Advanced { table, .. } => Some(table),
        }
    }

    /// Tile the unit occupies once the resolution is applied.
    #[must_use]
    pub fn destination(&self, unit: &UnitSnapshot) -> CellCoord {
        match self {
            Self::Advanced { to, .. } => *to,
            _ => unit.cell,
        }
    }
}

/// Resolves how far `unit` can advance toward its target this turn.
///
/// The route is recomputed from the unit's current position so no stale path
/// is ever walked. Steps are taken from the start of the route while the
/// cumulative cost stays within `moves_left`.
///
/// # Errors
///
/// Returns [`GridError::OutOfBounds`] when the unit's tile or its target lies
/// off the board.
pub fn resolve_move(board: BoardView<'_>, unit: &UnitSnapshot) -> Result<Resolution, GridError> {
    let _ = board.tile_at(unit.cell)?;
    let target = board.tile_at(unit.target)?;
    if unit.cell == unit.target {
        return Ok(Resolution::AtTarget);
    }
    if let Some(occupant) = target.occupant {
        if occupant != unit.id {
            return Ok(Resolution::TargetBlocked { by: occupant });
        }
    }

    let table = Pathfinder::for_unit(board, unit).enumerate_all(unit.cell)?;
    let Some(path) = table.shortest_path(unit.target) else {
        return Ok(Resolution::Unreachable { table });
    };

    let (to, cost) = affordable_prefix(
        board,
        &unit.profile,
        unit.cell,
        path,
        unit.moves_left,
    );
    if to == unit.cell {
        return Ok(Resolution::Stalled { table });
    }

    Ok(Resolution::Advanced {
        to,
        cost,
        arrived: to == unit.target,
        table,
    })
}

fn affordable_prefix(
    board: BoardView<'_>,
    profile: &MovementProfile,
    origin: CellCoord,
    path: &PathToTile,
    budget: u32,
) -> (CellCoord, u32) {
    let mut reached = origin;
    let mut spent = 0_u32;

    for &step in path.steps() {
        let Some(entry_cost) = board.step_cost(step, profile) else {
            break;
        };
        let total = spent.saturating_add(entry_cost);
        if total > budget {
            break;
        }
        spent = total;
        reached = step;
    }

    (reached, spent)
}

/// Pure system that reacts to turn events and emits movement commands.
///
/// The system keeps the most recent [`PathTable`] per unit so that callers can
/// highlight reachable tiles or preview routes between turns. Tables are only
/// served while they are anchored at the unit's current position.
#[derive(Debug, Default)]
pub struct Movement {
    tables: BTreeMap<UnitId, PathTable>,
}

impl Movement {
    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        board: BoardView<'_>,
        units: &UnitView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::BoardConfigured { .. } => self.tables.clear(),
                Event::TurnStarted { player } => self.resolve_turn(*player, board, units, out),
                _ => {}
            }
        }
    }

    /// Recomputes and stores the path table for `unit` from its current tile.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the unit stands off the board.
    pub fn generate_paths(
        &mut self,
        board: BoardView<'_>,
        unit: &UnitSnapshot,
    ) -> Result<&PathTable, GridError> {
        let table = Pathfinder::for_unit(board, unit).enumerate_all(unit.cell)?;
        let slot = self
            .tables
            .entry(unit.id)
            .or_insert_with(|| PathTable::anchored_at(unit.cell));
        *slot = table;
        Ok(slot)
    }

    /// Stored path table for `unit`, if one is anchored at its current tile.
    #[must_use]
    pub fn path_table(&self, unit: &UnitSnapshot) -> Option<&PathTable> {
        self.tables
            .get(&unit.id)
            .filter(|table| table.is_anchored_at(unit.cell))
    }

    /// Tiles `unit` can reach with its remaining movement points.
    ///
    /// Returns `None` until [`Movement::generate_paths`] has run for the
    /// unit's current position.
    #[must_use]
    pub fn reachable_tiles(&self, unit: &UnitSnapshot) -> Option<BTreeSet<CellCoord>> {
        self.path_table(unit)
            .map(|table| table.reachable_within(unit.moves_left))
    }

    /// Stored cheapest route from `unit`'s tile to `target`.
    #[must_use]
    pub fn shortest_path(&self, unit: &UnitSnapshot, target: CellCoord) -> Option<&PathToTile> {
        self.path_table(unit)?.shortest_path(target)
    }

    /// Resolves one unit and keeps the path table the resolution produced.
    ///
    /// # Errors
    ///
    /// Propagates the bounds failure of [`resolve_move`].
    pub fn resolve(
        &mut self,
        board: BoardView<'_>,
        unit: &UnitSnapshot,
    ) -> Result<Resolution, GridError> {
        let resolution = resolve_move(board, unit)?;
        if let Some(table) = resolution.table() {
            let _ = self.tables.insert(unit.id, table.clone());
        }
        Ok(resolution)
    }

    fn resolve_turn(
        &mut self,
        player: PlayerId,
        board: BoardView<'_>,
        units: &UnitView,
        out: &mut Vec<Command>,
    ) {
        // Moves proposed earlier in the batch are visible to later units.
        let mut occupancy = board.occupancy().to_vec();

        for unit in units.iter().filter(|unit| unit.owner == player) {
            let resolution = match self.resolve(board.with_occupancy(&occupancy), unit) {
                Ok(resolution) => resolution,
                Err(error) => {
                    warn!(unit = unit.id.get(), %error, "skipping unit with off-board position");
                    continue;
                }
            };
            match resolution {
                Resolution::AtTarget => {}
                Resolution::TargetBlocked { by } => {
                    debug!(
                        unit = unit.id.get(),
                        blocker = by.get(),
                        "target occupied, clearing"
                    );
                    out.push(Command::ClearTarget { unit: unit.id });
                }
                Resolution::Unreachable { .. } => {
                    debug!(unit = unit.id.get(), target = %unit.target, "target unreachable");
                }
                Resolution::Stalled { .. } => {
                    debug!(
                        unit = unit.id.get(),
                        moves_left = unit.moves_left,
                        "next step unaffordable"
                    );
                }
                Resolution::Advanced {
                    to, cost, arrived, ..
                } => {
                    debug!(
                        unit = unit.id.get(),
                        from = %unit.cell,
                        %to,
                        cost,
                        arrived,
                        "unit advances"
                    );
                    if let Some(index) = board.index(unit.cell) {
                        occupancy[index] = None;
                    }
                    if let Some(index) = board.index(to) {
                        occupancy[index] = Some(unit.id);
                    }
                    out.push(Command::MoveUnit {
                        unit: unit.id,
                        to,
                        cost,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use skirmish_core::{TerrainId, TerrainTable};

    use super::*;

    fn unit(cell: CellCoord, target: CellCoord, moves_left: u32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(0),
            owner: PlayerId::new(0),
            cell,
            target,
            moves_left,
            profile: MovementProfile::new(moves_left),
        }
    }

    #[test]
    fn affordable_prefix_stops_before_overspending() {
        let rules = TerrainTable::default();
        let terrain = vec![
            TerrainId::PLAINS,
            TerrainId::PLAINS,
            TerrainId::FOREST,
            TerrainId::PLAINS,
        ];
        let occupancy = vec![None; 4];
        let board = BoardView::new(&terrain, &occupancy, &rules, 4, 1);
        let origin = CellCoord::new(0, 0);
        let path = PathToTile::from_steps(
            origin,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0),
            ],
            4,
        );
        let profile = MovementProfile::new(4);

        assert_eq!(
            affordable_prefix(board, &profile, origin, &path, 2),
            (CellCoord::new(1, 0), 1)
        );
        assert_eq!(
            affordable_prefix(board, &profile, origin, &path, 3),
            (CellCoord::new(2, 0), 3)
        );
        assert_eq!(
            affordable_prefix(board, &profile, origin, &path, 0),
            (origin, 0)
        );
    }

    #[test]
    fn resolution_reports_destination() {
        let snapshot = unit(CellCoord::new(0, 0), CellCoord::new(2, 0), 2);
        let advanced = Resolution::Advanced {
            to: CellCoord::new(2, 0),
            cost: 2,
            arrived: true,
            table: PathTable::anchored_at(snapshot.cell),
        };

        assert_eq!(advanced.destination(&snapshot), CellCoord::new(2, 0));
        assert_eq!(Resolution::AtTarget.destination(&snapshot), snapshot.cell);
        assert!(Resolution::AtTarget.table().is_none());
        assert!(advanced.table().is_some());
    }

    #[test]
    fn stale_tables_are_not_served() {
        let rules = TerrainTable::default();
        let terrain = vec![TerrainId::PLAINS; 3];
        let occupancy = vec![None; 3];
        let board = BoardView::new(&terrain, &occupancy, &rules, 3, 1);
        let mut movement = Movement::default();
        let mut snapshot = unit(CellCoord::new(0, 0), CellCoord::new(2, 0), 2);

        let _ = movement
            .generate_paths(board, &snapshot)
            .expect("unit on board");
        assert!(movement.reachable_tiles(&snapshot).is_some());

        snapshot.cell = CellCoord::new(1, 0);
        assert!(movement.reachable_tiles(&snapshot).is_none());
        assert!(movement.shortest_path(&snapshot, CellCoord::new(2, 0)).is_none());
    }

    #[test]
    fn off_board_coordinates_are_errors_not_unreachable() {
        let rules = TerrainTable::default();
        let terrain = vec![TerrainId::PLAINS; 4];
        let occupancy = vec![None; 4];
        let board = BoardView::new(&terrain, &occupancy, &rules, 2, 2);
        let mut movement = Movement::default();

        let far_target = unit(CellCoord::new(0, 0), CellCoord::new(50, 50), 3);
        assert_eq!(
            resolve_move(board, &far_target),
            Err(GridError::OutOfBounds {
                cell: CellCoord::new(50, 50),
                columns: 2,
                rows: 2,
            })
        );

        let stranded = unit(CellCoord::new(4, 0), CellCoord::new(1, 1), 3);
        assert!(matches!(
            movement.resolve(board, &stranded),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(movement.generate_paths(board, &stranded).is_err());
        assert!(movement.path_table(&stranded).is_none());
    }
}
