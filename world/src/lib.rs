#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the board and every unit on it. Systems never mutate either
//! directly: they read [`query`] views and submit [`Command`] values, which
//! [`apply`] validates before touching tile occupancy or unit budgets.

mod board;
mod units;

use skirmish_core::{
    board_fits, CellCoord, Command, Event, MovementProfile, PlayerId, RejectionReason,
    TerrainId, TerrainTable, UnitId,
};
use tracing::{debug, warn};

use self::{board::Board, units::UnitRegistry};

const DEFAULT_BOARD_COLUMNS: u32 = 10;
const DEFAULT_BOARD_ROWS: u32 = 10;

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    units: UnitRegistry,
    active_player: Option<PlayerId>,
    turn_index: u64,
}

impl World {
    /// Creates a world with a default plains board and no units.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::new(
                DEFAULT_BOARD_COLUMNS,
                DEFAULT_BOARD_ROWS,
                TerrainTable::default(),
                TerrainId::PLAINS,
            ),
            units: UnitRegistry::new(),
            active_player: None,
            turn_index: 0,
        }
    }

    fn spawn_unit(
        &mut self,
        owner: PlayerId,
        cell: CellCoord,
        profile: MovementProfile,
    ) -> Result<UnitId, RejectionReason> {
        let terrain = self
            .board
            .terrain(cell)
            .ok_or(RejectionReason::OutOfBounds)?;
        if self.board.occupant(cell).is_some() {
            return Err(RejectionReason::Occupied);
        }
        if !profile.passable(terrain, self.board.rules()) {
            return Err(RejectionReason::Impassable);
        }

        let unit = self.units.spawn(owner, cell, profile);
        self.board.occupy(unit, cell);
        Ok(unit)
    }

    fn move_unit(
        &mut self,
        unit: UnitId,
        to: CellCoord,
        cost: u32,
    ) -> Result<Option<CellCoord>, RejectionReason> {
        let state = self.units.get(unit).ok_or(RejectionReason::UnknownUnit)?;
        let from = state.cell;
        if from == to {
            return Ok(None);
        }

        let terrain = self.board.terrain(to).ok_or(RejectionReason::OutOfBounds)?;
        if self.board.occupant(to).is_some() {
            return Err(RejectionReason::Occupied);
        }
        if !state.profile.passable(terrain, self.board.rules()) {
            return Err(RejectionReason::Impassable);
        }
        if cost > state.moves_left {
            return Err(RejectionReason::InsufficientMoves);
        }

        let Some(state) = self.units.get_mut(unit) else {
            return Err(RejectionReason::UnknownUnit);
        };
        state.cell = to;
        state.moves_left -= cost;
        self.board.vacate(from);
        self.board.occupy(unit, to);
        Ok(Some(from))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that cannot be honoured leave the world untouched and emit
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard {
            columns,
            rows,
            terrain,
        } => {
            if !board_fits(columns, rows) {
                reject(out_events, None, RejectionReason::BoardTooLarge);
                return;
            }
            let Some((fill, _)) = terrain.iter().next() else {
                reject(out_events, None, RejectionReason::UnknownTerrain);
                return;
            };
            world.board = Board::new(columns, rows, terrain, fill);
            world.units = UnitRegistry::new();
            world.active_player = None;
            world.turn_index = 0;
            out_events.push(Event::BoardConfigured { columns, rows });
        }
        Command::PaintTerrain { cell, terrain } => {
            if !world.board.in_bounds(cell) {
                reject(out_events, None, RejectionReason::OutOfBounds);
                return;
            }
            if !world.board.rules().contains(terrain) {
                reject(out_events, None, RejectionReason::UnknownTerrain);
                return;
            }
            world.board.paint(cell, terrain);
            out_events.push(Event::TerrainPainted { cell, terrain });
        }
        Command::SpawnUnit {
            owner,
            cell,
            profile,
        } => match world.spawn_unit(owner, cell, profile) {
            Ok(unit) => {
                debug!(unit = unit.get(), %cell, "unit spawned");
                out_events.push(Event::UnitSpawned { unit, owner, cell });
            }
            Err(reason) => reject(out_events, None, reason),
        },
        Command::SetTarget { unit, target } => {
            if !world.board.in_bounds(target) {
                reject(out_events, Some(unit), RejectionReason::OutOfBounds);
                return;
            }
            let Some(state) = world.units.get_mut(unit) else {
                reject(out_events, Some(unit), RejectionReason::UnknownUnit);
                return;
            };
            state.target = target;
            out_events.push(Event::TargetSet { unit, target });
        }
        Command::BeginTurn { player } => {
            world.turn_index = world.turn_index.saturating_add(1);
            world.active_player = Some(player);
            for state in world.units.iter_mut() {
                if state.owner == player {
                    state.refresh_moves();
                }
            }
            debug!(player = player.get(), turn = world.turn_index, "turn started");
            out_events.push(Event::TurnStarted { player });
        }
        Command::MoveUnit { unit, to, cost } => match world.move_unit(unit, to, cost) {
            Ok(Some(from)) => {
                debug!(unit = unit.get(), %from, %to, cost, "unit moved");
                out_events.push(Event::UnitMoved {
                    unit,
                    from,
                    to,
                    cost,
                });
            }
            Ok(None) => {}
            Err(reason) => reject(out_events, Some(unit), reason),
        },
        Command::ClearTarget { unit } => {
            let Some(state) = world.units.get_mut(unit) else {
                reject(out_events, Some(unit), RejectionReason::UnknownUnit);
                return;
            };
            state.clear_target();
            out_events.push(Event::TargetCleared {
                unit,
                at: state.cell,
            });
        }
    }
}

fn reject(out_events: &mut Vec<Event>, unit: Option<UnitId>, reason: RejectionReason) {
    warn!(unit = unit.map(|id| id.get()), %reason, "command rejected");
    out_events.push(Event::CommandRejected { unit, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{BoardView, PlayerId, TerrainTable, UnitId, UnitSnapshot, UnitView};

    /// Exposes a read-only view of the board's terrain and occupancy.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Terrain rules of the current board.
    #[must_use]
    pub fn terrain_table(world: &World) -> &TerrainTable {
        world.board.rules()
    }

    /// Dimensions of the current board as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.board.dimensions()
    }

    /// Captures a read-only view of every unit on the board.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures the state of a single unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.units.get(unit).map(|state| state.snapshot())
    }

    /// Player whose turn is currently running, if any turn has begun.
    #[must_use]
    pub fn active_player(world: &World) -> Option<PlayerId> {
        world.active_player
    }

    /// Number of turns started since the board was configured.
    #[must_use]
    pub fn turn_index(world: &World) -> u64 {
        world.turn_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_world(columns: u32, rows: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureBoard {
                columns,
                rows,
                terrain: TerrainTable::default(),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::BoardConfigured { columns, rows }]);
        world
    }

    fn spawn(world: &mut World, cell: CellCoord, move_speed: u32) -> UnitId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnUnit {
                owner: PlayerId::new(0),
                cell,
                profile: MovementProfile::new(move_speed),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::UnitSpawned { unit, .. }] => *unit,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    #[test]
    fn configure_board_replaces_dimensions_and_units() {
        let mut world = configured_world(5, 4);
        let _ = spawn(&mut world, CellCoord::new(1, 1), 3);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureBoard {
                columns: 7,
                rows: 2,
                terrain: TerrainTable::default(),
            },
            &mut events,
        );

        assert_eq!(query::dimensions(&world), (7, 2));
        assert_eq!(query::unit_view(&world).iter().count(), 0);
        assert_eq!(query::board_view(&world).occupant(CellCoord::new(1, 1)), None);
    }

    #[test]
    fn oversized_boards_are_rejected_without_allocating() {
        let mut world = configured_world(4, 4);
        let _ = spawn(&mut world, CellCoord::new(1, 1), 3);

        for (columns, rows) in [(u32::MAX, u32::MAX), (2048, 1024)] {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::ConfigureBoard {
                    columns,
                    rows,
                    terrain: TerrainTable::default(),
                },
                &mut events,
            );

            assert_eq!(
                events,
                vec![Event::CommandRejected {
                    unit: None,
                    reason: RejectionReason::BoardTooLarge,
                }]
            );
        }
        assert_eq!(query::dimensions(&world), (4, 4));
        assert_eq!(query::unit_view(&world).iter().count(), 1);
    }

    #[test]
    fn configure_board_requires_terrain_rules() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureBoard {
                columns: 3,
                rows: 3,
                terrain: TerrainTable::new(Vec::new()),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                unit: None,
                reason: RejectionReason::UnknownTerrain,
            }]
        );
        assert_eq!(query::dimensions(&world), (10, 10));
    }

    #[test]
    fn spawn_rejects_occupied_and_impassable_cells() {
        let mut world = configured_world(3, 3);
        let _ = spawn(&mut world, CellCoord::new(0, 0), 2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PaintTerrain {
                cell: CellCoord::new(2, 2),
                terrain: TerrainId::LAKE,
            },
            &mut events,
        );

        for cell in [CellCoord::new(0, 0), CellCoord::new(2, 2), CellCoord::new(3, 0)] {
            apply(
                &mut world,
                Command::SpawnUnit {
                    owner: PlayerId::new(1),
                    cell,
                    profile: MovementProfile::new(2),
                },
                &mut events,
            );
        }

        let reasons: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::CommandRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                RejectionReason::Occupied,
                RejectionReason::Impassable,
                RejectionReason::OutOfBounds,
            ]
        );
    }

    #[test]
    fn move_unit_relocates_and_spends_budget() {
        let mut world = configured_world(4, 1);
        let unit = spawn(&mut world, CellCoord::new(0, 0), 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit,
                to: CellCoord::new(2, 0),
                cost: 2,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitMoved {
                unit,
                from: CellCoord::new(0, 0),
                to: CellCoord::new(2, 0),
                cost: 2,
            }]
        );
        let snapshot = query::unit(&world, unit).expect("unit exists");
        assert_eq!(snapshot.cell, CellCoord::new(2, 0));
        assert_eq!(snapshot.moves_left, 1);
        let board = query::board_view(&world);
        assert_eq!(board.occupant(CellCoord::new(0, 0)), None);
        assert_eq!(board.occupant(CellCoord::new(2, 0)), Some(unit));
    }

    #[test]
    fn move_unit_rejects_overspending_and_occupied_destinations() {
        let mut world = configured_world(4, 1);
        let mover = spawn(&mut world, CellCoord::new(0, 0), 2);
        let _blocker = spawn(&mut world, CellCoord::new(1, 0), 2);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit: mover,
                to: CellCoord::new(1, 0),
                cost: 1,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveUnit {
                unit: mover,
                to: CellCoord::new(3, 0),
                cost: 3,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::CommandRejected {
                    unit: Some(mover),
                    reason: RejectionReason::Occupied,
                },
                Event::CommandRejected {
                    unit: Some(mover),
                    reason: RejectionReason::InsufficientMoves,
                },
            ]
        );
        let snapshot = query::unit(&world, mover).expect("unit exists");
        assert_eq!(snapshot.cell, CellCoord::new(0, 0));
        assert_eq!(snapshot.moves_left, 2);
    }

    #[test]
    fn begin_turn_refreshes_only_the_active_players_units() {
        let mut world = configured_world(4, 2);
        let ours = spawn(&mut world, CellCoord::new(0, 0), 3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnUnit {
                owner: PlayerId::new(1),
                cell: CellCoord::new(0, 1),
                profile: MovementProfile::new(3),
            },
            &mut events,
        );
        let theirs = UnitId::new(1);
        for (unit, to) in [(ours, CellCoord::new(2, 0)), (theirs, CellCoord::new(2, 1))] {
            apply(&mut world, Command::MoveUnit { unit, to, cost: 2 }, &mut events);
        }

        apply(
            &mut world,
            Command::BeginTurn {
                player: PlayerId::new(0),
            },
            &mut events,
        );

        assert_eq!(query::unit(&world, ours).map(|unit| unit.moves_left), Some(3));
        assert_eq!(query::unit(&world, theirs).map(|unit| unit.moves_left), Some(1));
        assert_eq!(query::active_player(&world), Some(PlayerId::new(0)));
        assert_eq!(query::turn_index(&world), 1);
    }

    #[test]
    fn targets_are_set_and_cleared() {
        let mut world = configured_world(4, 4);
        let unit = spawn(&mut world, CellCoord::new(1, 1), 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTarget {
                unit,
                target: CellCoord::new(3, 3),
            },
            &mut events,
        );
        assert!(query::unit(&world, unit).is_some_and(|unit| unit.has_pending_move()));

        apply(&mut world, Command::ClearTarget { unit }, &mut events);
        assert_eq!(
            events.last(),
            Some(&Event::TargetCleared {
                unit,
                at: CellCoord::new(1, 1),
            })
        );
        assert!(query::unit(&world, unit).is_some_and(|unit| !unit.has_pending_move()));
    }

    #[test]
    fn set_target_rejects_cells_off_the_board() {
        let mut world = configured_world(2, 2);
        let unit = spawn(&mut world, CellCoord::new(0, 0), 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTarget {
                unit,
                target: CellCoord::new(9, 9),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                unit: Some(unit),
                reason: RejectionReason::OutOfBounds,
            }]
        );
    }

    #[test]
    fn paint_rejects_unknown_terrain() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PaintTerrain {
                cell: CellCoord::new(0, 0),
                terrain: TerrainId::new(42),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                unit: None,
                reason: RejectionReason::UnknownTerrain,
            }]
        );
        assert_eq!(
            query::board_view(&world).terrain(CellCoord::new(0, 0)),
            Some(TerrainId::PLAINS)
        );
    }
}
