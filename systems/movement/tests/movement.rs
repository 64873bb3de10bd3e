use std::collections::BTreeSet;

use skirmish_core::{
    CellCoord, Command, Event, MovementProfile, PlayerId, TerrainId, TerrainTable, UnitId,
};
use skirmish_system_movement::{resolve_move, Movement, Resolution};
use skirmish_world::{self as world, query, World};

const BLUE: PlayerId = PlayerId::new(0);
const RED: PlayerId = PlayerId::new(1);

struct Harness {
    world: World,
    movement: Movement,
}

impl Harness {
    fn plains(columns: u32, rows: u32) -> Self {
        let mut harness = Self {
            world: World::new(),
            movement: Movement::default(),
        };
        let _ = harness.apply(Command::ConfigureBoard {
            columns,
            rows,
            terrain: TerrainTable::default(),
        });
        harness
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    fn paint(&mut self, column: u32, row: u32, terrain: TerrainId) {
        let _ = self.apply(Command::PaintTerrain {
            cell: CellCoord::new(column, row),
            terrain,
        });
    }

    fn spawn(&mut self, owner: PlayerId, cell: CellCoord, speed: u32) -> UnitId {
        let events = self.apply(Command::SpawnUnit {
            owner,
            cell,
            profile: MovementProfile::new(speed),
        });
        match events.as_slice() {
            [Event::UnitSpawned { unit, .. }] => *unit,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    fn target(&mut self, unit: UnitId, target: CellCoord) {
        let events = self.apply(Command::SetTarget { unit, target });
        assert!(matches!(events.as_slice(), [Event::TargetSet { .. }]));
    }

    /// Starts a turn and feeds the resulting commands back into the world.
    fn turn(&mut self, player: PlayerId) -> (Vec<Command>, Vec<Event>) {
        let events = self.apply(Command::BeginTurn { player });
        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            query::board_view(&self.world),
            &query::unit_view(&self.world),
            &mut commands,
        );

        let mut applied = Vec::new();
        for command in commands.clone() {
            applied.extend(self.apply(command));
        }
        (commands, applied)
    }

    fn cell_of(&self, unit: UnitId) -> CellCoord {
        query::unit(&self.world, unit).expect("unit exists").cell
    }
}

#[test]
fn straight_line_move_spends_the_whole_budget() {
    let mut harness = Harness::plains(5, 5);
    let unit = harness.spawn(BLUE, CellCoord::new(0, 0), 3);
    harness.target(unit, CellCoord::new(3, 0));

    let (commands, events) = harness.turn(BLUE);

    assert_eq!(
        commands,
        vec![Command::MoveUnit {
            unit,
            to: CellCoord::new(3, 0),
            cost: 3,
        }]
    );
    assert_eq!(
        events,
        vec![Event::UnitMoved {
            unit,
            from: CellCoord::new(0, 0),
            to: CellCoord::new(3, 0),
            cost: 3,
        }]
    );
    let snapshot = query::unit(&harness.world, unit).expect("unit exists");
    assert_eq!(snapshot.cell, CellCoord::new(3, 0));
    assert_eq!(snapshot.moves_left, 0);
    assert!(!snapshot.has_pending_move());
}

#[test]
fn long_routes_are_walked_over_several_turns() {
    let mut harness = Harness::plains(6, 1);
    harness.paint(2, 0, TerrainId::FOREST);
    let unit = harness.spawn(BLUE, CellCoord::new(0, 0), 2);
    harness.target(unit, CellCoord::new(5, 0));

    let _ = harness.turn(BLUE);
    assert_eq!(harness.cell_of(unit), CellCoord::new(1, 0), "forest costs 2");

    let _ = harness.turn(BLUE);
    assert_eq!(harness.cell_of(unit), CellCoord::new(2, 0));

    let _ = harness.turn(BLUE);
    assert_eq!(harness.cell_of(unit), CellCoord::new(4, 0));

    let (commands, _) = harness.turn(BLUE);
    assert_eq!(harness.cell_of(unit), CellCoord::new(5, 0));
    assert_eq!(commands.len(), 1);

    let (commands, _) = harness.turn(BLUE);
    assert!(commands.is_empty(), "unit already at target");
}

#[test]
fn occupied_target_resets_without_moving() {
    let mut harness = Harness::plains(4, 1);
    let mover = harness.spawn(BLUE, CellCoord::new(0, 0), 3);
    let _blocker = harness.spawn(RED, CellCoord::new(3, 0), 3);
    harness.target(mover, CellCoord::new(3, 0));

    let (commands, events) = harness.turn(BLUE);

    assert_eq!(commands, vec![Command::ClearTarget { unit: mover }]);
    assert_eq!(
        events,
        vec![Event::TargetCleared {
            unit: mover,
            at: CellCoord::new(0, 0),
        }]
    );
    let snapshot = query::unit(&harness.world, mover).expect("unit exists");
    assert_eq!(snapshot.cell, CellCoord::new(0, 0));
    assert_eq!(snapshot.target, CellCoord::new(0, 0));
    assert_eq!(snapshot.moves_left, 3);
}

#[test]
fn unreachable_target_is_a_no_op() {
    let mut harness = Harness::plains(3, 3);
    harness.paint(1, 0, TerrainId::MOUNTAIN);
    harness.paint(0, 1, TerrainId::LAKE);
    let unit = harness.spawn(BLUE, CellCoord::new(0, 0), 5);
    harness.target(unit, CellCoord::new(2, 2));

    let (commands, events) = harness.turn(BLUE);

    assert!(commands.is_empty());
    assert!(events.is_empty());
    let snapshot = query::unit(&harness.world, unit).expect("unit exists");
    assert_eq!(snapshot.cell, CellCoord::new(0, 0));
    assert_eq!(snapshot.target, CellCoord::new(2, 2), "target is kept");
}

#[test]
fn unaffordable_first_step_stalls() {
    let mut harness = Harness::plains(3, 1);
    harness.paint(1, 0, TerrainId::HILLS);
    let unit = harness.spawn(BLUE, CellCoord::new(0, 0), 1);
    harness.target(unit, CellCoord::new(2, 0));

    let snapshot = query::unit(&harness.world, unit).expect("unit exists");
    let resolution = resolve_move(query::board_view(&harness.world), &snapshot);
    assert!(matches!(resolution, Ok(Resolution::Stalled { .. })));

    let (commands, _) = harness.turn(BLUE);
    assert!(commands.is_empty());
    assert_eq!(harness.cell_of(unit), CellCoord::new(0, 0));
}

#[test]
fn only_the_active_players_units_move() {
    let mut harness = Harness::plains(5, 2);
    let blue = harness.spawn(BLUE, CellCoord::new(0, 0), 2);
    let red = harness.spawn(RED, CellCoord::new(0, 1), 2);
    harness.target(blue, CellCoord::new(4, 0));
    harness.target(red, CellCoord::new(4, 1));

    let _ = harness.turn(BLUE);

    assert_eq!(harness.cell_of(blue), CellCoord::new(2, 0));
    assert_eq!(harness.cell_of(red), CellCoord::new(0, 1));
}

#[test]
fn earlier_moves_in_a_batch_constrain_later_units() {
    let mut harness = Harness::plains(5, 1);
    let left = harness.spawn(BLUE, CellCoord::new(0, 0), 2);
    let right = harness.spawn(BLUE, CellCoord::new(4, 0), 2);
    harness.target(left, CellCoord::new(2, 0));
    harness.target(right, CellCoord::new(2, 0));

    let (commands, events) = harness.turn(BLUE);

    assert_eq!(
        commands,
        vec![
            Command::MoveUnit {
                unit: left,
                to: CellCoord::new(2, 0),
                cost: 2,
            },
            Command::ClearTarget { unit: right },
        ]
    );
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::CommandRejected { .. })));
    assert_eq!(harness.cell_of(left), CellCoord::new(2, 0));
    assert_eq!(harness.cell_of(right), CellCoord::new(4, 0));
}

#[test]
fn reachable_tiles_follow_the_remaining_budget() {
    let mut harness = Harness::plains(5, 5);
    let unit = harness.spawn(BLUE, CellCoord::new(0, 0), 3);
    harness.target(unit, CellCoord::new(2, 0));
    let snapshot = query::unit(&harness.world, unit).expect("unit exists");

    let table = harness
        .movement
        .generate_paths(query::board_view(&harness.world), &snapshot)
        .expect("unit on board");
    assert_eq!(table.len(), 25);

    let reachable = harness
        .movement
        .reachable_tiles(&snapshot)
        .expect("table generated for current tile");
    assert_eq!(reachable.len(), 10);

    let _ = harness.turn(BLUE);
    let moved = query::unit(&harness.world, unit).expect("unit exists");
    assert_eq!(moved.cell, CellCoord::new(2, 0));
    assert_eq!(moved.moves_left, 1);
    assert!(
        harness.movement.reachable_tiles(&moved).is_none(),
        "tables anchored at the old tile are not served"
    );

    let _ = harness
        .movement
        .generate_paths(query::board_view(&harness.world), &moved)
        .expect("unit on board");
    let reachable = harness
        .movement
        .reachable_tiles(&moved)
        .expect("table regenerated");
    let expected: BTreeSet<CellCoord> = [(2, 0), (1, 0), (3, 0), (2, 1)]
        .into_iter()
        .map(|(column, row)| CellCoord::new(column, row))
        .collect();
    assert_eq!(reachable, expected);
}
