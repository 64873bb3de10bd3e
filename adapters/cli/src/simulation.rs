//! Drives a world and the movement system through the rounds of a scenario.

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::{CellCoord, Command, Event, PlayerId, TerrainId, TerrainTable};
use skirmish_system_movement::Movement;
use skirmish_system_terrain::{place_units, TerrainGenerator};
use skirmish_world::{self as world, query, World};
use tracing::{info, warn};

use crate::{
    report::{owner_glyph, MoveRecord, Report, UnitSummary},
    scenario::Scenario,
};

/// World plus movement system, advanced one round at a time.
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    players: Vec<PlayerId>,
    seed: u64,
    rounds_played: u32,
    moves: Vec<MoveRecord>,
    rejected_commands: usize,
}

impl Simulation {
    /// Builds the board, paints terrain and spawns every unit of `scenario`.
    pub(crate) fn prepare(scenario: &Scenario, seed: u64) -> Result<Self> {
        let mut simulation = Self {
            world: World::new(),
            movement: Movement::default(),
            players: scenario.players(),
            seed,
            rounds_played: 0,
            moves: Vec::new(),
            rejected_commands: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let _ = simulation.submit(Command::ConfigureBoard {
            columns: scenario.columns,
            rows: scenario.rows,
            terrain: scenario.terrain.clone(),
        })?;

        if let Some(weights) = &scenario.weights {
            let generator = TerrainGenerator::new(weights, &scenario.terrain)
                .context("invalid generation weights")?;
            let layout = generator.generate(scenario.columns, scenario.rows, &mut rng);
            for (index, terrain) in layout.into_iter().enumerate() {
                let cell = cell_at(index, scenario.columns);
                let _ = simulation.submit(Command::PaintTerrain { cell, terrain })?;
            }
        }
        for &(cell, terrain) in &scenario.paint {
            let _ = simulation.submit(Command::PaintTerrain { cell, terrain })?;
        }

        let mut drawn = simulation.draw_spawn_cells(scenario, &mut rng)?.into_iter();
        for (index, spec) in scenario.units.iter().enumerate() {
            let cell = match spec.cell.or_else(|| drawn.next()) {
                Some(cell) => cell,
                None => bail!("no spawn cell left for unit entry {index}"),
            };
            let events = simulation
                .submit(Command::SpawnUnit {
                    owner: spec.owner,
                    cell,
                    profile: spec.profile.clone(),
                })
                .with_context(|| format!("unit entry {index} cannot spawn at {cell}"))?;
            let Some(unit) = events.iter().find_map(|event| match event {
                Event::UnitSpawned { unit, .. } => Some(*unit),
                _ => None,
            }) else {
                bail!("unit entry {index} produced no spawn event");
            };
            if let Some(target) = spec.target {
                let _ = simulation
                    .submit(Command::SetTarget { unit, target })
                    .with_context(|| format!("unit entry {index} cannot target {target}"))?;
            }
        }

        info!(
            seed,
            units = scenario.units.len(),
            players = simulation.players.len(),
            "scenario prepared"
        );
        Ok(simulation)
    }

    /// Plays up to `rounds` rounds, stopping early once no unit has a pending move.
    pub(crate) fn run(&mut self, rounds: u32) {
        for round in 1..=rounds {
            if !query::unit_view(&self.world)
                .iter()
                .any(|unit| unit.has_pending_move())
            {
                break;
            }
            self.rounds_played = round;
            for player in self.players.clone() {
                self.play_turn(round, player);
            }
        }
        info!(
            rounds = self.rounds_played,
            moves = self.moves.len(),
            "simulation finished"
        );
    }

    /// Summarizes the current state of the simulation.
    pub(crate) fn report(&self) -> Report {
        let (columns, rows) = query::dimensions(&self.world);
        let board = query::board_view(&self.world);
        let rules = query::terrain_table(&self.world);
        let units = query::unit_view(&self.world);

        let lines: Vec<String> = (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|column| {
                        let cell = CellCoord::new(column, row);
                        match board.occupant(cell).and_then(|unit| units.get(unit)) {
                            Some(unit) => owner_glyph(unit.owner.get()),
                            None => terrain_glyph(board.terrain(cell), rules),
                        }
                    })
                    .collect()
            })
            .collect();

        Report {
            seed: self.seed,
            columns,
            rows,
            rounds_played: self.rounds_played,
            board: lines,
            units: units
                .iter()
                .map(|unit| UnitSummary {
                    unit: unit.id.get(),
                    owner: unit.owner.get(),
                    cell: unit.cell,
                    target: unit.target,
                    moves_left: unit.moves_left,
                    pending: unit.has_pending_move(),
                })
                .collect(),
            moves: self.moves.clone(),
            rejected_commands: self.rejected_commands,
        }
    }

    fn play_turn(&mut self, round: u32, player: PlayerId) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::BeginTurn { player }, &mut events);

        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            query::board_view(&self.world),
            &query::unit_view(&self.world),
            &mut commands,
        );

        for command in commands {
            events.clear();
            world::apply(&mut self.world, command, &mut events);
            for event in &events {
                match *event {
                    Event::UnitMoved {
                        unit,
                        from,
                        to,
                        cost,
                    } => self.moves.push(MoveRecord {
                        round,
                        unit: unit.get(),
                        from,
                        to,
                        cost,
                    }),
                    Event::CommandRejected { unit, reason } => {
                        warn!(?unit, %reason, round, "movement command rejected");
                        self.rejected_commands += 1;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Applies a setup command, failing on rejection.
    fn submit(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            return Err(reason.into());
        }
        Ok(events)
    }

    /// Draws open cells for the units whose spawn cell is not configured.
    fn draw_spawn_cells(
        &self,
        scenario: &Scenario,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<CellCoord>> {
        let fixed: Vec<CellCoord> = scenario
            .units
            .iter()
            .filter_map(|spec| spec.cell)
            .collect();
        let wanted = scenario.units.len() - fixed.len();
        if wanted == 0 {
            return Ok(Vec::new());
        }

        let board = query::board_view(&self.world);
        let layout: Vec<TerrainId> = (0..scenario.columns as usize * scenario.rows as usize)
            .filter_map(|index| board.terrain(cell_at(index, scenario.columns)))
            .collect();
        let drawn = place_units(
            &layout,
            &scenario.terrain,
            scenario.columns,
            wanted + fixed.len(),
            rng,
        )
        .context("cannot draw spawn cells")?;

        Ok(drawn
            .into_iter()
            .filter(|cell| !fixed.contains(cell))
            .take(wanted)
            .collect())
    }
}

fn cell_at(index: usize, columns: u32) -> CellCoord {
    let index = index as u32;
    CellCoord::new(index % columns, index / columns)
}

fn terrain_glyph(terrain: Option<TerrainId>, rules: &TerrainTable) -> char {
    terrain
        .and_then(|terrain| rules.rule(terrain))
        .and_then(|rule| rule.name.chars().next())
        .map_or('?', |glyph| glyph.to_ascii_lowercase())
}
