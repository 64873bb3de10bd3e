//! Scenario files describing the board, its terrain and the units to simulate.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skirmish_core::{
    board_fits, CellCoord, MovementProfile, PlayerId, TerrainId, TerrainRule, TerrainTable,
    MAX_BOARD_TILES,
};

/// Parsed and validated scenario ready to be loaded into a world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scenario {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) terrain: TerrainTable,
    pub(crate) seed: u64,
    pub(crate) rounds: u32,
    /// Generation weights in terrain order, `None` when the board stays uniform.
    pub(crate) weights: Option<Vec<(TerrainId, u32)>>,
    pub(crate) paint: Vec<(CellCoord, TerrainId)>,
    pub(crate) units: Vec<UnitSpec>,
}

/// Unit entry of a scenario.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UnitSpec {
    pub(crate) owner: PlayerId,
    /// Spawn cell, drawn at random among open tiles when absent.
    pub(crate) cell: Option<CellCoord>,
    pub(crate) profile: MovementProfile,
    pub(crate) target: Option<CellCoord>,
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario in {}", path.display()))
    }

    /// Parses scenario TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        file.validate()
    }

    /// Distinct owners in ascending order; this is the turn order.
    pub(crate) fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.units.iter().map(|unit| unit.owner).collect();
        players.sort();
        players.dedup();
        players
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    board: BoardSection,
    #[serde(default)]
    terrain: Vec<TerrainRule>,
    #[serde(default)]
    generation: Option<GenerationSection>,
    #[serde(default)]
    simulation: SimulationSection,
    #[serde(default)]
    paint: Vec<PaintEntry>,
    #[serde(default)]
    units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardSection {
    columns: u32,
    rows: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerationSection {
    weights: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimulationSection {
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_rounds")]
    rounds: u32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: 0,
            rounds: default_rounds(),
        }
    }
}

fn default_rounds() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaintEntry {
    column: u32,
    row: u32,
    terrain: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    owner: u32,
    column: Option<u32>,
    row: Option<u32>,
    move_speed: u32,
    #[serde(default)]
    ignores_obstacles: bool,
    target_column: Option<u32>,
    target_row: Option<u32>,
    #[serde(default)]
    costs: BTreeMap<String, u32>,
}

impl ScenarioFile {
    fn validate(self) -> Result<Scenario> {
        let ScenarioFile {
            board,
            terrain,
            generation,
            simulation,
            paint,
            units,
        } = self;

        if board.columns == 0 || board.rows == 0 {
            bail!(
                "board must have at least one tile, got {}x{}",
                board.columns,
                board.rows
            );
        }
        if !board_fits(board.columns, board.rows) {
            bail!(
                "board of {}x{} tiles exceeds the limit of {MAX_BOARD_TILES} tiles",
                board.columns,
                board.rows
            );
        }
        let terrain = if terrain.is_empty() {
            TerrainTable::default()
        } else {
            TerrainTable::new(terrain)
        };

        let weights = generation
            .map(|section| {
                let mut weights = section
                    .weights
                    .iter()
                    .map(|(name, weight)| Ok((lookup(&terrain, name)?, *weight)))
                    .collect::<Result<Vec<_>>>()?;
                weights.sort();
                Ok::<_, anyhow::Error>(weights)
            })
            .transpose()?;

        let in_bounds = |column: u32, row: u32| column < board.columns && row < board.rows;

        let paint = paint
            .into_iter()
            .map(|entry| {
                if !in_bounds(entry.column, entry.row) {
                    bail!(
                        "painted cell ({}, {}) lies outside the board",
                        entry.column,
                        entry.row
                    );
                }
                Ok((
                    CellCoord::new(entry.column, entry.row),
                    lookup(&terrain, &entry.terrain)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let units = units
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .into_spec(&terrain, &in_bounds)
                    .with_context(|| format!("unit entry {index} is invalid"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Scenario {
            columns: board.columns,
            rows: board.rows,
            terrain,
            seed: simulation.seed,
            rounds: simulation.rounds,
            weights,
            paint,
            units,
        })
    }
}

impl UnitEntry {
    fn into_spec(
        self,
        terrain: &TerrainTable,
        in_bounds: &dyn Fn(u32, u32) -> bool,
    ) -> Result<UnitSpec> {
        let cell = pair(self.column, self.row, "column", "row")?;
        let target = pair(
            self.target_column,
            self.target_row,
            "target_column",
            "target_row",
        )?;
        for coord in cell.iter().chain(target.iter()) {
            if !in_bounds(coord.column(), coord.row()) {
                bail!("cell {coord} lies outside the board");
            }
        }

        let mut profile = MovementProfile::new(self.move_speed);
        if self.ignores_obstacles {
            profile = profile.ignoring_obstacles();
        }
        for (name, cost) in &self.costs {
            profile = profile.with_cost_override(lookup(terrain, name)?, *cost);
        }

        Ok(UnitSpec {
            owner: PlayerId::new(self.owner),
            cell,
            profile,
            target,
        })
    }
}

fn pair(
    column: Option<u32>,
    row: Option<u32>,
    column_key: &str,
    row_key: &str,
) -> Result<Option<CellCoord>> {
    match (column, row) {
        (Some(column), Some(row)) => Ok(Some(CellCoord::new(column, row))),
        (None, None) => Ok(None),
        _ => bail!("`{column_key}` and `{row_key}` must be given together"),
    }
}

fn lookup(terrain: &TerrainTable, name: &str) -> Result<TerrainId> {
    terrain
        .id_of(name)
        .with_context(|| format!("unknown terrain `{name}`"))
}
