#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded terrain generation for skirmish boards.
//!
//! The generator never owns a random source: callers thread their own RNG
//! through every call, so a fixed seed always yields the same board and the
//! same spawn cells.

use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng,
};
use skirmish_core::{CellCoord, TerrainId, TerrainTable};
use thiserror::Error;
use tracing::debug;

/// Reasons a generator cannot be built or cannot place units.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No terrain carries a positive weight.
    #[error("terrain weights must contain at least one positive entry")]
    NoWeights,
    /// A weight refers to a terrain the table does not define.
    #[error("terrain {0:?} is not defined by the terrain table")]
    UnknownTerrain(TerrainId),
    /// The board has fewer open tiles than units to place.
    #[error("cannot place {requested} units on {available} open tiles")]
    NotEnoughOpenTiles {
        /// Number of units that needed a tile.
        requested: usize,
        /// Number of passable, distinct tiles on the board.
        available: usize,
    },
}

/// Weighted random terrain painter.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    terrains: Vec<TerrainId>,
    distribution: WeightedIndex<u32>,
}

impl TerrainGenerator {
    /// Creates a generator that picks each terrain proportionally to its weight.
    ///
    /// Zero weights are allowed as long as one entry is positive.
    pub fn new(
        weights: &[(TerrainId, u32)],
        table: &TerrainTable,
    ) -> Result<Self, GenerationError> {
        if let Some((terrain, _)) = weights
            .iter()
            .find(|(terrain, _)| !table.contains(*terrain))
        {
            return Err(GenerationError::UnknownTerrain(*terrain));
        }
        let distribution = WeightedIndex::new(weights.iter().map(|(_, weight)| *weight))
            .map_err(|_| GenerationError::NoWeights)?;

        Ok(Self {
            terrains: weights.iter().map(|(terrain, _)| *terrain).collect(),
            distribution,
        })
    }

    /// Generator that draws every terrain of `table` with equal probability.
    pub fn uniform(table: &TerrainTable) -> Result<Self, GenerationError> {
        let weights: Vec<_> = table.iter().map(|(terrain, _)| (terrain, 1)).collect();
        Self::new(&weights, table)
    }

    /// Draws a row-major terrain layout for a `columns` x `rows` board.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        columns: u32,
        rows: u32,
        rng: &mut R,
    ) -> Vec<TerrainId> {
        let count = columns as usize * rows as usize;
        let layout: Vec<TerrainId> = (0..count)
            .map(|_| self.terrains[self.distribution.sample(rng)])
            .collect();
        debug!(columns, rows, "terrain generated");
        layout
    }
}

/// Picks `count` distinct tiles that ground units may stand on.
///
/// Candidates are the non-obstacle tiles of `layout` in row-major order;
/// the chosen tiles are returned in draw order.
pub fn place_units<R: Rng + ?Sized>(
    layout: &[TerrainId],
    table: &TerrainTable,
    columns: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<CellCoord>, GenerationError> {
    if columns == 0 {
        return Err(GenerationError::NotEnoughOpenTiles {
            requested: count,
            available: 0,
        });
    }

    let open: Vec<CellCoord> = layout
        .iter()
        .enumerate()
        .filter(|(_, terrain)| table.contains(**terrain) && !table.is_obstacle(**terrain))
        .map(|(index, _)| {
            let index = index as u32;
            CellCoord::new(index % columns, index / columns)
        })
        .collect();

    if open.len() < count {
        return Err(GenerationError::NotEnoughOpenTiles {
            requested: count,
            available: open.len(),
        });
    }

    Ok(open.choose_multiple(rng, count).copied().collect())
}
