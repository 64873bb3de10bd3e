//! Read-only grid accessor shared by the search and resolution systems.

use crate::{CellCoord, MovementProfile, TerrainId, TerrainTable, UnitId};

/// Largest number of tiles a board may hold.
pub const MAX_BOARD_TILES: u64 = 1 << 20;

/// Reports whether a `columns` by `rows` board stays within [`MAX_BOARD_TILES`].
#[must_use]
pub fn board_fits(columns: u32, rows: u32) -> bool {
    u64::from(columns) * u64::from(rows) <= MAX_BOARD_TILES
}

/// Failures raised when a caller queries the board incorrectly.
///
/// These signal logic errors in the caller and are never clamped away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The coordinate lies outside the board dimensions.
    #[error("cell {cell} lies outside the {columns}x{rows} board")]
    OutOfBounds {
        /// Coordinate that was queried.
        cell: CellCoord,
        /// Number of columns in the board.
        columns: u32,
        /// Number of rows in the board.
        rows: u32,
    },
}

/// Snapshot of a single tile returned by [`BoardView::tile_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileView {
    /// Coordinate of the tile.
    pub cell: CellCoord,
    /// Terrain classification of the tile.
    pub terrain: TerrainId,
    /// Unit standing on the tile, if any.
    pub occupant: Option<UnitId>,
}

/// Read-only view into the dense terrain and occupancy grids.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    terrain: &'a [TerrainId],
    occupancy: &'a [Option<UnitId>],
    rules: &'a TerrainTable,
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by row-major terrain and occupancy slices.
    #[must_use]
    pub fn new(
        terrain: &'a [TerrainId],
        occupancy: &'a [Option<UnitId>],
        rules: &'a TerrainTable,
        columns: u32,
        rows: u32,
    ) -> Self {
        Self {
            terrain,
            occupancy,
            rules,
            columns,
            rows,
        }
    }

    /// Returns a view over the same terrain with a different occupancy layer.
    #[must_use]
    pub fn with_occupancy<'b>(&self, occupancy: &'b [Option<UnitId>]) -> BoardView<'b>
    where
        'a: 'b,
    {
        BoardView {
            terrain: self.terrain,
            occupancy,
            rules: self.rules,
            columns: self.columns,
            rows: self.rows,
        }
    }

    /// Provides the dimensions of the board as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Terrain rules used to price movement on this board.
    #[must_use]
    pub const fn rules(&self) -> &'a TerrainTable {
        self.rules
    }

    /// Dense occupancy layer stored in row-major order.
    #[must_use]
    pub const fn occupancy(&self) -> &'a [Option<UnitId>] {
        self.occupancy
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Looks up the tile at the provided coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the coordinate is off the board.
    pub fn tile_at(&self, cell: CellCoord) -> Result<TileView, GridError> {
        let out_of_bounds = GridError::OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        };
        let index = self.index(cell).ok_or(out_of_bounds)?;
        let terrain = self.terrain.get(index).copied().ok_or(out_of_bounds)?;
        let occupant = self.occupancy.get(index).copied().flatten();

        Ok(TileView {
            cell,
            terrain,
            occupant,
        })
    }

    /// Terrain of the tile, or `None` when the coordinate is off the board.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainId> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    /// Reports whether `mover` could stand on the cell right now.
    ///
    /// A cell counts as free when nobody occupies it or `mover` itself does.
    #[must_use]
    pub fn is_free_for(&self, cell: CellCoord, mover: UnitId) -> bool {
        match self.occupant(cell) {
            None => self.in_bounds(cell),
            Some(occupant) => occupant == mover,
        }
    }

    /// Entry cost of the cell for the profile, `None` when terrain forbids it.
    #[must_use]
    pub fn step_cost(&self, cell: CellCoord, profile: &MovementProfile) -> Option<u32> {
        let terrain = self.terrain(cell)?;
        profile.step_cost(terrain, self.rules)
    }

    /// In-bounds axis-aligned neighbours in the order +x, -x, +y, -y.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> Neighbors {
        Neighbors::around(cell, self.columns, self.rows)
    }

    /// Row-major offset of the cell, if it lies on the board.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Fixed-capacity iterator over the cardinal neighbours of a cell.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn around(cell: CellCoord, columns: u32, rows: u32) -> Self {
        let mut neighbors = Self::default();
        if cell.column() >= columns || cell.row() >= rows {
            return neighbors;
        }

        if cell.column() + 1 < columns {
            neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
        }
        if cell.column() > 0 {
            neighbors.push(CellCoord::new(cell.column() - 1, cell.row()));
        }
        if cell.row() + 1 < rows {
            neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
        }
        if cell.row() > 0 {
            neighbors.push(CellCoord::new(cell.column(), cell.row() - 1));
        }

        neighbors
    }

    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}
