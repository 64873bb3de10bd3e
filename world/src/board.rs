//! Dense terrain and occupancy storage backing the world's board.

use skirmish_core::{BoardView, CellCoord, TerrainId, TerrainTable, UnitId};

/// Authoritative tile storage; dimensions never change after construction.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    columns: u32,
    rows: u32,
    terrain: Vec<TerrainId>,
    occupancy: Vec<Option<UnitId>>,
    rules: TerrainTable,
}

impl Board {
    /// Creates a board filled with `fill` terrain and no occupants.
    pub(crate) fn new(columns: u32, rows: u32, rules: TerrainTable, fill: TerrainId) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            terrain: vec![fill; capacity],
            occupancy: vec![None; capacity],
            rules,
        }
    }

    pub(crate) fn view(&self) -> BoardView<'_> {
        BoardView::new(
            &self.terrain,
            &self.occupancy,
            &self.rules,
            self.columns,
            self.rows,
        )
    }

    pub(crate) fn rules(&self) -> &TerrainTable {
        &self.rules
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn in_bounds(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    pub(crate) fn terrain(&self, cell: CellCoord) -> Option<TerrainId> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    pub(crate) fn paint(&mut self, cell: CellCoord, terrain: TerrainId) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.terrain.get_mut(index) {
                *slot = terrain;
            }
        }
    }

    pub(crate) fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupancy.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupancy.get_mut(index) {
                *slot = None;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
