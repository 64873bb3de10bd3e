//! Summary of a finished simulation, rendered as text or JSON.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;
use skirmish_core::CellCoord;

/// Outcome of a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Report {
    pub(crate) seed: u64,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) rounds_played: u32,
    /// One string per row; terrain initials with unit owners overlaid as letters.
    pub(crate) board: Vec<String>,
    pub(crate) units: Vec<UnitSummary>,
    pub(crate) moves: Vec<MoveRecord>,
    pub(crate) rejected_commands: usize,
}

/// Final state of one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct UnitSummary {
    pub(crate) unit: u32,
    pub(crate) owner: u32,
    pub(crate) cell: CellCoord,
    pub(crate) target: CellCoord,
    pub(crate) moves_left: u32,
    /// Whether the unit still has somewhere to go.
    pub(crate) pending: bool,
}

/// A single applied move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct MoveRecord {
    pub(crate) round: u32,
    pub(crate) unit: u32,
    pub(crate) from: CellCoord,
    pub(crate) to: CellCoord,
    pub(crate) cost: u32,
}

/// Glyph used for units of `owner` on the text board.
pub(crate) fn owner_glyph(owner: u32) -> char {
    char::from(b'A' + (owner % 26) as u8)
}

impl Report {
    /// Human readable multi-line summary.
    pub(crate) fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "seed {} | {}x{} board | {} round(s) played",
            self.seed, self.columns, self.rows, self.rounds_played
        );
        for line in &self.board {
            let _ = writeln!(out, "  {line}");
        }

        let _ = writeln!(out, "moves:");
        if self.moves.is_empty() {
            let _ = writeln!(out, "  none");
        }
        for record in &self.moves {
            let _ = writeln!(
                out,
                "  round {:>2}: unit {} {} -> {} (cost {})",
                record.round, record.unit, record.from, record.to, record.cost
            );
        }

        let _ = writeln!(out, "units:");
        for unit in &self.units {
            let status = if unit.pending { "en route" } else { "settled" };
            let _ = writeln!(
                out,
                "  unit {} [{}] at {} target {} moves left {} ({status})",
                unit.unit,
                owner_glyph(unit.owner),
                unit.cell,
                unit.target,
                unit.moves_left
            );
        }

        if self.rejected_commands > 0 {
            let _ = writeln!(out, "rejected commands: {}", self.rejected_commands);
        }
        out
    }

    /// Pretty-printed JSON document.
    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }
}
