#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`BoardView`] and [`UnitView`], and respond exclusively with
//! new command batches.

mod board;
mod path;
mod terrain;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use board::{board_fits, BoardView, GridError, Neighbors, TileView, MAX_BOARD_TILES};
pub use path::{PathTable, PathToTile};
pub use terrain::{MovementProfile, TerrainId, TerrainRule, TerrainTable};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the board with a fresh grid filled with the table's first terrain.
    ConfigureBoard {
        /// Number of columns laid out in the board.
        columns: u32,
        /// Number of rows laid out in the board.
        rows: u32,
        /// Terrain rules used to price and gate movement on the board.
        terrain: TerrainTable,
    },
    /// Overwrites the terrain classification of a single tile.
    PaintTerrain {
        /// Tile receiving the new terrain.
        cell: CellCoord,
        /// Terrain to assign.
        terrain: TerrainId,
    },
    /// Places a new unit on the board.
    SpawnUnit {
        /// Player controlling the unit.
        owner: PlayerId,
        /// Tile the unit occupies after spawning.
        cell: CellCoord,
        /// Movement capabilities resolved for the unit type.
        profile: MovementProfile,
    },
    /// Assigns a persistent destination to a unit.
    SetTarget {
        /// Unit receiving the destination.
        unit: UnitId,
        /// Destination the unit should advance toward over one or more turns.
        target: CellCoord,
    },
    /// Starts a turn for the provided player, renewing its units' budgets.
    BeginTurn {
        /// Player whose turn begins.
        player: PlayerId,
    },
    /// Relocates a unit, spending the provided amount of its movement budget.
    MoveUnit {
        /// Unit being moved.
        unit: UnitId,
        /// Tile the unit ends its advance on.
        to: CellCoord,
        /// Movement budget consumed by the advance.
        cost: u32,
    },
    /// Abandons a unit's pending destination.
    ClearTarget {
        /// Unit whose destination is reset to its current position.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new board replaced the previous one.
    BoardConfigured {
        /// Number of columns in the new board.
        columns: u32,
        /// Number of rows in the new board.
        rows: u32,
    },
    /// Confirms that a tile received a new terrain classification.
    TerrainPainted {
        /// Tile that changed.
        cell: CellCoord,
        /// Terrain now assigned to the tile.
        terrain: TerrainId,
    },
    /// Confirms that a unit was placed on the board.
    UnitSpawned {
        /// Identifier assigned to the unit by the world.
        unit: UnitId,
        /// Player controlling the unit.
        owner: PlayerId,
        /// Tile the unit occupies.
        cell: CellCoord,
    },
    /// Confirms that a unit accepted a new destination.
    TargetSet {
        /// Unit that received the destination.
        unit: UnitId,
        /// Destination recorded for the unit.
        target: CellCoord,
    },
    /// Announces that a player's turn started and budgets were renewed.
    TurnStarted {
        /// Player whose turn began.
        player: PlayerId,
    },
    /// Confirms that a unit advanced between two tiles.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile the unit occupied before moving.
        from: CellCoord,
        /// Tile the unit occupies after moving.
        to: CellCoord,
        /// Movement budget consumed by the advance.
        cost: u32,
    },
    /// Confirms that a unit abandoned its pending destination.
    TargetCleared {
        /// Unit whose destination was reset.
        unit: UnitId,
        /// Position the destination was reset to.
        at: CellCoord,
    },
    /// Reports that the world refused to apply a command.
    CommandRejected {
        /// Unit addressed by the command, when it named one.
        unit: Option<UnitId>,
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RejectionReason {
    /// The command referenced a cell outside the board.
    #[error("cell lies outside the board")]
    OutOfBounds,
    /// The destination tile already holds another unit.
    #[error("tile is occupied by another unit")]
    Occupied,
    /// The unit's movement profile can never enter the tile.
    #[error("tile is impassable for the unit")]
    Impassable,
    /// No unit with the provided identifier exists.
    #[error("unit does not exist")]
    UnknownUnit,
    /// The move costs more than the unit has left this turn.
    #[error("unit lacks the movement budget for the move")]
    InsufficientMoves,
    /// The terrain identifier is not part of the board's terrain table.
    #[error("terrain is not registered in the terrain table")]
    UnknownTerrain,
    /// The requested board would exceed [`MAX_BOARD_TILES`].
    #[error("board exceeds the maximum tile count")]
    BoardTooLarge,
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a player controlling units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single unit's movement state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Player controlling the unit.
    pub owner: PlayerId,
    /// Tile currently occupied by the unit.
    pub cell: CellCoord,
    /// Persistent destination; equals `cell` when no move is pending.
    pub target: CellCoord,
    /// Movement budget remaining in the current turn.
    pub moves_left: u32,
    /// Movement capabilities of the unit.
    pub profile: MovementProfile,
}

impl UnitSnapshot {
    /// Reports whether the unit still has a destination it has not reached.
    #[must_use]
    pub fn has_pending_move(&self) -> bool {
        self.cell != self.target
    }
}

/// Read-only snapshot describing all units on the board.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}
