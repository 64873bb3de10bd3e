//! Round-based uniform-cost expansion that fills a [`PathTable`].

use skirmish_core::{CellCoord, PathTable, PathToTile};
use tracing::trace;

use crate::Pathfinder;

/// Expands routes outward from `origin` until no round improves the table.
///
/// Every round extends the routes that improved in the previous one by a
/// single tile. A candidate replaces the recorded route only when it is
/// strictly cheaper, so non-negative costs guarantee termination and the first
/// route found among equal-cost alternatives is kept. Neighbours are visited
/// in board order (+x, -x, +y, -y), which makes the result deterministic.
/// `origin` must already be known to lie on the board.
pub(crate) fn enumerate_all(pathfinder: &Pathfinder<'_>, origin: CellCoord) -> PathTable {
    let board = pathfinder.board();
    let mut table = PathTable::anchored_at(origin);
    let mut frontier = vec![PathToTile::stationary(origin)];
    let mut rounds = 0_u32;

    while !frontier.is_empty() {
        rounds = rounds.saturating_add(1);
        let mut next = Vec::new();

        for path in &frontier {
            if table.cost_to(path.target()) != Some(path.cost()) {
                // Superseded by a cheaper route queued later.
                continue;
            }

            for neighbor in board.neighbors(path.target()) {
                if neighbor == origin {
                    continue;
                }
                let Some(entry_cost) = pathfinder.entry_cost(neighbor) else {
                    continue;
                };

                let candidate_cost = path.cost().saturating_add(entry_cost);
                if table
                    .cost_to(neighbor)
                    .is_some_and(|known| known <= candidate_cost)
                {
                    continue;
                }

                let candidate = path.extended(neighbor, entry_cost);
                next.push(candidate.clone());
                let _ = table.offer(candidate);
            }
        }

        frontier = next;
    }

    trace!(%origin, rounds, reachable = table.len(), "path table enumerated");
    table
}
