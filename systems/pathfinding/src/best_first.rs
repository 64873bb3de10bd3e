//! Single-destination best-first search guided by Manhattan distance.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::{CellCoord, PathToTile};
use tracing::trace;

use crate::Pathfinder;

/// Searches for the cheapest route from `origin` to `target`.
///
/// Both coordinates must already be known to lie on the board.
/// The open list is scanned linearly for the lowest `g + h`; among equal
/// scores the entry inserted first wins. Improved costs overwrite the stored
/// score in place without reordering the open list.
pub(crate) fn find_one(
    pathfinder: &Pathfinder<'_>,
    origin: CellCoord,
    target: CellCoord,
) -> Option<PathToTile> {
    let board = pathfinder.board();
    if origin == target {
        return Some(PathToTile::stationary(origin));
    }

    let mut open = vec![origin];
    let mut closed = BTreeSet::new();
    let mut accumulated = BTreeMap::from([(origin, 0_u32)]);
    let mut came_from = BTreeMap::new();

    while let Some(index) = select_next(pathfinder, &open, &accumulated, target) {
        let current = open.remove(index);
        let Some(&current_cost) = accumulated.get(&current) else {
            continue;
        };

        if current == target {
            trace!(%origin, %target, expanded = closed.len(), "route found");
            return Some(reconstruct(origin, target, current_cost, &came_from));
        }
        let _ = closed.insert(current);

        for neighbor in board.neighbors(current) {
            if closed.contains(&neighbor) {
                continue;
            }
            let Some(entry_cost) = pathfinder.entry_cost(neighbor) else {
                continue;
            };

            let tentative = current_cost.saturating_add(entry_cost);
            if accumulated
                .get(&neighbor)
                .is_some_and(|&known| known <= tentative)
            {
                continue;
            }

            let _ = accumulated.insert(neighbor, tentative);
            let _ = came_from.insert(neighbor, current);
            if !open.contains(&neighbor) {
                open.push(neighbor);
            }
        }
    }

    trace!(%origin, %target, expanded = closed.len(), "no route");
    None
}

fn select_next(
    pathfinder: &Pathfinder<'_>,
    open: &[CellCoord],
    accumulated: &BTreeMap<CellCoord, u32>,
    target: CellCoord,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;

    for (index, &cell) in open.iter().enumerate() {
        let cost = accumulated.get(&cell).copied().unwrap_or(u32::MAX);
        let score = cost.saturating_add(pathfinder.estimate(cell, target));
        match best {
            Some((_, best_score)) if best_score <= score => {}
            _ => best = Some((index, score)),
        }
    }

    best.map(|(index, _)| index)
}

fn reconstruct(
    origin: CellCoord,
    target: CellCoord,
    cost: u32,
    came_from: &BTreeMap<CellCoord, CellCoord>,
) -> PathToTile {
    let mut steps = vec![target];
    let mut cursor = target;
    while let Some(&previous) = came_from.get(&cursor) {
        if previous == origin {
            break;
        }
        steps.push(previous);
        cursor = previous;
    }
    steps.reverse();
    PathToTile::from_steps(origin, steps, cost)
}
