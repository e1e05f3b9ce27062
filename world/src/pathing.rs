//! Single-step breadth-first path stepping over the terrain grid.

use std::collections::VecDeque;

use river_chase_core::{Capabilities, TileCoord};

use crate::terrain::Grid;

/// Returns the first tile of a shortest path from `start` to `goal` for an
/// agent with the provided capability set.
///
/// The search expands neighbors in the grid's fixed order, so ties between
/// equally short paths resolve identically for identical inputs. When the
/// goal is unreachable, off-grid, or equal to the start, the start tile is
/// returned and the caller simply stays put this tick.
#[must_use]
pub fn next_step(
    grid: &Grid,
    capabilities: Capabilities,
    start: TileCoord,
    goal: TileCoord,
) -> TileCoord {
    if start == goal || !grid.contains(start) || !grid.contains(goal) {
        return start;
    }

    let tile_count = (grid.columns() * grid.rows()) as usize;
    let mut visited = vec![false; tile_count];
    let mut parent: Vec<Option<TileCoord>> = vec![None; tile_count];
    let mut frontier = VecDeque::new();

    if let Some(index) = grid.index(start) {
        visited[index] = true;
    }
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        for neighbor in grid.neighbors(current) {
            let Some(index) = grid.index(neighbor) else {
                continue;
            };
            if visited[index] || grid.is_blocked_for(capabilities, neighbor) {
                continue;
            }
            visited[index] = true;
            parent[index] = Some(current);

            if neighbor == goal {
                return first_hop(grid, &parent, start, goal);
            }
            frontier.push_back(neighbor);
        }
    }

    start
}

/// Walks the predecessor chain from the goal back to the tile adjacent to
/// the start.
fn first_hop(grid: &Grid, parent: &[Option<TileCoord>], start: TileCoord, goal: TileCoord) -> TileCoord {
    let mut cursor = goal;
    loop {
        let previous = grid
            .index(cursor)
            .and_then(|index| parent.get(index).copied().flatten());
        match previous {
            Some(tile) if tile == start => return cursor,
            Some(tile) => cursor = tile,
            None => return start,
        }
    }
}
