use std::collections::VecDeque;

use crate::grid::{Dir, Grid, Pos};

/// Shortest path from `source` to `target`, excluding `source` and ending at
/// `target`. Empty when the two coincide or `target` cannot be reached.
pub fn find_path(grid: &Grid, source: Pos, target: Pos) -> Vec<Pos> {
    if source == target || !grid.in_bounds(source) || !grid.in_bounds(target) {
        return Vec::new();
    }

    let width = grid.width();
    let mut came_from: Vec<Option<Pos>> = vec![None; width * grid.height()];
    let mut visited = vec![false; width * grid.height()];
    let mut queue = VecDeque::new();
    visited[source.y * width + source.x] = true;
    queue.push_back(source);

    while let Some(pos) = queue.pop_front() {
        if pos == target {
            return walk_back(&came_from, width, source, target);
        }
        for dir in Dir::ALL {
            let Some(next) = grid.step(pos, dir) else {
                continue;
            };
            let idx = next.y * width + next.x;
            if visited[idx] || !grid.can_move(pos, next) {
                continue;
            }
            // Marked on enqueue so a cell is never queued twice.
            visited[idx] = true;
            came_from[idx] = Some(pos);
            queue.push_back(next);
        }
    }
    Vec::new()
}

fn walk_back(came_from: &[Option<Pos>], width: usize, source: Pos, target: Pos) -> Vec<Pos> {
    let mut path = vec![target];
    let mut at = target;
    while let Some(prev) = came_from[at.y * width + at.x] {
        if prev == source {
            break;
        }
        path.push(prev);
        at = prev;
    }
    path.reverse();
    path
}

/// BFS step counts from `start` to every cell, indexed `[y][x]`; `None` marks
/// cells that cannot be reached.
pub fn distance_map(grid: &Grid, start: Pos) -> Vec<Vec<Option<u32>>> {
    let mut dist = vec![vec![None; grid.width()]; grid.height()];
    if !grid.in_bounds(start) {
        return dist;
    }
    let mut q = VecDeque::new();
    dist[start.y][start.x] = Some(0);
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        let base = dist[pos.y][pos.x].unwrap_or(0);
        for dir in Dir::ALL {
            let Some(next) = grid.step(pos, dir) else {
                continue;
            };
            if dist[next.y][next.x].is_none() && grid.can_move(pos, next) {
                dist[next.y][next.x] = Some(base + 1);
                q.push_back(next);
            }
        }
    }
    dist
}
