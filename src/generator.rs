//! Randomized depth-first ("recursive backtracker") maze carving.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Dir, Grid, Pos};

/// Cell the carve starts from; also the player's spawn.
pub const SEED_CELL: Pos = Pos::new(1, 1);

/// Cell whose right-hand wall is knocked out to form the exit.
pub fn exit_cell(width: usize) -> Pos {
    Pos::new(width - 2, 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NeighborOrder {
    /// Candidates are shuffled at every cell.
    #[default]
    Shuffled,
    /// Candidates are tried in `Dir::ALL` order; no randomness is consumed.
    Fixed,
}

struct Frame {
    pos: Pos,
    // Reversed, so `pop` yields the next candidate to try.
    pending: Vec<(Pos, Dir)>,
}

/// Generates a perfect maze with its entrance and exit opened.
pub fn generate_maze(rng: &mut impl Rng, width: usize, height: usize) -> Grid {
    generate_maze_with(rng, width, height, NeighborOrder::Shuffled)
}

pub fn generate_maze_with(
    rng: &mut impl Rng,
    width: usize,
    height: usize,
    order: NeighborOrder,
) -> Grid {
    let mut grid = Grid::new(width, height);
    carve_spanning_tree(&mut grid, SEED_CELL, order, rng);
    open_boundaries(&mut grid);
    debug!(
        "generated {}x{} maze with {} open edges",
        width,
        height,
        grid.open_edges().len()
    );
    grid
}

/// Carves a spanning tree over every cell reachable from `start`.
///
/// Equivalent to the recursive formulation, but the recursion lives in an
/// explicit stack so large grids cannot overflow the call stack. Each frame
/// keeps the candidate list computed when its cell was entered; a candidate
/// is re-checked before carving because a deeper branch may have reached it
/// in the meantime.
pub fn carve_spanning_tree(grid: &mut Grid, start: Pos, order: NeighborOrder, rng: &mut impl Rng) {
    grid.cell_mut(start).visited = true;
    let mut stack = vec![enter(grid, start, order, rng)];

    while let Some(frame) = stack.last_mut() {
        let current = frame.pos;
        let Some((next, dir)) = frame.pending.pop() else {
            stack.pop();
            continue;
        };
        if grid.cell(next).visited {
            continue;
        }
        grid.open(current, dir);
        grid.cell_mut(next).visited = true;
        let frame = enter(grid, next, order, rng);
        stack.push(frame);
    }
}

fn enter(grid: &Grid, pos: Pos, order: NeighborOrder, rng: &mut impl Rng) -> Frame {
    let mut pending: Vec<(Pos, Dir)> = grid
        .neighbors_in_bounds(pos)
        .into_iter()
        .filter(|(next, _)| !grid.cell(*next).visited)
        .collect();
    if order == NeighborOrder::Shuffled {
        pending.shuffle(rng);
    }
    pending.reverse();
    Frame { pos, pending }
}

/// Opens the entrance corridor left of the seed cell and the exit corridor
/// right of the exit cell. These are not tree edges and are never re-closed.
pub fn open_boundaries(grid: &mut Grid) {
    grid.open(SEED_CELL, Dir::Left);
    let exit = exit_cell(grid.width());
    grid.open(exit, Dir::Right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeSet, VecDeque};

    fn reachable_count(grid: &Grid, from: Pos) -> usize {
        let mut seen = vec![false; grid.width() * grid.height()];
        let mut queue = VecDeque::from([from]);
        seen[from.y * grid.width() + from.x] = true;
        let mut count = 1;
        while let Some(pos) = queue.pop_front() {
            for (next, _) in grid.neighbors_in_bounds(pos) {
                let idx = next.y * grid.width() + next.x;
                if !seen[idx] && grid.can_move(pos, next) {
                    seen[idx] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    #[test]
    fn carved_tree_spans_the_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        for (w, h) in [(4, 4), (5, 9), (15, 15), (31, 21)] {
            let mut grid = Grid::new(w, h);
            carve_spanning_tree(&mut grid, SEED_CELL, NeighborOrder::Shuffled, &mut rng);
            assert_eq!(grid.open_edges().len(), w * h - 1);
            assert_eq!(reachable_count(&grid, SEED_CELL), w * h);
            assert!(grid.walls_symmetric());
            assert!(grid.positions().all(|p| grid.cell(p).visited));
        }
    }

    #[test]
    fn fixed_order_5x5_matches_hand_computed_tree() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut grid = Grid::new(5, 5);
        carve_spanning_tree(&mut grid, SEED_CELL, NeighborOrder::Fixed, &mut rng);

        let p = Pos::new;
        let expected: BTreeSet<(Pos, Pos)> = [
            (p(1, 0), p(1, 1)),
            (p(1, 0), p(2, 0)),
            (p(2, 0), p(3, 0)),
            (p(3, 0), p(4, 0)),
            (p(4, 0), p(4, 1)),
            (p(4, 1), p(4, 2)),
            (p(4, 2), p(4, 3)),
            (p(4, 3), p(4, 4)),
            (p(3, 4), p(4, 4)),
            (p(3, 3), p(3, 4)),
            (p(3, 2), p(3, 3)),
            (p(3, 1), p(3, 2)),
            (p(2, 1), p(3, 1)),
            (p(2, 1), p(2, 2)),
            (p(2, 2), p(2, 3)),
            (p(2, 3), p(2, 4)),
            (p(1, 4), p(2, 4)),
            (p(1, 3), p(1, 4)),
            (p(1, 2), p(1, 3)),
            (p(0, 2), p(1, 2)),
            (p(0, 1), p(0, 2)),
            (p(0, 0), p(0, 1)),
            (p(0, 2), p(0, 3)),
            (p(0, 3), p(0, 4)),
        ]
        .into_iter()
        .collect();
        let carved: BTreeSet<(Pos, Pos)> = grid.open_edges().into_iter().collect();
        assert_eq!(carved, expected);

        open_boundaries(&mut grid);
        let mut with_boundaries = expected.clone();
        with_boundaries.insert((p(0, 1), p(1, 1)));
        with_boundaries.insert((p(3, 1), p(4, 1)));
        let opened: BTreeSet<(Pos, Pos)> = grid.open_edges().into_iter().collect();
        assert_eq!(opened, with_boundaries);
    }

    #[test]
    fn boundary_openings_are_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = generate_maze(&mut rng, 15, 15);
        assert!(grid.is_open(SEED_CELL, Dir::Left));
        assert!(grid.is_open(Pos::new(0, 1), Dir::Right));
        assert!(grid.is_open(exit_cell(15), Dir::Right));
        assert!(grid.is_open(Pos::new(14, 1), Dir::Left));
        assert!(grid.walls_symmetric());
        let edges = grid.open_edges().len();
        assert!((15 * 15 - 1..=15 * 15 + 1).contains(&edges));
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate_maze(&mut StdRng::seed_from_u64(42), 12, 9);
        let b = generate_maze(&mut StdRng::seed_from_u64(42), 12, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn large_grid_does_not_recurse() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(400, 400);
        carve_spanning_tree(&mut grid, SEED_CELL, NeighborOrder::Fixed, &mut rng);
        assert_eq!(grid.open_edges().len(), 400 * 400 - 1);
    }
}
