//! Per-decision logic for the pursuer: chase along the shortest path or
//! wander to a random open neighbour.

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Dir, Grid, Pos};
use crate::pathfinder::find_path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PursuitDecision {
    /// No path to the player (or already on it), or no open side to wander to.
    Stay,
    /// First step of the shortest path; `path_len` is the full path length
    /// measured before the step.
    Chase { to: Pos, path_len: usize },
    Wander { to: Pos },
}

impl PursuitDecision {
    pub fn destination(self, from: Pos) -> Pos {
        match self {
            PursuitDecision::Stay => from,
            PursuitDecision::Chase { to, .. } | PursuitDecision::Wander { to } => to,
        }
    }

    /// Whether this decision should raise the proximity cue.
    pub fn is_close(self, threshold: usize) -> bool {
        matches!(self, PursuitDecision::Chase { path_len, .. } if path_len < threshold)
    }
}

/// Decides the pursuer's next cell. `aggressiveness` is the probability of
/// taking the optimal step rather than a random legal one.
pub fn decide(
    grid: &Grid,
    pursuer: Pos,
    player: Pos,
    aggressiveness: f64,
    rng: &mut impl Rng,
) -> PursuitDecision {
    let path = find_path(grid, pursuer, player);
    let Some(&first) = path.first() else {
        return PursuitDecision::Stay;
    };

    let r: f64 = rng.gen();
    let decision = if r < aggressiveness {
        PursuitDecision::Chase {
            to: first,
            path_len: path.len(),
        }
    } else {
        wander(grid, pursuer, rng)
    };
    trace!("pursuer at {:?} -> {:?} (r = {:.3})", pursuer, decision, r);
    decision
}

fn wander(grid: &Grid, from: Pos, rng: &mut impl Rng) -> PursuitDecision {
    let mut dirs = Dir::ALL;
    dirs.shuffle(rng);
    dirs.iter()
        .filter_map(|&dir| grid.step(from, dir))
        .find(|&next| grid.can_move(from, next))
        .map_or(PursuitDecision::Stay, |to| PursuitDecision::Wander { to })
}
