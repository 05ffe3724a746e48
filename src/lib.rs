//! Maze generation, shortest-path pursuit and the game state machine for a
//! labyrinth escape game. Rendering, input and timing are left to the host;
//! it feeds in directional intents and elapsed time and reads back the grid,
//! the positions and the status.

pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod grid;
pub mod pathfinder;
pub mod pursuit;

pub use config::GameConfig;
pub use error::ConfigError;
pub use game::{format_elapsed, GameEvent, GameState, Layout, Status};
pub use grid::{Cell, Dir, Grid, Pos};
pub use pathfinder::{distance_map, find_path};
pub use pursuit::PursuitDecision;
