//! Session state: positions, status transitions and the pursuit cadence.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::generator::{exit_cell, generate_maze, SEED_CELL};
use crate::grid::{Dir, Grid, Pos};
use crate::pursuit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Escaped,
    Caught,
}

/// Notifications for the presentation layer. None of them affect state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved(Pos),
    /// Proximity cue: a short chase step or an ambient growl.
    Growl,
    Escaped,
    Caught,
}

/// Time accumulated since a periodic process last fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
    since_last: Duration,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Cadence {
            interval,
            since_last: Duration::ZERO,
        }
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        self.since_last = self.since_last.saturating_add(elapsed);
    }

    pub fn is_ready(&self) -> bool {
        self.since_last >= self.interval
    }

    pub fn reset(&mut self) {
        self.since_last = Duration::ZERO;
    }

    /// Accumulates `elapsed` and fires at most once if the interval has
    /// passed. Overshoot is dropped rather than carried over.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulate(elapsed);
        if self.is_ready() {
            self.reset();
            true
        } else {
            false
        }
    }
}

/// Explicit placement of a maze and both agents, for scripted sessions.
#[derive(Clone, Debug)]
pub struct Layout {
    pub grid: Grid,
    pub player: Pos,
    pub pursuer: Pos,
    pub exit: Pos,
}

pub struct GameState {
    config: GameConfig,
    grid: Grid,
    player: Pos,
    pursuer: Pos,
    exit: Pos,
    status: Status,
    elapsed: Duration,
    pursuit: Cadence,
    growl: Cadence,
    rng: StdRng,
    seed: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Starts a session on a freshly generated maze.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self::generate(config, seed))
    }

    /// Starts a session on a caller-supplied maze. The config's grid
    /// dimensions are ignored here but used again by `restart`.
    pub fn from_layout(config: GameConfig, layout: Layout) -> Result<Self, ConfigError> {
        config.validate()?;
        for pos in [layout.player, layout.pursuer, layout.exit] {
            if !layout.grid.in_bounds(pos) {
                return Err(ConfigError::PositionOutOfBounds {
                    x: pos.x,
                    y: pos.y,
                    width: layout.grid.width(),
                    height: layout.grid.height(),
                });
            }
        }
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self::assemble(config, layout, seed, StdRng::seed_from_u64(seed)))
    }

    fn generate(config: GameConfig, seed: u64) -> Self {
        let (w, h) = (config.width, config.height);
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = generate_maze(&mut rng, w, h);
        let layout = Layout {
            grid,
            player: SEED_CELL,
            pursuer: Pos::new(w - 2, h - 2),
            exit: exit_cell(w),
        };
        info!("new {}x{} labyrinth (seed {})", w, h, seed);
        Self::assemble(config, layout, seed, rng)
    }

    fn assemble(config: GameConfig, layout: Layout, seed: u64, rng: StdRng) -> Self {
        GameState {
            pursuit: Cadence::new(config.pursuit_interval),
            growl: Cadence::new(config.growl_interval),
            config,
            grid: layout.grid,
            player: layout.player,
            pursuer: layout.pursuer,
            exit: layout.exit,
            status: Status::Playing,
            elapsed: Duration::ZERO,
            rng,
            seed,
            events: Vec::new(),
        }
    }

    /// Throws the session away and starts over on a new maze.
    pub fn restart(&mut self) {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!("restarting after {:?}", self.status);
        *self = Self::generate(self.config.clone(), seed);
    }

    /// Moves the player one cell if the maze allows it. Blocked moves and
    /// moves after the game ended are ignored. Returns whether the player
    /// moved.
    pub fn apply_player_intent(&mut self, dir: Dir) -> bool {
        if self.status != Status::Playing {
            return false;
        }
        let Some(next) = self.grid.step(self.player, dir) else {
            return false;
        };
        if !self.grid.can_move(self.player, next) {
            return false;
        }
        self.player = next;
        self.events.push(GameEvent::PlayerMoved(next));
        self.evaluate();
        true
    }

    /// Advances the session clock by `elapsed`, running a pursuit decision
    /// whenever the cadence comes due.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.status != Status::Playing {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(elapsed);

        if self.pursuit.advance(elapsed) {
            self.move_pursuer();
        }

        self.growl.accumulate(elapsed);
        if self.growl.is_ready() && self.rng.gen_bool(self.config.growl_chance) {
            self.growl.reset();
            self.events.push(GameEvent::Growl);
        }

        self.evaluate();
    }

    fn move_pursuer(&mut self) {
        let decision = pursuit::decide(
            &self.grid,
            self.pursuer,
            self.player,
            self.config.aggressiveness,
            &mut self.rng,
        );
        if decision.is_close(self.config.proximity_threshold) {
            self.events.push(GameEvent::Growl);
        }
        self.pursuer = decision.destination(self.pursuer);
    }

    // Escape is checked first, so reaching the exit on the tick the pursuer
    // arrives counts as an escape.
    fn evaluate(&mut self) {
        if self.player == self.exit {
            self.finish(Status::Escaped, GameEvent::Escaped);
        } else if self.player == self.pursuer {
            self.finish(Status::Caught, GameEvent::Caught);
        }
    }

    fn finish(&mut self, status: Status, event: GameEvent) {
        self.status = status;
        self.events.push(event);
        info!("{:?} after {}", status, format_elapsed(self.elapsed));
        debug!("player {:?}, pursuer {:?}", self.player, self.pursuer);
    }

    /// Takes the notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn pursuer(&self) -> Pos {
        self.pursuer
    }

    pub fn exit(&self) -> Pos {
        self.exit
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::Playing
    }

    /// Play time, frozen once the game ends.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

/// `MM:SS`, minutes not wrapping at the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinder::find_path;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(17),
            growl_chance: 0.0,
            ..GameConfig::default()
        }
    }

    /// A 4x4 maze with a single corridor along the top row.
    fn corridor() -> Grid {
        let mut grid = Grid::new(4, 4);
        grid.open(Pos::new(0, 0), Dir::Right);
        grid.open(Pos::new(1, 0), Dir::Right);
        grid.open(Pos::new(2, 0), Dir::Right);
        grid
    }

    #[test]
    fn cadence_fires_once_per_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(500));
        assert!(!cadence.advance(Duration::from_millis(300)));
        assert!(cadence.advance(Duration::from_millis(200)));
        assert!(!cadence.advance(Duration::from_millis(499)));
        assert!(cadence.advance(Duration::from_millis(2000)));
        assert!(!cadence.advance(Duration::ZERO));
    }

    #[test]
    fn new_session_uses_fixed_start_cells() {
        let game = GameState::new(config()).unwrap();
        assert_eq!(game.player(), Pos::new(1, 1));
        assert_eq!(game.pursuer(), Pos::new(13, 13));
        assert_eq!(game.exit(), Pos::new(13, 1));
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.seed(), 17);
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = GameConfig {
            width: 2,
            ..GameConfig::default()
        };
        assert!(GameState::new(cfg).is_err());
    }

    #[test]
    fn rejects_layout_outside_grid() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(0, 0),
            pursuer: Pos::new(4, 0),
            exit: Pos::new(3, 0),
        };
        assert!(matches!(
            GameState::from_layout(config(), layout),
            Err(ConfigError::PositionOutOfBounds { x: 4, y: 0, .. })
        ));
    }

    #[test]
    fn blocked_intent_is_ignored() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(0, 0),
            pursuer: Pos::new(0, 3),
            exit: Pos::new(3, 3),
        };
        let mut game = GameState::from_layout(config(), layout).unwrap();
        assert!(!game.apply_player_intent(Dir::Down));
        assert!(!game.apply_player_intent(Dir::Left));
        assert_eq!(game.player(), Pos::new(0, 0));
        assert!(game.drain_events().is_empty());

        assert!(game.apply_player_intent(Dir::Right));
        assert_eq!(game.player(), Pos::new(1, 0));
        assert_eq!(game.drain_events(), vec![GameEvent::PlayerMoved(Pos::new(1, 0))]);
    }

    #[test]
    fn walking_into_exit_escapes() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(2, 0),
            pursuer: Pos::new(0, 3),
            exit: Pos::new(3, 0),
        };
        let mut game = GameState::from_layout(config(), layout).unwrap();
        assert!(game.apply_player_intent(Dir::Right));
        assert_eq!(game.status(), Status::Escaped);
        assert!(game.drain_events().contains(&GameEvent::Escaped));
    }

    #[test]
    fn pursuer_moves_only_on_cadence() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(0, 0),
            pursuer: Pos::new(3, 0),
            exit: Pos::new(3, 3),
        };
        let cfg = GameConfig {
            aggressiveness: 1.0,
            ..config()
        };
        let mut game = GameState::from_layout(cfg, layout).unwrap();
        game.tick(Duration::from_millis(499));
        assert_eq!(game.pursuer(), Pos::new(3, 0));
        game.tick(Duration::from_millis(1));
        assert_eq!(game.pursuer(), Pos::new(2, 0));
        assert_eq!(game.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn short_chase_growls() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(0, 0),
            pursuer: Pos::new(2, 0),
            exit: Pos::new(3, 3),
        };
        let cfg = GameConfig {
            aggressiveness: 1.0,
            ..config()
        };
        let mut game = GameState::from_layout(cfg, layout).unwrap();
        game.tick(Duration::from_millis(500));
        assert_eq!(game.drain_events(), vec![GameEvent::Growl]);
        game.tick(Duration::from_millis(500));
        assert_eq!(game.status(), Status::Caught);
        assert_eq!(game.drain_events(), vec![GameEvent::Growl, GameEvent::Caught]);
    }

    #[test]
    fn ambient_growl_waits_for_interval() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(0, 0),
            pursuer: Pos::new(0, 3),
            exit: Pos::new(3, 3),
        };
        let cfg = GameConfig {
            growl_chance: 1.0,
            ..config()
        };
        let mut game = GameState::from_layout(cfg, layout).unwrap();
        game.tick(Duration::from_millis(4999));
        assert!(game.drain_events().is_empty());
        game.tick(Duration::from_millis(1));
        assert_eq!(game.drain_events(), vec![GameEvent::Growl]);
        game.tick(Duration::from_millis(100));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn escape_wins_tie_with_capture() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(3, 0),
            pursuer: Pos::new(2, 0),
            exit: Pos::new(3, 0),
        };
        let cfg = GameConfig {
            aggressiveness: 1.0,
            ..config()
        };
        let mut game = GameState::from_layout(cfg, layout).unwrap();
        game.tick(Duration::from_millis(500));
        assert_eq!(game.pursuer(), game.player());
        assert_eq!(game.player(), game.exit());
        assert_eq!(game.status(), Status::Escaped);
    }

    #[test]
    fn finished_game_ignores_input_and_time() {
        let layout = Layout {
            grid: corridor(),
            player: Pos::new(1, 0),
            pursuer: Pos::new(2, 0),
            exit: Pos::new(3, 3),
        };
        let cfg = GameConfig {
            aggressiveness: 1.0,
            ..config()
        };
        let mut game = GameState::from_layout(cfg, layout).unwrap();
        game.tick(Duration::from_millis(500));
        assert_eq!(game.status(), Status::Caught);
        let (player, pursuer, elapsed) = (game.player(), game.pursuer(), game.elapsed());

        for dir in Dir::ALL {
            assert!(!game.apply_player_intent(dir));
        }
        for _ in 0..10 {
            game.tick(Duration::from_secs(1));
        }
        assert_eq!(game.player(), player);
        assert_eq!(game.pursuer(), pursuer);
        assert_eq!(game.elapsed(), elapsed);
        assert_eq!(game.status(), Status::Caught);
    }

    #[test]
    fn restart_builds_a_fresh_session() {
        let mut game = GameState::new(GameConfig {
            seed: None,
            ..config()
        })
        .unwrap();
        game.tick(Duration::from_secs(3));
        game.restart();
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert_eq!(game.player(), Pos::new(1, 1));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn chase_step_follows_shortest_path() {
        let mut game = GameState::new(GameConfig {
            aggressiveness: 1.0,
            ..config()
        })
        .unwrap();
        let expected = find_path(game.grid(), game.pursuer(), game.player())[0];
        game.tick(Duration::from_millis(500));
        assert_eq!(game.pursuer(), expected);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "62:05");
    }
}
