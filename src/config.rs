use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_GRID_W: usize = 15;
pub const DEFAULT_GRID_H: usize = 15;
/// Smallest side that keeps the seed and exit cells distinct and inside.
pub const MIN_GRID_SIDE: usize = 4;
pub const MAX_GRID_SIDE: usize = 64;
pub const DEFAULT_AGGRESSIVENESS: f64 = 0.7;
pub const DEFAULT_PURSUIT_MS: u64 = 500;
pub const DEFAULT_PROXIMITY_STEPS: usize = 3;
pub const DEFAULT_GROWL_MS: u64 = 5000;
pub const DEFAULT_GROWL_CHANCE: f64 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Probability that a pursuit decision follows the shortest path.
    pub aggressiveness: f64,
    pub pursuit_interval: Duration,
    /// Chase steps that leave a path shorter than this raise a growl.
    pub proximity_threshold: usize,
    /// Minimum gap between ambient growls.
    pub growl_interval: Duration,
    /// Chance per eligible tick that an ambient growl fires.
    pub growl_chance: f64,
    /// Fixed RNG seed; `None` draws a fresh one per session.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: DEFAULT_GRID_W,
            height: DEFAULT_GRID_H,
            aggressiveness: DEFAULT_AGGRESSIVENESS,
            pursuit_interval: Duration::from_millis(DEFAULT_PURSUIT_MS),
            proximity_threshold: DEFAULT_PROXIMITY_STEPS,
            growl_interval: Duration::from_millis(DEFAULT_GROWL_MS),
            growl_chance: DEFAULT_GROWL_CHANCE,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                width,
                height,
                min: MIN_GRID_SIDE,
            });
        }
        if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge {
                width,
                height,
                max: MAX_GRID_SIDE,
            });
        }
        if !(0.0..=1.0).contains(&self.aggressiveness) {
            return Err(ConfigError::AggressivenessOutOfRange(self.aggressiveness));
        }
        if !(0.0..=1.0).contains(&self.growl_chance) {
            return Err(ConfigError::GrowlChanceOutOfRange(self.growl_chance));
        }
        if self.pursuit_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("pursuit"));
        }
        if self.growl_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("growl"));
        }
        Ok(())
    }
}
