use thiserror::Error;

/// Reasons a session refuses to start.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least {min}x{min}, got {width}x{height}")]
    GridTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("grid may be at most {max}x{max}, got {width}x{height}")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("aggressiveness must lie in [0, 1], got {0}")]
    AggressivenessOutOfRange(f64),

    #[error("growl chance must lie in [0, 1], got {0}")]
    GrowlChanceOutOfRange(f64),

    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("position ({x}, {y}) lies outside the {width}x{height} grid")]
    PositionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
