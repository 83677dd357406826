use std::time::Duration;

use thiserror::Error;

use crate::GridOffset;
use crate::pattern::Pattern;
use crate::pattern::PatternError;
use crate::pattern::PatternName;
use crate::rule_set::RuleSet;

/// Random seeding marks a cell alive when a roll of `1..=10` is at most the alive chance.
pub const ALIVE_CHANCE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Largest side of a cell on the drawing surface, in pixels
pub const MAX_CELL_SIZE: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("A {width}x{height} grid is too small for 8 distinct neighbors per cell (minimum 3x3)")]
    DegenerateGrid { width: usize, height: usize },

    #[error(
        "Pattern {name} ({pattern_width}x{pattern_height}) does not fit on a {width}x{height} grid"
    )]
    PatternTooLarge {
        name: String,
        pattern_width: usize,
        pattern_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Alive chance must be between 1 and 10, got {got}")]
    AliveChance { got: u8 },

    #[error("Cell size must be positive")]
    ZeroCellSize,

    #[error("Cell size must be at most {}, got {got}", MAX_CELL_SIZE)]
    CellSizeTooLarge { got: usize },

    #[error("Tick interval must be positive")]
    ZeroInterval,

    #[error("Speed limits are inconsistent: {min:?} <= {interval:?} <= {max:?} with step {step:?}")]
    SpeedLimits {
        min: Duration,
        max: Duration,
        step: Duration,
        interval: Duration,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// A pattern stamped onto the grid with its top-left corner at `(x, y)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub x: GridOffset,
    pub y: GridOffset,

    /// Used in logs and errors
    pub name: String,

    pub pattern: Pattern,
}

impl Placement {
    pub fn named(x: GridOffset, y: GridOffset, name: PatternName) -> Result<Self, PatternError> {
        Ok(Self {
            x,
            y,
            name: name.to_string(),
            pattern: name.pattern()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seeding {
    /// Every cell is alive with probability `alive_chance / 10`
    Random { alive_chance: u8 },

    /// Start all dead, then stamp each placement in order
    Custom(Vec<Placement>),
}

/// Bounds for changing the tick interval while running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimits {
    /// Shortest interval, i.e. fastest
    pub min: Duration,

    /// Longest interval, i.e. slowest
    pub max: Duration,

    pub step: Duration,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(20),
            max: Duration::from_millis(80),
            step: Duration::from_millis(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Width of the grid in cells
    pub width: usize,

    /// Height of the grid in cells
    pub height: usize,

    /// Side length of a cell on the drawing surface, in pixels
    pub cell_size: usize,

    /// Time between two generations
    pub interval: Duration,

    pub speed: SpeedLimits,

    pub seeding: Seeding,

    pub rules: RuleSet,

    /// Seed for random seeding. Drawn from entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let seeding = match Placement::named(55, 55, PatternName::RPentomino) {
            Ok(placement) => Seeding::Custom(vec![placement]),
            Err(_) => Seeding::Random { alive_chance: 2 },
        };

        Self {
            width: 100,
            height: 100,
            cell_size: 1,
            interval: Duration::from_millis(25),
            speed: SpeedLimits::default(),
            seeding,
            rules: RuleSet::default(),
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.width, self.height)?;

        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }

        if self.cell_size > MAX_CELL_SIZE {
            return Err(ConfigError::CellSizeTooLarge {
                got: self.cell_size,
            });
        }

        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let SpeedLimits { min, max, step } = self.speed;
        let interval = self.interval;

        if min.is_zero() || min > max || step.is_zero() || interval < min || interval > max {
            return Err(ConfigError::SpeedLimits {
                min,
                max,
                step,
                interval,
            });
        }

        match &self.seeding {
            Seeding::Random { alive_chance } => validate_alive_chance(*alive_chance)?,
            Seeding::Custom(placements) => {
                for placement in placements {
                    validate_fit(self.width, self.height, &placement.name, &placement.pattern)?;
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_dimensions(width: usize, height: usize) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions { width, height });
    }

    if width < 3 || height < 3 {
        return Err(ConfigError::DegenerateGrid { width, height });
    }

    Ok(())
}

pub(crate) fn validate_alive_chance(alive_chance: u8) -> Result<(), ConfigError> {
    if !ALIVE_CHANCE_RANGE.contains(&alive_chance) {
        return Err(ConfigError::AliveChance { got: alive_chance });
    }

    Ok(())
}

/// A pattern larger than the grid would wrap onto itself
pub(crate) fn validate_fit(
    width: usize,
    height: usize,
    name: &str,
    pattern: &Pattern,
) -> Result<(), ConfigError> {
    if pattern.width() > width || pattern.height() > height {
        return Err(ConfigError::PatternTooLarge {
            name: name.to_string(),
            pattern_width: pattern.width(),
            pattern_height: pattern.height(),
            width,
            height,
        });
    }

    Ok(())
}
