use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::cell::CellState;

/// Largest number of cells a single pattern may hold
pub const MAX_PATTERN_CELLS: usize = 1 << 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern has no cells")]
    Empty,

    #[error("Row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row {row}, column {col}: expected 0 or 1, found {got}")]
    InvalidState { row: usize, col: usize, got: u8 },

    #[error("A {width}x{height} pattern is over the limit of {} cells", MAX_PATTERN_CELLS)]
    TooLarge { width: usize, height: usize },

    #[error("Unknown pattern \"{name}\"")]
    UnknownName { name: String },
}

/// A rectangular block of cell states, stored row-major. Row `0` is the top of the pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct Pattern {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Pattern {
    /// Build a pattern from a 0/1 matrix. Every row must have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, PatternError> {
        let Some(first) = rows.first() else {
            return Err(PatternError::Empty);
        };

        let width = first.as_ref().len();
        if width == 0 {
            return Err(PatternError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());

        for (row, bits) in rows.iter().enumerate() {
            let bits = bits.as_ref();

            if bits.len() != width {
                return Err(PatternError::RaggedRow {
                    row,
                    expected: width,
                    got: bits.len(),
                });
            }

            for (col, &bit) in bits.iter().enumerate() {
                let state = CellState::from_bit(bit)
                    .ok_or(PatternError::InvalidState { row, col, got: bit })?;

                cells.push(state);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// An all-dead pattern of the given size
    pub fn empty(width: usize, height: usize) -> Result<Self, PatternError> {
        if width == 0 || height == 0 {
            return Err(PatternError::Empty);
        }

        let len = width
            .checked_mul(height)
            .filter(|&len| len <= MAX_PATTERN_CELLS)
            .ok_or(PatternError::TooLarge { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![CellState::Dead; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Panics if `(x, y)` is outside the pattern
    pub fn get(&self, x: usize, y: usize) -> CellState {
        assert!(x < self.width, "x is out of bounds");
        assert!(y < self.height, "y is out of bounds");

        self.cells[y * self.width + x]
    }

    /// Panics if `(x, y)` is outside the pattern
    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        assert!(x < self.width, "x is out of bounds");
        assert!(y < self.height, "y is out of bounds");

        self.cells[y * self.width + x] = state;
    }

    /// Every cell of the pattern as `(x, y, state)`, row by row
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &state)| (i % self.width, i / self.width, state))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|s| s.is_alive()).count()
    }
}

/// Prints the pattern in the plaintext format, `O` for alive and `.` for dead
impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row
                .iter()
                .map(|s| if s.is_alive() { 'O' } else { '.' })
                .collect();

            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// Built-in still lifes, oscillators and spaceships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternName {
    Block,
    Beehive,
    Loaf,
    Boat,
    Tub,
    Blinker,
    Toad,
    Beacon,
    Pulsar,
    Pentadecathlon,
    Glider,
    LightweightSpaceship,
    MediumweightSpaceship,
    HeavyweightSpaceship,
    RPentomino,
}

impl PatternName {
    pub const ALL: [PatternName; 15] = [
        PatternName::Block,
        PatternName::Beehive,
        PatternName::Loaf,
        PatternName::Boat,
        PatternName::Tub,
        PatternName::Blinker,
        PatternName::Toad,
        PatternName::Beacon,
        PatternName::Pulsar,
        PatternName::Pentadecathlon,
        PatternName::Glider,
        PatternName::LightweightSpaceship,
        PatternName::MediumweightSpaceship,
        PatternName::HeavyweightSpaceship,
        PatternName::RPentomino,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PatternName::Block => "block",
            PatternName::Beehive => "beehive",
            PatternName::Loaf => "loaf",
            PatternName::Boat => "boat",
            PatternName::Tub => "tub",
            PatternName::Blinker => "blinker",
            PatternName::Toad => "toad",
            PatternName::Beacon => "beacon",
            PatternName::Pulsar => "pulsar",
            PatternName::Pentadecathlon => "pentadecathlon",
            PatternName::Glider => "glider",
            PatternName::LightweightSpaceship => "lwss",
            PatternName::MediumweightSpaceship => "mwss",
            PatternName::HeavyweightSpaceship => "hwss",
            PatternName::RPentomino => "r-pentomino",
        }
    }

    /// The 0/1 matrix for this pattern, top row first
    pub const fn rows(self) -> &'static [&'static [u8]] {
        match self {
            PatternName::Block => catalog::BLOCK,
            PatternName::Beehive => catalog::BEEHIVE,
            PatternName::Loaf => catalog::LOAF,
            PatternName::Boat => catalog::BOAT,
            PatternName::Tub => catalog::TUB,
            PatternName::Blinker => catalog::BLINKER,
            PatternName::Toad => catalog::TOAD,
            PatternName::Beacon => catalog::BEACON,
            PatternName::Pulsar => catalog::PULSAR,
            PatternName::Pentadecathlon => catalog::PENTADECATHLON,
            PatternName::Glider => catalog::GLIDER,
            PatternName::LightweightSpaceship => catalog::LWSS,
            PatternName::MediumweightSpaceship => catalog::MWSS,
            PatternName::HeavyweightSpaceship => catalog::HWSS,
            PatternName::RPentomino => catalog::R_PENTOMINO,
        }
    }

    pub fn pattern(self) -> Result<Pattern, PatternError> {
        Pattern::from_rows(self.rows())
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternName {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");

        let alias = match name.as_str() {
            "bee-hive" => Some(PatternName::Beehive),
            "light-weight-spaceship" | "lightweight-spaceship" => {
                Some(PatternName::LightweightSpaceship)
            }
            "medium-weight-spaceship" | "mediumweight-spaceship" => {
                Some(PatternName::MediumweightSpaceship)
            }
            "heavy-weight-spaceship" | "heavyweight-spaceship" => {
                Some(PatternName::HeavyweightSpaceship)
            }
            "rpentomino" | "pentomino" => Some(PatternName::RPentomino),
            _ => None,
        };

        alias
            .or_else(|| PatternName::ALL.into_iter().find(|p| p.as_str() == name))
            .ok_or(PatternError::UnknownName {
                name: s.to_string(),
            })
    }
}

#[rustfmt::skip]
mod catalog {
    pub const BLOCK: &[&[u8]] = &[
        &[1, 1],
        &[1, 1],
    ];

    pub const BEEHIVE: &[&[u8]] = &[
        &[0, 1, 1, 0],
        &[1, 0, 0, 1],
        &[0, 1, 1, 0],
    ];

    pub const LOAF: &[&[u8]] = &[
        &[0, 1, 1, 0],
        &[1, 0, 0, 1],
        &[0, 1, 0, 1],
        &[0, 0, 1, 0],
    ];

    pub const BOAT: &[&[u8]] = &[
        &[1, 1, 0],
        &[1, 0, 1],
        &[0, 1, 0],
    ];

    pub const TUB: &[&[u8]] = &[
        &[0, 1, 0],
        &[1, 0, 1],
        &[0, 1, 0],
    ];

    pub const BLINKER: &[&[u8]] = &[
        &[1, 1, 1],
    ];

    pub const TOAD: &[&[u8]] = &[
        &[0, 1, 1, 1],
        &[1, 1, 1, 0],
    ];

    pub const BEACON: &[&[u8]] = &[
        &[1, 1, 0, 0],
        &[1, 1, 0, 0],
        &[0, 0, 1, 1],
        &[0, 0, 1, 1],
    ];

    pub const PULSAR: &[&[u8]] = &[
        &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
    ];

    pub const PENTADECATHLON: &[&[u8]] = &[
        &[0, 0, 1, 0, 0],
        &[0, 1, 1, 1, 0],
        &[1, 1, 1, 1, 1],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 0],
        &[0, 0, 1, 0, 0],
    ];

    pub const GLIDER: &[&[u8]] = &[
        &[0, 0, 1],
        &[1, 0, 1],
        &[0, 1, 1],
    ];

    pub const LWSS: &[&[u8]] = &[
        &[0, 1, 1, 1, 1],
        &[1, 0, 0, 0, 1],
        &[0, 0, 0, 0, 1],
        &[1, 0, 0, 1, 0],
    ];

    pub const MWSS: &[&[u8]] = &[
        &[0, 1, 1, 1, 1, 1],
        &[1, 0, 0, 0, 0, 1],
        &[0, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 1, 0],
        &[0, 0, 1, 0, 0, 0],
    ];

    pub const HWSS: &[&[u8]] = &[
        &[0, 1, 1, 1, 1, 1, 1],
        &[1, 0, 0, 0, 0, 0, 1],
        &[0, 0, 0, 0, 0, 0, 1],
        &[1, 0, 0, 0, 0, 1, 0],
        &[0, 0, 1, 1, 0, 0, 0],
    ];

    pub const R_PENTOMINO: &[&[u8]] = &[
        &[0, 1, 1],
        &[1, 1, 0],
        &[0, 1, 0],
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_loads() {
        for name in PatternName::ALL {
            let pattern = name.pattern().unwrap();
            assert!(pattern.population() > 0, "{name} has no live cells");
        }
    }

    #[test]
    fn names_round_trip() {
        for name in PatternName::ALL {
            assert_eq!(name.as_str().parse::<PatternName>(), Ok(name));
        }

        assert_eq!("R_Pentomino".parse::<PatternName>(), Ok(PatternName::RPentomino));
        assert_eq!("bee hive".parse::<PatternName>(), Ok(PatternName::Beehive));
        assert_eq!(
            "gosper".parse::<PatternName>(),
            Err(PatternError::UnknownName {
                name: "gosper".to_string()
            })
        );
    }

    #[test]
    fn ragged_rows_fail_fast() {
        let rows: &[&[u8]] = &[&[1, 1, 0], &[1, 1]];

        assert_eq!(
            Pattern::from_rows(rows),
            Err(PatternError::RaggedRow {
                row: 1,
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn rejects_non_binary_entries() {
        let rows: &[&[u8]] = &[&[1, 2]];

        assert_eq!(
            Pattern::from_rows(rows),
            Err(PatternError::InvalidState {
                row: 0,
                col: 1,
                got: 2
            })
        );
    }

    #[test]
    fn rejects_empty() {
        let rows: &[&[u8]] = &[];
        assert_eq!(Pattern::from_rows(rows), Err(PatternError::Empty));

        let rows: &[&[u8]] = &[&[]];
        assert_eq!(Pattern::from_rows(rows), Err(PatternError::Empty));
    }

    #[test]
    fn empty_pattern_size_is_bounded() {
        assert_eq!(Pattern::empty(4, 3).unwrap().population(), 0);
        assert_eq!(
            Pattern::empty(1 << 32, 1 << 32),
            Err(PatternError::TooLarge {
                width: 1 << 32,
                height: 1 << 32
            })
        );
        assert_eq!(
            Pattern::empty(MAX_PATTERN_CELLS, 2),
            Err(PatternError::TooLarge {
                width: MAX_PATTERN_CELLS,
                height: 2
            })
        );
    }

    #[test]
    fn glider_layout() {
        let glider = PatternName::Glider.pattern().unwrap();

        assert_eq!((glider.width(), glider.height()), (3, 3));
        assert_eq!(format!("{glider:?}"), "..O\nO.O\n.OO\n");
    }
}
