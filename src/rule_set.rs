use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::cell::CellState;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    ///
    /// Big endian is used here (i.e. `b = 0b1` means b1, and `b = 0b1_0000_0000` means b8).
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// The state a cell moves to given its current state and how many of its 8 neighbors are
    /// alive.
    pub fn next_state(&self, state: CellState, alive_neighbors: u8) -> CellState {
        debug_assert!(alive_neighbors <= 8, "a cell has 8 neighbors");

        let mask = 1u16 << alive_neighbors;

        let set = match state {
            CellState::Alive => self.survivals(),
            CellState::Dead => self.births(),
        };

        CellState::from(set & mask == mask)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |set: u16| -> String {
            (0..=8u8)
                .filter(|n| set & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Empty rule")]
    Empty,

    #[error("Unexpected character '{got}' in rule")]
    InvalidChar { got: char },

    #[error("A cell cannot have {got} neighbors")]
    NeighborCount { got: u32 },

    #[error("Expected a '/' between survivals and births")]
    MissingSeparator,
}

/// # Format
///
/// Either `B[0-8]*/S[0-8]*` (the slash and the letter case are optional), or the older
/// `[0-8]*/[0-8]*` notation which lists survivals first.
impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(RuleError::Empty);
        }

        if s.starts_with(|c: char| c.is_ascii_digit() || c == '/') {
            return parse_nameless_rule(s);
        }

        enum State {
            Birth,
            Survival,
        }

        let mut state = State::Birth;
        let (mut births, mut survivals) = (0, 0);

        for c in s.chars() {
            match c {
                'b' | 'B' => state = State::Birth,
                's' | 'S' => state = State::Survival,
                '/' => {}
                c => {
                    let n = neighbor_bit(c)?;

                    match state {
                        State::Birth => births |= n,
                        State::Survival => survivals |= n,
                    }
                }
            }
        }

        Ok(RuleSet::new(births, survivals))
    }
}

// Parse rules that look like 23/3
fn parse_nameless_rule(s: &str) -> Result<RuleSet, RuleError> {
    let Some((survivals, births)) = s.split_once('/') else {
        return Err(RuleError::MissingSeparator);
    };

    let to_bits = |digits: &str| -> Result<u16, RuleError> {
        digits.chars().try_fold(0, |acc, c| Ok(acc | neighbor_bit(c)?))
    };

    Ok(RuleSet::new(to_bits(births)?, to_bits(survivals)?))
}

/// Convert a human readable neighbor count to its bit in the packed representation
fn neighbor_bit(c: char) -> Result<u16, RuleError> {
    let n = c.to_digit(10).ok_or(RuleError::InvalidChar { got: c })?;

    if n > 8 {
        return Err(RuleError::NeighborCount { got: n });
    }

    Ok(1 << n)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cell::CellState::Alive;
    use crate::cell::CellState::Dead;

    #[test]
    fn conway_transitions() {
        let rules = B3S23;

        for n in 0..=8 {
            let survives = n == 2 || n == 3;
            assert_eq!(rules.next_state(Alive, n), CellState::from(survives), "alive, {n}");

            let born = n == 3;
            assert_eq!(rules.next_state(Dead, n), CellState::from(born), "dead, {n}");
        }
    }

    #[test]
    fn parse_forms() {
        assert_eq!("B3/S23".parse::<RuleSet>(), Ok(B3S23));
        assert_eq!("b3s23".parse::<RuleSet>(), Ok(B3S23));
        assert_eq!("23/3".parse::<RuleSet>(), Ok(B3S23));

        let highlife: RuleSet = "B36/S23".parse().unwrap();
        assert_eq!(highlife.births(), 0b100_1000);
        assert_eq!(highlife.survivals(), 0b1100);
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<RuleSet>(), Err(RuleError::Empty));
        assert_eq!("B9/S23".parse::<RuleSet>(), Err(RuleError::NeighborCount { got: 9 }));
        assert_eq!("B3/X23".parse::<RuleSet>(), Err(RuleError::InvalidChar { got: 'X' }));
        assert_eq!("233".parse::<RuleSet>(), Err(RuleError::MissingSeparator));
    }

    #[test]
    fn display() {
        assert_eq!(B3S23.to_string(), "B3/S23");
        assert_eq!(RuleSet::new(0, 0).to_string(), "B/S");
    }
}
