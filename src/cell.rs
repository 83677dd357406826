#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CellState {
    Alive,

    #[default]
    Dead,
}

impl CellState {
    pub const fn is_alive(self) -> bool {
        matches!(self, CellState::Alive)
    }

    /// `1` is alive, `0` is dead. Anything else is not a state.
    pub const fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(CellState::Dead),
            1 => Some(CellState::Alive),
            _ => None,
        }
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

/// A single square of the grid.
///
/// `state` is what every other cell sees while a generation is being computed. `next` is only
/// written during the staging pass and only read during the commit pass, so no cell can observe a
/// neighbor's future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,

    pub state: CellState,

    /// Staged state, pending commit
    pub next: CellState,
}

impl Cell {
    pub const fn dead(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            state: CellState::Dead,
            next: CellState::Dead,
        }
    }

    pub const fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Overwrite both the current and the staged state
    pub fn force(&mut self, state: CellState) {
        self.state = state;
        self.next = state;
    }

    /// Make the staged state current. Returns whether the cell changed.
    pub fn commit(&mut self) -> bool {
        let changed = self.state != self.next;
        self.state = self.next;

        changed
    }
}
