use rand::Rng;
use tracing::debug;
use tracing::trace;

use crate::CellIndex;
use crate::GridOffset;
use crate::cell::Cell;
use crate::cell::CellState;
use crate::config;
use crate::config::ALIVE_CHANCE_RANGE;
use crate::config::ConfigError;
use crate::config::Seeding;
use crate::pattern::Pattern;
use crate::rule_set::RuleSet;

/// Offsets of the 8 neighbors, in reading order:
///
///   0 1 2
///   3 . 4
///   5 6 7
///
const NEIGHBORHOOD: [(GridOffset, GridOffset); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// What a single generation did to the grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// A fixed-size toroidal grid of cells.
///
/// Cells live in a single row-major arena, `(0, 0)` being the top-left corner. Every cell's
/// neighborhood is resolved once, at construction, into 8 indices into that arena, so stepping
/// never does any coordinate arithmetic.
#[derive(Clone)]
pub struct Grid {
    width: usize,
    height: usize,

    cells: Vec<Cell>,

    /// `neighbors[i]` holds the indices of the 8 cells surrounding `cells[i]`
    neighbors: Vec<[CellIndex; 8]>,

    rules: RuleSet,
}

impl Grid {
    /// Create an all-dead Game of Life grid
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::with_rules(width, height, RuleSet::default())
    }

    /// Create an all-dead grid evolving under `rules`
    pub fn with_rules(width: usize, height: usize, rules: RuleSet) -> Result<Self, ConfigError> {
        config::validate_dimensions(width, height)?;

        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::dead(x, y)))
            .collect();

        let mut grid = Self {
            width,
            height,
            cells,
            neighbors: Vec::new(),
            rules,
        };

        let neighbors = (0..grid.len())
            .map(|i| grid.compute_neighbors(i))
            .collect();
        grid.neighbors = neighbors;

        debug!(width, height, %rules, "Created grid");

        Ok(grid)
    }

    /// Build a grid and seed it
    pub fn initialize<R: Rng>(
        width: usize,
        height: usize,
        seeding: &Seeding,
        rules: RuleSet,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let mut grid = Self::with_rules(width, height, rules)?;
        grid.seed(seeding, rng)?;

        Ok(grid)
    }

    /// Kill every cell, then apply `seeding`
    pub fn seed<R: Rng>(
        &mut self,
        seeding: &Seeding,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        self.clear();

        match seeding {
            Seeding::Random { alive_chance } => {
                config::validate_alive_chance(*alive_chance)?;

                for cell in &mut self.cells {
                    let roll = rng.random_range(ALIVE_CHANCE_RANGE);
                    cell.force(CellState::from(roll <= *alive_chance));
                }

                debug!(alive_chance, population = self.population(), "Seeded at random");
            }
            Seeding::Custom(placements) => {
                for placement in placements {
                    config::validate_fit(
                        self.width,
                        self.height,
                        &placement.name,
                        &placement.pattern,
                    )?;

                    self.apply_pattern(placement.x, placement.y, &placement.pattern)?;

                    debug!(
                        name = %placement.name,
                        x = placement.x,
                        y = placement.y,
                        "Applied pattern"
                    );
                }
            }
        }

        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Wrap any coordinate onto the torus
    pub fn normalize(&self, x: GridOffset, y: GridOffset) -> (usize, usize) {
        let x = x.rem_euclid(self.width as GridOffset) as usize;
        let y = y.rem_euclid(self.height as GridOffset) as usize;

        (x, y)
    }

    /// Arena index of the cell at `(x, y)`, after wrapping
    pub fn index(&self, x: GridOffset, y: GridOffset) -> CellIndex {
        let (x, y) = self.normalize(x, y);

        y * self.width + x
    }

    /// The 8 cells surrounding `(x, y)`
    pub fn neighbors_of(&self, x: GridOffset, y: GridOffset) -> &[CellIndex; 8] {
        &self.neighbors[self.index(x, y)]
    }

    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[index]
    }

    pub fn get(&self, x: GridOffset, y: GridOffset) -> CellState {
        self.cells[self.index(x, y)].state
    }

    pub fn is_alive(&self, x: GridOffset, y: GridOffset) -> bool {
        self.get(x, y).is_alive()
    }

    /// Overwrite the cell at `(x, y)`, after wrapping
    pub fn set(&mut self, x: GridOffset, y: GridOffset, state: CellState) {
        let i = self.index(x, y);
        self.cells[i].force(state);
    }

    /// Kill every cell
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.force(CellState::Dead);
        }
    }

    /// Stamp `pattern` with its top-left corner at `(x, y)`. Dead cells of the pattern overwrite
    /// the grid too. Anything past an edge wraps around to the other side.
    pub fn apply_pattern(
        &mut self,
        x: GridOffset,
        y: GridOffset,
        pattern: &Pattern,
    ) -> Result<(), ConfigError> {
        config::validate_fit(self.width, self.height, "pattern", pattern)?;

        // Offsets are added to the wrapped origin, so any origin is fine
        let (x, y) = self.normalize(x, y);

        for (dx, dy, state) in pattern.iter() {
            self.set((x + dx) as GridOffset, (y + dy) as GridOffset, state);
        }

        Ok(())
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Coordinates of every live cell, row by row
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.is_alive())
            .map(|cell| (cell.x, cell.y))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// How many of the cell's neighbors are currently alive
    pub fn alive_neighbors(&self, index: CellIndex) -> u8 {
        self.neighbors[index]
            .iter()
            .filter(|&&n| self.cells[n].is_alive())
            .count() as u8
    }

    /// First phase of a generation: compute every cell's next state from the current states.
    ///
    /// Only `next` is written here, so the order in which cells are visited does not matter.
    pub fn stage(&mut self) {
        for i in 0..self.cells.len() {
            let alive = self.alive_neighbors(i);
            let cell = &mut self.cells[i];

            cell.next = self.rules.next_state(cell.state, alive);
        }
    }

    /// Second phase of a generation: make every staged state current
    pub fn commit(&mut self) -> Generation {
        let mut generation = Generation::default();

        for cell in &mut self.cells {
            if cell.commit() {
                if cell.is_alive() {
                    generation.births += 1;
                } else {
                    generation.deaths += 1;
                }
            }

            if cell.is_alive() {
                generation.population += 1;
            }
        }

        generation
    }

    /// Advance the grid by one generation
    pub fn step(&mut self) -> Generation {
        self.stage();
        let generation = self.commit();

        trace!(?generation, "Stepped");

        generation
    }

    fn compute_neighbors(&self, index: CellIndex) -> [CellIndex; 8] {
        let (x, y) = (
            (index % self.width) as GridOffset,
            (index / self.width) as GridOffset,
        );

        NEIGHBORHOOD.map(|(dx, dy)| self.index(x + dx, y + dy))
    }
}

impl std::fmt::Debug for Grid {
    /// Prints the grid in the plaintext format, `O` for alive and `.` for dead
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row
                .iter()
                .map(|c| if c.is_alive() { 'O' } else { '.' })
                .collect();

            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
