use std::collections::HashSet;
use std::time::Duration;
use std::time::Instant;

use proptest::prelude::*;

use lifegrid::GridOffset;
use lifegrid::cell::CellState;
use lifegrid::config::Config;
use lifegrid::config::Seeding;
use lifegrid::grid::Grid;
use lifegrid::render::Color;
use lifegrid::render::Surface;
use lifegrid::scheduler::Simulation;

struct Nothing;

impl Surface for Nothing {
    fn fill_rect(&mut self, _: usize, _: usize, _: usize, _: usize, _: Color) {}
}

/// A grid with the given cells alive, row-major
fn grid_from(width: usize, height: usize, alive: &[bool]) -> Grid {
    let mut grid = Grid::new(width, height).unwrap();

    for (i, &a) in alive.iter().enumerate() {
        let (x, y) = ((i % width) as GridOffset, (i / width) as GridOffset);
        grid.set(x, y, CellState::from(a));
    }

    grid
}

/// One generation computed from a frozen copy of the current states
fn reference_step(width: usize, height: usize, alive: &[bool]) -> Vec<bool> {
    let (w, h) = (width as GridOffset, height as GridOffset);

    (0..alive.len())
        .map(|i| {
            let (x, y) = ((i % width) as GridOffset, (i / width) as GridOffset);

            let mut n = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy) == (0, 0) {
                        continue;
                    }

                    let (nx, ny) = ((x + dx).rem_euclid(w), (y + dy).rem_euclid(h));
                    if alive[(ny * w + nx) as usize] {
                        n += 1;
                    }
                }
            }

            n == 3 || (alive[i] && n == 2)
        })
        .collect()
}

fn random_board() -> impl Strategy<Value = (usize, usize, Vec<bool>)> {
    (3usize..12, 3usize..12).prop_flat_map(|(w, h)| {
        (
            Just(w),
            Just(h),
            proptest::collection::vec(any::<bool>(), w * h),
        )
    })
}

proptest! {
    #[test]
    fn eight_distinct_symmetric_neighbors(w in 3usize..16, h in 3usize..16) {
        let grid = Grid::new(w, h).unwrap();

        for y in 0..h as GridOffset {
            for x in 0..w as GridOffset {
                let me = grid.index(x, y);
                let neighbors = grid.neighbors_of(x, y);

                let distinct: HashSet<_> = neighbors.iter().copied().collect();
                prop_assert_eq!(distinct.len(), 8);
                prop_assert!(!distinct.contains(&me));

                for &n in neighbors {
                    let cell = grid.cell(n);
                    let back = grid.neighbors_of(cell.x as GridOffset, cell.y as GridOffset);
                    prop_assert!(back.contains(&me));
                }
            }
        }
    }

    #[test]
    fn normalize_stays_on_the_grid(
        w in 1usize..50,
        h in 1usize..50,
        x in -1_000i64..1_000,
        y in -1_000i64..1_000,
    ) {
        let grid = Grid::new(w.max(3), h.max(3)).unwrap();
        let (nx, ny) = grid.normalize(x, y);

        prop_assert!(nx < grid.width());
        prop_assert!(ny < grid.height());
        prop_assert_eq!(grid.normalize(x + grid.width() as i64, y - grid.height() as i64), (nx, ny));
    }

    #[test]
    fn step_matches_frozen_snapshot((w, h, alive) in random_board()) {
        let mut grid = grid_from(w, h, &alive);
        let expected = reference_step(w, h, &alive);

        let generation = grid.step();
        let got: Vec<bool> = grid.cells().map(|c| c.is_alive()).collect();

        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(generation.population, expected.iter().filter(|&&a| a).count());
    }

    #[test]
    fn stage_leaves_states_untouched((w, h, alive) in random_board()) {
        let mut grid = grid_from(w, h, &alive);

        grid.stage();
        let states: Vec<bool> = grid.cells().map(|c| c.is_alive()).collect();

        prop_assert_eq!(states, alive);
    }

    #[test]
    fn toggling_twice_changes_nothing(
        seed in any::<u64>(),
        delay_ms in 0u64..25,
        periods in 0u32..8,
    ) {
        let config = Config {
            width: 12,
            height: 12,
            seeding: Seeding::Random { alive_chance: 3 },
            rng_seed: Some(seed),
            ..Config::default()
        };
        let interval = config.interval;

        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();

        let t0 = Instant::now();
        a.resume(t0);
        b.resume(t0);

        // Pause and resume again before the first tick is due
        let t1 = t0 + Duration::from_millis(delay_ms);
        b.toggle(t1);
        b.toggle(t1);

        for k in 1..=periods {
            let now = t1 + interval * k;
            prop_assert!(a.advance(now, &mut Nothing));
            prop_assert!(b.advance(now, &mut Nothing));
        }

        prop_assert_eq!(a.iteration(), u64::from(periods));
        prop_assert_eq!(b.iteration(), u64::from(periods));
        prop_assert_eq!(format!("{:?}", a.grid()), format!("{:?}", b.grid()));
    }
}
