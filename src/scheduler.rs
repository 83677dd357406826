use std::time::Duration;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;
use tracing::info;

use crate::config::Config;
use crate::config::ConfigError;
use crate::config::SpeedLimits;
use crate::grid::Generation;
use crate::grid::Grid;
use crate::render;
use crate::render::Surface;

/// A periodic timer driven by an outside clock.
///
/// Nothing happens on its own: the owner asks [`Timer::fire`] whether a period has ended by `now`.
/// A cancelled timer never fires. Periods missed while the owner was busy are dropped, not
/// replayed.
#[derive(Debug, Clone)]
pub struct Timer {
    interval: Duration,

    /// `None` while cancelled
    deadline: Option<Instant>,
}

impl Timer {
    /// A stopped timer
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Start firing every interval, the first time one interval after `now`. Starting a running
    /// timer does nothing.
    pub fn start(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        }
    }

    /// Stop firing. Cancelling a stopped timer does nothing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Change the period. A running timer restarts its period from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;

        if self.deadline.is_some() {
            self.deadline = Some(now + interval);
        }
    }

    /// Whether a period ended by `now`. Fires at most once per call.
    ///
    /// A timer that is on time keeps its phase. One that fell a whole period or more behind
    /// restarts its period from `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };

        if deadline > now {
            return false;
        }

        let next = deadline + self.interval;

        if next > now {
            self.deadline = Some(next);
        } else {
            debug!(late_by = ?now.duration_since(deadline), "Dropped late periods");
            self.deadline = Some(now + self.interval);
        }

        true
    }

    /// Time left before the next period ends, `None` when cancelled
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// A grid evolving on a timer.
///
/// Every tick runs to completion: the whole grid is stepped, then drawn, then the iteration
/// counter moves. Pausing cancels the timer, so no tick can start until the simulation resumes.
pub struct Simulation {
    config: Config,
    grid: Grid,
    timer: Timer,
    iteration: u64,
    rng: SmallRng,
}

impl Simulation {
    /// Build and seed the grid described by `config`. The timer starts stopped.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };

        let grid = Grid::initialize(
            config.width,
            config.height,
            &config.seeding,
            config.rules,
            &mut rng,
        )?;

        Ok(Self {
            timer: Timer::new(config.interval),
            config,
            grid,
            iteration: 0,
            rng,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of completed steps
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.timer.until_next(now)
    }

    pub fn resume(&mut self, now: Instant) {
        if !self.timer.is_running() {
            info!(iteration = self.iteration, "Resumed");
        }

        self.timer.start(now);
    }

    pub fn pause(&mut self) {
        if self.timer.is_running() {
            info!(iteration = self.iteration, "Paused");
        }

        self.timer.cancel();
    }

    /// Switch between running and paused. Returns whether the simulation is now running.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.timer.is_running() {
            self.pause();
        } else {
            self.resume(now);
        }

        self.timer.is_running()
    }

    /// Step, then draw, then count
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Generation {
        let generation = self.grid.step();
        render::draw_grid(&self.grid, surface, self.config.cell_size);
        self.iteration += 1;

        generation
    }

    /// Run a tick if the timer fired by `now`. Returns whether it did.
    pub fn advance<S: Surface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> bool {
        if !self.timer.fire(now) {
            return false;
        }

        self.tick(surface);

        true
    }

    /// Advance by exactly one generation, for stepping through a paused simulation
    pub fn step_once<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Generation {
        self.tick(surface)
    }

    /// Draw the current state without stepping
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        render::draw_grid(&self.grid, surface, self.config.cell_size);
    }

    /// Shorten the interval by one step, unless that would go under the minimum. Returns whether
    /// the interval changed.
    pub fn faster(&mut self, now: Instant) -> bool {
        let SpeedLimits { min, step, .. } = self.config.speed;

        match self.timer.interval().checked_sub(step) {
            Some(interval) if interval >= min => {
                self.set_interval(interval, now);
                true
            }
            _ => false,
        }
    }

    /// Lengthen the interval by one step, unless that would go over the maximum. Returns whether
    /// the interval changed.
    pub fn slower(&mut self, now: Instant) -> bool {
        let SpeedLimits { max, step, .. } = self.config.speed;

        let interval = self.timer.interval() + step;
        if interval > max {
            return false;
        }

        self.set_interval(interval, now);
        true
    }

    /// Seed the grid again from the configuration and start counting from zero
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.grid.seed(&self.config.seeding, &mut self.rng)?;
        self.iteration = 0;

        info!(population = self.grid.population(), "Reset");

        Ok(())
    }

    fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.timer.set_interval(interval, now);

        info!(interval_ms = interval.as_millis() as u64, "Changed speed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Placement;
    use crate::config::Seeding;
    use crate::pattern::PatternName;
    use crate::render::Color;

    struct Nothing;

    impl Surface for Nothing {
        fn fill_rect(&mut self, _: usize, _: usize, _: usize, _: usize, _: Color) {}
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn blinker_config() -> Config {
        Config {
            width: 8,
            height: 8,
            seeding: Seeding::Custom(vec![Placement::named(2, 3, PatternName::Blinker).unwrap()]),
            ..Config::default()
        }
    }

    #[test]
    fn timer_fires_per_period() {
        let t0 = Instant::now();
        let mut timer = Timer::new(ms(10));

        assert!(!timer.fire(t0 + ms(100)));

        timer.start(t0);
        assert!(!timer.fire(t0 + ms(9)));
        assert!(timer.fire(t0 + ms(10)));
        assert!(!timer.fire(t0 + ms(10)));

        // Slightly late keeps the phase
        assert!(timer.fire(t0 + ms(23)));
        assert_eq!(timer.until_next(t0 + ms(23)), Some(ms(7)));
    }

    #[test]
    fn stall_drops_missed_periods() {
        let t0 = Instant::now();
        let mut timer = Timer::new(ms(25));
        timer.start(t0);

        let late = t0 + Duration::from_secs(3_600);
        assert!(timer.fire(late));
        assert!(!timer.fire(late));
        assert_eq!(timer.until_next(late), Some(ms(25)));
        assert!(timer.fire(late + ms(25)));
    }

    #[test]
    fn zero_interval_fires_once_per_call() {
        let t0 = Instant::now();
        let mut timer = Timer::new(Duration::ZERO);
        timer.start(t0);

        assert!(timer.fire(t0 + ms(1)));
        assert!(timer.fire(t0 + ms(1)));
        assert_eq!(timer.until_next(t0 + ms(1)), Some(Duration::ZERO));
    }

    #[test]
    fn cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = Timer::new(ms(10));

        timer.cancel();
        timer.start(t0);
        timer.cancel();
        timer.cancel();

        assert!(!timer.is_running());
        assert!(!timer.fire(t0 + ms(1_000)));
        assert_eq!(timer.until_next(t0), None);
    }

    #[test]
    fn start_twice_keeps_phase() {
        let t0 = Instant::now();
        let mut timer = Timer::new(ms(10));

        timer.start(t0);
        timer.start(t0 + ms(7));

        assert!(timer.fire(t0 + ms(10)));
    }

    #[test]
    fn paused_simulation_does_not_tick() {
        let t0 = Instant::now();
        let mut sim = Simulation::new(blinker_config()).unwrap();

        assert!(!sim.is_running());
        assert!(!sim.advance(t0 + ms(1_000), &mut Nothing));
        assert_eq!(sim.iteration(), 0);

        assert!(sim.toggle(t0));
        assert!(sim.advance(t0 + ms(25), &mut Nothing));
        assert!(sim.advance(t0 + ms(50), &mut Nothing));
        assert_eq!(sim.iteration(), 2);

        assert!(!sim.toggle(t0 + ms(50)));
        assert!(!sim.advance(t0 + ms(500), &mut Nothing));
        assert_eq!(sim.iteration(), 2);
    }

    #[test]
    fn step_once_while_paused() {
        let mut sim = Simulation::new(blinker_config()).unwrap();

        sim.step_once(&mut Nothing);

        assert_eq!(sim.iteration(), 1);
        assert!(sim.grid().is_alive(3, 2));
        assert!(!sim.grid().is_alive(2, 3));
    }

    #[test]
    fn speed_stays_within_limits() {
        let t0 = Instant::now();
        let mut sim = Simulation::new(blinker_config()).unwrap();
        assert_eq!(sim.interval(), ms(25));

        assert!(sim.faster(t0));
        assert_eq!(sim.interval(), ms(20));
        assert!(!sim.faster(t0));
        assert_eq!(sim.interval(), ms(20));

        for _ in 0..12 {
            sim.slower(t0);
        }
        assert_eq!(sim.interval(), ms(80));
        assert!(!sim.slower(t0));
    }

    #[test]
    fn speed_change_keeps_pause() {
        let t0 = Instant::now();
        let mut sim = Simulation::new(blinker_config()).unwrap();

        sim.slower(t0);

        assert!(!sim.is_running());
        assert!(!sim.advance(t0 + ms(1_000), &mut Nothing));
    }

    #[test]
    fn one_tick_after_a_stall() {
        let t0 = Instant::now();
        let mut sim = Simulation::new(blinker_config()).unwrap();
        sim.resume(t0);

        let late = t0 + Duration::from_secs(3_600);
        assert!(sim.advance(late, &mut Nothing));
        assert!(!sim.advance(late, &mut Nothing));
        assert_eq!(sim.iteration(), 1);
    }

    #[test]
    fn reset_restores_seed() {
        let mut sim = Simulation::new(blinker_config()).unwrap();
        let before = format!("{:?}", sim.grid());

        sim.step_once(&mut Nothing);
        assert_ne!(format!("{:?}", sim.grid()), before);

        sim.reset().unwrap();
        assert_eq!(format!("{:?}", sim.grid()), before);
        assert_eq!(sim.iteration(), 0);
    }

    #[test]
    fn seeded_runs_repeat() {
        let config = Config {
            width: 20,
            height: 20,
            seeding: Seeding::Random { alive_chance: 3 },
            rng_seed: Some(7),
            ..Config::default()
        };

        let a = Simulation::new(config.clone()).unwrap();
        let b = Simulation::new(config).unwrap();

        assert_eq!(format!("{:?}", a.grid()), format!("{:?}", b.grid()));
    }
}
