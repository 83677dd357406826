use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifegrid::GridOffset;
use lifegrid::config::Config;
use lifegrid::config::Placement;
use lifegrid::config::Seeding;
use lifegrid::events::AppEvent;
use lifegrid::events::Event;
use lifegrid::events::SimEvent;
use lifegrid::io::convert_event;
use lifegrid::pattern::PatternName;
use lifegrid::render;
use lifegrid::render::BrailleCanvas;
use lifegrid::rle;
use lifegrid::rule_set::RuleSet;
use lifegrid::scheduler::Simulation;

/// How long to wait for input while paused
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "lifegrid",
    version,
    about = "Conway's Game of Life on a wrapping grid, drawn in the terminal"
)]
struct Cli {
    /// Width of the grid, in cells.
    #[arg(long, default_value_t = 100)]
    width: usize,

    /// Height of the grid, in cells.
    #[arg(long, default_value_t = 100)]
    height: usize,

    /// Size of a cell in braille dots.
    #[arg(long, default_value_t = 1)]
    cell_size: usize,

    /// Milliseconds between two generations.
    #[arg(long, default_value_t = 25)]
    interval: u64,

    /// Seed every cell at random, alive with a chance of N in 10.
    #[arg(long, value_name = "N", conflicts_with_all = ["place", "load"])]
    random: Option<u8>,

    /// Stamp a catalog pattern with its top-left corner at X,Y (e.g. glider@10,4).
    #[arg(long, value_name = "NAME@X,Y")]
    place: Vec<At<PatternName>>,

    /// Stamp a pattern read from an RLE file with its top-left corner at X,Y.
    #[arg(long, value_name = "FILE@X,Y")]
    load: Vec<At<PathBuf>>,

    /// Rule string such as B3/S23.
    #[arg(long)]
    rule: Option<RuleSet>,

    /// Seed for the random number generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many generations without a UI, print the final frame and exit.
    #[arg(long, value_name = "N")]
    generations: Option<u64>,
}

/// A command line value positioned on the grid, written `VALUE@X,Y`
#[derive(Debug, Clone)]
struct At<T> {
    value: T,
    x: GridOffset,
    y: GridOffset,
}

impl<T> FromStr for At<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, pos) = s
            .rsplit_once('@')
            .ok_or_else(|| format!("expected VALUE@X,Y, got \"{s}\""))?;
        let (x, y) = pos
            .split_once(',')
            .ok_or_else(|| format!("expected a position X,Y, got \"{pos}\""))?;

        Ok(Self {
            value: value.parse().map_err(|e: T::Err| e.to_string())?,
            x: x.trim().parse().map_err(|_| format!("invalid x \"{x}\""))?,
            y: y.trim().parse().map_err(|_| format!("invalid y \"{y}\""))?,
        })
    }
}

fn load_placement(at: &At<PathBuf>) -> Result<Placement> {
    let bytes = fs::read(&at.value).with_context(|| format!("Reading {}", at.value.display()))?;
    let file = rle::read_rle(&bytes).with_context(|| format!("Parsing {}", at.value.display()))?;

    let name = file
        .name_lossy()
        .unwrap_or_else(|| at.value.display().to_string());

    if let Some(rules) = file.rules {
        debug!(%name, %rules, "RLE file suggests a rule");
    }

    Ok(Placement {
        x: at.x,
        y: at.y,
        name,
        pattern: file.pattern,
    })
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config {
        width: cli.width,
        height: cli.height,
        cell_size: cli.cell_size,
        interval: Duration::from_millis(cli.interval),
        rng_seed: cli.seed,
        ..Config::default()
    };

    if let Some(rules) = cli.rule {
        config.rules = rules;
    }

    if let Some(alive_chance) = cli.random {
        config.seeding = Seeding::Random { alive_chance };
    } else if !cli.place.is_empty() || !cli.load.is_empty() {
        let mut placements = Vec::with_capacity(cli.place.len() + cli.load.len());

        for at in &cli.place {
            placements.push(Placement::named(at.x, at.y, at.value)?);
        }

        for at in &cli.load {
            placements.push(load_placement(at)?);
        }

        config.seeding = Seeding::Custom(placements);
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn run_headless(mut sim: Simulation, generations: u64) -> Result<()> {
    let mut canvas = BrailleCanvas::for_grid(sim.grid(), sim.config().cell_size);
    sim.draw(&mut canvas);

    for _ in 0..generations {
        sim.tick(&mut canvas);
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(canvas.render().as_bytes())?;
    writeln!(
        stdout,
        "{}",
        render::status_line(
            sim.iteration(),
            sim.grid().population(),
            sim.interval(),
            sim.is_running()
        )
    )?;

    Ok(())
}

/// Draw the last frame and the status line from the top-left corner
fn present<W: Write>(out: &mut W, canvas: &mut BrailleCanvas, sim: &Simulation) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0))?;

    for line in canvas.render().lines() {
        queue!(out, style::Print(line), cursor::MoveToNextLine(1))?;
    }

    let status = render::status_line(
        sim.iteration(),
        sim.grid().population(),
        sim.interval(),
        sim.is_running(),
    );
    queue!(
        out,
        style::Print(status),
        terminal::Clear(terminal::ClearType::UntilNewLine)
    )?;

    out.flush()
}

fn event_loop<W: Write>(sim: &mut Simulation, out: &mut W) -> Result<()> {
    let mut canvas = BrailleCanvas::for_grid(sim.grid(), sim.config().cell_size);
    sim.draw(&mut canvas);
    sim.resume(Instant::now());

    loop {
        present(out, &mut canvas, sim)?;

        // Block on input until the next generation is due
        let wait = sim.until_next(Instant::now()).unwrap_or(IDLE_POLL);

        if event::poll(wait)? {
            match convert_event(event::read()?) {
                None => {}
                Some(Event::AppEvent(AppEvent::Exit)) => break,
                Some(Event::AppEvent(AppEvent::Resize { .. })) => {
                    execute!(out, terminal::Clear(terminal::ClearType::All))?;
                }
                Some(Event::SimEvent(SimEvent::TogglePause)) => {
                    sim.toggle(Instant::now());
                }
                Some(Event::SimEvent(SimEvent::Step)) => {
                    sim.step_once(&mut canvas);
                }
                Some(Event::SimEvent(SimEvent::Faster)) => {
                    sim.faster(Instant::now());
                }
                Some(Event::SimEvent(SimEvent::Slower)) => {
                    sim.slower(Instant::now());
                }
                Some(Event::SimEvent(SimEvent::Reset)) => {
                    sim.reset()?;
                    sim.draw(&mut canvas);
                }
            }
        }

        sim.advance(Instant::now(), &mut canvas);
    }

    Ok(())
}

fn run_interactive(mut sim: Simulation) -> Result<()> {
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All),
        cursor::Hide
    )?;

    let res = event_loop(&mut sim, &mut stdout);

    // Give the terminal back even if the loop failed
    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    info!(iteration = sim.iteration(), "Exited");

    res
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let sim = Simulation::new(config).context("Failed to build the grid")?;

    match cli.generations {
        Some(generations) => run_headless(sim, generations),
        None => run_interactive(sim),
    }
}
