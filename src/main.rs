//! Ecosim - batch runner
//!
//! Loads a scenario, runs it for the requested simulated time and writes
//! the world before and after the run as JSON.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecosim::control::Controller;
use ecosim::core::config::SimulationConfig;
use ecosim::core::error::Result;
use ecosim::factory::Factories;
use ecosim::simulation::census::CensusRecorder;
use ecosim::simulation::events::Shared;
use ecosim::simulation::simulator::Simulator;
use ecosim::world::scenario::Scenario;

/// Predator/prey ecosystem simulation
#[derive(Parser, Debug)]
#[command(name = "ecosim")]
#[command(about = "Run a sheep/wolf ecosystem scenario and print the world before and after")]
struct Args {
    /// Scenario file (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the result; stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 10.0)]
    time: f64,

    /// Seconds per simulation step
    #[arg(long, default_value_t = 0.03)]
    dt: f64,

    /// Tuning overrides (TOML)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Random seed; overrides the tuning file
    #[arg(long)]
    seed: Option<u64>,

    /// Print a species/region census after the run
    #[arg(long)]
    census: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "ecosim=debug" } else { "ecosim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.tuning {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let scenario = Scenario::from_file(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        width = scenario.world.width,
        height = scenario.world.height,
        animals = scenario.population(),
        seed = config.seed,
        "loading scenario"
    );

    let sim = Simulator::new(scenario.world, config, Factories::standard())?;
    let mut controller = Controller::new(sim);

    let recorder = Rc::new(RefCell::new(CensusRecorder::new()));
    if args.census {
        controller.add_observer(Shared(Rc::clone(&recorder)));
    }

    controller.load_scenario(&scenario)?;

    let start = std::time::Instant::now();
    let output = controller.run(args.time, args.dt)?;
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        summary = %output.summary(),
        "run complete"
    );

    let json = output.to_json();
    match &args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            tracing::info!(output = %path.display(), "result written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }

    if args.census {
        if let Some(census) = recorder.borrow().latest() {
            eprint!("{census}");
        }
        eprintln!("Peak population: {}", recorder.borrow().peak());
    }

    Ok(())
}
