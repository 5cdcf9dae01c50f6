use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use evodrive::simulation::brain::NeuralNetwork;
use evodrive::simulation::params::Params;
use evodrive::simulation::population::Population;

/// Headless driver: runs generations and keeps the best network.
#[derive(Debug, Parser)]
#[command(name = "evodrive", version, about)]
struct Args {
    /// JSON parameter file; defaults are used for missing fields.
    #[arg(long)]
    config: Option<String>,
    /// Overrides the number of cars per generation.
    #[arg(long)]
    population: Option<usize>,
    /// Overrides the mutation rate.
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Number of generations to run.
    #[arg(long, default_value_t = 10)]
    generations: u32,
    /// Let learning cars collide with each other. Every generation starts
    /// from one shared pose, so all cars but the first crash on tick one.
    /// Without this flag they only collide with borders and traffic.
    #[arg(long)]
    collide: bool,
    /// Tick limit per generation.
    #[arg(long, default_value_t = 2000)]
    ticks: u64,
    /// Seed network to start from.
    #[arg(long)]
    seed_in: Option<String>,
    /// Where to write the final seed network.
    #[arg(long)]
    seed_out: Option<String>,
    /// Where to write a snapshot of the last tick.
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => {
            Params::load_from_file(path).with_context(|| format!("loading config {path}"))?
        }
        None => Params::default(),
    };
    if let Some(size) = args.population {
        params.population_size = size;
    }
    if let Some(rate) = args.mutation_rate {
        params.mutation_rate = rate;
    }
    params.population_collisions = args.collide;

    let mut population = Population::new(params).context("building population")?;

    if let Some(path) = &args.seed_in {
        let network =
            NeuralNetwork::load_from_file(path).with_context(|| format!("loading seed {path}"))?;
        match population.restore_seed(network) {
            Ok(()) => population.next_generation()?,
            Err(err) => warn!(error = %err, "starting from random networks"),
        }
    }

    for generation in 0..args.generations {
        if generation > 0 {
            population.next_generation()?;
        }

        while population.tick() < args.ticks && !population.all_damaged() {
            population.step()?;
        }

        let best_y = population.best().map(|car| car.position().y);
        info!(
            generation = population.generation(),
            ticks = population.tick(),
            alive = population.alive_count(),
            best_y,
            "generation finished"
        );
        population.commit_best();
    }

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&population.snapshot())?;
        std::fs::write(path, json).with_context(|| format!("writing snapshot {path}"))?;
    }

    if let (Some(path), Some(seed)) = (&args.seed_out, population.seed()) {
        seed.save_to_file(path)
            .with_context(|| format!("writing seed {path}"))?;
        info!(path = %path, "saved seed network");
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
