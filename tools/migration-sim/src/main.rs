use std::process::exit;
use std::time::Instant;

use clap::Parser;
use log::error;

use dslab_migration::core::config::SimulationConfig;
use dslab_migration::core::error::SimulationError;
use dslab_migration::core::strategy::StrategyKind;
use dslab_migration::experiment::Experiment;
use dslab_migration::simulation;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// VM migration simulator
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to YAML simulation config (overrides the built-in fleet)
    #[clap(short, long)]
    config: Option<String>,

    /// Migration algorithm: random, load_aware, load_aware_woi, migration_likelihood, migration_likelihood_woi,
    /// sandpiper
    #[clap(short, long)]
    strategy: Option<String>,

    /// Load normalization period: 0 if inactive, 10 for every ten steps
    #[clap(short, long)]
    normalization_period: Option<u64>,

    /// Destination folder for results and logs
    #[clap(short, long)]
    outdir: Option<String>,

    /// Simulation steps
    #[clap(long)]
    steps: Option<u64>,

    /// Seed of the random number generator
    #[clap(long)]
    seed: Option<u64>,

    /// Use the large fleet (250 machines, 1000 VMs) instead of the small one
    #[clap(long)]
    large: bool,

    /// Run all strategies in parallel, each in its own subfolder of outdir
    #[clap(long)]
    compare: bool,

    /// Number of threads used with --compare
    #[clap(short, long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
    threads: usize,
}

fn build_config(args: &Args) -> Result<SimulationConfig, SimulationError> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None if args.large => SimulationConfig::large(),
        None => SimulationConfig::small(),
    };
    if let Some(strategy) = &args.strategy {
        config.strategy = strategy.clone();
    }
    if let Some(period) = args.normalization_period {
        config.normalization_period = period;
    }
    if let Some(outdir) = &args.outdir {
        config.outdir = outdir.clone();
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    // reject unknown names before touching the output folder
    config.strategy.parse::<StrategyKind>()?;
    Ok(config)
}

fn main() {
    init_logger();
    let args = Args::parse();
    let simulation_start = Instant::now();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    if args.compare {
        let experiment = Experiment::compare_strategies(&config, &config.outdir);
        match experiment.run(args.threads) {
            Ok(results) => {
                for summary in results.into_iter().flatten() {
                    println!("{:<26} {:>6} migrations", summary.strategy.name(), summary.total_migrations);
                }
            }
            Err(e) => {
                error!("{}", e);
                exit(1);
            }
        }
    } else {
        match simulation::run(&config) {
            Ok(summary) => println!(
                "{}: {} migrations in {} steps, logs in {}",
                summary.strategy, summary.total_migrations, summary.steps, config.outdir
            ),
            Err(e) => {
                error!("{}", e);
                exit(1);
            }
        }
    }

    println!("Simulation process time {:.2?}", simulation_start.elapsed());
}
