use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsp_ga::{CrossoverStrategy, DistanceMatrix, GaConfig, GaResult, GaRunner, Reporter, Tour};

/// Exit status for malformed command-line arguments.
const EXIT_ARGUMENT: i32 = -1;
/// Exit status for every other failure.
const EXIT_FAILURE: i32 = -3;

/// Adaptive genetic algorithm for the symmetric TSP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Distance matrix file (size line, then lower-triangular or full rows).
    #[arg(short = 'd', long = "data")]
    data: PathBuf,

    /// Population size.
    #[arg(short = 'p', long = "population")]
    population: usize,

    /// Crossover probability.
    #[arg(short = 'c', long = "crossover", default_value_t = 0.95)]
    crossover: f64,

    /// Mutation probability.
    #[arg(short = 'm', long = "mutation", default_value_t = 0.005)]
    mutation: f64,

    /// Generation budget.
    #[arg(short = 'g', long = "generations")]
    generations: usize,

    /// Tournament size; defaults to 5% of the population (at least 2).
    #[arg(short = 'k', long = "tournament")]
    tournament: Option<usize>,

    /// Initial crossover strategy: pmx, ox or cx.
    #[arg(short = 's', long = "strategy", default_value = "pmx")]
    strategy: String,

    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Generations between progress lines.
    #[arg(long = "report-interval", default_value_t = 500)]
    report_interval: usize,

    /// Run every phase on the calling thread.
    #[arg(long)]
    sequential: bool,
}

/// Writes the best tour as `node-node-...-node cost`, one per line.
struct LineReporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter for LineReporter<W> {
    fn progress(&mut self, generation: usize, best: &Tour) {
        tracing::debug!(generation, "progress");
        let _ = writeln!(self.out, "{best}");
    }

    fn finished(&mut self, result: &GaResult) {
        let _ = writeln!(self.out, "{}", result.best);
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => exit_code(EXIT_ARGUMENT),
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            let argument = err
                .downcast_ref::<tsp_ga::TspError>()
                .is_some_and(tsp_ga::TspError::is_argument_error);
            exit_code(if argument { EXIT_ARGUMENT } else { EXIT_FAILURE })
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let strategy: CrossoverStrategy = cli.strategy.parse()?;

    let mut config = GaConfig::new(cli.population, cli.generations)
        .with_crossover_rate(cli.crossover)
        .with_mutation_rate(cli.mutation)
        .with_strategy(strategy)
        .with_parallel(!cli.sequential)
        .with_report_interval(cli.report_interval)
        .with_keep_history(false);
    if let Some(k) = cli.tournament {
        config = config.with_tournament_size(k);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    config.validate().map_err(tsp_ga::TspError::from)?;

    let matrix = DistanceMatrix::from_path(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;
    tracing::info!(nodes = matrix.len(), path = %cli.data.display(), "loaded distance matrix");

    let mut reporter = LineReporter {
        out: std::io::stdout(),
    };
    let result = GaRunner::run_with(&matrix, &config, &mut reporter, None)?;
    tracing::info!(
        generations = result.generations,
        fitness = result.best_fitness,
        reason = %result.stop_reason,
        switches = result.strategy_switches,
        bombs = result.mutation_bombs,
        "done"
    );
    Ok(())
}

/// Exit statuses are reported modulo 256, so -1 becomes 255.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}
