use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use drawdown_core::{Scenario, simulate, sweep};

mod io;
mod logging;
mod output;

use logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "drawdown")]
#[command(about = "Year-by-year retirement withdrawal and tax simulator")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Scenario file (YAML)
    #[arg(short, long, global = true, default_value = "scenarios/default.yaml")]
    scenario: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Replay historical market data starting from this year
    #[arg(long, global = true)]
    historic_year: Option<i32>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Simulate the scenario once and print the yearly report (default)
    Run,
    /// Replay the scenario against every historic start year in a range
    Sweep {
        /// First historic year; inflation data starts in 1948
        #[arg(long, default_value_t = 1948)]
        from: i32,
        #[arg(long, default_value_t = 1990)]
        to: i32,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut config = io::load_scenario(&args.scenario)?;
    if let Some(year) = args.historic_year {
        config = config.with_historic_year(year);
    }

    let rendered = match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let scenario = Scenario::from_config(&config)
                .wrap_err_with(|| format!("invalid scenario {}", args.scenario.display()))?;
            let result = simulate(scenario)?;
            tracing::info!(
                years = result.years.len(),
                net_worth = result.final_net_worth(),
                "Simulation finished"
            );
            output::render_run(&result, args.format)?
        }
        Command::Sweep { from, to } => {
            let years: Vec<i32> = (from..=to).collect();
            let summary = sweep(&config, &years);
            tracing::info!(
                runs = summary.runs.len(),
                success_rate = summary.success_rate(),
                "Sweep finished"
            );
            output::render_sweep(&summary, args.format)?
        }
    };

    match &args.output {
        Some(path) => {
            io::atomic_write(path, &rendered)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
