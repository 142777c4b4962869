use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use funnelforge_generate::{GenerateOptions, GenerationEngine, GenerationError};

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "funnelforge", version, about = "Funnelforge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the users, events, and subscriptions tables.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of users to fabricate.
    #[arg(long, default_value_t = 8000)]
    users: u64,
    /// Seed for the shared draw stream.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Base epoch date for signup instants (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    start_date: String,
    /// Output directory for runs.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> Result<(), CliError> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let base_date = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d").map_err(|err| {
        CliError::InvalidConfig(format!("start date '{}': {err}", args.start_date))
    })?;

    let options = GenerateOptions {
        out_dir: args.out_dir,
        population: args.users,
        base_date,
        seed: args.seed,
    };

    let result = GenerationEngine::new(options).run()?;

    println!("run directory: {}", result.run_dir.display());
    println!("users:         {}", result.report.users_generated);
    println!("events:        {}", result.report.events_generated);
    println!("subscriptions: {}", result.report.subscriptions_generated);

    Ok(())
}
