mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::catalog::CatalogArgs;
use commands::compute::RequestArgs;
use commands::EngineArgs;

/// Project ROI estimation
#[derive(Parser)]
#[command(
    name = "roi",
    version,
    about = "Project ROI estimation with Monte Carlo variance and risk scoring",
    long_about = "Estimates cost, cash flows, NPV, IRR, payback and composite risk for a \
                  proposed project from its company size, project type and target industry. \
                  Requests can be given as flags, a JSON/YAML file, or piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(flatten)]
    engine: EngineArgs,

    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full ROI calculation
    Compute(RequestArgs),
    /// Check a request and show the resolved parameters
    Validate(RequestArgs),
    /// List company, industry and project profiles
    Catalog(CatalogArgs),
    /// Show only the Monte Carlo distribution
    Simulate(RequestArgs),
    /// Show how ROI responds to each driver
    Sensitivity(RequestArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Version = cli.command {
        println!("roi {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = commands::build_engine(&cli.engine).and_then(|engine| match cli.command {
        Commands::Compute(args) => commands::compute::run_compute(&engine, args),
        Commands::Validate(args) => commands::compute::run_validate(&engine, args),
        Commands::Catalog(args) => commands::catalog::run_catalog(&engine, args),
        Commands::Simulate(args) => commands::compute::run_simulate(&engine, args),
        Commands::Sensitivity(args) => commands::compute::run_sensitivity(&engine, args),
        Commands::Version => Ok(serde_json::Value::Null),
    });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
