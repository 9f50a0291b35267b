mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use madlab_core::ValidationIssues;

use commands::sensitivity::SensitivityArgs;
use commands::valuation::{DcfArgs, EpvArgs};

/// Deterministic DCF and EPV valuation
#[derive(Parser)]
#[command(
    name = "madlab",
    version,
    about = "Deterministic DCF and EPV valuation",
    long_about = "Run the MAD LAB valuation core from the command line. Inputs come from \
                  flags, a JSON/YAML file (--input) or piped JSON on stdin. Invalid inputs \
                  are reported field by field."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Round displayed numbers to this many decimal places
    #[arg(long, global = true)]
    precision: Option<u32>,

    /// Debug logging (overrides MADLAB_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Single-stage discounted cash flow valuation
    Dcf(DcfArgs),
    /// Earnings power value
    Epv(EpvArgs),
    /// Two-way DCF sensitivity grid of per-share value
    Sensitivity(SensitivityArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MADLAB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dcf(args) => commands::valuation::run_dcf(args),
        Commands::Epv(args) => commands::valuation::run_epv(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("madlab {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(mut value) => {
            if let Some(dp) = cli.precision {
                output::round_numbers(&mut value, dp);
            }
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            match e.downcast_ref::<ValidationIssues>() {
                Some(report) => {
                    eprintln!("{}: invalid input", "error".red().bold());
                    for issue in &report.issues {
                        eprintln!("  - {}", issue);
                    }
                }
                None => eprintln!("{}: {}", "error".red().bold(), e),
            }
            process::exit(1);
        }
    }
}
