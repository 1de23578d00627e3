mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{ConvertRateArgs, ResolveArgs, ScheduleArgs};

/// Constant-annuity loan calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Constant-annuity loan calculations with decimal precision",
    long_about = "Resolves the missing loan parameter (principal, term or payment) \
                  from the other three and generates month-by-month amortization \
                  schedules with a flat-rate insurance overlay."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the unknown loan parameter from the other three
    Resolve(ResolveArgs),
    /// Generate the full amortization schedule
    Schedule(ScheduleArgs),
    /// Convert an annual percentage rate to the actuarial monthly rate
    ConvertRate(ConvertRateArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Resolve(args) => commands::loan::run_resolve(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::ConvertRate(args) => commands::loan::run_convert_rate(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

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
