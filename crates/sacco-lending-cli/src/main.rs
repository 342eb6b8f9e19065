mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::debug;
use std::process;

use commands::amortization::{AffordabilityArgs, AmortizeArgs};
use commands::applicant::AssembleArgs;
use commands::evaluation::EvaluateArgs;
use commands::policy::PolicyArgs;

/// Loan schedules and credit decisions for savings and credit co-operatives
#[derive(Parser)]
#[command(
    name = "sacco",
    version,
    about = "Loan schedules and credit decisions for savings and credit co-operatives",
    long_about = "A CLI for SACCO lending with decimal precision. Builds reducing-balance \
                  repayment schedules, sizes affordable loans, and scores loan applications \
                  against a configurable lending policy."
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
    /// Build a level-payment repayment schedule
    Amortize(AmortizeArgs),
    /// Score a loan application and recommend an amount and rate
    Evaluate(EvaluateArgs),
    /// Largest principal the member's income can carry
    Affordability(AffordabilityArgs),
    /// Build evaluation criteria from member savings and loan records
    Assemble(AssembleArgs),
    /// Validate and print the effective lending policy
    Policy(PolicyArgs),
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
    env_logger::init();
    let cli = Cli::parse();
    debug!("output format: {:?}", cli.output);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::Evaluate(args) => commands::evaluation::run_evaluate(args),
        Commands::Affordability(args) => commands::amortization::run_affordability(args),
        Commands::Assemble(args) => commands::applicant::run_assemble(args),
        Commands::Policy(args) => commands::policy::run_policy(args),
        Commands::Version => {
            println!("sacco {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    let rendered = result.and_then(|value| output::format_output(&cli.output, &value));

    match rendered {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
