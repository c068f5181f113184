mod commands;
mod input;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::calculators::{OptionValueArgs, RsuValueArgs};
use commands::export::{ClearArgs, ExportArgs};
use commands::grant::GrantCommand;
use commands::portfolio::{ExitArgs, SummaryArgs, WhatIfArgs};
use commands::settings::SettingsCommand;
use commands::vesting::VestingArgs;
use commands::Context;

/// Equity compensation vesting and valuation calculator
#[derive(Parser)]
#[command(
    name = "vestcalc",
    version,
    about = "Equity compensation vesting and valuation calculator",
    long_about = "Track stock option and RSU grants, see what has vested, and value \
                  the portfolio at the current share price or at hypothetical exit \
                  prices. Grants and settings are kept in a local JSON store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Directory holding the portfolio store
    #[arg(long, global = true, env = "VESTCALC_DATA_DIR", default_value = "vestcalc-data")]
    data_dir: PathBuf,

    /// Vesting reference date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Debounce window for store writes, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, edit, remove and list grants
    #[command(subcommand)]
    Grant(GrantCommand),
    /// Show or change the share price and tax rate
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Portfolio totals and per-grant breakdown at the current share price
    Summary(SummaryArgs),
    /// Vesting schedule for one grant
    Vesting(VestingArgs),
    /// Value vested units at a hypothetical exit price
    Exit(ExitArgs),
    /// Value the portfolio at several hypothetical prices
    WhatIf(WhatIfArgs),
    /// Quick stock-option exercise estimate (does not touch the store)
    OptionValue(OptionValueArgs),
    /// Quick RSU release estimate (does not touch the store)
    RsuValue(RsuValueArgs),
    /// Export grants with vested/unvested counts as CSV
    Export(ExportArgs),
    /// Delete every grant and reset settings
    Clear(ClearArgs),
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
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.data_dir, cli.as_of, cli.debounce_ms);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Grant(cmd) => commands::grant::run(&ctx, cmd),
        Commands::Settings(cmd) => commands::settings::run(&ctx, cmd),
        Commands::Summary(args) => commands::portfolio::run_summary(&ctx, args),
        Commands::Vesting(args) => commands::vesting::run_vesting(&ctx, args),
        Commands::Exit(args) => commands::portfolio::run_exit(&ctx, args),
        Commands::WhatIf(args) => commands::portfolio::run_what_if(&ctx, args),
        Commands::OptionValue(args) => commands::calculators::run_option_value(args),
        Commands::RsuValue(args) => commands::calculators::run_rsu_value(args),
        Commands::Export(args) => commands::export::run_export(&ctx, args),
        Commands::Clear(args) => commands::export::run_clear(&ctx, args),
        Commands::Version => {
            println!("vestcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(serde_json::Value::Null) => process::exit(0),
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
