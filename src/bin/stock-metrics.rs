//! stock-metrics CLI - prices, CAGR and Sharpe ratios from a price database
//!
//! ## Example Usage
//!
//! ```bash
//! # Apple prices in euro
//! stock-metrics prices AAPL --currency EUR
//!
//! # Every tracked company grouped by symbol
//! stock-metrics prices --grouped
//!
//! # Five-year CAGR of Tesla, whole-history CAGR of everything
//! stock-metrics cagr TSLA --years 5
//! stock-metrics cagr
//!
//! # Sharpe ratios against the configured benchmark
//! stock-metrics sharpe AAPL MSFT
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use stock_metrics::config::Config;
use stock_metrics::data::SqliteRepository;
use stock_metrics::error::MetricsError;
use stock_metrics::service::{MetricsService, OutputMode};
use stock_metrics::types::parse_timestamp;

/// stock-metrics: historical prices and performance metrics
#[derive(Parser)]
#[command(name = "stock-metrics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Historical prices, CAGR and Sharpe ratios", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print price bars
    Prices {
        /// Ticker (all tracked companies when omitted)
        symbol: Option<String>,

        /// Currency to express prices in
        #[arg(short = 'x', long, default_value = "USD")]
        currency: String,

        /// Group bars per symbol with company names
        #[arg(short, long)]
        grouped: bool,
    },

    /// Compound annual growth rate
    Cagr {
        /// Ticker (all tracked companies when omitted)
        symbol: Option<String>,

        /// Number of years, or "all" for the whole history
        #[arg(short, long, default_value = "all")]
        years: String,

        /// Reference time for the end point (defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Annualized Sharpe ratio against the benchmark
    Sharpe {
        /// Tickers (all tracked companies when omitted)
        symbols: Vec<String>,
    },

    /// Show configuration and database contents
    Info,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    if cli.verbose {
        eprintln!(
            "{} v{}",
            "stock-metrics".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        eprintln!(
            "Database: {}",
            config.database.display().to_string().dimmed()
        );
    }

    let repo = SqliteRepository::open_read_only(&config.database)?;

    if let Commands::Info = cli.command {
        return show_info(&repo, &config);
    }

    let service = MetricsService::new(&repo, config);
    match cli.command {
        Commands::Prices {
            symbol,
            currency,
            grouped,
        } => {
            let mode = if grouped {
                OutputMode::Grouped
            } else {
                OutputMode::Flat
            };
            print_json(&service.get_prices(symbol.as_deref(), &currency, mode)?)
        }

        Commands::Cagr {
            symbol,
            years,
            as_of,
        } => {
            let as_of = match as_of {
                Some(s) => parse_timestamp(&s)?,
                None => Utc::now(),
            };
            let spinner = (symbol.is_none()).then(|| spinner("Computing CAGR..."));
            let response = service.get_cagr(symbol.as_deref(), &years, as_of);
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            print_json(&response?)
        }

        Commands::Sharpe { symbols } => {
            let symbols = (!symbols.is_empty()).then_some(symbols);
            let pb = spinner("Computing Sharpe ratios...");
            let response = service.get_sharpe(symbols.as_deref());
            pb.finish_and_clear();
            print_json(&response?)
        }

        Commands::Info => Ok(()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_info(repo: &SqliteRepository, config: &Config) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "stock-metrics".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Database:".bold(), config.database.display());
    println!("  {} {}", "Base currency:".bold(), config.base_currency);
    println!("  {} {}", "Benchmark:".bold(), config.benchmark);
    println!(
        "  {} {} .. {}",
        "Sharpe window:".bold(),
        config.sharpe_start,
        config.sharpe_end
    );
    println!();

    let (prices, rates) = repo.count()?;
    println!("{}", "Database".bold());
    println!("{}", "========".dimmed());
    println!("  {} {}", "Price rows:".bold(), prices);
    println!("  {} {}", "Rate rows:".bold(), rates);
    println!("  {} {}", "Symbols:".bold(), repo.symbols()?.join(", "));
    println!();
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MetricsError>().map(MetricsError::status_code) {
        Some(400) => 2,
        Some(404) => 3,
        Some(422) => 4,
        _ => 1,
    }
}
