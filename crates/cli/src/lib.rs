pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tradeguard_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tradeguard",
    about = "Tradeguard trade-defense measure recommender",
    long_about = "Recommend trade-defense measures for a product code from a source data snapshot.",
    after_help = concat!(
        "Examples:\n",
        "  tradeguard recommend 8418 --snapshot data/snapshot.json\n",
        "  tradeguard measures --json\n",
        "  tradeguard config"
    )
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the decision tree for a product code and print recommended measures")]
    Recommend {
        #[arg(help = "Product code to analyze (e.g. an HS code)")]
        product_code: String,
        #[arg(long, help = "Source snapshot JSON file (overrides data.snapshot_path)")]
        snapshot: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List the measure catalog with codes and display text")]
    Measures {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Recommend { product_code, snapshot, json } => {
            commands::recommend::run(&product_code, snapshot, json)
        }
        Command::Measures { json } => commands::measures::run(json),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Falls back to the default logging settings when configuration is invalid;
/// the command itself reports the configuration error.
fn init_logging() {
    use tracing::Level;

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);
    match logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
