// src/main.rs
// sudoscan - parse a sudoers tree and print it as JSON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use sudoscan::config::{EnvOverrides, ScanConfig};
use sudoscan::sudoers::to_json;
use sudoscan::{Scanner, parse_document};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "sudoscan")]
#[command(about = "Parse sudoers files, following #include and #includedir")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.sudoscan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a root sudoers file and everything it includes (default)
    Scan {
        /// Root sudoers file (default: /etc/sudoers)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Parse included files in parallel
        #[arg(long)]
        parallel: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a single file without following includes
    Parse {
        /// File to parse
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Resolve values: CLI args > env vars > config file > defaults
fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let config = match &cli.config {
        Some(path) => ScanConfig::load_from(path)?,
        None => ScanConfig::load(),
    };
    Ok(config.with_env(&EnvOverrides::from_env()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = to_json(value, pretty).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

fn run_scan(config: &ScanConfig, pretty: bool) -> Result<()> {
    let corpus = Scanner::new(config.scan_options())
        .scan(&config.root)
        .with_context(|| format!("Failed to scan {}", config.root.display()))?;
    print_json(&corpus, pretty)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let default_level = if cli.verbose { "info" } else { "warn" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut config = load_config(&cli)?;
    debug!(?config, "effective configuration");

    match cli.command {
        None => run_scan(&config, false)?,
        Some(Commands::Scan {
            root,
            parallel,
            pretty,
        }) => {
            if let Some(root) = root {
                config.root = root;
            }
            config.parallel |= parallel;
            run_scan(&config, pretty)?;
        }
        Some(Commands::Parse { file, pretty }) => {
            let doc = parse_document(&file, &config.scan_options())
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            print_json(&doc, pretty)?;
        }
    }

    Ok(())
}
