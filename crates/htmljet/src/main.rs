//! htmljet CLI - capture page elements as screenshots and keep one image per
//! look-alike group.
//!
//! # Usage
//!
//! ```bash
//! # Deduplicate a directory of screenshots into ./shots/clean
//! htmljet cleanup ./shots
//!
//! # Stricter matching, explicit output and a JSON report
//! htmljet cleanup ./shots --threshold 0.95 --output ./unique --report report.json
//!
//! # Capture a page with headless Chromium, then clean up
//! htmljet snap https://example.com
//!
//! # View configuration
//! htmljet config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// htmljet - element screenshots without the duplicates.
#[derive(Parser, Debug)]
#[command(name = "htmljet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "HTMLJET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove near-duplicate images from a directory
    Cleanup(cli::cleanup::CleanupArgs),

    /// Capture element screenshots of a page, then clean them up
    Snap(cli::snap::SnapArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(cli::expand);

    // Logging isn't initialized yet, so config problems go to stderr directly.
    let loaded = cli::load_config(config_path.as_deref());
    match &loaded {
        Ok(config) => logging::init_from_config(config, cli.verbose, cli.json_logs),
        Err(e) => {
            eprintln!("Warning: Failed to load config: {e}");
            logging::init_from_config(&htmljet_core::Config::default(), cli.verbose, cli.json_logs);
        }
    }

    tracing::debug!("htmljet v{}", htmljet_core::VERSION);

    match cli.command {
        Commands::Cleanup(args) => cli::cleanup::execute(args, loaded?).await,
        Commands::Snap(args) => cli::snap::execute(args, loaded?).await,
        Commands::Config(args) => cli::config::execute(args, config_path).await,
    }
}
