//! Blur-O-Matic - Main Entry Point
//! Terminal front-end over the blur -> save -> cleanup work chain

mod commands;
mod config;
mod container;
mod screen;
mod telemetry;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::container::AppContainer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "bluromatic")]
#[command(about = "Blur a bundled image with a chain of background work", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file (TOML)
    #[arg(long, env = "BLUROMATIC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run blur -> save -> cleanup once (Ctrl+C cancels)
    Run {
        /// Blur level (1 = a little, 3 = the most)
        #[arg(short, long, default_value_t = 1)]
        blur_level: i64,
    },

    /// Interactive screen
    Interactive,

    /// Delete temporary blur outputs
    Cleanup,

    /// Print the local path behind an image locator
    Open {
        /// e.g. content://media/external/images/media/1
        locator: String,
    },

    /// List the blur level options
    Levels,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_logging()?;
    info!("Blur-O-Matic v{} starting...", VERSION);

    if let Commands::Levels = cli.command {
        commands::levels();
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    let container = AppContainer::build(config)?;

    match cli.command {
        Commands::Run { blur_level } => commands::run(&container, blur_level).await,
        Commands::Interactive => commands::interactive(&container).await,
        Commands::Cleanup => commands::cleanup(&container).await,
        Commands::Open { locator } => commands::open(&container, &locator),
        Commands::Levels => {
            commands::levels();
            Ok(())
        }
    }
}
