//! CHESSVS CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the web board server
//! - play: Play against the computer in the terminal
//! - bestmove: Search one position
//! - eval: Material evaluation of one position

mod analyze;
mod config;
mod play;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "chessvs")]
#[command(about = "Chess against a fixed-depth minimax computer player")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web board server
    Serve(server::ServerArgs),
    /// Play against the computer in the terminal
    Play(play::PlayArgs),
    /// Search a position and print the chosen move
    Bestmove(analyze::BestMoveArgs),
    /// Print the material evaluation of a position
    Eval(analyze::EvalArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => server::run(args, app),
        Commands::Play(args) => play::run(args, app),
        Commands::Bestmove(args) => analyze::run_bestmove(args),
        Commands::Eval(args) => analyze::run_eval(args),
    }
}
