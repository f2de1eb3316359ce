//! spiboot command-line entry point

use clap::Parser;
use spiboot::cli::{Cli, Commands};
use spiboot::commands;
use spiboot::config::Board;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Boot {
            board,
            output,
            no_fit,
        } => {
            let resolved = Board::from_args(&board)?;
            commands::boot::run_boot(&resolved, &board.image, output.as_deref(), !no_fit)?;
        }
        Commands::Probe { board } => {
            let resolved = Board::from_args(&board)?;
            commands::probe::run_probe(&resolved, &board.image)?;
        }
        Commands::ListChips => commands::list::list_chips(),
        Commands::ListTargets => commands::list::list_targets(),
    }

    Ok(())
}
