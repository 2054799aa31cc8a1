mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands, OptimizeArgs};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!(
        "🚀 Extractopt CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        None => {
            info!("No subcommand given; running 'optimize' with defaults.");
            commands::optimize::run(OptimizeArgs::default(), !cli.quiet)
        }
        Some(Commands::Optimize(args)) => {
            info!("Dispatching to 'optimize' command.");
            commands::optimize::run(args, !cli.quiet)
        }
        Some(Commands::Descriptors(args)) => {
            info!("Dispatching to 'descriptors' command.");
            commands::descriptors::run(args)
        }
        Some(Commands::Polarity(args)) => {
            info!("Dispatching to 'polarity' command.");
            commands::polarity::run(args)
        }
    };

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
