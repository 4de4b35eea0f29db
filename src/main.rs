//! Loopkitchen CLI
//!
//! Command-line front end for the loop mixing engine.

use clap::Parser;
use env_logger::Env;
use log::info;

use loopkitchen::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Loopkitchen v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Loopkitchen v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Validate {
            config,
            verify_files,
        } => commands::validate(&config, verify_files),
        Commands::Beat {
            bpm,
            at_ms,
            start_ms,
        } => commands::beat(bpm, at_ms, start_ms),
        Commands::Simulate {
            config,
            script,
            verify_files,
            end_ms,
        } => commands::simulate(&config, &script, verify_files, end_ms),
    }
}
