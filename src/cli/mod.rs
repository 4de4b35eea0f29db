//! CLI Module
//!
//! Command-line interface for checking session files and running scripted
//! sessions without an audio device.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Loopkitchen - beat-synchronized loop mixing engine
#[derive(Parser, Debug)]
#[command(name = "loopkitchen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a session configuration
    #[command(name = "validate")]
    Validate {
        /// Path to the session JSON file
        config: PathBuf,

        /// Open every loop file as WAV
        #[arg(long)]
        verify_files: bool,
    },

    /// Print the sequencer beat at a given time
    #[command(name = "beat")]
    Beat {
        /// Tempo in beats per minute
        #[arg(long)]
        bpm: f64,

        /// Time in milliseconds
        #[arg(long)]
        at_ms: u64,

        /// Session start time in milliseconds
        #[arg(long, default_value_t = 0)]
        start_ms: u64,
    },

    /// Run a scripted pointer session and print the final mix state
    #[command(name = "simulate")]
    Simulate {
        /// Path to the session JSON file
        config: PathBuf,

        /// Path to the pointer script JSON file
        script: PathBuf,

        /// Open every dropped loop file as WAV
        #[arg(long)]
        verify_files: bool,

        /// Run a last update at this time after the script ends
        #[arg(long)]
        end_ms: Option<u64>,
    },
}
