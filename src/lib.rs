//! Loopkitchen - Beat-Synchronized Loop Mixing Engine
//!
//! Loops are dragged from a palette into one of four mixing slots. Every
//! slot sequences its loops on a shared beat clock and derives volume,
//! lowpass and stutter length from where each loop sits.
//!
//! # Architecture
//!
//! - `engine`: beat clock, time sources and the audio sink boundary
//! - `mix`: loops, channels, slots, corner rigs and the session
//! - `config`: JSON session files
//! - `cli`: command-line front end

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod mix;

pub use error::{KitchenError, Result};
