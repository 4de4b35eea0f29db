//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::config::SessionConfig;
use crate::engine::{probe_wav, BeatClock, ManualClock, VirtualSinkFactory};
use crate::mix::{MixSession, PointerEvent, SessionSnapshot};

/// One timed step of a pointer script
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds since the session started
    pub at_ms: u64,

    #[serde(flatten)]
    pub event: PointerEvent,

    /// Palette asset picked up by this pointer-down
    #[serde(default)]
    pub grab: Option<String>,
}

/// Parse a pointer script; steps must be in time order
pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
    let steps: Vec<ScriptStep> =
        serde_json::from_str(content).context("Malformed pointer script")?;
    if let Some(pair) = steps.windows(2).find(|pair| pair[1].at_ms < pair[0].at_ms) {
        bail!(
            "Script steps out of order: {} ms follows {} ms",
            pair[1].at_ms,
            pair[0].at_ms
        );
    }
    Ok(steps)
}

/// Validate a session configuration.
pub fn validate(config_path: &Path, verify_files: bool) -> Result<()> {
    info!("Validating session: {}", config_path.display());

    let config = SessionConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    println!("Session: {}", config_path.display());
    println!("Tempo: {} BPM", config.bpm);
    println!(
        "Viewport: {}x{}",
        config.viewport.width, config.viewport.height
    );
    println!("Loops: {}", config.loops.len());

    let mut failures = 0;
    for entry in &config.loops {
        let lifetime = match entry.lifetime() {
            Some(ms) => format!("{} ms", ms),
            None => "infinite".to_string(),
        };
        println!(
            "  {:<16} {:<6} {} beats, lifetime {}",
            entry.id, entry.category, entry.beats, lifetime
        );

        if verify_files {
            match probe_wav(&entry.path) {
                Ok(wav) => println!(
                    "    {} Hz, {} ch, {:.2}s",
                    wav.sample_rate, wav.channels, wav.duration_secs
                ),
                Err(e) => {
                    warn!("{}: {}", entry.id, e);
                    println!("    unreadable: {}", e);
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        bail!("{} loop file(s) could not be read", failures);
    }
    println!("OK");
    Ok(())
}

/// Print the sequencer beat at `at_ms`.
pub fn beat(bpm: f64, at_ms: u64, start_ms: u64) -> Result<()> {
    let clock = BeatClock::new(bpm, start_ms)?;
    println!(
        "Beat {} (phase {:.3}, period {:.1} ms)",
        clock.current_beat(at_ms),
        clock.beat_phase(at_ms),
        clock.period_ms()
    );
    Ok(())
}

/// Run `steps` against a fresh session on a manual clock
pub fn run_script(
    config: &SessionConfig,
    steps: &[ScriptStep],
    verify_files: bool,
    end_ms: Option<u64>,
) -> Result<SessionSnapshot> {
    let clock = ManualClock::new(0);
    let mut session = MixSession::from_config(
        config,
        Box::new(VirtualSinkFactory { verify_files }),
        Box::new(clock.clone()),
    )?;

    for step in steps {
        clock.set(step.at_ms);
        session.tick();

        if let Some(asset) = &step.grab {
            if let Err(e) = session.pick_from_palette(asset, &step.event) {
                if !e.is_recoverable() {
                    return Err(e.into());
                }
                warn!("Step at {} ms: {}", step.at_ms, e);
            }
        }
        session.handle_pointer(&step.event)?;
    }

    if let Some(end_ms) = end_ms {
        clock.set(end_ms);
        session.tick();
    }

    let snapshot = session.snapshot();
    session.shutdown();
    Ok(snapshot)
}

/// Simulate a scripted session and print its final state.
pub fn simulate(
    config_path: &Path,
    script_path: &Path,
    verify_files: bool,
    end_ms: Option<u64>,
) -> Result<()> {
    info!(
        "Simulating {} with {}",
        config_path.display(),
        script_path.display()
    );

    let config = SessionConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let content = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let steps = parse_script(&content)?;

    let snapshot = run_script(&config, &steps, verify_files, end_ms)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
