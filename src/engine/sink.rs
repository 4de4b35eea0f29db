//! Audio sink abstraction
//!
//! Each live loop drives one sink. The engine only ever issues
//! fire-and-forget commands against it; decoding and output happen
//! outside this crate.

use std::fmt;
use std::path::{Path, PathBuf};

use hound::WavReader;

use crate::error::{KitchenError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Cutoff applied for a fully closed filter
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Upper bound of the sink's native cutoff range
pub const NYQUIST_HZ: f32 = 22_050.0;

/// Linear scale from the normalized lowpass amount to the sink's range
pub const LOWPASS_SCALE: f32 = 0.33;

/// Map a normalized lowpass amount in `[0, 1]` to a cutoff in Hz
///
/// Monotonic: `0` gives [`MIN_CUTOFF_HZ`], `1` gives the widest cutoff.
pub fn lowpass_cutoff_hz(amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    MIN_CUTOFF_HZ + LOWPASS_SCALE * amount * (NYQUIST_HZ - MIN_CUTOFF_HZ)
}

// ============================================================================
// Traits
// ============================================================================

/// Playback handle for a single audio asset
pub trait AudioSink: fmt::Debug + Send {
    /// Load the asset at `path`, replacing anything previously loaded
    fn load(&mut self, path: &Path) -> Result<()>;

    fn play(&mut self);

    fn stop(&mut self);

    /// Set output gain, expected in `[0, 1]`
    fn set_volume(&mut self, gain: f32);

    fn set_lowpass(&mut self, cutoff_hz: f32);

    /// Current playback position, in the sink's own units
    fn position(&self) -> f32;

    fn set_position(&mut self, position: f32);

    fn is_playing(&self) -> bool;
}

/// Creates a fresh sink for every loop instance
pub trait SinkFactory: Send {
    fn create(&self) -> Box<dyn AudioSink>;
}

impl<F> SinkFactory for F
where
    F: Fn() -> Box<dyn AudioSink> + Send,
{
    fn create(&self) -> Box<dyn AudioSink> {
        self()
    }
}

// ============================================================================
// WAV probing
// ============================================================================

/// Header information of a probed WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

/// Read the header of a WAV file without decoding its samples
pub fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = WavReader::open(path).map_err(|e| KitchenError::AssetLoadFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let spec = reader.spec();

    if spec.sample_rate == 0 {
        return Err(KitchenError::AssetLoadFailure {
            path: path.display().to_string(),
            reason: "sample rate is zero".to_string(),
        });
    }

    // duration() counts frames, not interleaved samples
    let duration_secs = reader.duration() as f64 / spec.sample_rate as f64;

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs,
    })
}

// ============================================================================
// Virtual Sink
// ============================================================================

/// In-memory sink recording the commands it receives
///
/// With file verification enabled, `load` probes the file as WAV and fails
/// for anything unreadable. Otherwise any non-empty path is accepted.
#[derive(Debug, Clone, Default)]
pub struct VirtualSink {
    verify_files: bool,
    path: Option<PathBuf>,
    info: Option<WavInfo>,
    playing: bool,
    volume: f32,
    cutoff_hz: f32,
    position: f32,
    play_count: u32,
}

impl VirtualSink {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            cutoff_hz: lowpass_cutoff_hz(1.0),
            ..Self::default()
        }
    }

    /// Sink that probes every loaded file as WAV
    pub fn verifying() -> Self {
        Self {
            verify_files: true,
            ..Self::new()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self) -> Option<WavInfo> {
        self.info
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Number of times playback was started
    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

impl AudioSink for VirtualSink {
    fn load(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(KitchenError::AssetLoadFailure {
                path: String::new(),
                reason: "empty path".to_string(),
            });
        }

        self.info = if self.verify_files {
            Some(probe_wav(path)?)
        } else {
            None
        };
        self.path = Some(path.to_path_buf());
        self.playing = false;
        self.position = 0.0;
        Ok(())
    }

    fn play(&mut self) {
        if self.path.is_none() {
            return;
        }
        self.playing = true;
        self.position = 0.0;
        self.play_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, gain: f32) {
        self.volume = gain;
    }

    fn set_lowpass(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
    }

    fn position(&self) -> f32 {
        self.position
    }

    fn set_position(&mut self, position: f32) {
        self.position = position;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Factory handing out [`VirtualSink`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualSinkFactory {
    pub verify_files: bool,
}

impl SinkFactory for VirtualSinkFactory {
    fn create(&self) -> Box<dyn AudioSink> {
        if self.verify_files {
            Box::new(VirtualSink::verifying())
        } else {
            Box::new(VirtualSink::new())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
