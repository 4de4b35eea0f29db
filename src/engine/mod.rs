//! Engine Module
//!
//! Time keeping and the audio sink boundary:
//! - Beat clock and millisecond time sources
//! - Audio sink trait, factory and in-memory implementation

pub mod clock;
pub mod sink;

pub use clock::{BeatClock, ManualClock, SystemClock, TimeSource, SEQUENCER_STEPS};
pub use sink::{
    lowpass_cutoff_hz, probe_wav, AudioSink, SinkFactory, VirtualSink, VirtualSinkFactory, WavInfo,
};
