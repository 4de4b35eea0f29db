//! Beat clock and time sources
//!
//! The beat index is a pure function of wall-clock time: no state is kept
//! beyond the session start time, so every caller asking at the same
//! millisecond sees the same beat.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{KitchenError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Number of steps in the sequencer; beat indices wrap at this value
pub const SEQUENCER_STEPS: usize = 16;

const MS_PER_MINUTE: f64 = 60_000.0;

// ============================================================================
// Time Sources
// ============================================================================

/// A millisecond wall-clock
pub trait TimeSource: Send {
    /// Milliseconds elapsed since an arbitrary, fixed origin
    fn now_ms(&self) -> u64;
}

/// Monotonic clock counting from its own construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and scripted sessions
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give the other to a session.
///
/// # Example
/// ```
/// use loopkitchen::engine::{ManualClock, TimeSource};
/// let clock = ManualClock::new(0);
/// let handle = clock.clone();
/// clock.advance(250);
/// assert_eq!(handle.now_ms(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Beat Clock
// ============================================================================

/// Converts elapsed time and a tempo into a discrete sequencer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatClock {
    bpm: f64,
    period_ms: f64,
    session_start_ms: u64,
}

impl BeatClock {
    /// Create a clock for the given tempo, anchored at `session_start_ms`
    ///
    /// # Example
    /// ```
    /// use loopkitchen::engine::BeatClock;
    /// let clock = BeatClock::new(120.0, 0).unwrap();
    /// assert_eq!(clock.current_beat(1250), 2);
    /// ```
    pub fn new(bpm: f64, session_start_ms: u64) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(KitchenError::InvalidTempo { bpm });
        }

        Ok(Self {
            bpm,
            period_ms: MS_PER_MINUTE / bpm,
            session_start_ms,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of one beat in milliseconds
    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn session_start_ms(&self) -> u64 {
        self.session_start_ms
    }

    /// Whole beats elapsed since the session started (no wraparound)
    pub fn beats_elapsed(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.session_start_ms) as f64;
        (elapsed / self.period_ms).floor() as u64
    }

    /// Current sequencer step, always in `[0, SEQUENCER_STEPS)`
    pub fn current_beat(&self, now_ms: u64) -> usize {
        (self.beats_elapsed(now_ms) % SEQUENCER_STEPS as u64) as usize
    }

    /// Fraction of the current beat already elapsed, in `[0, 1)`
    pub fn beat_phase(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.session_start_ms) as f64;
        let phase = (elapsed % self.period_ms) / self.period_ms;
        phase.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_period_from_bpm() {
        let clock = BeatClock::new(120.0, 0).unwrap();
        assert_abs_diff_eq!(clock.period_ms(), 500.0);
    }

    #[test]
    fn test_current_beat_scenario() {
        let clock = BeatClock::new(120.0, 0).unwrap();
        assert_eq!(clock.current_beat(1250), 2);
    }

    #[test]
    fn test_beat_wraps_at_sequencer_steps() {
        let clock = BeatClock::new(120.0, 0).unwrap();
        assert_eq!(clock.current_beat(500 * 15), 15);
        assert_eq!(clock.current_beat(500 * 16), 0);
        assert_eq!(clock.current_beat(500 * 17 + 10), 1);
    }

    #[test]
    fn test_session_start_offset() {
        let clock = BeatClock::new(60.0, 10_000).unwrap();
        assert_eq!(clock.current_beat(10_000), 0);
        assert_eq!(clock.current_beat(12_999), 2);
        // Before the session start counts as beat zero
        assert_eq!(clock.current_beat(5_000), 0);
    }

    #[test]
    fn test_beat_is_monotonic_modulo_wrap() {
        let clock = BeatClock::new(137.0, 0).unwrap();
        let mut previous = clock.current_beat(0);
        for now in (0..60_000).step_by(7) {
            let beat = clock.current_beat(now);
            assert!(beat < SEQUENCER_STEPS);
            assert!(
                beat == previous || beat == (previous + 1) % SEQUENCER_STEPS,
                "beat jumped from {} to {} at {}ms",
                previous,
                beat,
                now
            );
            previous = beat;
        }
    }

    #[test]
    fn test_invalid_tempo_rejected() {
        assert!(matches!(
            BeatClock::new(0.0, 0),
            Err(KitchenError::InvalidTempo { .. })
        ));
        assert!(BeatClock::new(-90.0, 0).is_err());
        assert!(BeatClock::new(f64::NAN, 0).is_err());
    }

    #[test]
    fn test_beat_phase() {
        let clock = BeatClock::new(120.0, 0).unwrap();
        assert_abs_diff_eq!(clock.beat_phase(0), 0.0);
        assert_abs_diff_eq!(clock.beat_phase(1250), 0.5);
        assert!(clock.beat_phase(1499) < 1.0);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        clock.set(900);
        assert_eq!(other.now_ms(), 900);
        other.advance(100);
        assert_eq!(clock.now_ms(), 1000);
    }

    #[test]
    fn test_system_clock_never_goes_backwards() {
        let clock = SystemClock::new();
        let mut previous = clock.now_ms();
        for _ in 0..1_000 {
            let now = clock.now_ms();
            assert!(now >= previous);
            previous = now;
        }
    }
}
