//! Live loop instances
//!
//! A `CookableLoop` is what a palette asset becomes once it is dropped into
//! a slot: it owns a sink, remembers where it sits, and carries the
//! touch-derived volume, filter and stutter parameters.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::engine::{lowpass_cutoff_hz, AudioSink};
use crate::error::{KitchenError, Result};
use crate::mix::asset::{LoopAsset, LoopCategory};
use crate::mix::geometry::Point;

/// Stable handle to a loop inside a slot
///
/// Handles are never reused within a slot, so a handle whose loop has been
/// evicted simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoopId(pub(crate) u64);

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loop#{}", self.0)
    }
}

/// A playable instance of a [`LoopAsset`]
#[derive(Debug)]
pub struct CookableLoop {
    id: LoopId,
    asset: Arc<LoopAsset>,
    origin: Point,
    origin_at_drag_start: Point,
    radius: f32,
    relative_volume: f32,
    lowpass: f32,
    beat_length: u32,
    region_beats: u32,
    region_start_beat: u32,
    region_restart_position: f32,
    current_beat: u32,
    created_at_ms: u64,
    sink: Box<dyn AudioSink>,
    silent: bool,
    applied_gain: f32,
}

impl CookableLoop {
    /// Create a loop at `origin` (world units) and load its asset into `sink`
    ///
    /// A sink that fails to load leaves the loop silent; only a degenerate
    /// radius is an error.
    pub fn new(
        id: LoopId,
        asset: Arc<LoopAsset>,
        origin: Point,
        radius: f32,
        created_at_ms: u64,
        mut sink: Box<dyn AudioSink>,
    ) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(KitchenError::InvalidGeometry {
                reason: format!("loop radius must be positive, got {}", radius),
            });
        }

        let silent = match sink.load(asset.path()) {
            Ok(()) => false,
            Err(e) => {
                warn!("{} ({}) will stay silent: {}", id, asset.id(), e);
                true
            }
        };

        Ok(Self {
            id,
            beat_length: asset.default_beat_length(),
            asset,
            origin,
            origin_at_drag_start: origin,
            radius,
            relative_volume: 1.0,
            lowpass: 0.0,
            region_beats: 0,
            region_start_beat: 0,
            region_restart_position: 0.0,
            current_beat: 0,
            created_at_ms,
            sink,
            silent,
            applied_gain: 0.0,
        })
    }

    pub fn id(&self) -> LoopId {
        self.id
    }

    pub fn asset(&self) -> &Arc<LoopAsset> {
        &self.asset
    }

    pub fn category(&self) -> LoopCategory {
        self.asset.category()
    }

    /// True when the sink failed to load the asset
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    // ========================================================================
    // Lifetime
    // ========================================================================

    /// Milliseconds since creation, `None` for loops that never expire
    pub fn age(&self, now_ms: u64) -> Option<u64> {
        self.asset
            .lifetime_ms()
            .map(|_| now_ms.saturating_sub(self.created_at_ms))
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        match (self.asset.lifetime_ms(), self.age(now_ms)) {
            (Some(lifetime), Some(age)) => age > lifetime,
            _ => false,
        }
    }

    /// Age as a fraction of the lifetime
    pub fn standardized_age(&self, now_ms: u64) -> Option<f32> {
        let lifetime = self.asset.lifetime_ms()?;
        let age = self.age(now_ms)?;
        if lifetime == 0 {
            return Some(1.0);
        }
        Some(age as f32 / lifetime as f32)
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn origin_at_drag_start(&self) -> Point {
        self.origin_at_drag_start
    }

    /// Place the loop at `origin`; `origin_at_drag_start` is where it sits
    /// with the shared drag offset removed
    pub fn set_origin(&mut self, origin: Point, origin_at_drag_start: Point) {
        self.origin = origin;
        self.origin_at_drag_start = origin_at_drag_start;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether `world` lies on the loop
    pub fn contains(&self, world: Point) -> bool {
        self.origin.distance(world) <= self.radius
    }

    pub fn drag(&mut self, delta: Point) {
        self.origin = self.origin_at_drag_start + delta;
    }

    // ========================================================================
    // Mix parameters
    // ========================================================================

    pub fn relative_volume(&self) -> f32 {
        self.relative_volume
    }

    /// Set the loop's volume relative to its slot; negative values become 0
    pub fn set_relative_volume(&mut self, volume: f32) {
        self.relative_volume = if volume.is_nan() {
            0.0
        } else {
            volume.max(0.0)
        };
    }

    /// Unclamped product of relative volume and slot gain
    pub fn effective_gain(&self, slot_gain: f32) -> f32 {
        self.relative_volume * slot_gain
    }

    /// Gain most recently sent to the sink
    pub fn applied_gain(&self) -> f32 {
        self.applied_gain
    }

    /// Push the current gain to the sink
    pub fn update(&mut self, slot_gain: f32) {
        let gain = self.effective_gain(slot_gain).clamp(0.0, 1.0);
        self.applied_gain = gain;
        self.sink.set_volume(gain);
    }

    pub fn lowpass(&self) -> f32 {
        self.lowpass
    }

    pub fn set_lowpass(&mut self, amount: f32) {
        self.lowpass = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };
        self.sink.set_lowpass(lowpass_cutoff_hz(self.lowpass));
    }

    // ========================================================================
    // Beats and stutter
    // ========================================================================

    /// Loop length in beats
    pub fn beat_length(&self) -> u32 {
        self.beat_length
    }

    pub fn loop_region_beats(&self) -> u32 {
        self.region_beats
    }

    pub fn loop_region_start_beat(&self) -> u32 {
        self.region_start_beat
    }

    pub fn current_beat_in_region(&self) -> u32 {
        self.current_beat
    }

    /// Request a stutter region of `beats` beats (0 disables it)
    ///
    /// The region starts at the beat and playback position current at the
    /// moment the length changes. Repeating the same length keeps the
    /// original start point.
    pub fn set_loop_region(&mut self, beats: u32) {
        if self.region_beats == beats {
            return;
        }
        self.region_beats = beats;
        self.region_start_beat = self.current_beat;
        self.region_restart_position = self.sink.position();
        debug!(
            "{} region set to {} beats from beat {}",
            self.id, beats, self.region_start_beat
        );
    }

    /// Step the in-loop beat counter, rewinding the sink at a region end
    pub fn advance_beat(&mut self) {
        if self.beat_length == 0 {
            return;
        }

        self.current_beat = (self.current_beat + 1) % self.beat_length;

        if self.region_beats > 0 {
            let region_end = (self.region_start_beat + self.region_beats) % self.beat_length;
            if self.current_beat == region_end {
                self.sink.set_position(self.region_restart_position);
                self.current_beat = self.region_start_beat;
                debug!(
                    "{} rewound over {} beats to beat {}",
                    self.id, self.region_beats, self.current_beat
                );
            }
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub fn play(&mut self) {
        if self.silent {
            return;
        }
        self.sink.play();
    }

    pub fn stop(&mut self) {
        self.sink.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.sink.is_playing()
    }

    pub fn sink(&self) -> &dyn AudioSink {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut dyn AudioSink {
        self.sink.as_mut()
    }
}

// ============================================================================
// Tests
// ============================================================================
