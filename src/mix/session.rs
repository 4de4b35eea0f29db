//! Mix session
//!
//! Owns the four rigs, the beat clock and the pointer state. Pointer events
//! are routed to palette drags first, then to the slots, and whatever is
//! left over becomes a background drag that pans the plane and drives the
//! crossfade.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::engine::{BeatClock, SinkFactory, TimeSource};
use crate::error::{KitchenError, Result};
use crate::mix::asset::{LoopAsset, LoopCategory};
use crate::mix::cookable::{CookableLoop, LoopId};
use crate::mix::geometry::{Point, Viewport};
use crate::mix::rig::{Corner, Rig, SLOT_COLOR};

// ============================================================================
// Pointer events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[serde(alias = "pressed")]
    Down,
    #[serde(alias = "moved", alias = "drag")]
    Move,
    #[serde(alias = "released")]
    Up,
}

/// A mouse or touch event
///
/// Coordinates are normalized to `[0,1]²` unless `full_range` is set, in
/// which case they are world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub full_range: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, id: u32, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            id,
            full_range: false,
        }
    }

    pub fn down(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, id, x, y)
    }

    pub fn moved(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, id, x, y)
    }

    pub fn up(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, id, x, y)
    }

    /// Event position in normalized units
    pub fn normalized(&self, viewport: &Viewport) -> Point {
        let point = Point::new(self.x, self.y);
        if self.full_range {
            viewport.normalize(point)
        } else {
            point
        }
    }
}

/// A pointer dragging the background
#[derive(Debug, Clone, Copy)]
struct BackgroundPoint {
    pointer: u32,
    position: Point,
    last_position: Point,
}

impl BackgroundPoint {
    fn new(pointer: u32, position: Point) -> Self {
        Self {
            pointer,
            position,
            last_position: position,
        }
    }

    fn move_to(&mut self, position: Point) {
        self.last_position = self.position;
        self.position = position;
    }

    fn incremental_drag(&self) -> Point {
        self.position - self.last_position
    }
}

/// A palette asset carried by a pointer
#[derive(Debug, Clone)]
struct PaletteDrag {
    pointer: u32,
    asset: Arc<LoopAsset>,
}

// ============================================================================
// Snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopSnapshot {
    pub id: LoopId,
    pub asset: String,
    pub playing: bool,
    pub relative_volume: f32,
    pub gain: f32,
    pub lowpass: f32,
    pub region_beats: u32,
    pub beat: u32,
    pub origin: Point,
}

impl LoopSnapshot {
    fn capture(cookable: &CookableLoop) -> Self {
        Self {
            id: cookable.id(),
            asset: cookable.asset().id().to_string(),
            playing: cookable.is_playing(),
            relative_volume: cookable.relative_volume(),
            gain: cookable.applied_gain(),
            lowpass: cookable.lowpass(),
            region_beats: cookable.loop_region_beats(),
            beat: cookable.current_beat_in_region(),
            origin: cookable.origin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSnapshot {
    pub category: LoopCategory,
    pub loops: Vec<LoopSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RigSnapshot {
    pub corner: Corner,
    pub gain: f32,
    pub origin: Point,
    pub region_guide: bool,
    pub channels: Vec<ChannelSnapshot>,
}

/// Serializable view of a session's mix state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub beat: Option<usize>,
    pub drag_offset: Point,
    pub rigs: Vec<RigSnapshot>,
}

// ============================================================================
// Mix Session
// ============================================================================

/// The mixing surface: four rigs sharing one beat clock and drag offset
pub struct MixSession {
    clock: BeatClock,
    time: Box<dyn TimeSource>,
    sinks: Box<dyn SinkFactory>,
    viewport: Viewport,
    loop_radius: f32,
    palette: Vec<Arc<LoopAsset>>,
    rigs: Vec<Rig>,
    drag_offset: Point,
    background: Vec<BackgroundPoint>,
    palette_drags: Vec<PaletteDrag>,
    beat: Option<usize>,
}

impl MixSession {
    /// Create a session whose beat clock starts at the time source's
    /// current reading
    pub fn new(
        palette: Vec<Arc<LoopAsset>>,
        bpm: f64,
        viewport: Viewport,
        loop_radius: f32,
        sinks: Box<dyn SinkFactory>,
        time: Box<dyn TimeSource>,
    ) -> Result<Self> {
        viewport.validate()?;
        if !loop_radius.is_finite() || loop_radius <= 0.0 {
            return Err(KitchenError::InvalidGeometry {
                reason: format!("loop radius must be positive, got {}", loop_radius),
            });
        }

        let clock = BeatClock::new(bpm, time.now_ms())?;
        let rigs = Corner::ALL
            .iter()
            .map(|corner| Rig::new(*corner, &viewport, SLOT_COLOR))
            .collect::<Result<Vec<_>>>()?;

        let mut session = Self {
            clock,
            time,
            sinks,
            viewport,
            loop_radius,
            palette,
            rigs,
            drag_offset: Point::ZERO,
            background: Vec::new(),
            palette_drags: Vec::new(),
            beat: None,
        };
        session.apply_drag_offset();

        info!(
            "Mix session started at {} BPM with {} palette loops ({}x{})",
            bpm,
            session.palette.len(),
            viewport.width,
            viewport.height
        );
        Ok(session)
    }

    /// Create a session from a validated configuration
    pub fn from_config(
        config: &SessionConfig,
        sinks: Box<dyn SinkFactory>,
        time: Box<dyn TimeSource>,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.assets()?,
            config.bpm,
            config.viewport,
            config.loop_radius,
            sinks,
            time,
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn palette(&self) -> &[Arc<LoopAsset>] {
        &self.palette
    }

    pub fn rigs(&self) -> &[Rig] {
        &self.rigs
    }

    pub fn rig(&self, corner: Corner) -> Option<&Rig> {
        self.rigs.iter().find(|rig| rig.corner() == corner)
    }

    /// Shared background drag offset in `[0,1]²`
    pub fn drag_offset(&self) -> Point {
        self.drag_offset
    }

    /// Beat handled by the most recent update
    pub fn beat(&self) -> Option<usize> {
        self.beat
    }

    pub fn background_point_count(&self) -> usize {
        self.background.len()
    }

    pub fn palette_drag_count(&self) -> usize {
        self.palette_drags.len()
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance every rig to the beat current at `now_ms`
    pub fn update(&mut self, now_ms: u64) -> usize {
        let beat = self.clock.current_beat(now_ms);
        for rig in self.rigs.iter_mut() {
            rig.update(beat, now_ms);
        }
        self.beat = Some(beat);
        beat
    }

    /// Update using the session's time source
    pub fn tick(&mut self) -> usize {
        let now_ms = self.time.now_ms();
        self.update(now_ms)
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        viewport.validate()?;
        for rig in self.rigs.iter_mut() {
            rig.relayout(&viewport)?;
        }
        self.viewport = viewport;
        debug!("Relayout for {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    /// Stop every sink in every slot
    pub fn shutdown(&mut self) {
        for rig in self.rigs.iter_mut() {
            rig.stop();
        }
        self.palette_drags.clear();
        self.background.clear();
        info!("Mix session stopped");
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Attach the palette asset `asset_id` to the pointer of `event`
    ///
    /// The asset is dropped into a slot when that pointer is released.
    pub fn pick_from_palette(&mut self, asset_id: &str, event: &PointerEvent) -> Result<()> {
        let asset = self
            .palette
            .iter()
            .find(|asset| asset.id() == asset_id)
            .cloned()
            .ok_or_else(|| KitchenError::UnknownAsset {
                id: asset_id.to_string(),
            })?;

        debug!("Pointer {} picked up '{}'", event.id, asset.id());
        self.palette_drags.retain(|drag| drag.pointer != event.id);
        self.palette_drags.push(PaletteDrag {
            pointer: event.id,
            asset,
        });
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Result<()> {
        let point = event.normalized(&self.viewport);
        match event.kind {
            PointerKind::Down => self.pointer_down(event.id, point),
            PointerKind::Move => self.pointer_moved(event.id, point),
            PointerKind::Up => self.pointer_up(event.id, point)?,
        }
        Ok(())
    }

    fn pointer_down(&mut self, pointer: u32, point: Point) {
        let mut claimed = self.palette_drags.iter().any(|drag| drag.pointer == pointer);
        for rig in self.rigs.iter_mut() {
            claimed |= rig
                .slot_mut()
                .begin_drag(pointer, point, &self.viewport)
                .is_touched();
        }

        if !claimed {
            self.background.retain(|bg| bg.pointer != pointer);
            self.background.push(BackgroundPoint::new(pointer, point));
        }
    }

    fn pointer_moved(&mut self, pointer: u32, point: Point) {
        let mut claimed = self.palette_drags.iter().any(|drag| drag.pointer == pointer);
        for rig in self.rigs.iter_mut() {
            claimed |= rig
                .slot_mut()
                .continue_drag(pointer, point, &self.viewport, self.drag_offset);
        }
        if claimed {
            return;
        }

        let Some(background) = self.background.iter_mut().find(|bg| bg.pointer == pointer) else {
            return;
        };
        background.move_to(point);
        let delta = background.incremental_drag();

        // Only a single finger pans
        if self.background.len() == 1 {
            self.drag_offset = (self.drag_offset + delta).clamp_unit();
            self.apply_drag_offset();
        }
    }

    fn pointer_up(&mut self, pointer: u32, point: Point) -> Result<()> {
        for rig in self.rigs.iter_mut() {
            rig.slot_mut().end_drag(pointer, point, &self.viewport);
        }

        let released: Vec<PaletteDrag> = self
            .palette_drags
            .iter()
            .filter(|drag| drag.pointer == pointer)
            .cloned()
            .collect();
        self.palette_drags.retain(|drag| drag.pointer != pointer);
        for drag in released {
            self.drop_asset(drag.asset, point)?;
        }

        self.background.retain(|bg| bg.pointer != pointer);
        Ok(())
    }

    /// Create a loop for `asset` in the first slot under `point`
    fn drop_asset(&mut self, asset: Arc<LoopAsset>, point: Point) -> Result<Option<LoopId>> {
        let viewport = self.viewport;
        let world = viewport.to_world(point);
        let home = world - viewport.to_world(self.drag_offset);

        let Some(rig) = self
            .rigs
            .iter_mut()
            .find(|rig| rig.slot().contains_world(world))
        else {
            debug!("'{}' released outside every slot", asset.id());
            return Ok(None);
        };

        let corner = rig.corner();
        let slot = rig.slot_mut();
        let params = slot.touch_parameters(world);
        let id = slot.allocate_loop_id();
        let mut cookable = CookableLoop::new(
            id,
            asset,
            world,
            self.loop_radius,
            self.time.now_ms(),
            self.sinks.create(),
        )?;
        cookable.set_origin(world, home);
        cookable.set_relative_volume(params.relative_volume);
        cookable.set_lowpass(params.lowpass);

        info!(
            "Dropped '{}' as {} on {} (volume {:.2}, lowpass {:.2})",
            cookable.asset().id(),
            id,
            corner,
            params.relative_volume,
            params.lowpass
        );
        slot.add_cook_element(cookable)?;
        Ok(Some(id))
    }

    fn apply_drag_offset(&mut self) {
        let delta = self.viewport.to_world(self.drag_offset);
        for rig in self.rigs.iter_mut() {
            rig.drag(delta);
            let gain = rig.crossfade_gain(self.drag_offset);
            rig.slot_mut().set_focus_volume(gain);
        }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        let rigs = self
            .rigs
            .iter()
            .map(|rig| {
                let slot = rig.slot();
                RigSnapshot {
                    corner: rig.corner(),
                    gain: slot.gain(),
                    origin: slot.origin(),
                    region_guide: slot.shows_region_guide(),
                    channels: slot
                        .channels()
                        .iter()
                        .map(|channel| ChannelSnapshot {
                            category: channel.category(),
                            loops: channel.iter().map(LoopSnapshot::capture).collect(),
                        })
                        .collect(),
                }
            })
            .collect();

        SessionSnapshot {
            beat: self.beat,
            drag_offset: self.drag_offset,
            rigs,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
