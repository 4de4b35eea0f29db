//! Rigs place one mixing slot on each corner of a virtual 2×2 plane
//!
//! Dragging the background pans the whole plane. The shared drag offset
//! also drives a four-way crossfade: each corner is loudest when the offset
//! sits on it and fades out toward the opposite corner.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::mix::asset::Color;
use crate::mix::geometry::{Point, Viewport};
use crate::mix::slot::MixingSlot;

/// Default slot colour
pub const SLOT_COLOR: Color = Color(0x323232);

/// Inset of the corner information box from its tile origin
const INFO_INSET: f32 = 2.0;

// ============================================================================
// Corners
// ============================================================================

/// Fixed position of a rig on the 2×2 plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    FrontRight,
    FrontLeft,
    RearLeft,
    RearRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::FrontRight,
        Corner::FrontLeft,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    /// Whether the x and y axes of the drag offset are mirrored for this
    /// corner, so that the corner itself maps to `(0, 0)`
    fn mirrored_axes(self) -> (bool, bool) {
        match self {
            Corner::FrontRight => (false, false),
            Corner::FrontLeft => (true, false),
            Corner::RearLeft => (true, true),
            Corner::RearRight => (false, true),
        }
    }

    /// Tile position in viewport sizes
    fn tile(self) -> Point {
        match self {
            Corner::FrontRight => Point::new(0.0, 0.0),
            Corner::FrontLeft => Point::new(-1.0, 0.0),
            Corner::RearLeft => Point::new(-1.0, -1.0),
            Corner::RearRight => Point::new(0.0, -1.0),
        }
    }

    fn tile_origin(self, viewport: &Viewport) -> Point {
        let tile = self.tile();
        Point::new(tile.x * viewport.width, tile.y * viewport.height)
    }

    /// Undragged slot centre for this corner
    pub fn slot_home(self, viewport: &Viewport) -> Point {
        self.tile_origin(viewport) + Point::new(viewport.width / 2.0, viewport.height / 3.0)
    }

    /// Undragged origin of the corner's information box
    pub fn info_home(self, viewport: &Viewport) -> Point {
        self.tile_origin(viewport) + Point::new(INFO_INSET, INFO_INSET)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corner::FrontRight => write!(f, "front-right"),
            Corner::FrontLeft => write!(f, "front-left"),
            Corner::RearLeft => write!(f, "rear-left"),
            Corner::RearRight => write!(f, "rear-right"),
        }
    }
}

/// Crossfade gain of `corner` for a drag offset in `[0,1]²`
///
/// The offset is mirrored so the corner sits at the origin, then the gain
/// falls off linearly with the larger of the two axis distances. It is 1
/// on the corner and 0 on the two far edges.
pub fn crossfade_gain(corner: Corner, offset: Point) -> f32 {
    let offset = offset.clamp_unit();
    let (mirror_x, mirror_y) = corner.mirrored_axes();
    let dx = if mirror_x { 1.0 - offset.x } else { offset.x };
    let dy = if mirror_y { 1.0 - offset.y } else { offset.y };

    (1.0 - dx.max(dy)).clamp(0.0, 1.0)
}

// ============================================================================
// Rig
// ============================================================================

/// A mixing slot pinned to one corner of the plane
#[derive(Debug)]
pub struct Rig {
    corner: Corner,
    slot: MixingSlot,
    info_home: Point,
    info_origin: Point,
    total_drag: Point,
    width: f32,
}

impl Rig {
    /// Build the rig for `corner`; the slot radius is a third of the
    /// viewport height
    pub fn new(corner: Corner, viewport: &Viewport, color: Color) -> Result<Self> {
        viewport.validate()?;
        let slot = MixingSlot::new(color, corner.slot_home(viewport), viewport.height / 3.0)?;
        let info_home = corner.info_home(viewport);

        Ok(Self {
            corner,
            slot,
            info_home,
            info_origin: info_home,
            total_drag: Point::ZERO,
            width: viewport.width,
        })
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn slot(&self) -> &MixingSlot {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut MixingSlot {
        &mut self.slot
    }

    pub fn info_origin(&self) -> Point {
        self.info_origin
    }

    /// Accumulated drag in viewport widths (both axes)
    pub fn total_drag_fraction(&self) -> Point {
        self.total_drag
    }

    pub fn crossfade_gain(&self, offset: Point) -> f32 {
        crossfade_gain(self.corner, offset)
    }

    /// Pan the rig by `delta` world units from its undragged layout
    pub fn drag(&mut self, delta: Point) {
        // Both axes are normalized by the width
        self.total_drag = Point::new(delta.x / self.width, delta.y / self.width);
        self.slot.drag(delta);
        self.info_origin = self.info_home + delta;
    }

    /// Recompute the layout for a new viewport and reapply the current drag
    pub fn relayout(&mut self, viewport: &Viewport) -> Result<()> {
        viewport.validate()?;
        self.width = viewport.width;
        self.slot.set_home(self.corner.slot_home(viewport));
        self.info_home = self.corner.info_home(viewport);
        self.info_origin = self.info_home;
        self.drag(self.total_drag * viewport.width);
        Ok(())
    }

    /// Advance the slot's channels to `beat`
    pub fn update(&mut self, beat: usize, now_ms: u64) {
        self.slot.update(beat, now_ms);
    }

    pub fn stop(&mut self) {
        self.slot.stop_all();
    }
}

// ============================================================================
// Tests
// ============================================================================
