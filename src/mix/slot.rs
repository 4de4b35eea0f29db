//! Mixing slots
//!
//! A slot ("pot") holds one channel per loop category and turns touch
//! geometry into loop parameters: distance from the centre sets volume,
//! height inside the slot sets the lowpass amount, and the quadrant of a
//! loop held near the centre selects a stutter length.

use log::{debug, info};

use crate::error::{KitchenError, Result};
use crate::mix::asset::{Color, LoopCategory};
use crate::mix::channel::Channel;
use crate::mix::cookable::{CookableLoop, LoopId};
use crate::mix::geometry::{Point, Viewport};

// ============================================================================
// Constants
// ============================================================================

/// Fraction of the slot radius inside which a held loop stutters
pub const RADIUS_LOOP_PCT: f32 = 0.5;

/// Relative volume at the exact centre of a slot
pub const CENTRE_VOLUME: f32 = 1.5;

// ============================================================================
// Stutter quadrants
// ============================================================================

/// Quadrant of a point relative to a slot centre (screen y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    UpperRight,
    LowerRight,
    LowerLeft,
    UpperLeft,
}

impl Quadrant {
    /// Quadrant of `offset`, `None` when it lies on an axis
    pub fn of(offset: Point) -> Option<Quadrant> {
        let right = offset.x > 0.0;
        let left = offset.x < 0.0;
        let lower = offset.y > 0.0;
        let upper = offset.y < 0.0;

        match (right, left, lower, upper) {
            (true, _, true, _) => Some(Quadrant::LowerRight),
            (true, _, _, true) => Some(Quadrant::UpperRight),
            (_, true, true, _) => Some(Quadrant::LowerLeft),
            (_, true, _, true) => Some(Quadrant::UpperLeft),
            _ => None,
        }
    }

    /// Fixed stutter length for this quadrant
    pub fn region_beats(self) -> u32 {
        match self {
            Quadrant::UpperRight => 1,
            Quadrant::LowerRight => 2,
            Quadrant::LowerLeft => 4,
            Quadrant::UpperLeft => 8,
        }
    }
}

/// Loop parameters derived from where a loop sits inside a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchParameters {
    pub relative_volume: f32,
    pub lowpass: f32,
    pub region_beats: u32,
}

/// What a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTarget {
    /// A loop, now being dragged
    Loop(LoopId),
    /// The slot body, outside any loop
    Slot,
    None,
}

impl TouchTarget {
    pub fn is_touched(self) -> bool {
        !matches!(self, TouchTarget::None)
    }
}

/// A loop held by one pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragHandle {
    pointer: u32,
    id: LoopId,
}

// ============================================================================
// Mixing Slot
// ============================================================================

/// A circular mixing area with one channel per loop category
#[derive(Debug)]
pub struct MixingSlot {
    color: Color,
    origin: Point,
    origin_at_drag_start: Point,
    radius: f32,
    gain: f32,
    channels: [Channel; LoopCategory::COUNT],
    dragged: Vec<DragHandle>,
    next_loop_id: u64,
    region_guide: bool,
}

impl MixingSlot {
    /// Create a slot centred at `origin` (world units)
    pub fn new(color: Color, origin: Point, radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(KitchenError::InvalidGeometry {
                reason: format!("slot radius must be positive, got {}", radius),
            });
        }

        Ok(Self {
            color,
            origin,
            origin_at_drag_start: origin,
            radius,
            gain: 1.0,
            channels: LoopCategory::ALL.map(Channel::new),
            dragged: Vec::new(),
            next_loop_id: 0,
            region_guide: false,
        })
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn origin_at_drag_start(&self) -> Point {
        self.origin_at_drag_start
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Move the slot's undragged position, keeping the current drag
    pub fn set_home(&mut self, origin: Point) {
        let drag = self.origin - self.origin_at_drag_start;
        self.origin_at_drag_start = origin;
        self.origin = origin + drag;
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Set the slot's overall gain, clamped to `[0, 1]`
    pub fn set_focus_volume(&mut self, gain: f32) {
        self.gain = if gain.is_nan() {
            0.0
        } else {
            gain.clamp(0.0, 1.0)
        };
    }

    /// Whether a loop held during the last drag sat close enough to the
    /// centre to stutter
    pub fn shows_region_guide(&self) -> bool {
        self.region_guide
    }

    // ========================================================================
    // Channels and loops
    // ========================================================================

    pub fn channel(&self, category: LoopCategory) -> &Channel {
        &self.channels[category.index()]
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Reserve a handle for a loop about to be added to this slot
    pub fn allocate_loop_id(&mut self) -> LoopId {
        let id = LoopId(self.next_loop_id);
        self.next_loop_id += 1;
        id
    }

    /// Queue a loop on the channel of its category
    pub fn add_cook_element(&mut self, cookable: CookableLoop) -> Result<LoopId> {
        let category = cookable.category();
        self.channels[category.index()].add(cookable)
    }

    pub fn loops(&self) -> impl Iterator<Item = &CookableLoop> {
        self.channels.iter().flat_map(|channel| channel.iter())
    }

    pub fn get_loop(&self, id: LoopId) -> Option<&CookableLoop> {
        self.channels.iter().find_map(|channel| channel.get(id))
    }

    pub fn get_loop_mut(&mut self, id: LoopId) -> Option<&mut CookableLoop> {
        self.channels
            .iter_mut()
            .find_map(|channel| channel.get_mut(id))
    }

    /// Handles of loops currently held by any pointer
    pub fn dragged_loops(&self) -> Vec<LoopId> {
        self.dragged.iter().map(|handle| handle.id).collect()
    }

    /// Handles of loops held by `pointer`
    pub fn loops_held_by(&self, pointer: u32) -> Vec<LoopId> {
        self.dragged
            .iter()
            .filter(|handle| handle.pointer == pointer)
            .map(|handle| handle.id)
            .collect()
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Whether the normalized `point` falls inside the slot
    pub fn hit_test(&self, point: Point, viewport: &Viewport) -> bool {
        self.contains_world(viewport.to_world(point))
    }

    pub fn contains_world(&self, world: Point) -> bool {
        self.origin.distance(world) <= self.radius
    }

    /// Volume, filter and stutter length for a loop placed at `world`
    pub fn touch_parameters(&self, world: Point) -> TouchParameters {
        let offset = world - self.origin;
        let distance_fraction = offset.length() / self.radius;

        let relative_volume = (CENTRE_VOLUME * (1.0 - distance_fraction)).max(0.0);
        let height = (self.origin.y + self.radius - world.y) / (2.0 * self.radius);
        let lowpass = height.clamp(0.0, 1.0);
        let region_beats = if distance_fraction < RADIUS_LOOP_PCT {
            Quadrant::of(offset).map_or(0, Quadrant::region_beats)
        } else {
            0
        };

        TouchParameters {
            relative_volume,
            lowpass,
            region_beats,
        }
    }

    /// Move the slot and its loops by `delta` from their undragged positions
    pub fn drag(&mut self, delta: Point) {
        self.origin = self.origin_at_drag_start + delta;
        for channel in self.channels.iter_mut() {
            for cookable in channel.iter_mut() {
                cookable.drag(delta);
            }
        }
    }

    // ========================================================================
    // Pointer handling
    // ========================================================================

    /// Let `pointer` pick up the first loop under `point`, searching
    /// channels in category order
    pub fn begin_drag(
        &mut self,
        pointer: u32,
        point: Point,
        viewport: &Viewport,
    ) -> TouchTarget {
        let world = viewport.to_world(point);

        let hit = self
            .channels
            .iter()
            .flat_map(Channel::iter)
            .find(|cookable| cookable.contains(world))
            .map(|cookable| cookable.id());

        if let Some(id) = hit {
            // A loop follows one pointer at a time
            self.dragged.retain(|handle| handle.id != id);
            self.dragged.push(DragHandle { pointer, id });
            debug!("pointer {} picked up {}", pointer, id);
            return TouchTarget::Loop(id);
        }

        if self.contains_world(world) {
            TouchTarget::Slot
        } else {
            TouchTarget::None
        }
    }

    /// Move every loop held by `pointer` that is still under `point` and
    /// re-derive its parameters
    ///
    /// `drag_offset` is the session's normalized drag offset. Handles whose
    /// loop is gone are dropped. Returns whether any loop moved.
    pub fn continue_drag(
        &mut self,
        pointer: u32,
        point: Point,
        viewport: &Viewport,
        drag_offset: Point,
    ) -> bool {
        let world = viewport.to_world(point);
        let params = self.touch_parameters(world);
        let home = world - viewport.to_world(drag_offset);

        let mut moved = false;
        let mut live = Vec::with_capacity(self.dragged.len());
        for handle in std::mem::take(&mut self.dragged) {
            if handle.pointer != pointer {
                live.push(handle);
                continue;
            }
            match self.get_loop_mut(handle.id) {
                Some(cookable) => {
                    if cookable.contains(world) {
                        cookable.set_origin(world, home);
                        cookable.set_relative_volume(params.relative_volume);
                        cookable.set_lowpass(params.lowpass);
                        cookable.set_loop_region(params.region_beats);
                        moved = true;
                    }
                    live.push(handle);
                }
                None => debug!("dropping stale drag handle {}", handle.id),
            }
        }
        self.dragged = live;

        let inner_radius = RADIUS_LOOP_PCT * self.radius;
        let origin = self.origin;
        let guide = self
            .loops()
            .any(|cookable| cookable.origin().distance(origin) < inner_radius);
        self.region_guide = guide;

        moved
    }

    /// Release everything `pointer` holds; loops under a release point
    /// outside the slot leave the mix. Returns the handles of removed loops.
    pub fn end_drag(&mut self, pointer: u32, point: Point, viewport: &Viewport) -> Vec<LoopId> {
        let world = viewport.to_world(point);
        self.dragged.retain(|handle| handle.pointer != pointer);

        if self.contains_world(world) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        for channel in self.channels.iter_mut() {
            removed.extend(channel.remove_if(|cookable| cookable.contains(world)));
        }
        self.dragged.retain(|handle| !removed.contains(&handle.id));
        for id in &removed {
            info!("{} dragged out of slot", id);
        }
        removed
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Expire loops, advance every channel to `beat` and push gains
    pub fn update(&mut self, beat: usize, now_ms: u64) {
        for channel in self.channels.iter_mut() {
            channel.remove_expired(now_ms);
            channel.update(beat);
            channel.apply_gain(self.gain);
        }
    }

    pub fn stop_all(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.stop_all();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VirtualSink;
    use crate::mix::asset::LoopAsset;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;
    use test_case::test_case;

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    fn slot() -> MixingSlot {
        let origin = Point::new(500.0, 500.0);
        MixingSlot::new(Color(0x323232), origin, 100.0).unwrap()
    }

    fn drop_loop(slot: &mut MixingSlot, category: LoopCategory, at: Point) -> LoopId {
        let asset = Arc::new(LoopAsset::new(
            format!("{}", category),
            category,
            "loops/test.wav",
            Color::WHITE,
            4,
            None,
        ));
        let id = slot.allocate_loop_id();
        let sink = Box::new(VirtualSink::new());
        let cookable = CookableLoop::new(id, asset, at, 20.0, 0, sink).unwrap();
        slot.add_cook_element(cookable).unwrap()
    }

    fn normalized(x: f32, y: f32) -> Point {
        VIEWPORT.normalize(Point::new(x, y))
    }

    /// Continue `pointer`'s drag to world `(x, y)` with no background offset
    fn move_to(slot: &mut MixingSlot, pointer: u32, x: f32, y: f32) -> bool {
        slot.continue_drag(pointer, normalized(x, y), &VIEWPORT, Point::ZERO)
    }

    fn origin_of(slot: &MixingSlot, id: LoopId) -> Point {
        slot.get_loop(id).unwrap().origin()
    }

    #[test]
    fn test_degenerate_radius_rejected() {
        let result = MixingSlot::new(Color::WHITE, Point::ZERO, -5.0);
        assert!(matches!(result, Err(KitchenError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_hit_test_scales_to_world() {
        let slot = slot();
        assert!(slot.hit_test(Point::new(0.5, 0.5), &VIEWPORT));
        assert!(slot.hit_test(normalized(599.0, 500.0), &VIEWPORT));
        assert!(!slot.hit_test(normalized(602.0, 500.0), &VIEWPORT));
    }

    #[test]
    fn test_add_cook_element_routes_by_category() {
        let mut slot = slot();
        drop_loop(&mut slot, LoopCategory::Lead, Point::new(500.0, 500.0));
        drop_loop(&mut slot, LoopCategory::Rhythm, Point::new(520.0, 500.0));
        assert_eq!(slot.channel(LoopCategory::Lead).len(), 1);
        assert_eq!(slot.channel(LoopCategory::Rhythm).len(), 1);
        assert!(slot.channel(LoopCategory::Bass).is_empty());
    }

    #[test]
    fn test_centre_volume() {
        let params = slot().touch_parameters(Point::new(500.0, 500.0));
        assert_abs_diff_eq!(params.relative_volume, 1.5);
        assert_abs_diff_eq!(params.lowpass, 0.5);
        assert_eq!(params.region_beats, 0, "centre lies on both axes");
    }

    #[test]
    fn test_volume_falls_off_linearly() {
        let slot = slot();
        let volume_at = |x: f32| slot.touch_parameters(Point::new(x, 500.0)).relative_volume;
        assert_abs_diff_eq!(volume_at(550.0), 0.75);
        assert_abs_diff_eq!(volume_at(600.0), 0.0);
        // Outside the slot the volume never goes negative
        assert_abs_diff_eq!(volume_at(700.0), 0.0);
    }

    #[test]
    fn test_lowpass_from_height() {
        let slot = slot();
        let lowpass_at = |y: f32| slot.touch_parameters(Point::new(500.0, y)).lowpass;
        assert_abs_diff_eq!(lowpass_at(600.0), 0.0);
        assert_abs_diff_eq!(lowpass_at(400.0), 1.0);
        assert_abs_diff_eq!(lowpass_at(450.0), 0.75);
    }

    #[test_case(1.0, -1.0, 1 ; "upper right")]
    #[test_case(1.0, 1.0, 2 ; "lower right")]
    #[test_case(-1.0, 1.0, 4 ; "lower left")]
    #[test_case(-1.0, -1.0, 8 ; "upper left")]
    fn test_quadrant_region_beats(dx: f32, dy: f32, expected: u32) {
        let slot = slot();
        let distance = 0.5 * RADIUS_LOOP_PCT * slot.radius();
        let step = distance / std::f32::consts::SQRT_2;
        let at = Point::new(500.0 + dx * step, 500.0 + dy * step);
        assert_eq!(slot.touch_parameters(at).region_beats, expected);
    }

    #[test]
    fn test_no_region_outside_inner_radius() {
        let slot = slot();
        let at = Point::new(500.0 + 40.0, 500.0 - 40.0);
        assert_eq!(slot.touch_parameters(at).region_beats, 0);
    }

    #[test]
    fn test_begin_drag_targets() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Bass, Point::new(560.0, 500.0));

        assert_eq!(
            slot.begin_drag(1, normalized(565.0, 505.0), &VIEWPORT),
            TouchTarget::Loop(id)
        );
        assert_eq!(slot.dragged_loops(), vec![id]);

        assert_eq!(
            slot.begin_drag(1, normalized(450.0, 500.0), &VIEWPORT),
            TouchTarget::Slot
        );
        assert_eq!(
            slot.begin_drag(1, normalized(100.0, 100.0), &VIEWPORT),
            TouchTarget::None
        );
        assert!(!TouchTarget::None.is_touched());
    }

    #[test]
    fn test_begin_drag_searches_categories_in_order() {
        let mut slot = slot();
        let lead = drop_loop(&mut slot, LoopCategory::Lead, Point::new(500.0, 500.0));
        let rhythm = drop_loop(&mut slot, LoopCategory::Rhythm, Point::new(505.0, 500.0));
        let target = slot.begin_drag(1, normalized(502.0, 500.0), &VIEWPORT);
        assert_eq!(target, TouchTarget::Loop(rhythm));
        assert_ne!(target, TouchTarget::Loop(lead));
    }

    #[test]
    fn test_continue_drag_updates_parameters() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);

        let moved = move_to(&mut slot, 1, 550.0, 500.0);
        assert!(moved);

        let cookable = slot.get_loop(id).unwrap();
        assert_abs_diff_eq!(cookable.origin().x, 550.0, epsilon = 1e-3);
        assert_abs_diff_eq!(cookable.origin().y, 500.0, epsilon = 1e-3);
        assert_abs_diff_eq!(cookable.relative_volume(), 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(cookable.lowpass(), 0.5, epsilon = 1e-5);
        assert_eq!(cookable.loop_region_beats(), 0);
        assert!(!slot.shows_region_guide());
    }

    #[test]
    fn test_continue_drag_near_centre_sets_region() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(530.0, 480.0));
        slot.begin_drag(1, normalized(530.0, 480.0), &VIEWPORT);
        move_to(&mut slot, 1, 520.0, 480.0);

        assert_eq!(slot.get_loop(id).unwrap().loop_region_beats(), 1);
        assert!(slot.shows_region_guide());
    }

    #[test]
    fn test_continue_drag_records_home_without_offset() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);
        let offset = Point::new(0.1, 0.0);
        slot.continue_drag(1, normalized(555.0, 500.0), &VIEWPORT, offset);

        let cookable = slot.get_loop(id).unwrap();
        assert_abs_diff_eq!(cookable.origin_at_drag_start().x, 455.0, epsilon = 1e-3);
    }

    #[test]
    fn test_continue_drag_ignores_loops_not_under_pointer() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Bass, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);

        assert!(!move_to(&mut slot, 1, 450.0, 450.0));
        assert_eq!(origin_of(&slot, id), Point::new(560.0, 500.0));
    }

    #[test]
    fn test_stale_drag_handle_dropped() {
        let mut slot = slot();
        let first = drop_loop(&mut slot, LoopCategory::Bass, Point::new(560.0, 500.0));
        drop_loop(&mut slot, LoopCategory::Bass, Point::new(440.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);

        // Beat hand-off evicts the first loop while it is still held
        slot.update(0, 0);
        assert!(slot.get_loop(first).is_none());

        move_to(&mut slot, 1, 560.0, 500.0);
        assert!(slot.dragged_loops().is_empty());
    }

    #[test]
    fn test_end_drag_inside_keeps_loop() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);

        let removed = slot.end_drag(1, normalized(560.0, 500.0), &VIEWPORT);
        assert!(removed.is_empty());
        assert!(slot.dragged_loops().is_empty());
        assert!(slot.get_loop(id).is_some());
    }

    #[test]
    fn test_end_drag_outside_evicts_loop() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(590.0, 500.0));
        slot.update(0, 0);
        assert!(slot.get_loop(id).unwrap().is_playing());

        slot.begin_drag(1, normalized(590.0, 500.0), &VIEWPORT);
        move_to(&mut slot, 1, 605.0, 500.0);
        let removed = slot.end_drag(1, normalized(605.0, 500.0), &VIEWPORT);

        assert_eq!(removed, vec![id]);
        assert!(slot.channel(LoopCategory::Lead).is_empty());
        assert!(slot.dragged_loops().is_empty());
    }

    #[test]
    fn test_update_applies_slot_gain() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Rhythm, Point::new(500.0, 500.0));
        slot.set_focus_volume(0.5);
        slot.update(0, 0);
        assert_abs_diff_eq!(slot.get_loop(id).unwrap().applied_gain(), 0.5);

        slot.set_focus_volume(3.0);
        assert_eq!(slot.gain(), 1.0);
    }

    #[test]
    fn test_drag_moves_slot_and_loops() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Rhythm, Point::new(520.0, 500.0));
        slot.drag(Point::new(-100.0, 50.0));
        assert_eq!(slot.origin(), Point::new(400.0, 550.0));
        assert_eq!(origin_of(&slot, id), Point::new(420.0, 550.0));
    }

    #[test]
    fn test_set_home_keeps_drag() {
        let mut slot = slot();
        slot.drag(Point::new(10.0, 0.0));
        slot.set_home(Point::new(100.0, 100.0));
        assert_eq!(slot.origin(), Point::new(110.0, 100.0));
        assert_eq!(slot.origin_at_drag_start(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_continue_drag_moves_only_own_pointer() {
        let mut slot = slot();
        let left = drop_loop(&mut slot, LoopCategory::Bass, Point::new(440.0, 500.0));
        let right = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(440.0, 500.0), &VIEWPORT);
        slot.begin_drag(2, normalized(560.0, 500.0), &VIEWPORT);
        assert_eq!(slot.loops_held_by(1), vec![left]);
        assert_eq!(slot.loops_held_by(2), vec![right]);

        // Pointer 1 sweeps across the loop held by pointer 2
        assert!(!move_to(&mut slot, 1, 555.0, 500.0));
        assert_eq!(origin_of(&slot, right), Point::new(560.0, 500.0));

        assert!(move_to(&mut slot, 2, 555.0, 500.0));
        assert_abs_diff_eq!(origin_of(&slot, right).x, 555.0, epsilon = 1e-3);
    }

    #[test]
    fn test_release_away_from_loop_drops_handle() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);

        // Released inside the slot but away from the loop
        let removed = slot.end_drag(1, normalized(450.0, 500.0), &VIEWPORT);
        assert!(removed.is_empty());
        assert!(slot.dragged_loops().is_empty());

        // A later pointer passing over the loop does not pick it up
        assert!(!move_to(&mut slot, 1, 558.0, 500.0));
        assert_eq!(origin_of(&slot, id), Point::new(560.0, 500.0));
    }

    #[test]
    fn test_pick_up_moves_handle_to_new_pointer() {
        let mut slot = slot();
        let id = drop_loop(&mut slot, LoopCategory::Lead, Point::new(560.0, 500.0));
        slot.begin_drag(1, normalized(560.0, 500.0), &VIEWPORT);
        slot.begin_drag(2, normalized(562.0, 500.0), &VIEWPORT);

        assert!(slot.loops_held_by(1).is_empty());
        assert_eq!(slot.loops_held_by(2), vec![id]);
    }
}
