//! Per-category loop queues
//!
//! A channel plays at most one loop at a time. Loops dropped while another
//! one plays wait in arrival order and only take over on a beat boundary.

use std::collections::VecDeque;

use log::debug;

use crate::error::{KitchenError, Result};
use crate::mix::asset::LoopCategory;
use crate::mix::cookable::{CookableLoop, LoopId};

/// Ordered queue of loops of one category within a slot
#[derive(Debug)]
pub struct Channel {
    category: LoopCategory,
    loops: VecDeque<CookableLoop>,
    last_beat: Option<usize>,
}

impl Channel {
    pub fn new(category: LoopCategory) -> Self {
        Self {
            category,
            loops: VecDeque::new(),
            last_beat: None,
        }
    }

    pub fn category(&self) -> LoopCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// The beat most recently handled by [`Channel::update`]
    pub fn last_beat(&self) -> Option<usize> {
        self.last_beat
    }

    /// Append a loop behind whatever is already queued
    ///
    /// Fails when the loop belongs to another category.
    pub fn add(&mut self, cookable: CookableLoop) -> Result<LoopId> {
        if cookable.category() != self.category {
            return Err(KitchenError::InvalidConfig {
                reason: format!(
                    "{} loop {} added to the {} channel",
                    cookable.category(),
                    cookable.id(),
                    self.category
                ),
            });
        }

        let id = cookable.id();
        self.loops.push_back(cookable);
        Ok(id)
    }

    /// Advance the channel to `beat`
    ///
    /// Nothing happens unless `beat` differs from the previous call. On a new
    /// beat a lone loop is started (and its beat counter stepped) while a
    /// queue of two or more hands over from the oldest loop to the next.
    /// Returns whether this was a new beat.
    pub fn update(&mut self, beat: usize) -> bool {
        if self.last_beat == Some(beat) {
            return false;
        }
        self.last_beat = Some(beat);

        match self.loops.len() {
            0 => {}
            1 => {
                if let Some(current) = self.loops.front_mut() {
                    if !current.is_playing() {
                        current.play();
                    }
                    current.advance_beat();
                }
            }
            _ => {
                if let Some(mut outgoing) = self.loops.pop_front() {
                    outgoing.stop();
                    debug!(
                        "{} channel: {} handed over on beat {}",
                        self.category,
                        outgoing.id(),
                        beat
                    );
                }
                if let Some(incoming) = self.loops.front_mut() {
                    incoming.play();
                }
            }
        }

        true
    }

    /// Push the slot gain down to every loop
    pub fn apply_gain(&mut self, slot_gain: f32) {
        for cookable in self.loops.iter_mut() {
            cookable.update(slot_gain);
        }
    }

    /// Remove every loop matching `predicate`, stopping its sink first
    pub fn remove_if<F>(&mut self, mut predicate: F) -> Vec<LoopId>
    where
        F: FnMut(&CookableLoop) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.loops.len());

        for mut cookable in self.loops.drain(..) {
            if predicate(&cookable) {
                cookable.stop();
                removed.push(cookable.id());
            } else {
                kept.push_back(cookable);
            }
        }

        self.loops = kept;
        removed
    }

    /// Drop loops whose lifetime has elapsed
    pub fn remove_expired(&mut self, now_ms: u64) -> Vec<LoopId> {
        let removed = self.remove_if(|cookable| cookable.is_expired(now_ms));
        for id in &removed {
            debug!("{} channel: {} expired", self.category, id);
        }
        removed
    }

    pub fn stop_all(&mut self) {
        for cookable in self.loops.iter_mut() {
            cookable.stop();
        }
    }

    /// The loop at the head of the queue, if it is playing
    pub fn active(&self) -> Option<&CookableLoop> {
        self.loops.front().filter(|cookable| cookable.is_playing())
    }

    pub fn get(&self, id: LoopId) -> Option<&CookableLoop> {
        self.loops.iter().find(|cookable| cookable.id() == id)
    }

    pub fn get_mut(&mut self, id: LoopId) -> Option<&mut CookableLoop> {
        self.loops.iter_mut().find(|cookable| cookable.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CookableLoop> {
        self.loops.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CookableLoop> {
        self.loops.iter_mut()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VirtualSink;
    use crate::mix::asset::{Color, LoopAsset};
    use crate::mix::geometry::Point;
    use std::sync::Arc;

    fn bass_loop(id: u64, lifetime_ms: Option<u64>) -> CookableLoop {
        let asset = Arc::new(LoopAsset::new(
            format!("bass-{}", id),
            LoopCategory::Bass,
            format!("loops/bass-{}.wav", id),
            Color::WHITE,
            4,
            lifetime_ms,
        ));
        CookableLoop::new(
            LoopId(id),
            asset,
            Point::ZERO,
            30.0,
            0,
            Box::new(VirtualSink::new()),
        )
        .unwrap()
    }

    fn playing_ids(channel: &Channel) -> Vec<LoopId> {
        channel
            .iter()
            .filter(|cookable| cookable.is_playing())
            .map(|cookable| cookable.id())
            .collect()
    }

    #[test]
    fn test_empty_channel_update_is_noop() {
        let mut channel = Channel::new(LoopCategory::Bass);
        assert!(channel.update(0));
        assert!(channel.is_empty());
    }

    #[test]
    fn test_single_loop_starts_on_first_beat() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        assert!(channel.active().is_none());

        channel.update(3);
        assert_eq!(channel.active().map(|c| c.id()), Some(LoopId(1)));
        assert_eq!(channel.active().unwrap().current_beat_in_region(), 1);
    }

    #[test]
    fn test_single_loop_never_evicts_itself() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        for beat in 0..40 {
            channel.update(beat % 16);
        }
        assert_eq!(channel.len(), 1);
        assert_eq!(playing_ids(&channel), vec![LoopId(1)]);
    }

    #[test]
    fn test_repeated_beat_is_ignored() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        assert!(channel.update(5));
        assert!(!channel.update(5));
        assert_eq!(channel.active().unwrap().current_beat_in_region(), 1);
    }

    #[test]
    fn test_replacement_waits_for_beat_boundary() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        channel.update(0);

        // Dropped mid-beat: the old loop keeps playing
        channel.add(bass_loop(2, None)).unwrap();
        channel.update(0);
        channel.update(0);
        assert_eq!(channel.len(), 2);
        assert_eq!(playing_ids(&channel), vec![LoopId(1)]);

        channel.update(1);
        assert_eq!(channel.len(), 1);
        assert_eq!(playing_ids(&channel), vec![LoopId(2)]);
    }

    #[test]
    fn test_remove_if_stops_active_loop() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        channel.update(0);

        let removed = channel.remove_if(|cookable| cookable.id() == LoopId(1));
        assert_eq!(removed, vec![LoopId(1)]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_remove_expired() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, Some(1_000))).unwrap();
        channel.add(bass_loop(2, None)).unwrap();

        assert!(channel.remove_expired(1_000).is_empty());
        assert_eq!(channel.remove_expired(1_001), vec![LoopId(1)]);
        assert_eq!(channel.len(), 1);
        assert!(channel.get(LoopId(2)).is_some());
    }

    #[test]
    fn test_apply_gain_reaches_every_loop() {
        let mut channel = Channel::new(LoopCategory::Bass);
        channel.add(bass_loop(1, None)).unwrap();
        channel.add(bass_loop(2, None)).unwrap();
        channel.apply_gain(0.4);
        for cookable in channel.iter() {
            assert_eq!(cookable.applied_gain(), 0.4);
        }
    }

    #[test]
    fn test_add_rejects_other_category() {
        let mut channel = Channel::new(LoopCategory::Lead);
        let err = channel.add(bass_loop(1, None)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(channel.is_empty());
    }
}
