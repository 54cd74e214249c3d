//! Frame events produced by the interaction core
//!
//! The core never draws, plays audio, or mutates presentation state.
//! Instead every noteworthy thing that happens during an update lands in a
//! queue here, and the embedding layer drains what it cares about after the
//! frame: slices feed scoring popups and particles, touches feed subtle
//! feedback, awards feed the score HUD.

use crate::game::target::{FoodCategory, FoodKind, TargetId};
use crate::hand::landmarks::Handedness;
use crate::hand::tracker::FingertipId;
use crate::math::Vec3;

/// A queue for events of a single type, collected during an update and
/// drained by the embedder afterwards
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate without consuming; useful when two listeners read one queue
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All queues the core can fill in one update.
///
/// Queues are cleared at the start of each update, so anything still here
/// after `GameSession::update` happened on this frame.
#[derive(Debug, Default)]
pub struct Events {
    /// A fingertip cut a target fast enough to destroy it
    pub slices: EventQueue<SliceEvent>,

    /// A fingertip rested inside a target below the slice speed
    pub touches: EventQueue<TouchEvent>,

    /// Points granted for a slice, after level and combo multipliers
    pub awards: EventQueue<SliceAward>,

    /// The session crossed a level boundary this frame
    pub level_ups: EventQueue<LevelUpEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every queue. The session calls this at the top of each update.
    pub fn clear_all(&mut self) {
        self.slices.clear();
        self.touches.clear();
        self.awards.clear();
        self.level_ups.clear();
    }
}

// =============================================================================
// Event types
// =============================================================================

/// A target was sliced.
///
/// The event is the removal request: the session takes the target out of
/// the live set when it processes the queue, and the detector's cooldown
/// record covers the gap in case a consumer defers that removal.
#[derive(Debug, Clone, Copy)]
pub struct SliceEvent {
    pub target: TargetId,
    /// Kind and category, copied out since the target will be gone
    pub kind: FoodKind,
    pub category: FoodCategory,
    /// The fingertip that cut it
    pub fingertip: FingertipId,
    pub handedness: Handedness,
    /// Target world position at the moment of the cut (for VFX)
    pub position: Vec3,
    /// Smoothed speed that passed the gate
    pub velocity: f32,
}

/// A fingertip overlapped a target too slowly to slice it
#[derive(Debug, Clone, Copy)]
pub struct TouchEvent {
    pub target: TargetId,
    pub kind: FoodKind,
    pub category: FoodCategory,
    pub fingertip: FingertipId,
    pub handedness: Handedness,
    pub position: Vec3,
    /// Smoothed speed at contact, below the slice threshold
    pub velocity: f32,
}

/// Points granted for one slice
#[derive(Debug, Clone, Copy)]
pub struct SliceAward {
    pub target: TargetId,
    pub kind: FoodKind,
    pub category: FoodCategory,
    /// Final points after level and combo multipliers
    pub points: u32,
    /// Streak length at the moment of the award
    pub combo: u32,
    /// Combo multiplier that was applied
    pub multiplier: f32,
    /// Level the award was scored at
    pub level: u32,
    /// Where to show the popup
    pub position: Vec3,
}

/// The session entered a new level
#[derive(Debug, Clone, Copy)]
pub struct LevelUpEvent {
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_drain_clears() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        queue.send(7);
        queue.send(9);
        assert_eq!(queue.len(), 2);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![7, 9]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_all_empties_every_queue() {
        let mut events = Events::new();
        events.level_ups.send(LevelUpEvent { level: 2 });
        events.awards.send(SliceAward {
            target: TargetId(0),
            kind: FoodKind::Apple,
            category: FoodCategory::Fruit,
            points: 10,
            combo: 1,
            multiplier: 1.0,
            level: 1,
            position: Vec3::ZERO,
        });

        events.clear_all();
        assert!(events.level_ups.is_empty());
        assert!(events.awards.is_empty());
    }
}
