//! Fingertip tracking: world positions and smoothed velocities
//!
//! Each frame the tracker maps index fingertips into world space and keeps a
//! short history of instantaneous speeds per fingertip. The smoothed value
//! (mean over the window) is what the slice detector gates on; raw
//! frame-to-frame speed is far too jittery to threshold directly.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use crate::config::{TrackerTuning, ViewMapping};
use crate::hand::landmarks::{HandDetection, Handedness};
use crate::math::Vec3;

/// Samples retained per fingertip for velocity smoothing
pub const VELOCITY_WINDOW: usize = 5;

/// Identifies one tracked fingertip across frames.
///
/// `hand_slot` is the hand's position in the detector's frame output, not a
/// persistent hand identity; if hands swap order between frames the tracks
/// swap with them, which in practice the smoothing window absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FingertipId {
    pub hand_slot: u8,
    pub landmark: u8,
}

impl std::fmt::Display for FingertipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.hand_slot, self.landmark)
    }
}

/// Live state for one fingertip
#[derive(Debug, Clone)]
pub struct Fingertip {
    pub id: FingertipId,
    /// World-space position after mirroring/flipping/depth scaling
    pub world: Vec3,
    /// Frame-to-frame speed in world units/s
    pub raw_velocity: f32,
    /// Mean speed over the smoothing window; the value the gate reads
    pub smoothed_velocity: f32,
    pub handedness: Handedness,
    window: VecDeque<f32>,
}

impl Fingertip {
    fn new(id: FingertipId, world: Vec3, handedness: Handedness) -> Self {
        // A fingertip that just appeared has no motion history. Seed the
        // window with zero so it cannot slice on its first frame no matter
        // where it materialized.
        let mut window = VecDeque::with_capacity(VELOCITY_WINDOW);
        window.push_back(0.0);
        Self {
            id,
            world,
            raw_velocity: 0.0,
            smoothed_velocity: 0.0,
            handedness,
            window,
        }
    }

    fn observe(&mut self, world: Vec3, dt: f32) {
        // Without a usable time step there is no speed to measure
        let raw = if dt > f32::EPSILON {
            self.world.distance(world) / dt
        } else {
            0.0
        };
        self.world = world;
        self.raw_velocity = raw;
        self.window.push_back(raw);
        while self.window.len() > VELOCITY_WINDOW {
            self.window.pop_front();
        }
        self.smoothed_velocity = self.window.iter().sum::<f32>() / self.window.len() as f32;
    }
}

/// Tracks index fingertips across frames.
///
/// Tracks live exactly as long as the detector reports them: an id absent
/// from a frame is dropped immediately, so stale positions never linger as
/// phantom blades. Iteration order is stable (hand slot 0 first), which
/// makes slice resolution deterministic when two fingertips contest one
/// target.
#[derive(Debug, Default)]
pub struct FingertipTracker {
    tips: BTreeMap<FingertipId, Fingertip>,
    hand_count: usize,
}

impl FingertipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one frame of detections
    pub fn update(
        &mut self,
        hands: &[HandDetection],
        view: &ViewMapping,
        tuning: &TrackerTuning,
        dt: f32,
    ) {
        let mut seen: Vec<FingertipId> = Vec::with_capacity(tuning.max_hands);
        let mut hand_count = 0;

        for (slot, hand) in hands.iter().take(tuning.max_hands).enumerate() {
            if hand.confidence < tuning.min_confidence {
                continue;
            }
            hand_count += 1;

            let id = FingertipId {
                hand_slot: slot as u8,
                landmark: crate::hand::landmarks::landmark_ids::INDEX_FINGER_TIP as u8,
            };
            let world = view.to_world(hand.index_tip().to_vec3());

            match self.tips.get_mut(&id) {
                Some(tip) => {
                    tip.handedness = hand.handedness;
                    tip.observe(world, dt);
                }
                None => {
                    self.tips.insert(id, Fingertip::new(id, world, hand.handedness));
                }
            }
            seen.push(id);
        }

        self.tips.retain(|id, _| seen.contains(id));
        self.hand_count = hand_count;
    }

    pub fn get(&self, id: FingertipId) -> Option<&Fingertip> {
        self.tips.get(&id)
    }

    /// Fingertips in stable id order
    pub fn iter(&self) -> impl Iterator<Item = &Fingertip> {
        self.tips.values()
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    /// Hands accepted from the most recent frame (after the cap and the
    /// confidence filter)
    pub fn hand_count(&self) -> usize {
        self.hand_count
    }

    pub fn clear(&mut self) {
        self.tips.clear();
        self.hand_count = 0;
    }
}
