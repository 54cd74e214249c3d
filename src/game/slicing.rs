//! Slice detection: fingertip-versus-target collision with a velocity gate
//!
//! Per target the life of a contact is: idle, then a fingertip inside the
//! expanded volume at gate speed slices it, then the target sits in cooldown
//! until the record expires (by which point the session has normally removed
//! it). Contacts below gate speed are touches: reported for feedback, never
//! scored, never destructive.
//!
//! The detector owns two id-keyed maps. The volume cache holds each
//! target's expanded bounds for a short lifetime so per-frame recomputation
//! stays bounded with many targets. The cooldown map holds one
//! [`SliceRecord`] per recently sliced target; while a record is live the
//! target is invisible to collision testing. Removal of sliced targets is
//! the session's job, driven by the emitted events; the detector never
//! assumes it happened.

use std::collections::HashMap;
use crate::config::SliceTuning;
use crate::game::events::{Events, SliceEvent, TouchEvent};
use crate::game::target::{Target, TargetId, TargetSet};
use crate::hand::landmarks::Handedness;
use crate::hand::tracker::{FingertipId, FingertipTracker};
use crate::math::Aabb;

/// Cooldown marker for a freshly sliced target
#[derive(Debug, Clone, Copy)]
pub struct SliceRecord {
    /// When the slice landed
    pub sliced_at: f64,
    /// Which fingertip performed it
    pub fingertip: FingertipId,
    pub handedness: Handedness,
}

#[derive(Debug, Clone, Copy)]
struct CachedVolume {
    bounds: Aabb,
    computed_at: f64,
}

/// Detects slices and touches between tracked fingertips and live targets
#[derive(Debug)]
pub struct SliceDetector {
    volume_cache: HashMap<TargetId, CachedVolume>,
    cooldowns: HashMap<TargetId, SliceRecord>,
    status: String,
    /// Print per-contact debug lines to stdout
    pub debug_log: bool,
}

impl SliceDetector {
    pub fn new() -> Self {
        Self {
            volume_cache: HashMap::new(),
            cooldowns: HashMap::new(),
            status: "idle".to_string(),
            debug_log: false,
        }
    }

    /// Run one frame of collision testing.
    ///
    /// Targets in cooldown are skipped outright. Each remaining target can
    /// produce at most one event this frame: the first fingertip (stable
    /// iteration order) that clears the gate slices it and later fingertips
    /// never see it; slower contacts each report a touch. One fast fingertip
    /// may slice several targets in the same frame.
    pub fn update(
        &mut self,
        tracker: &FingertipTracker,
        targets: &TargetSet,
        tuning: &SliceTuning,
        now: f64,
        events: &mut Events,
    ) {
        // Expired cooldowns and volumes of departed targets are dropped
        // up front so neither map grows with session length
        let cooldown = tuning.slice_cooldown_secs;
        self.cooldowns.retain(|_, rec| now - rec.sliced_at < cooldown);
        self.volume_cache.retain(|id, _| targets.get(*id).is_some());

        let mut sliced_this_frame: Vec<TargetId> = Vec::new();

        for tip in tracker.iter() {
            for target in targets.iter() {
                if self.cooldowns.contains_key(&target.id)
                    || sliced_this_frame.contains(&target.id)
                {
                    continue;
                }

                let bounds = self.bounds_for(target, tuning, now);
                if !bounds.contains(tip.world) {
                    continue;
                }

                if tip.smoothed_velocity >= tuning.slice_velocity {
                    self.cooldowns.insert(target.id, SliceRecord {
                        sliced_at: now,
                        fingertip: tip.id,
                        handedness: tip.handedness,
                    });
                    sliced_this_frame.push(target.id);
                    self.status = format!(
                        "slice {} at {:.1} u/s",
                        target.kind.label(),
                        tip.smoothed_velocity
                    );
                    if self.debug_log {
                        println!(
                            "SLICE | target={} | kind={:?} | tip={} | vel={:.2}",
                            target.id, target.kind, tip.id, tip.smoothed_velocity
                        );
                    }
                    events.slices.send(SliceEvent {
                        target: target.id,
                        kind: target.kind,
                        category: target.kind.category(),
                        fingertip: tip.id,
                        handedness: tip.handedness,
                        position: target.position,
                        velocity: tip.smoothed_velocity,
                    });
                } else {
                    self.status = format!(
                        "touch {} at {:.1} u/s",
                        target.kind.label(),
                        tip.smoothed_velocity
                    );
                    if self.debug_log {
                        println!(
                            "TOUCH | target={} | kind={:?} | tip={} | vel={:.2}",
                            target.id, target.kind, tip.id, tip.smoothed_velocity
                        );
                    }
                    events.touches.send(TouchEvent {
                        target: target.id,
                        kind: target.kind,
                        category: target.kind.category(),
                        fingertip: tip.id,
                        handedness: tip.handedness,
                        position: target.position,
                        velocity: tip.smoothed_velocity,
                    });
                }
            }
        }
    }

    /// Expanded bounds for a target, reusing the cached volume while it is
    /// fresh enough
    fn bounds_for(&mut self, target: &Target, tuning: &SliceTuning, now: f64) -> Aabb {
        if let Some(cached) = self.volume_cache.get(&target.id) {
            if now - cached.computed_at <= tuning.volume_cache_secs {
                return cached.bounds;
            }
        }
        let bounds = target.bounds().expanded(tuning.margin_for(target.kind));
        self.volume_cache.insert(target.id, CachedVolume { bounds, computed_at: now });
        bounds
    }

    /// Human-readable description of the most recent contact
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Cooldown record for a target, if one is still live
    pub fn cooldown_record(&self, id: TargetId) -> Option<&SliceRecord> {
        self.cooldowns.get(&id)
    }

    pub fn active_cooldowns(&self) -> usize {
        self.cooldowns.len()
    }

    /// Drop all per-target state (cooldowns and cached volumes)
    pub fn clear(&mut self) {
        self.volume_cache.clear();
        self.cooldowns.clear();
        self.status = "idle".to_string();
    }
}

impl Default for SliceDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TrackerTuning, ViewMapping};
    use crate::game::target::FoodKind;
    use crate::hand::landmarks::{landmark_ids, HandDetection, Landmark, LANDMARK_COUNT};
    use crate::math::Vec3;

    fn test_view() -> ViewMapping {
        ViewMapping { half_width: 5.0, half_height: 5.0, depth_scale: 1.0 }
    }

    /// Invert the view mapping so tests can place fingertips in world space
    fn hand_at_world(view: &ViewMapping, world: Vec3) -> HandDetection {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[landmark_ids::INDEX_FINGER_TIP] = Landmark::new(
            0.5 - world.x / (2.0 * view.half_width),
            0.5 - world.y / (2.0 * view.half_height),
            world.z / view.depth_scale,
        );
        HandDetection::new(landmarks, Handedness::Right, 0.9)
    }

    /// Drive a tracker so its single fingertip ends at `end` moving at
    /// `step / dt` world units per second
    fn swiping_tracker(view: &ViewMapping, end: Vec3, step: f32, dt: f32, frames: usize) -> FingertipTracker {
        let tuning = TrackerTuning::default();
        let mut tracker = FingertipTracker::new();
        for i in (0..frames).rev() {
            let pos = Vec3::new(end.x - step * i as f32, end.y, end.z);
            tracker.update(&[hand_at_world(view, pos)], view, &tuning, dt);
        }
        tracker
    }

    /// A fingertip parked at `pos`, smoothed velocity zero
    fn resting_tracker(view: &ViewMapping, pos: Vec3) -> FingertipTracker {
        swiping_tracker(view, pos, 0.0, 0.1, 3)
    }

    #[test]
    fn test_fast_swipe_slices() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        let id = targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3));

        // 1.0 world units per 0.1s frame: 10 u/s, well over the gate
        let tracker = swiping_tracker(&view, Vec3::ZERO, 1.0, 0.1, 6);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &tuning, 1.0, &mut events);

        assert_eq!(events.slices.len(), 1);
        assert!(events.touches.is_empty());
        let slice = events.slices.iter().next().unwrap();
        assert_eq!(slice.target, id);
        assert_eq!(slice.kind, FoodKind::Apple);
        assert!(slice.velocity >= tuning.slice_velocity);
        assert!(detector.cooldown_record(id).is_some());
        assert!(detector.status().starts_with("slice"));
    }

    #[test]
    fn test_slow_contact_is_a_touch_no_matter_how_long() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3));

        let tracker = resting_tracker(&view, Vec3::ZERO);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();

        // Dwell inside the volume for many frames
        for frame in 0..20 {
            events.clear_all();
            detector.update(&tracker, &targets, &tuning, frame as f64 * 0.1, &mut events);
            assert!(events.slices.is_empty());
            assert_eq!(events.touches.len(), 1);
        }
        assert!(detector.status().starts_with("touch"));
    }

    #[test]
    fn test_cooldown_blocks_a_second_slice() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        let id = targets.spawn(FoodKind::Banana, Vec3::ZERO, Vec3::new(0.4, 0.3, 0.3));

        let tracker = swiping_tracker(&view, Vec3::ZERO, 1.0, 0.1, 6);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();

        detector.update(&tracker, &targets, &tuning, 1.0, &mut events);
        assert_eq!(events.slices.len(), 1);

        // The session normally removes the target here; simulate a consumer
        // that has not done so yet. Still inside the cooldown window, the
        // same fast fingertip must not slice again, or even touch.
        events.clear_all();
        detector.update(&tracker, &targets, &tuning, 1.2, &mut events);
        assert!(events.slices.is_empty());
        assert!(events.touches.is_empty());
        assert!(detector.cooldown_record(id).is_some());
    }

    #[test]
    fn test_cooldown_record_expires() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        let id = targets.spawn(FoodKind::Banana, Vec3::ZERO, Vec3::new(0.4, 0.3, 0.3));

        let tracker = swiping_tracker(&view, Vec3::ZERO, 1.0, 0.1, 6);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &tuning, 1.0, &mut events);
        assert_eq!(detector.active_cooldowns(), 1);

        // Past the window the record is purged on the next update
        events.clear_all();
        let empty = FingertipTracker::new();
        detector.update(&empty, &targets, &tuning, 1.0 + tuning.slice_cooldown_secs + 0.01, &mut events);
        assert!(detector.cooldown_record(id).is_none());
        assert_eq!(detector.active_cooldowns(), 0);
    }

    #[test]
    fn test_volume_cache_serves_stale_bounds_briefly() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        let id = targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3));

        let tracker = resting_tracker(&view, Vec3::ZERO);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();

        // First contact computes and caches the volume at the origin
        detector.update(&tracker, &targets, &tuning, 0.0, &mut events);
        assert_eq!(events.touches.len(), 1);

        // Teleport the target far away; within the cache lifetime the stale
        // volume still covers the fingertip
        targets.get_mut(id).unwrap().position = Vec3::new(3.0, 3.0, 0.0);
        events.clear_all();
        detector.update(&tracker, &targets, &tuning, 0.05, &mut events);
        assert_eq!(events.touches.len(), 1);

        // Once the cache goes stale the recomputed volume is elsewhere
        events.clear_all();
        detector.update(&tracker, &targets, &tuning, 0.25, &mut events);
        assert!(events.touches.is_empty());
    }

    #[test]
    fn test_margin_expands_the_hit_volume() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        // Raw half-extent 0.2; default margin 0.25 reaches out to 0.45
        targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.2, 0.2, 0.2));

        let mut detector = SliceDetector::new();
        let mut events = Events::new();

        // Outside the raw bounds but inside the margin
        let tracker = resting_tracker(&view, Vec3::new(0.4, 0.0, 0.0));
        detector.update(&tracker, &targets, &tuning, 0.0, &mut events);
        assert_eq!(events.touches.len(), 1);

        // Beyond the margin there is no contact at all
        let tracker = resting_tracker(&view, Vec3::new(0.5, 0.0, 0.0));
        let mut detector = SliceDetector::new();
        events.clear_all();
        detector.update(&tracker, &targets, &tuning, 0.0, &mut events);
        assert!(events.touches.is_empty());
    }

    #[test]
    fn test_degenerate_volume_never_collides() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::ZERO);

        let tracker = swiping_tracker(&view, Vec3::ZERO, 1.0, 0.1, 6);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &tuning, 0.0, &mut events);

        assert!(events.slices.is_empty());
        assert!(events.touches.is_empty());
    }

    #[test]
    fn test_two_fingertips_slice_two_targets_in_one_frame() {
        let view = test_view();
        let slice_tuning = SliceTuning::default();
        let track_tuning = TrackerTuning::default();
        let mut targets = TargetSet::new();
        let a = targets.spawn(FoodKind::Apple, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(0.3, 0.3, 0.3));
        let b = targets.spawn(FoodKind::Donut, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.3, 0.3, 0.3));

        // Two hands swiping in parallel, one ending on each target
        let mut tracker = FingertipTracker::new();
        for i in (0..6).rev() {
            let offset = i as f32 * 1.0;
            let hands = vec![
                hand_at_world(&view, Vec3::new(-2.0 - offset, 0.0, 0.0)),
                hand_at_world(&view, Vec3::new(2.0 - offset, 0.0, 0.0)),
            ];
            tracker.update(&hands, &view, &track_tuning, 0.1);
        }

        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &slice_tuning, 1.0, &mut events);

        assert_eq!(events.slices.len(), 2);
        let sliced: Vec<TargetId> = events.slices.iter().map(|s| s.target).collect();
        assert!(sliced.contains(&a));
        assert!(sliced.contains(&b));
    }

    #[test]
    fn test_one_slice_per_target_per_frame() {
        let view = test_view();
        let slice_tuning = SliceTuning::default();
        let track_tuning = TrackerTuning::default();
        let mut targets = TargetSet::new();
        targets.spawn(FoodKind::Watermelon, Vec3::ZERO, Vec3::new(0.5, 0.4, 0.5));

        // Both hands converge fast on the same target
        let mut tracker = FingertipTracker::new();
        for i in (0..6).rev() {
            let offset = i as f32 * 1.0;
            let hands = vec![
                hand_at_world(&view, Vec3::new(-offset, 0.0, 0.0)),
                hand_at_world(&view, Vec3::new(offset, 0.0, 0.0)),
            ];
            tracker.update(&hands, &view, &track_tuning, 0.1);
        }

        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &slice_tuning, 1.0, &mut events);

        assert_eq!(events.slices.len(), 1);
        // Stable iteration order means the first hand slot wins the contest
        assert_eq!(events.slices.iter().next().unwrap().fingertip.hand_slot, 0);
    }

    #[test]
    fn test_clear_resets_detector_state() {
        let view = test_view();
        let tuning = SliceTuning::default();
        let mut targets = TargetSet::new();
        targets.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3));

        let tracker = swiping_tracker(&view, Vec3::ZERO, 1.0, 0.1, 6);
        let mut detector = SliceDetector::new();
        let mut events = Events::new();
        detector.update(&tracker, &targets, &tuning, 1.0, &mut events);
        assert_eq!(detector.active_cooldowns(), 1);

        detector.clear();
        assert_eq!(detector.active_cooldowns(), 0);
        assert_eq!(detector.status(), "idle");
    }
}
