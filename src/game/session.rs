//! The per-frame session loop
//!
//! `GameSession` owns every core component and runs them in the one order
//! that is correct: poll the landmark source, update fingertip tracking,
//! run slice detection, apply slice events to the target set and the score,
//! then tick session time. Presentation code calls [`GameSession::update`]
//! once per frame and drains [`Events`] afterwards; it never reaches into
//! the components directly.
//!
//! Time is injected. `now` is a monotonic timestamp in seconds shared with
//! the cooldown and cache logic; `dt` is the seconds since the previous
//! frame. Nothing in here reads a clock, which is what makes the whole
//! pipeline scriptable in tests.

use crate::config::Tuning;
use crate::game::events::{Events, LevelUpEvent, SliceAward, SliceEvent};
use crate::game::score::ScoreEngine;
use crate::game::slicing::SliceDetector;
use crate::game::target::{FoodKind, TargetId, TargetSet};
use crate::hand::landmarks::LandmarkSource;
use crate::hand::tracker::{Fingertip, FingertipTracker};
use crate::math::Vec3;

/// One interactive slicing session: tracker, detector, score, targets
pub struct GameSession {
    pub tuning: Tuning,
    tracker: FingertipTracker,
    detector: SliceDetector,
    score: ScoreEngine,
    /// Live targets. The spawner adds and expires entries between updates;
    /// the session removes sliced ones. Both removal paths are idempotent.
    pub targets: TargetSet,
    /// Outbound queues, refilled by each update
    pub events: Events,
    last_error: Option<String>,
    debug_log: bool,
}

impl GameSession {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            tracker: FingertipTracker::new(),
            detector: SliceDetector::new(),
            score: ScoreEngine::new(),
            targets: TargetSet::new(),
            events: Events::new(),
            last_error: None,
            debug_log: false,
        }
    }

    /// Run one frame of the core pipeline.
    ///
    /// A failing landmark source is contained here: the frame proceeds as
    /// if no hands were seen, the error is kept for read-back, and the
    /// tracker purges its history so nothing stale survives the outage.
    pub fn update(&mut self, source: &mut dyn LandmarkSource, now: f64, dt: f32) {
        self.events.clear_all();

        let hands = match source.poll() {
            Ok(hands) => hands,
            Err(e) => {
                if self.debug_log {
                    println!("SOURCE | error={}", e);
                }
                self.last_error = Some(e.to_string());
                Vec::new()
            }
        };

        self.tracker.update(&hands, &self.tuning.view, &self.tuning.tracker, dt);
        self.detector.update(&self.tracker, &self.targets, &self.tuning.slicing, now, &mut self.events);

        // Slice events double as removal requests: take each sliced target
        // out of the live set, then score it
        let slices: Vec<SliceEvent> = self.events.slices.iter().copied().collect();
        for slice in slices {
            self.targets.remove(slice.target);
            let scored = self.score.record_slice(slice.kind, &self.tuning.scoring);
            self.events.awards.send(SliceAward {
                target: slice.target,
                kind: slice.kind,
                category: scored.category,
                points: scored.points,
                combo: scored.combo,
                multiplier: scored.multiplier,
                level: scored.level,
                position: slice.position,
            });
        }

        // Exactly one time tick per frame, after event recording
        if let Some(level) = self.score.tick(dt, &self.tuning.scoring) {
            if self.debug_log {
                println!("LEVEL | now={} | level={}", now, level);
            }
            self.events.level_ups.send(LevelUpEvent { level });
        }
    }

    /// Spawn a target with its kind's baseline extents
    pub fn spawn(&mut self, kind: FoodKind, position: Vec3) -> TargetId {
        self.targets.spawn(kind, position, kind.default_half_extents())
    }

    /// Back to a fresh session: score zeroed, no targets, no tracked
    /// fingertips, no cooldowns, empty queues
    pub fn reset(&mut self) {
        self.score.reset();
        self.detector.clear();
        self.tracker.clear();
        self.targets.clear();
        self.events.clear_all();
        self.last_error = None;
    }

    /// Mirror the debug flag into every component that logs
    pub fn set_debug_log(&mut self, on: bool) {
        self.debug_log = on;
        self.detector.debug_log = on;
    }

    // ---- read-backs, all side-effect free ----

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn level(&self) -> u32 {
        self.score.level()
    }

    pub fn combo(&self) -> u32 {
        self.score.combo()
    }

    pub fn slices(&self) -> u32 {
        self.score.slices()
    }

    pub fn elapsed(&self) -> f64 {
        self.score.elapsed()
    }

    pub fn hand_count(&self) -> usize {
        self.tracker.hand_count()
    }

    pub fn fingertips(&self) -> impl Iterator<Item = &Fingertip> {
        self.tracker.iter()
    }

    /// Human-readable description of the most recent contact
    pub fn contact_status(&self) -> &str {
        self.detector.status()
    }

    /// Most recent landmark source failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use crate::hand::landmarks::{landmark_ids, HandDetection, Handedness, Landmark, SourceError, LANDMARK_COUNT};

    /// Plays back pre-built frames; empty once the script runs out
    struct ScriptedSource {
        frames: VecDeque<Result<Vec<HandDetection>, SourceError>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self { frames: VecDeque::new() }
        }

        fn push(&mut self, frame: Result<Vec<HandDetection>, SourceError>) {
            self.frames.push_back(frame);
        }
    }

    impl LandmarkSource for ScriptedSource {
        fn poll(&mut self) -> Result<Vec<HandDetection>, SourceError> {
            self.frames.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn hand_at_world(tuning: &Tuning, world: Vec3) -> HandDetection {
        let view = &tuning.view;
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[landmark_ids::INDEX_FINGER_TIP] = Landmark::new(
            0.5 - world.x / (2.0 * view.half_width),
            0.5 - world.y / (2.0 * view.half_height),
            world.z / view.depth_scale,
        );
        HandDetection::new(landmarks, Handedness::Right, 0.9)
    }

    /// A sweep ending on the world origin at 10 world units/s
    fn sweep_frames(tuning: &Tuning, frames: usize) -> ScriptedSource {
        let mut source = ScriptedSource::new();
        for i in (0..frames).rev() {
            let pos = Vec3::new(-(i as f32), 0.0, 0.0);
            source.push(Ok(vec![hand_at_world(tuning, pos)]));
        }
        source
    }

    #[test]
    fn test_sweep_slices_and_scores() {
        let mut session = GameSession::new(Tuning::default());
        session.spawn(FoodKind::Burger, Vec3::ZERO);

        let mut source = sweep_frames(&session.tuning, 5);
        for frame in 0..5 {
            session.update(&mut source, frame as f64 * 0.1, 0.1);
        }

        assert_eq!(session.slices(), 1);
        assert_eq!(session.score(), 60);
        assert_eq!(session.combo(), 1);
        assert!(session.targets.is_empty());
        assert_eq!(session.events.awards.len(), 1);
        let award = session.events.awards.iter().next().unwrap();
        assert_eq!(award.points, 60);
        assert_eq!(award.level, 1);
        assert!(session.contact_status().starts_with("slice"));
    }

    #[test]
    fn test_touch_leaves_target_and_score_alone() {
        let mut session = GameSession::new(Tuning::default());
        session.spawn(FoodKind::Apple, Vec3::ZERO);

        // A parked fingertip inside the target, frame after frame
        let mut source = ScriptedSource::new();
        for _ in 0..10 {
            source.push(Ok(vec![hand_at_world(&session.tuning, Vec3::ZERO)]));
        }
        let mut touches = 0;
        for frame in 0..10 {
            session.update(&mut source, frame as f64 * 0.1, 0.1);
            touches += session.events.touches.len();
        }

        assert!(touches > 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.slices(), 0);
        assert_eq!(session.targets.len(), 1);
    }

    #[test]
    fn test_source_failure_is_one_empty_frame() {
        let mut session = GameSession::new(Tuning::default());

        let mut source = ScriptedSource::new();
        source.push(Ok(vec![hand_at_world(&session.tuning, Vec3::ZERO)]));
        source.push(Err(SourceError("camera stalled".to_string())));
        source.push(Ok(vec![hand_at_world(&session.tuning, Vec3::new(2.0, 0.0, 0.0))]));

        session.update(&mut source, 0.0, 0.1);
        assert_eq!(session.hand_count(), 1);

        // The failing frame empties tracking but the loop keeps running
        session.update(&mut source, 0.1, 0.1);
        assert_eq!(session.hand_count(), 0);
        assert_eq!(session.fingertips().count(), 0);
        assert_eq!(session.last_error(), Some("landmark source error: camera stalled"));

        // Recovery is a cold start, not a continuation
        session.update(&mut source, 0.2, 0.1);
        let tip = session.fingertips().next().unwrap();
        assert_eq!(tip.smoothed_velocity, 0.0);
    }

    #[test]
    fn test_queues_hold_one_frame_only() {
        let mut session = GameSession::new(Tuning::default());
        session.spawn(FoodKind::Apple, Vec3::ZERO);

        let mut source = sweep_frames(&session.tuning, 5);
        for frame in 0..5 {
            session.update(&mut source, frame as f64 * 0.1, 0.1);
        }
        assert_eq!(session.events.slices.len(), 1);

        // The next update clears everything the embedder did not drain
        session.update(&mut source, 0.5, 0.1);
        assert!(session.events.slices.is_empty());
        assert!(session.events.awards.is_empty());
    }

    #[test]
    fn test_level_up_event_fires_once_per_boundary() {
        let mut session = GameSession::new(Tuning::default());
        let mut source = ScriptedSource::new();

        session.update(&mut source, 0.0, 30.0);
        assert_eq!(session.events.level_ups.len(), 1);
        assert_eq!(session.events.level_ups.iter().next().unwrap().level, 2);
        assert_eq!(session.level(), 2);

        session.update(&mut source, 30.0, 0.1);
        assert!(session.events.level_ups.is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = GameSession::new(Tuning::default());
        session.spawn(FoodKind::Burger, Vec3::ZERO);

        let mut source = sweep_frames(&session.tuning, 5);
        for frame in 0..5 {
            session.update(&mut source, frame as f64 * 0.1, 0.1);
        }
        assert!(session.score() > 0);

        session.reset();
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.combo(), 0);
        assert_eq!(session.slices(), 0);
        assert_eq!(session.elapsed(), 0.0);
        assert!(session.targets.is_empty());
        assert_eq!(session.fingertips().count(), 0);
        assert_eq!(session.contact_status(), "idle");
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_spawner_and_session_removals_coexist() {
        let mut session = GameSession::new(Tuning::default());
        let kept = session.spawn(FoodKind::Apple, Vec3::new(3.0, 0.0, 0.0));
        let sliced = session.spawn(FoodKind::Burger, Vec3::ZERO);

        let mut source = sweep_frames(&session.tuning, 5);
        for frame in 0..5 {
            session.update(&mut source, frame as f64 * 0.1, 0.1);
        }
        assert!(session.targets.get(sliced).is_none());
        assert!(session.targets.get(kept).is_some());

        // A spawner expiring the already-sliced id is a quiet no-op
        assert!(!session.targets.remove(sliced));
        assert!(session.targets.remove(kept));
    }
}
