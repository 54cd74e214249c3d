//! Score, combo, and level state
//!
//! All timing here runs on the session clock (accumulated delta time), so
//! the engine is deterministic given the same slice/tick sequence. Points
//! for a slice are computed in a fixed order: base value (special bonus or
//! category), times the current level, times the combo multiplier, floored
//! to an integer at the end.

use crate::config::ScoreTuning;
use crate::game::target::{FoodCategory, FoodKind};

/// Point breakdown for one slice, returned to the caller so the UI never
/// has to re-derive it
#[derive(Debug, Clone, Copy)]
pub struct SliceScore {
    /// Final points after all multipliers
    pub points: u32,
    /// Streak length including this slice
    pub combo: u32,
    /// Combo multiplier that was applied (1.0 when the streak is fresh)
    pub multiplier: f32,
    pub level: u32,
    pub category: FoodCategory,
}

/// Scoring state machine for one session
#[derive(Debug)]
pub struct ScoreEngine {
    score: u32,
    level: u32,
    combo: u32,
    slices: u32,
    elapsed: f64,
    /// Session time of the last slice; None means no live streak
    last_slice_at: Option<f64>,
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            combo: 0,
            slices: 0,
            elapsed: 0.0,
            last_slice_at: None,
        }
    }

    /// Score one slice and return its breakdown
    pub fn record_slice(&mut self, kind: FoodKind, tuning: &ScoreTuning) -> SliceScore {
        self.combo += 1;
        self.slices += 1;
        self.last_slice_at = Some(self.elapsed);

        let base = tuning.base_points(kind);
        let leveled = base.saturating_mul(self.level);

        // The first slice of a streak gets no bonus; from the second on the
        // multiplier grows per step up to the cap
        let multiplier = if self.combo > 1 {
            let raw = 1.0 + (self.combo - 1) as f64 * tuning.combo_step as f64;
            raw.min(tuning.combo_cap as f64)
        } else {
            1.0
        };
        let points = (leveled as f64 * multiplier).floor() as u32;

        self.score = self.score.saturating_add(points);
        SliceScore {
            points,
            combo: self.combo,
            multiplier: multiplier as f32,
            level: self.level,
            category: kind.category(),
        }
    }

    /// Advance session time. Returns the new level when a boundary was
    /// crossed this tick.
    ///
    /// A negative delta (clock anomaly upstream) contributes nothing rather
    /// than winding the session backwards.
    pub fn tick(&mut self, dt: f32, tuning: &ScoreTuning) -> Option<u32> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt as f64;

        if let Some(last) = self.last_slice_at {
            if self.elapsed - last > tuning.combo_timeout_secs {
                // Streak is dead. Clearing the timestamp makes the reset a
                // one-time transition instead of firing every tick after.
                self.combo = 0;
                self.last_slice_at = None;
            }
        }

        let level = (self.elapsed / tuning.level_period_secs).floor() as u32 + 1;
        if level > self.level {
            self.level = level;
            Some(level)
        } else {
            None
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn slices(&self) -> u32 {
        self.slices
    }

    /// Accumulated session time in seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Back to the start-of-session state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
