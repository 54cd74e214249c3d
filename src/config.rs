//! Session tuning: every knob the interaction core reads
//!
//! Uses RON (Rusty Object Notation) for a human-readable tuning file.
//! All values are validated on load so a bad file is rejected up front
//! instead of producing NaN velocities or negative cooldowns mid-session.
//! `Tuning::default()` is the shipped baseline and always validates.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::math::Vec3;
use crate::game::target::{FoodKind, FoodCategory};

/// Validation limits to keep a hand-edited tuning file inside sane bounds
pub mod limits {
    /// Maximum world half-extent for the view mapping
    pub const MAX_WORLD_EXTENT: f32 = 1000.0;
    /// Maximum point award per slice before multipliers
    pub const MAX_POINTS: u32 = 1_000_000;
    /// Maximum additive hit margin (world units)
    pub const MAX_MARGIN: f32 = 100.0;
    /// Maximum time window for cooldowns/timeouts (seconds)
    pub const MAX_SECONDS: f64 = 3600.0;
    /// Hard cap on simultaneously tracked hands
    pub const MAX_HANDS: usize = 2;
}

/// Error type for tuning load/save
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

// =============================================================================
// Tuning data
// =============================================================================

/// Camera-normalized → world-space mapping.
///
/// Detector landmarks arrive with x/y nominally in [0,1] (image space,
/// y down) and z as a relative depth offset. World mapping mirrors x so the
/// player's movement matches on-screen motion, flips y so up is up, and
/// scales depth. The scale constants are configuration, never derived from
/// the video stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewMapping {
    /// World half-width: normalized x spans [-half_width, +half_width]
    pub half_width: f32,
    /// World half-height: normalized y spans [-half_height, +half_height]
    pub half_height: f32,
    /// Multiplier applied to the raw relative depth value
    pub depth_scale: f32,
}

impl ViewMapping {
    /// Map one normalized landmark position into world space
    pub fn to_world(&self, norm: Vec3) -> Vec3 {
        Vec3::new(
            (0.5 - norm.x) * 2.0 * self.half_width,
            (0.5 - norm.y) * 2.0 * self.half_height,
            norm.z * self.depth_scale,
        )
    }
}

impl Default for ViewMapping {
    fn default() -> Self {
        Self {
            half_width: 4.0,
            half_height: 3.0,
            depth_scale: 2.0,
        }
    }
}

/// Fingertip tracking knobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerTuning {
    /// Hands processed per frame (detections beyond this are ignored)
    pub max_hands: usize,
    /// Hands below this detector confidence are skipped entirely
    pub min_confidence: f32,
}

impl Default for TrackerTuning {
    fn default() -> Self {
        Self {
            max_hands: 2,
            min_confidence: 0.5,
        }
    }
}

/// Slice detection knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceTuning {
    /// Minimum smoothed fingertip velocity (world units/s) for a contact to
    /// count as a slice; below this it is only a touch
    pub slice_velocity: f32,
    /// Seconds a freshly sliced target is excluded from collision testing
    pub slice_cooldown_secs: f64,
    /// Seconds a computed bounding volume is reused before recomputing
    pub volume_cache_secs: f64,
    /// Additive hit margin (world units per side) for kinds not listed below
    pub default_margin: f32,
    /// Per-kind margin overrides; awkward silhouettes get extra forgiveness
    pub margins: BTreeMap<FoodKind, f32>,
}

impl Default for SliceTuning {
    fn default() -> Self {
        let mut margins = BTreeMap::new();
        // Small items are hard to clip precisely; widen their hit volumes
        margins.insert(FoodKind::Sushi, 0.4);
        margins.insert(FoodKind::Donut, 0.4);
        margins.insert(FoodKind::Cup, 0.35);
        Self {
            slice_velocity: 6.0,
            slice_cooldown_secs: 0.5,
            volume_cache_secs: 0.1,
            default_margin: 0.25,
            margins,
        }
    }
}

impl SliceTuning {
    /// Margin for a kind, falling back to the documented default
    pub fn margin_for(&self, kind: FoodKind) -> f32 {
        self.margins.get(&kind).copied().unwrap_or(self.default_margin)
    }
}

/// Base points per food category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryPoints {
    pub fruit: u32,
    pub main_dish: u32,
    pub dessert: u32,
    pub tableware: u32,
}

impl CategoryPoints {
    pub fn for_category(&self, category: FoodCategory) -> u32 {
        match category {
            FoodCategory::Fruit => self.fruit,
            FoodCategory::MainDish => self.main_dish,
            FoodCategory::Dessert => self.dessert,
            FoodCategory::Tableware => self.tableware,
        }
    }
}

impl Default for CategoryPoints {
    fn default() -> Self {
        Self {
            fruit: 10,
            main_dish: 30,
            dessert: 20,
            tableware: 5,
        }
    }
}

/// Scoring, combo, and level knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTuning {
    /// Base points per category
    pub category_points: CategoryPoints,
    /// Per-kind overrides that replace (not add to) the category value
    pub special_bonus: BTreeMap<FoodKind, u32>,
    /// Seconds of session time per level step
    pub level_period_secs: f64,
    /// Combo multiplier growth per extra slice in the streak
    pub combo_step: f32,
    /// Upper bound on the combo multiplier
    pub combo_cap: f32,
    /// Maximum gap between slices (seconds) before the streak resets
    pub combo_timeout_secs: f64,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        let mut special_bonus = BTreeMap::new();
        special_bonus.insert(FoodKind::Burger, 60);
        special_bonus.insert(FoodKind::Cake, 50);
        Self {
            category_points: CategoryPoints::default(),
            special_bonus,
            level_period_secs: 30.0,
            combo_step: 0.1,
            combo_cap: 2.0,
            combo_timeout_secs: 2.0,
        }
    }
}

impl ScoreTuning {
    /// Base points for a slice: special bonus wins over the category table
    pub fn base_points(&self, kind: FoodKind) -> u32 {
        self.special_bonus
            .get(&kind)
            .copied()
            .unwrap_or_else(|| self.category_points.for_category(kind.category()))
    }
}

/// The full tuning tree consumed by the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tuning {
    pub view: ViewMapping,
    pub tracker: TrackerTuning,
    pub slicing: SliceTuning,
    pub scoring: ScoreTuning,
}

// =============================================================================
// Validation
// =============================================================================

/// Check that a float is a usable positive magnitude
fn is_valid_extent(f: f32) -> bool {
    f.is_finite() && f > 0.0 && f <= limits::MAX_WORLD_EXTENT
}

fn is_valid_window(secs: f64) -> bool {
    secs.is_finite() && secs >= 0.0 && secs <= limits::MAX_SECONDS
}

fn validate_view(view: &ViewMapping) -> Result<(), String> {
    if !is_valid_extent(view.half_width) {
        return Err(format!("view.half_width out of range: {}", view.half_width));
    }
    if !is_valid_extent(view.half_height) {
        return Err(format!("view.half_height out of range: {}", view.half_height));
    }
    if !view.depth_scale.is_finite() || view.depth_scale < 0.0 {
        return Err(format!("view.depth_scale must be finite and >= 0, got {}", view.depth_scale));
    }
    Ok(())
}

fn validate_tracker(tracker: &TrackerTuning) -> Result<(), String> {
    if tracker.max_hands == 0 || tracker.max_hands > limits::MAX_HANDS {
        return Err(format!(
            "tracker.max_hands must be 1..={}, got {}",
            limits::MAX_HANDS, tracker.max_hands
        ));
    }
    if !tracker.min_confidence.is_finite() || !(0.0..=1.0).contains(&tracker.min_confidence) {
        return Err(format!("tracker.min_confidence must be in [0,1], got {}", tracker.min_confidence));
    }
    Ok(())
}

fn validate_slicing(slicing: &SliceTuning) -> Result<(), String> {
    if !slicing.slice_velocity.is_finite() || slicing.slice_velocity < 0.0 {
        return Err(format!("slicing.slice_velocity must be finite and >= 0, got {}", slicing.slice_velocity));
    }
    if !is_valid_window(slicing.slice_cooldown_secs) || slicing.slice_cooldown_secs == 0.0 {
        return Err(format!("slicing.slice_cooldown_secs must be > 0, got {}", slicing.slice_cooldown_secs));
    }
    if !is_valid_window(slicing.volume_cache_secs) {
        return Err(format!("slicing.volume_cache_secs out of range: {}", slicing.volume_cache_secs));
    }
    let margin_ok = |m: f32| m.is_finite() && (0.0..=limits::MAX_MARGIN).contains(&m);
    if !margin_ok(slicing.default_margin) {
        return Err(format!("slicing.default_margin out of range: {}", slicing.default_margin));
    }
    for (kind, margin) in &slicing.margins {
        if !margin_ok(*margin) {
            return Err(format!("slicing.margins[{:?}] out of range: {}", kind, margin));
        }
    }
    Ok(())
}

fn validate_scoring(scoring: &ScoreTuning) -> Result<(), String> {
    let pts = &scoring.category_points;
    for (name, value) in [
        ("fruit", pts.fruit),
        ("main_dish", pts.main_dish),
        ("dessert", pts.dessert),
        ("tableware", pts.tableware),
    ] {
        if value > limits::MAX_POINTS {
            return Err(format!("scoring.category_points.{} too large: {}", name, value));
        }
    }
    for (kind, value) in &scoring.special_bonus {
        if *value > limits::MAX_POINTS {
            return Err(format!("scoring.special_bonus[{:?}] too large: {}", kind, value));
        }
    }
    if !scoring.level_period_secs.is_finite()
        || scoring.level_period_secs <= 0.0
        || scoring.level_period_secs > limits::MAX_SECONDS
    {
        return Err(format!("scoring.level_period_secs must be > 0, got {}", scoring.level_period_secs));
    }
    if !scoring.combo_step.is_finite() || scoring.combo_step < 0.0 {
        return Err(format!("scoring.combo_step must be finite and >= 0, got {}", scoring.combo_step));
    }
    if !scoring.combo_cap.is_finite() || scoring.combo_cap < 1.0 {
        return Err(format!("scoring.combo_cap must be >= 1, got {}", scoring.combo_cap));
    }
    if !is_valid_window(scoring.combo_timeout_secs) || scoring.combo_timeout_secs == 0.0 {
        return Err(format!("scoring.combo_timeout_secs must be > 0, got {}", scoring.combo_timeout_secs));
    }
    Ok(())
}

/// Validate a full tuning tree
pub fn validate_tuning(tuning: &Tuning) -> Result<(), ConfigError> {
    validate_view(&tuning.view).map_err(ConfigError::ValidationError)?;
    validate_tracker(&tuning.tracker).map_err(ConfigError::ValidationError)?;
    validate_slicing(&tuning.slicing).map_err(ConfigError::ValidationError)?;
    validate_scoring(&tuning.scoring).map_err(ConfigError::ValidationError)?;
    Ok(())
}

// =============================================================================
// Load / save
// =============================================================================

/// Parse and validate tuning from RON text
pub fn load_tuning_from_str(s: &str) -> Result<Tuning, ConfigError> {
    let tuning: Tuning = ron::from_str(s)?;
    validate_tuning(&tuning)?;
    Ok(tuning)
}

/// Load tuning from a RON file
pub fn load_tuning<P: AsRef<Path>>(path: P) -> Result<Tuning, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_tuning_from_str(&contents)
}

/// Serialize tuning to pretty RON text
pub fn serialize_tuning(tuning: &Tuning) -> Result<String, ConfigError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(tuning, config)?)
}

/// Save tuning to a RON file
pub fn save_tuning<P: AsRef<Path>>(tuning: &Tuning, path: P) -> Result<(), ConfigError> {
    let ron_string = serialize_tuning(tuning)?;
    fs::write(path, ron_string)?;
    Ok(())
}
