//! SLICECAM: webcam fruit slicing, the game logic half
//!
//! The interaction core of an AR slicing game: hand landmarks come in from
//! a detector once per frame, fingertips get mapped into world space with
//! smoothed velocities, fast fingertips cut falling food, and a score
//! engine keeps the combo and level math honest. Everything is synchronous,
//! single-threaded, and driven by injected time, so the whole pipeline runs
//! identically under a render loop or inside a test.
//!
//! Camera capture, the landmark model, rendering, and audio all live
//! outside this crate; they talk to it through [`hand::LandmarkSource`],
//! the target set, and the per-frame event queues.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod game;
pub mod hand;
pub mod math;

pub use config::{ConfigError, Tuning};
pub use game::{Events, FoodCategory, FoodKind, GameSession, ScoreEngine, SliceDetector, TargetId, TargetSet};
pub use hand::{FingertipTracker, HandDetection, Handedness, LandmarkSource};
pub use math::{Aabb, Vec3};
