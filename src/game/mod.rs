//! Game logic: targets, slice detection, scoring, and the session loop
//!
//! Data flows one way each frame: tracked fingertips are tested against the
//! live targets, slice events feed the score engine, and everything worth
//! presenting lands in the outbound event queues. No module here draws or
//! reads a clock; the embedder supplies time and consumes events.

pub mod events;
pub mod score;
pub mod session;
pub mod slicing;
pub mod target;

pub use events::{Events, LevelUpEvent, SliceAward, SliceEvent, TouchEvent};
pub use score::{ScoreEngine, SliceScore};
pub use session::GameSession;
pub use slicing::{SliceDetector, SliceRecord};
pub use target::{FoodCategory, FoodKind, Target, TargetId, TargetSet};
