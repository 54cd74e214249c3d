//! Hand input: detector-facing landmark types and fingertip tracking

pub mod landmarks;
pub mod tracker;

pub use landmarks::{HandDetection, Handedness, Landmark, LandmarkSource, SourceError};
pub use tracker::{Fingertip, FingertipId, FingertipTracker, VELOCITY_WINDOW};
