//! Detector-facing hand data
//!
//! A hand detector (MediaPipe Hands or compatible) reports 21 landmarks per
//! hand in normalized image coordinates: x/y nominally in [0,1] with y down,
//! z a relative depth offset (negative toward the camera). The core never
//! talks to a camera; it consumes whatever frames a [`LandmarkSource`]
//! hands it.

use crate::math::Vec3;

/// Number of landmarks per detected hand
pub const LANDMARK_COUNT: usize = 21;

/// MediaPipe hand landmark indices
pub mod landmark_ids {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// One landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Which hand the detector believes it is looking at.
///
/// Detectors report this as a free-form label; parse it once at the
/// boundary and carry the closed enum everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("left") {
            Handedness::Left
        } else if label.eq_ignore_ascii_case("right") {
            Handedness::Right
        } else {
            Handedness::Unknown
        }
    }
}

impl Default for Handedness {
    fn default() -> Self {
        Handedness::Unknown
    }
}

/// One detected hand: 21 landmarks plus detector metadata
#[derive(Debug, Clone)]
pub struct HandDetection {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Detector confidence in [0,1]
    pub confidence: f32,
}

impl HandDetection {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness, confidence: f32) -> Self {
        Self { landmarks, handedness, confidence }
    }

    /// The index fingertip, the landmark the slice detector cares about
    pub fn index_tip(&self) -> Landmark {
        self.landmarks[landmark_ids::INDEX_FINGER_TIP]
    }
}

/// Error from a landmark source.
///
/// Detection runs outside the core (camera pipeline, ML runtime), so all
/// the core can do with a failure is report it and move on.
#[derive(Debug)]
pub struct SourceError(pub String);

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "landmark source error: {}", self.0)
    }
}

/// Anything that can produce hand detections once per frame.
///
/// Implementations wrap the real detector pipeline; tests and demos feed
/// scripted frames. A poll that fails must not take the session down; the
/// session treats an Err as an empty frame.
pub trait LandmarkSource {
    fn poll(&mut self) -> Result<Vec<HandDetection>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handedness_parsing() {
        assert_eq!(Handedness::from_label("Left"), Handedness::Left);
        assert_eq!(Handedness::from_label("right"), Handedness::Right);
        assert_eq!(Handedness::from_label("RIGHT"), Handedness::Right);
        assert_eq!(Handedness::from_label(""), Handedness::Unknown);
        assert_eq!(Handedness::from_label("both?"), Handedness::Unknown);
    }

    #[test]
    fn test_index_tip_reads_landmark_eight() {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[landmark_ids::INDEX_FINGER_TIP] = Landmark::new(0.3, 0.7, -0.1);
        let hand = HandDetection::new(landmarks, Handedness::Right, 0.9);
        assert_eq!(hand.index_tip(), Landmark::new(0.3, 0.7, -0.1));
    }
}
