//! Vector and bounding-volume math for the interaction core
//!
//! World space is right-handed with the camera at the origin: +x to the
//! player's right (after mirroring), +y up, +z toward the player. Targets
//! and fingertips live in this space; all collision work happens on
//! axis-aligned boxes.

use std::ops::{Add, Sub, Mul};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).len()
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// All components are finite (rejects NaN and infinities)
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// Axis-aligned bounding box in world space.
///
/// An empty box (any `min` component greater than its `max` counterpart)
/// contains nothing; this is the representation for targets whose extents
/// are not yet known, so they fail every containment test instead of
/// erroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The canonical empty box: inverted infinite bounds
    pub const EMPTY: Aabb = Aabb {
        min: Vec3 { x: f32::INFINITY, y: f32::INFINITY, z: f32::INFINITY },
        max: Vec3 { x: f32::NEG_INFINITY, y: f32::NEG_INFINITY, z: f32::NEG_INFINITY },
    };

    /// Build from a center point and per-axis half extents.
    ///
    /// Degenerate extents (any component not strictly positive, or any
    /// non-finite input) yield `EMPTY` rather than a zero-volume box, so a
    /// target mid-spawn can never be hit.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        if !center.is_finite() || !half_extents.is_finite() {
            return Aabb::EMPTY;
        }
        if half_extents.x <= 0.0 || half_extents.y <= 0.0 || half_extents.z <= 0.0 {
            return Aabb::EMPTY;
        }
        Aabb {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Point containment test (inclusive bounds)
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Expand by a scalar margin on every side (additive, world units).
    ///
    /// Expanding an empty box keeps it empty: infinite bounds swallow any
    /// finite margin.
    pub fn expanded(&self, margin: f32) -> Aabb {
        let m = Vec3::new(margin, margin, margin);
        Aabb {
            min: self.min - m,
            max: self.max + m,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max).scale(0.5)
    }
}
