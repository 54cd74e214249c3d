//! Sliceable targets and the set the slice detector scans
//!
//! Targets are plain data: a kind, a world position, and half-extents.
//! How they move (falling, arcing, despawning) is the presentation layer's
//! business; the core only needs where they are on the frame it checks them.

use serde::{Serialize, Deserialize};
use crate::math::{Vec3, Aabb};

/// Scoring category a food kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodCategory {
    Fruit,
    MainDish,
    Dessert,
    Tableware,
}

/// Every sliceable kind the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Apple,
    Banana,
    Orange,
    Watermelon,
    Burger,
    Pizza,
    Sushi,
    Hotdog,
    Donut,
    Cake,
    IceCream,
    Plate,
    Cup,
    Fork,
}

impl FoodKind {
    pub const ALL: [FoodKind; 14] = [
        FoodKind::Apple,
        FoodKind::Banana,
        FoodKind::Orange,
        FoodKind::Watermelon,
        FoodKind::Burger,
        FoodKind::Pizza,
        FoodKind::Sushi,
        FoodKind::Hotdog,
        FoodKind::Donut,
        FoodKind::Cake,
        FoodKind::IceCream,
        FoodKind::Plate,
        FoodKind::Cup,
        FoodKind::Fork,
    ];

    pub fn category(&self) -> FoodCategory {
        match self {
            FoodKind::Apple | FoodKind::Banana | FoodKind::Orange | FoodKind::Watermelon => {
                FoodCategory::Fruit
            }
            FoodKind::Burger | FoodKind::Pizza | FoodKind::Sushi | FoodKind::Hotdog => {
                FoodCategory::MainDish
            }
            FoodKind::Donut | FoodKind::Cake | FoodKind::IceCream => FoodCategory::Dessert,
            FoodKind::Plate | FoodKind::Cup | FoodKind::Fork => FoodCategory::Tableware,
        }
    }

    /// Human-readable name for HUD text
    pub fn label(&self) -> &'static str {
        match self {
            FoodKind::Apple => "Apple",
            FoodKind::Banana => "Banana",
            FoodKind::Orange => "Orange",
            FoodKind::Watermelon => "Watermelon",
            FoodKind::Burger => "Burger",
            FoodKind::Pizza => "Pizza",
            FoodKind::Sushi => "Sushi",
            FoodKind::Hotdog => "Hotdog",
            FoodKind::Donut => "Donut",
            FoodKind::Cake => "Cake",
            FoodKind::IceCream => "Ice Cream",
            FoodKind::Plate => "Plate",
            FoodKind::Cup => "Cup",
            FoodKind::Fork => "Fork",
        }
    }

    /// Baseline half-extents (world units) used by spawners when they have
    /// no model of their own to measure
    pub fn default_half_extents(&self) -> Vec3 {
        match self {
            FoodKind::Apple => Vec3::new(0.25, 0.25, 0.25),
            FoodKind::Banana => Vec3::new(0.35, 0.15, 0.15),
            FoodKind::Orange => Vec3::new(0.22, 0.22, 0.22),
            FoodKind::Watermelon => Vec3::new(0.5, 0.4, 0.5),
            FoodKind::Burger => Vec3::new(0.35, 0.3, 0.35),
            FoodKind::Pizza => Vec3::new(0.45, 0.1, 0.45),
            FoodKind::Sushi => Vec3::new(0.18, 0.15, 0.18),
            FoodKind::Hotdog => Vec3::new(0.4, 0.15, 0.15),
            FoodKind::Donut => Vec3::new(0.22, 0.1, 0.22),
            FoodKind::Cake => Vec3::new(0.3, 0.25, 0.3),
            FoodKind::IceCream => Vec3::new(0.18, 0.35, 0.18),
            FoodKind::Plate => Vec3::new(0.45, 0.06, 0.45),
            FoodKind::Cup => Vec3::new(0.18, 0.25, 0.18),
            FoodKind::Fork => Vec3::new(0.1, 0.05, 0.35),
        }
    }
}

/// Stable identifier for a spawned target.
///
/// Ids are handed out monotonically and never reused, so a stale id from an
/// earlier frame can never accidentally address a newer target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live sliceable object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub kind: FoodKind,
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl Target {
    /// Tight bounding volume around the target, before any hit margin
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}

/// All live targets plus the id counter.
///
/// Spawning is driven from outside (the presentation layer decides what
/// falls and when); removal is driven by the slice detector.
#[derive(Debug, Default)]
pub struct TargetSet {
    targets: Vec<Target>,
    next_id: u64,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target and return its id
    pub fn spawn(&mut self, kind: FoodKind, position: Vec3, half_extents: Vec3) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.push(Target { id, kind, position, half_extents });
        id
    }

    /// Remove a target by id. Returns false when the id is already gone,
    /// which callers are free to ignore: removing twice is harmless.
    pub fn remove(&mut self, id: TargetId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.targets.len() < before
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Drop every target. The id counter keeps running so cleared ids are
    /// not handed out again.
    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_and_not_reused() {
        let mut set = TargetSet::new();
        let a = set.spawn(FoodKind::Apple, Vec3::ZERO, Vec3::new(0.2, 0.2, 0.2));
        let b = set.spawn(FoodKind::Burger, Vec3::ZERO, Vec3::new(0.3, 0.3, 0.3));
        assert!(b > a);

        set.remove(a);
        let c = set.spawn(FoodKind::Pizza, Vec3::ZERO, Vec3::new(0.4, 0.1, 0.4));
        assert!(c > b);
        assert_ne!(c, a);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut set = TargetSet::new();
        let id = set.spawn(FoodKind::Donut, Vec3::ZERO, Vec3::new(0.2, 0.1, 0.2));
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear_keeps_counter_running() {
        let mut set = TargetSet::new();
        let a = set.spawn(FoodKind::Cup, Vec3::ZERO, Vec3::new(0.2, 0.2, 0.2));
        set.clear();
        let b = set.spawn(FoodKind::Fork, Vec3::ZERO, Vec3::new(0.1, 0.05, 0.3));
        assert!(b > a);
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(FoodKind::Watermelon.category(), FoodCategory::Fruit);
        assert_eq!(FoodKind::Burger.category(), FoodCategory::MainDish);
        assert_eq!(FoodKind::IceCream.category(), FoodCategory::Dessert);
        assert_eq!(FoodKind::Plate.category(), FoodCategory::Tableware);
    }

    #[test]
    fn test_bounds_centered_on_position() {
        let mut set = TargetSet::new();
        let id = set.spawn(FoodKind::Apple, Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.25, 0.25, 0.25));
        let target = set.get(id).unwrap();
        let bounds = target.bounds();
        assert!(bounds.contains(Vec3::new(1.0, 2.0, 0.0)));
        assert!(bounds.contains(Vec3::new(1.25, 2.25, 0.25)));
        assert!(!bounds.contains(Vec3::new(1.3, 2.0, 0.0)));
    }
}
