use serde::{Deserialize, Serialize};

/// A point in pitch space.
///
/// `y` is height above the ground; `z` runs from the bowler's crease (0)
/// towards the batter's crease (negative).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Distance on the ground plane, ignoring height.
    pub fn horizontal_distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Linear interpolation between `a` and `b` at parameter `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Euler rotation in radians, accumulated per axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(&mut self, delta: Rotation) {
        self.x += delta.x;
        self.y += delta.y;
        self.z += delta.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, 0.0, -4.0);
        assert!((a.horizontal_distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.5, 0.1, 0.0), 2.5);
        assert!((lerp(2.5, 0.1, 1.0) - 0.1).abs() < 1e-6);
        assert!((lerp(0.0, -12.0, 0.5) + 6.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Vec3::new(0.0, 1.0, 2.0).is_finite());
        assert!(!Vec3::new(f32::NAN, 1.0, 2.0).is_finite());
        assert!(!Vec3::new(0.0, f32::INFINITY, 2.0).is_finite());
    }
}
