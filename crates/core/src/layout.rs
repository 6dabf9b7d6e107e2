use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const BRANCH_DISTANCE: f32 = 3.0;

/// Full angle between the two child branches, always within `[0, pi]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct AngleParameter(f32);

impl AngleParameter {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = PI;

    pub fn new(radians: f32) -> Self {
        if radians.is_nan() {
            return Self(Self::MIN);
        }
        Self(radians.clamp(Self::MIN, Self::MAX))
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::new(degrees.to_radians())
    }

    pub fn radians(self) -> f32 {
        self.0
    }

    pub fn degrees(self) -> f32 {
        self.0.to_degrees()
    }

    pub fn half(self) -> f32 {
        self.0 * 0.5
    }

    pub fn stepped(self, delta: f32) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for AngleParameter {
    fn default() -> Self {
        Self(PI / 4.0)
    }
}

impl From<f32> for AngleParameter {
    fn from(radians: f32) -> Self {
        Self::new(radians)
    }
}

impl From<AngleParameter> for f32 {
    fn from(angle: AngleParameter) -> Self {
        angle.0
    }
}

/// Positions of the two children for a root at the origin.
///
/// Each child sits `distance` below and in front of the root, mirrored across
/// the vertical YZ plane by half the angle.
pub fn compute_child_positions(angle: AngleParameter, distance: f32) -> (Vec3, Vec3) {
    let (sin, cos) = angle.half().sin_cos();
    let spread = sin * distance;
    let depth = -cos * distance;
    (
        Vec3::new(spread, -distance, depth),
        Vec3::new(-spread, -distance, depth),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_layout_matches_reference_points() {
        let (left, right) = compute_child_positions(AngleParameter::default(), BRANCH_DISTANCE);
        assert!((left.x - 1.148).abs() < 1.0e-3);
        assert!((left.y + 3.0).abs() < 1.0e-6);
        assert!((left.z + 2.772).abs() < 1.0e-3);
        assert!((right.x + 1.148).abs() < 1.0e-3);
        assert_eq!(right.y, left.y);
        assert_eq!(right.z, left.z);
    }

    #[test]
    fn children_are_mirror_images_across_range() {
        for i in 0..=36 {
            let angle = AngleParameter::new(i as f32 * PI / 36.0);
            let (left, right) = compute_child_positions(angle, BRANCH_DISTANCE);
            assert_eq!(left.x, -right.x);
            assert_eq!(left.y, right.y);
            assert_eq!(left.z, right.z);
            assert!((left.length() - BRANCH_DISTANCE * 2.0_f32.sqrt()).abs() < 1.0e-4);
        }
    }

    #[test]
    fn zero_angle_collapses_children() {
        let (left, right) = compute_child_positions(AngleParameter::new(0.0), BRANCH_DISTANCE);
        assert_eq!(left, right);
        assert_eq!(left, Vec3::new(0.0, -3.0, -3.0));
    }

    #[test]
    fn straight_angle_puts_children_level_with_root_depth() {
        let (left, right) = compute_child_positions(AngleParameter::new(PI), BRANCH_DISTANCE);
        assert!((left.x - 3.0).abs() < 1.0e-5);
        assert!((right.x + 3.0).abs() < 1.0e-5);
        assert!(left.z.abs() < 1.0e-5);
    }

    #[test]
    fn angle_saturates_at_bounds() {
        assert_eq!(AngleParameter::new(-1.0).radians(), 0.0);
        assert_eq!(AngleParameter::new(10.0).radians(), PI);
        assert_eq!(AngleParameter::new(f32::NAN).radians(), 0.0);
        assert_eq!(AngleParameter::new(PI).stepped(0.1).radians(), PI);
    }

    #[test]
    fn step_and_reverse_round_trips() {
        let step = PI / 36.0;
        let start = AngleParameter::default();
        let back = start.stepped(step).stepped(-step);
        assert!((back.radians() - start.radians()).abs() < 1.0e-6);
    }
}
