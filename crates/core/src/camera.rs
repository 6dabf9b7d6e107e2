use std::ops::RangeInclusive;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const FOV_RANGE_DEG: RangeInclusive<f32> = 10.0..=120.0;
pub const NEAR_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const FAR_RANGE: RangeInclusive<f32> = 10.0..=100.0;

pub const DEFAULT_FOV_DEG: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 50.0;

fn saturate(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParameters {
    fov_deg: f32,
    near: f32,
    far: f32,
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
            fov_deg: DEFAULT_FOV_DEG,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl CameraParameters {
    pub fn new(fov_deg: f32, near: f32, far: f32) -> Self {
        let mut params = Self::default();
        params.set_fov_deg(fov_deg);
        params.set_near(near);
        params.set_far(far);
        params
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_fov_deg(&mut self, value: f32) {
        self.fov_deg = saturate(value, &FOV_RANGE_DEG);
    }

    pub fn set_near(&mut self, value: f32) {
        self.near = saturate(value, &NEAR_RANGE);
    }

    pub fn set_far(&mut self, value: f32) {
        self.far = saturate(value, &FAR_RANGE);
    }

    /// Re-applies the clamps, for values that bypassed the setters (deserialization).
    pub fn sanitized(self) -> Self {
        Self::new(self.fov_deg, self.near, self.far)
    }

    pub fn has_valid_depth_range(&self) -> bool {
        self.near < self.far
    }
}

/// Corners of the viewing volume in camera space (camera looks down -Z).
///
/// Order: near plane then far plane, each as bottom-left, bottom-right,
/// top-right, top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumHelper {
    pub apex: Vec3,
    pub corners: [Vec3; 8],
}

impl FrustumHelper {
    pub fn from_parameters(params: &CameraParameters, aspect: f32) -> Self {
        let tan_half = (params.fov_deg().to_radians() * 0.5).tan();
        let plane = |depth: f32| {
            let half_h = depth * tan_half;
            let half_w = half_h * aspect;
            [
                Vec3::new(-half_w, -half_h, -depth),
                Vec3::new(half_w, -half_h, -depth),
                Vec3::new(half_w, half_h, -depth),
                Vec3::new(-half_w, half_h, -depth),
            ]
        };
        let near = plane(params.near());
        let far = plane(params.far());
        Self {
            apex: Vec3::ZERO,
            corners: [
                near[0], near[1], near[2], near[3], far[0], far[1], far[2], far[3],
            ],
        }
    }

    /// Outline of both planes, the four side edges, and rays from the apex to the near plane.
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        let c = &self.corners;
        let mut segments = Vec::with_capacity(16);
        for plane in [0, 4] {
            for i in 0..4 {
                segments.push((c[plane + i], c[plane + (i + 1) % 4]));
            }
        }
        for i in 0..4 {
            segments.push((c[i], c[i + 4]));
        }
        for corner in c.iter().take(4) {
            segments.push((self.apex, *corner));
        }
        segments
    }

    pub fn to_world(&self, camera_to_world: Mat4) -> Self {
        Self {
            apex: camera_to_world.transform_point3(self.apex),
            corners: self.corners.map(|c| camera_to_world.transform_point3(c)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionState {
    params: CameraParameters,
    aspect: f32,
    projection: Mat4,
    helper: FrustumHelper,
    degenerate: bool,
    recomputes: u64,
}

impl ProjectionState {
    pub fn new(params: CameraParameters, aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let mut state = Self {
            params,
            aspect,
            projection: Mat4::IDENTITY,
            helper: FrustumHelper::from_parameters(&params, aspect),
            degenerate: false,
            recomputes: 0,
        };
        state.recompute();
        state
    }

    pub fn params(&self) -> CameraParameters {
        self.params
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn helper(&self) -> &FrustumHelper {
        &self.helper
    }

    /// True while the current near/far pair cannot form a projection; the
    /// matrix then still holds the last valid one.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    pub fn apply_and_recompute(&mut self, params: CameraParameters) {
        self.params = params;
        self.recompute();
    }

    /// Returns false when either dimension is zero, leaving the aspect untouched.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!("ignoring zero-sized viewport {}x{}", width, height);
            return false;
        }
        self.aspect = width as f32 / height as f32;
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.recomputes += 1;
        self.helper = FrustumHelper::from_parameters(&self.params, self.aspect);

        if !self.params.has_valid_depth_range() {
            if !self.degenerate {
                tracing::warn!(
                    "near plane {:.2} is not in front of far plane {:.2}; keeping previous projection",
                    self.params.near(),
                    self.params.far()
                );
            }
            self.degenerate = true;
            return;
        }

        self.degenerate = false;
        self.projection = Mat4::perspective_rh(
            self.params.fov_deg().to_radians(),
            self.aspect,
            self.params.near(),
            self.params.far(),
        );
        tracing::debug!(
            "projection recomputed: fov {:.1} near {:.2} far {:.1} aspect {:.3}",
            self.params.fov_deg(),
            self.params.near(),
            self.params.far(),
            self.aspect
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_contract() {
        let params = CameraParameters::default();
        assert_eq!(params.fov_deg(), 75.0);
        assert_eq!(params.near(), 0.1);
        assert_eq!(params.far(), 50.0);
    }

    #[test]
    fn writes_saturate_to_bounds() {
        let mut params = CameraParameters::default();
        params.set_fov_deg(5.0);
        params.set_near(50.0);
        params.set_far(500.0);
        assert_eq!(params.fov_deg(), 10.0);
        assert_eq!(params.near(), 10.0);
        assert_eq!(params.far(), 100.0);

        params.set_fov_deg(f32::NAN);
        assert_eq!(params.fov_deg(), 10.0);
    }

    #[test]
    fn projection_matches_perspective() {
        let params = CameraParameters::new(60.0, 0.5, 40.0);
        let state = ProjectionState::new(params, 800.0 / 600.0);
        let expected = Mat4::perspective_rh(60.0_f32.to_radians(), 800.0 / 600.0, 0.5, 40.0);
        assert!(state.projection().abs_diff_eq(expected, 1.0e-6));
        assert!(!state.is_degenerate());
    }

    #[test]
    fn resize_updates_aspect_only() {
        let mut state = ProjectionState::new(CameraParameters::default(), 800.0 / 600.0);
        let before = state.params();
        assert!(state.set_viewport(1024, 768));
        assert!((state.aspect() - 1024.0 / 768.0).abs() < 1.0e-6);
        assert_eq!(state.params(), before);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut state = ProjectionState::new(CameraParameters::default(), 2.0);
        let count = state.recompute_count();
        assert!(!state.set_viewport(0, 600));
        assert_eq!(state.aspect(), 2.0);
        assert_eq!(state.recompute_count(), count);
    }

    #[test]
    fn equal_near_and_far_keeps_last_projection() {
        let mut state = ProjectionState::new(CameraParameters::default(), 1.0);
        let valid = state.projection();
        state.apply_and_recompute(CameraParameters::new(75.0, 10.0, 10.0));
        assert!(state.is_degenerate());
        assert_eq!(state.projection(), valid);

        state.apply_and_recompute(CameraParameters::new(75.0, 10.0, 15.0));
        assert!(!state.is_degenerate());
        assert_ne!(state.projection(), valid);
    }

    #[test]
    fn helper_corners_follow_fov_and_planes() {
        let params = CameraParameters::new(90.0, 1.0, 10.0);
        let helper = FrustumHelper::from_parameters(&params, 2.0);
        // tan(45 deg) == 1, so half height equals depth
        assert!((helper.corners[2] - Vec3::new(2.0, 1.0, -1.0)).length() < 1.0e-5);
        assert!((helper.corners[4] - Vec3::new(-20.0, -10.0, -10.0)).length() < 1.0e-4);
        assert_eq!(helper.segments().len(), 16);
    }

    #[test]
    fn helper_moves_with_camera() {
        let helper = FrustumHelper::from_parameters(&CameraParameters::default(), 1.0);
        let world = helper.to_world(Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)));
        for (local, moved) in helper.corners.iter().zip(world.corners.iter()) {
            assert!((*moved - *local - Vec3::new(0.0, 0.0, 10.0)).length() < 1.0e-5);
        }
        assert_eq!(world.apex, Vec3::new(0.0, 0.0, 10.0));
        let rays = &world.segments()[12..];
        assert!(rays.iter().all(|(start, _)| *start == world.apex));
    }
}
