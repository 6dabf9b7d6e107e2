use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraParameters;
use crate::layout::{AngleParameter, BRANCH_DISTANCE};

pub const DEFAULT_CAMERA_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutSettings,
    pub camera: CameraParameters,
    pub orbit: OrbitCamera,
    pub overlays: OverlaySettings,
    pub panels: PanelSettings,
    pub palette: Palette,
}

impl Settings {
    /// Clamps anything that could have arrived out of range.
    pub fn sanitized(mut self) -> Self {
        self.camera = self.camera.sanitized();
        self.layout.initial_angle_deg = AngleParameter::from_degrees(self.layout.initial_angle_deg)
            .degrees();
        if !(self.layout.branch_distance.is_finite() && self.layout.branch_distance > 0.0) {
            self.layout.branch_distance = BRANCH_DISTANCE;
        }
        if !(self.orbit.distance.is_finite() && self.orbit.distance > 0.0) {
            self.orbit.distance = DEFAULT_CAMERA_DISTANCE;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub branch_distance: f32,
    pub initial_angle_deg: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            branch_distance: BRANCH_DISTANCE,
            initial_angle_deg: 45.0,
        }
    }
}

impl LayoutSettings {
    pub fn initial_angle(&self) -> AngleParameter {
        AngleParameter::from_degrees(self.initial_angle_deg)
    }
}

/// Orbiting view around `target`; yaw 0 and pitch 0 look down -Z from +Z.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, 0.0],
            distance: DEFAULT_CAMERA_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vec3::new(
            self.distance * cos_pitch * sin_yaw,
            self.distance * sin_pitch,
            self.distance * cos_pitch * cos_yaw,
        );
        Vec3::from(self.target) + offset
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::from(self.target), Vec3::Y)
    }

    pub fn camera_to_world(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub show_grid: bool,
    pub show_axes: bool,
    pub show_frustum: bool,
    pub show_labels: bool,
    pub show_stats: bool,
    /// Render from a fixed outside camera so the frustum helper is visible.
    pub overview: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            show_frustum: true,
            show_labels: true,
            show_stats: false,
            overview: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub show_parameters: bool,
    pub show_debug: bool,
    pub show_console: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            show_parameters: true,
            show_debug: true,
            show_console: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub root: [f32; 3],
    pub child: [f32; 3],
    pub edge: [f32; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            root: [0.95, 0.55, 0.2],
            child: [0.3, 0.6, 0.95],
            edge: [0.85, 0.85, 0.88],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_scene() {
        let settings = Settings::default();
        assert_eq!(settings.layout.branch_distance, 3.0);
        assert!((settings.layout.initial_angle().radians() - std::f32::consts::FRAC_PI_4).abs() < 1.0e-6);
        assert_eq!(settings.orbit.position(), Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(settings.camera, CameraParameters::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "layout": { "initial_angle_deg": 90.0 } }"#)
                .expect("settings");
        assert_eq!(settings.layout.initial_angle_deg, 90.0);
        assert_eq!(settings.layout.branch_distance, 3.0);
        assert_eq!(settings.camera.fov_deg(), 75.0);
    }

    #[test]
    fn partial_panels_keep_other_toggles() {
        let settings: Settings =
            serde_json::from_str(r#"{ "panels": { "show_debug": false } }"#).expect("settings");
        assert!(!settings.panels.show_debug);
        assert!(settings.panels.show_parameters);
        assert!(settings.panels.show_console);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "layout": { "initial_angle_deg": 400.0, "branch_distance": -1.0 },
                "camera": { "fov_deg": 200.0, "near": 0.0, "far": 5.0 },
                "orbit": { "distance": 0.0 }
            }"#,
        )
        .expect("settings");
        let settings = settings.sanitized();
        assert!((settings.layout.initial_angle_deg - 180.0).abs() < 1.0e-3);
        assert_eq!(settings.layout.branch_distance, 3.0);
        assert_eq!(settings.camera.fov_deg(), 120.0);
        assert_eq!(settings.camera.near(), 0.1);
        assert_eq!(settings.camera.far(), 10.0);
        assert_eq!(settings.orbit.distance, 10.0);
    }

    #[test]
    fn view_matrix_maps_target_in_front_of_camera() {
        let orbit = OrbitCamera {
            yaw: 0.7,
            pitch: 0.3,
            ..OrbitCamera::default()
        };
        let in_view = orbit.view_matrix().transform_point3(Vec3::ZERO);
        assert!((in_view - Vec3::new(0.0, 0.0, -10.0)).length() < 1.0e-4);
        let eye = orbit.camera_to_world().transform_point3(Vec3::ZERO);
        assert!((eye - orbit.position()).length() < 1.0e-4);
    }
}
