use egui::epaint::{Pos2, Rect};
use glam::{Mat4, Vec3, Vec4Swizzles as _};

/// Matrices the viewport renders with for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraState {
    pub fn from_matrices(view: Mat4, projection: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection) * Mat4::from_cols_array_2d(&self.view)
    }
}

/// Maps a world-space point into `rect`, or `None` when it falls outside
/// the depth range or behind the camera.
pub fn project_to_screen(camera: &CameraState, rect: Rect, point: Vec3) -> Option<Pos2> {
    let clip = camera.view_proj() * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Pos2::new(
        rect.left() + (ndc.x * 0.5 + 0.5) * rect.width(),
        rect.top() + (0.5 - ndc.y * 0.5) * rect.height(),
    ))
}
