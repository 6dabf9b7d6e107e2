use eframe::egui;
use forkview_core::{FrustumHelper, Node};
use glam::{Mat4, Vec3};
use render::{project_to_screen, CameraState, RenderLine, ViewportStats};

const FRUSTUM_COLOR: [f32; 3] = [1.0, 0.8, 0.25];
const APEX_RAY_COLOR: [f32; 3] = [0.55, 0.55, 0.55];
const LABEL_OFFSET: f32 = 14.0;

/// Fixed camera outside the scene, looking back at the graph and the main camera.
pub(super) fn overview_camera(aspect: f32) -> CameraState {
    let eye = Vec3::new(18.0, 10.0, 16.0);
    let target = Vec3::new(0.0, -1.5, 2.0);
    CameraState::from_matrices(
        Mat4::look_at_rh(eye, target, Vec3::Y),
        Mat4::perspective_rh(40.0_f32.to_radians(), aspect.max(0.01), 0.1, 500.0),
    )
}

pub(super) fn frustum_lines(helper: &FrustumHelper) -> Vec<RenderLine> {
    helper
        .segments()
        .into_iter()
        .map(|(start, end)| RenderLine {
            start: start.to_array(),
            end: end.to_array(),
            color: if start == helper.apex {
                APEX_RAY_COLOR
            } else {
                FRUSTUM_COLOR
            },
        })
        .collect()
}

pub(super) fn draw_labels(
    painter: &egui::Painter,
    rect: egui::Rect,
    camera: &CameraState,
    nodes: &[Node],
) {
    for node in nodes {
        let Some(pos) = project_to_screen(camera, rect, node.position) else {
            continue;
        };
        if !rect.contains(pos) {
            continue;
        }
        painter.text(
            pos - egui::vec2(0.0, LABEL_OFFSET),
            egui::Align2::CENTER_BOTTOM,
            node.role.label(),
            egui::FontId::proportional(13.0),
            egui::Color32::WHITE,
        );
    }
}

pub(super) fn draw_stats(ui: &mut egui::Ui, rect: egui::Rect, stats: ViewportStats) {
    let text = format!(
        "FPS: {:.1}\nFrame: {:.2} ms\nVerts: {}\nTris: {}\nMeshes: {}\nCache: {} hits / {} misses / {} uploads",
        stats.fps,
        stats.frame_time_ms,
        stats.vertex_count,
        stats.triangle_count,
        stats.mesh_count,
        stats.cache_hits,
        stats.cache_misses,
        stats.cache_uploads
    );
    let font_id = egui::FontId::monospace(12.0);
    let galley = ui.fonts_mut(|f| f.layout_no_wrap(text, font_id, egui::Color32::WHITE));
    let padding = egui::vec2(6.0, 4.0);
    let bg_rect = egui::Rect::from_min_size(
        rect.min + egui::vec2(8.0, 8.0),
        galley.size() + padding * 2.0,
    );
    let painter = ui.painter();
    painter.rect_filled(bg_rect, 4.0, egui::Color32::from_black_alpha(160));
    painter.galley(bg_rect.min + padding, galley, egui::Color32::WHITE);
}
