use std::sync::{Arc, Mutex};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use egui::epaint::{PaintCallback, Rect};
use egui_wgpu::Callback;

use crate::camera::CameraState;
use crate::scene::{RenderLine, RenderScene};

mod callback;
mod mesh;
mod pipeline;

use callback::ViewportCallback;

pub struct ViewportRenderer {
    target_format: egui_wgpu::wgpu::TextureFormat,
    stats: Arc<Mutex<ViewportStatsState>>,
    scene: Arc<Mutex<ViewportSceneState>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewportDebug {
    pub show_grid: bool,
    pub show_axes: bool,
    pub grid_height: f32,
}

impl Default for ViewportDebug {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            grid_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub mesh_count: u32,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_uploads: u64,
}

struct ViewportStatsState {
    last_frame: Option<Instant>,
    stats: ViewportStats,
}

impl ViewportStatsState {
    /// Folds one frame into the smoothed fps and frame time.
    fn record_frame(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            let dt = (now - last).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                let frame_ms = dt * 1000.0;
                if self.stats.fps == 0.0 {
                    self.stats.fps = fps;
                    self.stats.frame_time_ms = frame_ms;
                } else {
                    let alpha = 0.1;
                    self.stats.fps += (fps - self.stats.fps) * alpha;
                    self.stats.frame_time_ms += (frame_ms - self.stats.frame_time_ms) * alpha;
                }
            }
        }
        self.last_frame = Some(now);
    }
}

struct ViewportSceneState {
    version: u64,
    scene: Option<RenderScene>,
}

impl ViewportRenderer {
    pub fn new(target_format: egui_wgpu::wgpu::TextureFormat) -> Self {
        Self {
            target_format,
            stats: Arc::new(Mutex::new(ViewportStatsState {
                last_frame: None,
                stats: ViewportStats::default(),
            })),
            scene: Arc::new(Mutex::new(ViewportSceneState {
                version: 0,
                scene: None,
            })),
        }
    }

    /// `helper_lines` are world-space segments drawn this frame only.
    pub fn paint_callback(
        &self,
        rect: Rect,
        camera: CameraState,
        debug: ViewportDebug,
        helper_lines: Vec<RenderLine>,
    ) -> PaintCallback {
        Callback::new_paint_callback(
            rect,
            ViewportCallback {
                target_format: self.target_format,
                rect,
                camera,
                debug,
                helper_lines,
                stats: self.stats.clone(),
                scene: self.scene.clone(),
            },
        )
    }

    pub fn stats_snapshot(&self) -> ViewportStats {
        self.stats
            .lock()
            .map(|state| state.stats)
            .unwrap_or_default()
    }

    pub fn set_scene(&self, scene: RenderScene) {
        if let Ok(mut state) = self.scene.lock() {
            state.version = state.version.wrapping_add(1);
            state.scene = Some(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn set_scene_replaces_pending_scene() {
        let renderer = ViewportRenderer::new(egui_wgpu::wgpu::TextureFormat::Bgra8Unorm);
        let version = |r: &ViewportRenderer| r.scene.lock().map(|s| s.version).unwrap_or(0);
        assert_eq!(version(&renderer), 0);

        let mut scene = RenderScene::default();
        scene.mesh.indices = vec![0, 1, 2];
        renderer.set_scene(scene.clone());
        renderer.set_scene(scene);
        assert_eq!(version(&renderer), 2);
        let state = renderer.scene.lock().expect("scene lock");
        assert_eq!(state.scene.as_ref().map(|s| s.mesh.indices.len()), Some(3));
    }

    #[test]
    fn first_frame_only_records_timestamp() {
        let mut state = ViewportStatsState {
            last_frame: None,
            stats: ViewportStats::default(),
        };
        state.record_frame(Instant::now());
        assert_eq!(state.stats.fps, 0.0);
        assert!(state.last_frame.is_some());
    }

    #[test]
    fn frame_rate_is_smoothed() {
        let start = Instant::now();
        let mut state = ViewportStatsState {
            last_frame: Some(start),
            stats: ViewportStats::default(),
        };
        state.record_frame(start + Duration::from_millis(10));
        assert!((state.stats.fps - 100.0).abs() < 0.5);

        state.record_frame(start + Duration::from_millis(30));
        assert!(state.stats.fps < 100.0 && state.stats.fps > 90.0);
        assert!(state.stats.frame_time_ms > 10.0);
    }
}
