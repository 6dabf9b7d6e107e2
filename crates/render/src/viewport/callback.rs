use std::sync::{Arc, Mutex};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use egui::epaint::Rect;
use egui_wgpu::wgpu;
use egui_wgpu::{CallbackResources, CallbackTrait};

use crate::camera::CameraState;
use crate::scene::RenderLine;

use super::mesh::{line_vertices, MAX_HELPER_VERTICES};
use super::pipeline::{
    apply_scene_to_pipeline, ensure_offscreen_targets, move_grid, PipelineState, Uniforms,
};
use super::{ViewportDebug, ViewportSceneState, ViewportStatsState};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 28.0 / 255.0,
    g: 28.0 / 255.0,
    b: 30.0 / 255.0,
    a: 1.0,
};

pub(super) struct ViewportCallback {
    pub(super) target_format: wgpu::TextureFormat,
    pub(super) rect: Rect,
    pub(super) camera: CameraState,
    pub(super) debug: ViewportDebug,
    pub(super) helper_lines: Vec<RenderLine>,
    pub(super) stats: Arc<Mutex<ViewportStatsState>>,
    pub(super) scene: Arc<Mutex<ViewportSceneState>>,
}

impl CallbackTrait for ViewportCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        egui_encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        if callback_resources.get::<PipelineState>().is_none() {
            callback_resources.insert(PipelineState::new(device, self.target_format));
        }
        let Some(pipeline) = callback_resources.get_mut::<PipelineState>() else {
            return Vec::new();
        };

        let width = (self.rect.width() * screen_descriptor.pixels_per_point)
            .round()
            .max(1.0) as u32;
        let height = (self.rect.height() * screen_descriptor.pixels_per_point)
            .round()
            .max(1.0) as u32;
        ensure_offscreen_targets(device, pipeline, self.target_format, width, height);

        if let Ok(scene_state) = self.scene.lock() {
            if scene_state.version != pipeline.scene_version {
                apply_scene_to_pipeline(device, pipeline, scene_state.scene.as_ref());
                pipeline.scene_version = scene_state.version;
            }
        }

        let uniforms = Uniforms {
            view_proj: self.camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&pipeline.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        move_grid(queue, pipeline, self.debug.grid_height);

        let mut helper = line_vertices(&self.helper_lines);
        helper.truncate(MAX_HELPER_VERTICES);
        if !helper.is_empty() {
            queue.write_buffer(&pipeline.helper_buffer, 0, bytemuck::cast_slice(&helper));
        }
        pipeline.helper_count = helper.len() as u32;

        if let Ok(mut stats_state) = self.stats.lock() {
            stats_state.record_frame(Instant::now());
            let cache_stats = pipeline.mesh_cache.stats_snapshot();
            stats_state.stats.mesh_count = cache_stats.mesh_count;
            stats_state.stats.cache_hits = cache_stats.hits;
            stats_state.stats.cache_misses = cache_stats.misses;
            stats_state.stats.cache_uploads = cache_stats.uploads;
            stats_state.stats.vertex_count = pipeline.vertex_count;
            stats_state.stats.triangle_count = pipeline.index_count / 3;
        }

        let mesh = if pipeline.index_count > 0 {
            pipeline.mesh_cache.get(pipeline.mesh_id)
        } else {
            None
        };
        let mut render_pass = egui_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("forkview_viewport_offscreen"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &pipeline.offscreen_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &pipeline.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        render_pass.set_bind_group(0, &pipeline.uniform_bind_group, &[]);
        if let Some(mesh) = mesh {
            render_pass.set_pipeline(&pipeline.mesh_pipeline);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        render_pass.set_pipeline(&pipeline.line_pipeline);
        let line_sets = [
            (self.debug.show_grid, &pipeline.grid_buffer, pipeline.grid_count),
            (self.debug.show_axes, &pipeline.axes_buffer, pipeline.axes_count),
            (true, &pipeline.helper_buffer, pipeline.helper_count),
        ];
        for (visible, buffer, count) in line_sets {
            if visible && count > 0 {
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..count, 0..1);
            }
        }

        Vec::new()
    }

    fn paint(
        &self,
        info: egui::epaint::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &CallbackResources,
    ) {
        let viewport = info.viewport_in_pixels();
        if viewport.width_px <= 0 || viewport.height_px <= 0 {
            return;
        }

        let clip = info.clip_rect_in_pixels();
        if clip.width_px <= 0 || clip.height_px <= 0 {
            return;
        }

        let Some(pipeline) = callback_resources.get::<PipelineState>() else {
            return;
        };

        render_pass.set_viewport(
            viewport.left_px as f32,
            viewport.top_px as f32,
            viewport.width_px as f32,
            viewport.height_px as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            clip.left_px.max(0) as u32,
            clip.top_px.max(0) as u32,
            clip.width_px.max(0) as u32,
            clip.height_px.max(0) as u32,
        );
        render_pass.set_pipeline(&pipeline.blit_pipeline);
        render_pass.set_bind_group(0, &pipeline.blit_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
