use std::collections::VecDeque;
use std::io::{self, Write as _};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use eframe::egui;
use forkview_core::{Effect, InputEvent, OrbitCamera, SceneSnapshot, Settings, Visualization};
use render::{CameraState, RenderMesh, RenderScene, ViewportDebug, ViewportRenderer};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::cli::DEFAULT_VIEWPORT;

mod input;
mod overlay;
mod readout;

const MAX_LOG_LINES: usize = 500;

#[derive(Clone)]
pub(crate) struct ConsoleBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl ConsoleBuffer {
    fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    fn push_line(&self, line: String) {
        let mut lines = self.lines.lock().expect("console buffer lock");
        lines.push_back(line);
        while lines.len() > MAX_LOG_LINES {
            lines.pop_front();
        }
    }

    fn snapshot(&self) -> Vec<String> {
        let lines = self.lines.lock().expect("console buffer lock");
        lines.iter().cloned().collect()
    }
}

struct ConsoleMakeWriter {
    buffer: ConsoleBuffer,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            buffer: self.buffer.clone(),
        }
    }
}

struct ConsoleWriter {
    buffer: ConsoleBuffer,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines() {
            self.buffer.push_line(line.to_string());
        }

        let _ = io::stdout().write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stdout().flush();
        Ok(())
    }
}

pub(crate) struct ForkviewApp {
    settings: Settings,
    initial_orbit: OrbitCamera,
    visualization: Visualization,
    console: ConsoleBuffer,
    log_level: LevelFilter,
    log_level_state: Arc<AtomicU8>,
    viewport_renderer: Option<ViewportRenderer>,
    uploaded_version: Option<u64>,
    last_effect: Option<Effect>,
}

impl ForkviewApp {
    pub(crate) fn new(
        settings: Settings,
        console: ConsoleBuffer,
        log_level_state: Arc<AtomicU8>,
    ) -> Self {
        let visualization = Visualization::new(&settings, DEFAULT_VIEWPORT);
        Self {
            initial_orbit: settings.orbit,
            settings,
            visualization,
            console,
            log_level: LevelFilter::INFO,
            log_level_state,
            viewport_renderer: None,
            uploaded_version: None,
            last_effect: None,
        }
    }

    fn set_log_level(&mut self, new_level: LevelFilter) {
        if new_level == self.log_level {
            return;
        }

        self.log_level_state
            .store(level_filter_to_u8(new_level), Ordering::Relaxed);
        self.log_level = new_level;
    }

    fn dispatch(&mut self, event: InputEvent) {
        let effect = self.visualization.dispatch(event);
        if matches!(event, InputEvent::KeyDown(_)) {
            self.last_effect = Some(effect);
        }
    }

    fn sync_wgpu_renderer(&mut self, frame: &eframe::Frame) {
        let Some(render_state) = frame.wgpu_render_state() else {
            return;
        };

        if self.viewport_renderer.is_none() {
            self.viewport_renderer = Some(ViewportRenderer::new(render_state.target_format));
        }
    }

    /// Hands the renderer a new scene whenever the core scene version moved.
    fn upload_scene(&mut self) {
        let Some(renderer) = &self.viewport_renderer else {
            return;
        };
        let version = self.visualization.graph().scene().version();
        if self.uploaded_version == Some(version) {
            return;
        }
        renderer.set_scene(scene_to_render(&self.visualization.graph().scene().snapshot()));
        self.uploaded_version = Some(version);
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(available, egui::Sense::click_and_drag());
        input::orbit_with_pointer(&mut self.settings.orbit, &response);

        let pixels_per_point = ui.ctx().pixels_per_point();
        let width = (rect.width() * pixels_per_point).round().max(0.0) as u32;
        let height = (rect.height() * pixels_per_point).round().max(0.0) as u32;
        self.dispatch(InputEvent::Resize { width, height });
        self.upload_scene();

        ui.painter()
            .rect_filled(rect, 0.0, egui::Color32::from_rgb(28, 28, 28));
        let Some(renderer) = &self.viewport_renderer else {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "WGPU not ready",
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
            return;
        };

        let overlays = &self.settings.overlays;
        let projection = self.visualization.projection();
        let camera = if overlays.overview {
            overlay::overview_camera(rect.aspect_ratio())
        } else {
            CameraState::from_matrices(self.settings.orbit.view_matrix(), projection.projection())
        };
        let helper_lines = if overlays.show_frustum {
            overlay::frustum_lines(
                &projection
                    .helper()
                    .to_world(self.settings.orbit.camera_to_world()),
            )
        } else {
            Vec::new()
        };
        let debug = ViewportDebug {
            show_grid: overlays.show_grid,
            show_axes: overlays.show_axes,
            grid_height: -self.settings.layout.branch_distance,
        };
        let callback = renderer.paint_callback(rect, camera, debug, helper_lines);
        ui.painter().add(egui::Shape::Callback(callback));

        if overlays.show_labels {
            overlay::draw_labels(
                ui.painter(),
                rect,
                &camera,
                self.visualization.graph().nodes(),
            );
        }
        if overlays.show_stats {
            overlay::draw_stats(ui, rect, renderer.stats_snapshot());
        }
    }
}

impl eframe::App for ForkviewApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.sync_wgpu_renderer(frame);
        for key in input::collect_keys(ctx) {
            self.dispatch(InputEvent::KeyDown(key));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.label("forkview");
                ui.separator();
                let panels = &mut self.settings.panels;
                ui.checkbox(&mut panels.show_parameters, "Parameters");
                ui.checkbox(&mut panels.show_debug, "Debug");
                ui.checkbox(&mut panels.show_console, "Console");
            });
        });

        let panels = self.settings.panels.clone();
        if panels.show_parameters || panels.show_debug || panels.show_console {
            egui::SidePanel::right("side_panels")
                .resizable(true)
                .default_width(300.0)
                .show(ctx, |ui| {
                    if panels.show_parameters {
                        egui::CollapsingHeader::new("Parameters")
                            .default_open(true)
                            .show(ui, |ui| {
                                readout::show_parameters(
                                    ui,
                                    &self.visualization.report(),
                                    self.last_effect,
                                );
                            });
                    }

                    if panels.show_debug {
                        egui::CollapsingHeader::new("Debug")
                            .default_open(true)
                            .show(ui, |ui| {
                                ui.label("Viewport overlays");
                                let overlays = &mut self.settings.overlays;
                                ui.checkbox(&mut overlays.show_grid, "Grid");
                                ui.checkbox(&mut overlays.show_axes, "Axes");
                                ui.checkbox(&mut overlays.show_frustum, "Frustum helper");
                                ui.checkbox(&mut overlays.show_labels, "Node labels");
                                ui.checkbox(&mut overlays.show_stats, "Stats overlay");
                                ui.checkbox(&mut overlays.overview, "Overview camera");
                                if ui.button("Reset orbit").clicked() {
                                    self.settings.orbit = self.initial_orbit;
                                }

                                ui.separator();
                                egui::ComboBox::from_label("Log level")
                                    .selected_text(format!("{:?}", self.log_level))
                                    .show_ui(ui, |ui| {
                                        for level in [
                                            LevelFilter::ERROR,
                                            LevelFilter::WARN,
                                            LevelFilter::INFO,
                                            LevelFilter::DEBUG,
                                            LevelFilter::TRACE,
                                        ] {
                                            if ui
                                                .selectable_label(
                                                    self.log_level == level,
                                                    format!("{:?}", level),
                                                )
                                                .clicked()
                                            {
                                                self.set_log_level(level);
                                            }
                                        }
                                    });
                            });
                    }

                    if panels.show_console {
                        egui::CollapsingHeader::new("Console")
                            .default_open(true)
                            .show(ui, |ui| {
                                egui::ScrollArea::vertical()
                                    .stick_to_bottom(true)
                                    .show(ui, |ui| {
                                        for line in self.console.snapshot() {
                                            ui.label(line);
                                        }
                                    });
                            });
                    }
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_viewport(ui));
    }
}

pub(crate) fn setup_tracing() -> (ConsoleBuffer, Arc<AtomicU8>) {
    let console = ConsoleBuffer::new();
    let log_level_state = Arc::new(AtomicU8::new(level_filter_to_u8(LevelFilter::INFO)));
    let filter_state = log_level_state.clone();
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let level = match filter_state.load(Ordering::Relaxed) {
            value if value == level_filter_to_u8(LevelFilter::ERROR) => Level::ERROR,
            value if value == level_filter_to_u8(LevelFilter::WARN) => Level::WARN,
            value if value == level_filter_to_u8(LevelFilter::INFO) => Level::INFO,
            value if value == level_filter_to_u8(LevelFilter::DEBUG) => Level::DEBUG,
            _ => Level::TRACE,
        };
        metadata.level() <= &level
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(ConsoleMakeWriter {
            buffer: console.clone(),
        });

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();

    (console, log_level_state)
}

fn level_filter_to_u8(level: LevelFilter) -> u8 {
    match level {
        LevelFilter::OFF => 0,
        LevelFilter::ERROR => 1,
        LevelFilter::WARN => 2,
        LevelFilter::INFO => 3,
        LevelFilter::DEBUG => 4,
        LevelFilter::TRACE => 5,
    }
}

fn scene_to_render(snapshot: &SceneSnapshot) -> RenderScene {
    RenderScene {
        mesh: RenderMesh {
            positions: snapshot.mesh.positions.clone(),
            colors: snapshot.mesh.colors.clone(),
            indices: snapshot.mesh.indices.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_keeps_most_recent_lines() {
        let console = ConsoleBuffer::new();
        for i in 0..(MAX_LOG_LINES + 20) {
            console.push_line(format!("line {i}"));
        }
        let lines = console.snapshot();
        assert_eq!(lines.len(), MAX_LOG_LINES);
        assert_eq!(lines[0], "line 20");
    }

    #[test]
    fn writer_splits_lines_into_console() {
        use std::io::Write as _;

        let console = ConsoleBuffer::new();
        let mut writer = ConsoleWriter {
            buffer: console.clone(),
        };
        writer.write_all(b"first\nsecond\n").expect("write");
        assert_eq!(console.snapshot(), vec!["first", "second"]);
    }

    #[test]
    fn level_filters_are_ordered() {
        let levels = [
            LevelFilter::OFF,
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ];
        let encoded: Vec<u8> = levels.iter().map(|l| level_filter_to_u8(*l)).collect();
        assert_eq!(encoded, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn render_scene_carries_snapshot_colors() {
        let visualization = Visualization::new(&Settings::default(), DEFAULT_VIEWPORT);
        let snapshot = visualization.graph().scene().snapshot();
        let scene = scene_to_render(&snapshot);
        assert_eq!(scene.mesh.positions.len(), scene.mesh.colors.len());
        assert_eq!(scene.mesh.indices, snapshot.mesh.indices);
    }
}
