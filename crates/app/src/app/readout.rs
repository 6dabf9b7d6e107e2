use eframe::egui::{self, Color32, RichText, Ui};
use forkview_core::{Effect, StateReport};

pub(super) fn show_parameters(ui: &mut Ui, report: &StateReport, last_effect: Option<Effect>) {
    egui::Grid::new("parameter_readout")
        .striped(true)
        .spacing([14.0, 6.0])
        .show(ui, |ui| {
            let rows = [
                ("angle", format!("{:.1} deg", report.angle_deg), "< >"),
                ("fov", format!("{:.0} deg", report.fov_deg), "f F"),
                ("near", format!("{:.2}", report.near), "n N"),
                ("far", format!("{:.0}", report.far), "r R"),
                ("aspect", format!("{:.3}", report.aspect), ""),
                (
                    "viewport",
                    format!("{} x {}", report.viewport[0], report.viewport[1]),
                    "",
                ),
                ("edge rebuilds", report.edge_rebuilds.to_string(), ""),
            ];
            for (name, value, keys) in rows {
                ui.label(name);
                ui.monospace(value);
                ui.label(RichText::new(keys).color(Color32::GRAY));
                ui.end_row();
            }
        });

    if report.degenerate_projection {
        ui.colored_label(
            Color32::from_rgb(230, 120, 80),
            "near == far: keeping the previous projection",
        );
    }
    if let Some(effect) = last_effect {
        ui.label(RichText::new(format!("last key: {}", effect_label(effect))).color(Color32::GRAY));
    }

    ui.add_space(6.0);
    egui::Grid::new("node_positions")
        .striped(true)
        .spacing([14.0, 6.0])
        .show(ui, |ui| {
            ui.label("node");
            ui.label("position");
            ui.end_row();
            for node in &report.nodes {
                let [x, y, z] = node.position;
                ui.label(node.label);
                ui.monospace(format!("{x:.3}, {y:.3}, {z:.3}"));
                ui.end_row();
            }
        });
}

fn effect_label(effect: Effect) -> &'static str {
    match effect {
        Effect::None => "no change",
        Effect::Relayout => "layout rebuilt",
        Effect::Reproject => "projection recomputed",
        Effect::Resize => "viewport resized",
    }
}
