use eframe::egui;
use forkview_core::{Key, OrbitCamera};

/// Maps an egui key press onto a router key. Letters keep their case so
/// Shift selects the increasing variant.
pub(super) fn translate_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<Key> {
    let letter = match key {
        egui::Key::ArrowLeft => return Some(Key::ArrowLeft),
        egui::Key::ArrowRight => return Some(Key::ArrowRight),
        egui::Key::F => 'f',
        egui::Key::N => 'n',
        egui::Key::R => 'r',
        _ => return None,
    };
    if modifiers.ctrl || modifiers.alt || modifiers.command {
        return None;
    }
    Some(Key::Char(if modifiers.shift {
        letter.to_ascii_uppercase()
    } else {
        letter
    }))
}

/// Key presses queued this frame, in order. Repeats are kept.
pub(super) fn collect_keys(ctx: &egui::Context) -> Vec<Key> {
    if ctx.wants_keyboard_input() {
        return Vec::new();
    }
    ctx.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => translate_key(*key, *modifiers),
                _ => None,
            })
            .collect()
    })
}

pub(super) fn orbit_with_pointer(orbit: &mut OrbitCamera, response: &egui::Response) {
    if !response.hovered() {
        return;
    }

    let orbit_speed = 0.01;
    let pan_speed = 0.0025 * orbit.distance.max(0.1);
    let zoom_speed = 0.1;

    if response.dragged_by(egui::PointerButton::Primary) {
        let delta = response.drag_motion();
        orbit.yaw -= delta.x * orbit_speed;
        orbit.pitch = (orbit.pitch + delta.y * orbit_speed).clamp(-1.54, 1.54);
    }

    if response.dragged_by(egui::PointerButton::Middle) {
        let delta = response.drag_motion();
        orbit.target[0] -= delta.x * pan_speed;
        orbit.target[1] += delta.y * pan_speed;
    }

    let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta.y);
    if scroll_delta.abs() > 0.0 {
        let zoom = 1.0 - (scroll_delta * zoom_speed / 100.0);
        orbit.distance = (orbit.distance * zoom).clamp(0.5, 200.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_regardless_of_modifiers() {
        assert_eq!(
            translate_key(egui::Key::ArrowLeft, egui::Modifiers::SHIFT),
            Some(Key::ArrowLeft)
        );
        assert_eq!(
            translate_key(egui::Key::ArrowRight, egui::Modifiers::NONE),
            Some(Key::ArrowRight)
        );
    }

    #[test]
    fn shift_selects_upper_case() {
        assert_eq!(
            translate_key(egui::Key::F, egui::Modifiers::NONE),
            Some(Key::Char('f'))
        );
        assert_eq!(
            translate_key(egui::Key::N, egui::Modifiers::SHIFT),
            Some(Key::Char('N'))
        );
        assert_eq!(
            translate_key(egui::Key::R, egui::Modifiers::SHIFT),
            Some(Key::Char('R'))
        );
    }

    #[test]
    fn shortcuts_and_other_keys_are_dropped() {
        assert_eq!(translate_key(egui::Key::R, egui::Modifiers::CTRL), None);
        assert_eq!(translate_key(egui::Key::Q, egui::Modifiers::NONE), None);
        assert_eq!(translate_key(egui::Key::Space, egui::Modifiers::NONE), None);
    }
}
