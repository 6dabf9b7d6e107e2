use std::f32::consts::PI;

use serde::Serialize;

use crate::camera::CameraParameters;
use crate::layout::AngleParameter;

pub const ANGLE_STEP: f32 = PI / 36.0;
pub const FOV_STEP_DEG: f32 = 5.0;
pub const NEAR_STEP: f32 = 0.1;
pub const FAR_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    Resize { width: u32, height: u32 },
}

/// What has to be rebuilt after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    None,
    Relayout,
    Reproject,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub angle: AngleParameter,
    pub camera: CameraParameters,
    pub viewport: [u32; 2],
}

impl ViewState {
    pub fn aspect(&self) -> f32 {
        let [width, height] = self.viewport;
        if width == 0 || height == 0 {
            return 1.0;
        }
        width as f32 / height as f32
    }
}

pub fn transition(state: ViewState, event: InputEvent) -> (ViewState, Effect) {
    match event {
        InputEvent::KeyDown(key) => route_key(state, key),
        InputEvent::Resize { width, height } => {
            if width == 0 || height == 0 || state.viewport == [width, height] {
                return (state, Effect::None);
            }
            let next = ViewState {
                viewport: [width, height],
                ..state
            };
            (next, Effect::Resize)
        }
    }
}

fn route_key(state: ViewState, key: Key) -> (ViewState, Effect) {
    let mut next = state;
    let effect = match key {
        Key::ArrowLeft => {
            next.angle = state.angle.stepped(-ANGLE_STEP);
            Effect::Relayout
        }
        Key::ArrowRight => {
            next.angle = state.angle.stepped(ANGLE_STEP);
            Effect::Relayout
        }
        Key::Char(c) => {
            let camera = &mut next.camera;
            match c {
                'f' => camera.set_fov_deg(camera.fov_deg() - FOV_STEP_DEG),
                'F' => camera.set_fov_deg(camera.fov_deg() + FOV_STEP_DEG),
                'n' => camera.set_near(camera.near() - NEAR_STEP),
                'N' => camera.set_near(camera.near() + NEAR_STEP),
                'r' => camera.set_far(camera.far() - FAR_STEP),
                'R' => camera.set_far(camera.far() + FAR_STEP),
                _ => return (state, Effect::None),
            }
            Effect::Reproject
        }
    };

    // a saturated write changes nothing, so there is nothing to rebuild
    if next == state {
        return (state, Effect::None);
    }
    (next, effect)
}

/// Parses a key script: `<` and `>` are the arrow keys, whitespace is
/// skipped, any other character is sent as itself.
pub fn parse_key_script(script: &str) -> Vec<Key> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '<' => Key::ArrowLeft,
            '>' => Key::ArrowRight,
            other => Key::Char(other),
        })
        .collect()
}
