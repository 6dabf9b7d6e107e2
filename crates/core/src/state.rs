use serde::Serialize;

use crate::camera::ProjectionState;
use crate::input::{transition, Effect, InputEvent, Key, ViewState};
use crate::layout::compute_child_positions;
use crate::scene::{GraphScene, NodeRole};
use crate::settings::Settings;

/// All mutable state of the visualization, owned in one place.
///
/// Events go through [`Visualization::dispatch`], which runs the pure
/// transition and then applies its effect before returning, so a caller that
/// renders after dispatch never sees a half-applied event.
#[derive(Debug)]
pub struct Visualization {
    view: ViewState,
    branch_distance: f32,
    graph: GraphScene,
    projection: ProjectionState,
}

impl Visualization {
    pub fn new(settings: &Settings, viewport: [u32; 2]) -> Self {
        let view = ViewState {
            angle: settings.layout.initial_angle(),
            camera: settings.camera,
            viewport,
        };
        let branch_distance = settings.layout.branch_distance;
        let (left, right) = compute_child_positions(view.angle, branch_distance);
        let graph = GraphScene::assemble(settings.palette, left, right);
        let projection = ProjectionState::new(view.camera, view.aspect());

        Self {
            view,
            branch_distance,
            graph,
            projection,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn graph(&self) -> &GraphScene {
        &self.graph
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Effect {
        let (next, effect) = transition(self.view, event);
        self.view = next;
        match effect {
            Effect::None => {}
            Effect::Relayout => {
                let (left, right) = compute_child_positions(self.view.angle, self.branch_distance);
                self.graph.apply_layout(left, right);
                tracing::debug!("angle now {:.1} deg", self.view.angle.degrees());
            }
            Effect::Reproject => {
                self.projection.apply_and_recompute(self.view.camera);
            }
            Effect::Resize => {
                let [width, height] = self.view.viewport;
                self.projection.set_viewport(width, height);
            }
        }
        effect
    }

    pub fn press(&mut self, key: Key) -> Effect {
        self.dispatch(InputEvent::KeyDown(key))
    }

    pub fn report(&self) -> StateReport {
        let params = self.projection.params();
        StateReport {
            angle_deg: self.view.angle.degrees(),
            fov_deg: params.fov_deg(),
            near: params.near(),
            far: params.far(),
            aspect: self.projection.aspect(),
            viewport: self.view.viewport,
            degenerate_projection: self.projection.is_degenerate(),
            edge_rebuilds: self.graph.rebuild_count(),
            nodes: self
                .graph
                .nodes()
                .iter()
                .map(|node| NodeReport {
                    label: node.role.label(),
                    position: node.position.to_array(),
                })
                .collect(),
        }
    }

    pub fn child_positions(&self) -> ([f32; 3], [f32; 3]) {
        (
            self.graph.node(NodeRole::ChildLeft).position.to_array(),
            self.graph.node(NodeRole::ChildRight).position.to_array(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub label: &'static str,
    pub position: [f32; 3],
}

/// Plain-data view of the current state, for readouts and headless output.
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub angle_deg: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub viewport: [u32; 2],
    pub degenerate_projection: bool,
    pub edge_rebuilds: u64,
    pub nodes: Vec<NodeReport>,
}
