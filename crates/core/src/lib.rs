mod camera;
mod geometry;
mod input;
mod layout;
mod mesh;
mod scene;
mod settings;
mod state;

pub use camera::{
    CameraParameters, FrustumHelper, ProjectionState, DEFAULT_FAR, DEFAULT_FOV_DEG, DEFAULT_NEAR,
    FAR_RANGE, FOV_RANGE_DEG, NEAR_RANGE,
};
pub use geometry::{
    make_edge_geometry, make_node_geometry, FlatMaterial, PrimitiveKind, Renderable, Transform,
    EDGE_RADIUS, NODE_RADIUS,
};
pub use input::{
    parse_key_script, transition, Effect, InputEvent, Key, ViewState, ANGLE_STEP, FAR_STEP,
    FOV_STEP_DEG, NEAR_STEP,
};
pub use layout::{compute_child_positions, AngleParameter, BRANCH_DISTANCE};
pub use mesh::{make_cylinder, make_sphere, Aabb, Mesh};
pub use scene::{
    Edge, EdgeRole, GraphScene, Node, NodeRole, ObjectId, Scene, SceneMesh, SceneSnapshot,
};
pub use settings::{
    LayoutSettings, OrbitCamera, OverlaySettings, Palette, PanelSettings, Settings,
    DEFAULT_CAMERA_DISTANCE,
};
pub use state::{NodeReport, StateReport, Visualization};
