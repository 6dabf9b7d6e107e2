mod camera;
mod mesh_cache;
mod scene;
mod viewport;

pub use camera::{project_to_screen, CameraState};
pub use scene::{RenderLine, RenderMesh, RenderScene};
pub use viewport::{ViewportDebug, ViewportRenderer, ViewportStats};
