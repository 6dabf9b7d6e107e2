use std::f32::consts::FRAC_PI_2;

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::mesh::{make_cylinder, make_sphere, Mesh};

pub const NODE_RADIUS: f32 = 0.5;
pub const EDGE_RADIUS: f32 = 0.05;

const SPHERE_WIDTH_SEGMENTS: u32 = 32;
const SPHERE_HEIGHT_SEGMENTS: u32 = 16;
const CYLINDER_RADIAL_SEGMENTS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Sphere,
    Cylinder,
}

/// Flat, unlit surface color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatMaterial {
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// A mesh in local space plus where it sits in the world and how it is shaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub kind: PrimitiveKind,
    pub mesh: Mesh,
    pub material: FlatMaterial,
    pub transform: Transform,
}

impl Renderable {
    pub fn world_mesh(&self) -> Mesh {
        self.mesh.transformed(self.transform.matrix())
    }
}

pub fn make_node_geometry(color: [f32; 3]) -> Renderable {
    Renderable {
        kind: PrimitiveKind::Sphere,
        mesh: make_sphere(NODE_RADIUS, SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS),
        material: FlatMaterial { color },
        transform: Transform::default(),
    }
}

/// Cylinder whose long axis runs from `start` to `end`.
///
/// Coincident endpoints give a zero-length cylinder at `start` with identity
/// orientation.
pub fn make_edge_geometry(start: Vec3, end: Vec3, color: [f32; 3]) -> Renderable {
    let direction = end - start;
    let length = direction.length();
    let rotation = if length > f32::EPSILON {
        look_rotation(direction / length) * Quat::from_rotation_x(FRAC_PI_2)
    } else {
        tracing::debug!("edge endpoints coincide at {:?}; using zero-length edge", start);
        Quat::IDENTITY
    };

    Renderable {
        kind: PrimitiveKind::Cylinder,
        mesh: make_cylinder(EDGE_RADIUS, length, CYLINDER_RADIAL_SEGMENTS),
        material: FlatMaterial { color },
        transform: Transform {
            translation: start + direction * 0.5,
            rotation,
        },
    }
}

/// Rotation taking local +Z onto `forward`, keeping +Y as up where possible.
fn look_rotation(forward: Vec3) -> Quat {
    let z = forward.normalize();
    let mut x = Vec3::Y.cross(z);
    if x.length_squared() < 1.0e-12 {
        // forward is vertical; any horizontal right vector works
        x = Vec3::Z.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1.0e-4, "{a:?} != {b:?}");
    }

    fn axis_ends(edge: &Renderable) -> (Vec3, Vec3) {
        let half = edge.mesh.bounds().expect("bounds").max[1];
        let matrix = edge.transform.matrix();
        (
            matrix.transform_point3(Vec3::new(0.0, -half, 0.0)),
            matrix.transform_point3(Vec3::new(0.0, half, 0.0)),
        )
    }

    #[test]
    fn node_is_sphere_of_fixed_radius() {
        let node = make_node_geometry([1.0, 0.0, 0.0]);
        assert_eq!(node.kind, PrimitiveKind::Sphere);
        assert_eq!(node.material.color, [1.0, 0.0, 0.0]);
        let bounds = node.mesh.bounds().expect("bounds");
        assert!((bounds.max[1] - NODE_RADIUS).abs() < 1.0e-5);
        assert_eq!(node.transform, Transform::default());
    }

    #[test]
    fn edge_axis_connects_endpoints() {
        let start = Vec3::ZERO;
        let end = Vec3::new(1.148, -3.0, -2.772);
        let edge = make_edge_geometry(start, end, [1.0; 3]);
        assert_eq!(edge.kind, PrimitiveKind::Cylinder);
        assert_close(edge.transform.translation, (start + end) * 0.5);

        let (bottom, top) = axis_ends(&edge);
        assert_close(bottom, start);
        assert_close(top, end);
    }

    #[test]
    fn edge_length_matches_distance() {
        let start = Vec3::new(1.0, 2.0, 3.0);
        let end = Vec3::new(-2.0, 6.0, 3.0);
        let edge = make_edge_geometry(start, end, [1.0; 3]);
        let bounds = edge.mesh.bounds().expect("bounds");
        assert!((bounds.size()[1] - 5.0).abs() < 1.0e-5);
        let world = edge.world_mesh().bounds().expect("bounds");
        assert!(world.min[0] < -1.9 && world.max[0] > 0.9);
    }

    #[test]
    fn vertical_edge_is_oriented() {
        let start = Vec3::new(0.0, 2.0, 0.0);
        let end = Vec3::new(0.0, -1.0, 0.0);
        let edge = make_edge_geometry(start, end, [1.0; 3]);
        let (bottom, top) = axis_ends(&edge);
        assert_close(bottom, start);
        assert_close(top, end);
    }

    #[test]
    fn coincident_endpoints_give_zero_length_edge() {
        let point = Vec3::new(0.0, -3.0, -3.0);
        let edge = make_edge_geometry(point, point, [1.0; 3]);
        assert_eq!(edge.transform.rotation, Quat::IDENTITY);
        assert_close(edge.transform.translation, point);
        let bounds = edge.mesh.bounds().expect("bounds");
        assert_eq!(bounds.size()[1], 0.0);
    }
}
