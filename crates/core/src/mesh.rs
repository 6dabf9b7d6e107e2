use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions_indices(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.positions.iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;

        for p in iter {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            min[2] = min[2].min(p[2]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
            max[2] = max[2].max(p[2]);
        }

        Some(Aabb { min, max })
    }

    pub fn transform(&mut self, matrix: Mat4) {
        for p in &mut self.positions {
            let v = matrix.transform_point3(Vec3::from(*p));
            *p = v.to_array();
        }
    }

    pub fn transformed(&self, matrix: Mat4) -> Mesh {
        let mut mesh = self.clone();
        mesh.transform(matrix);
        mesh
    }

    pub fn merge(meshes: &[Mesh]) -> Mesh {
        let mut merged = Mesh::default();
        let mut vertex_offset = 0u32;

        for mesh in meshes {
            merged.positions.extend_from_slice(&mesh.positions);
            merged
                .indices
                .extend(mesh.indices.iter().map(|i| i + vertex_offset));
            vertex_offset += mesh.positions.len() as u32;
        }

        merged
    }
}

/// UV sphere centered at the origin, poles on the Y axis.
pub fn make_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let radius = radius.max(0.0);
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut positions = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            positions.push([
                -radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            ]);
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;

            // The pole rows collapse to a point, so only one triangle per quad.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh::with_positions_indices(positions, indices)
}

/// Capped cylinder centered at the origin with its axis along +Y.
pub fn make_cylinder(radius: f32, height: f32, radial_segments: u32) -> Mesh {
    let radius = radius.max(0.0);
    let half = height.max(0.0) * 0.5;
    let radial_segments = radial_segments.max(3);

    let ring = |y: f32| -> Vec<[f32; 3]> {
        (0..=radial_segments)
            .map(|i| {
                let (sin, cos) = (i as f32 / radial_segments as f32 * TAU).sin_cos();
                [radius * sin, y, radius * cos]
            })
            .collect()
    };

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    // side
    positions.extend(ring(half));
    positions.extend(ring(-half));
    let stride = radial_segments + 1;
    for i in 0..radial_segments {
        let top = i;
        let bottom = i + stride;
        indices.extend_from_slice(&[top, bottom, top + 1, bottom, bottom + 1, top + 1]);
    }

    // caps
    for y in [half, -half] {
        let center = positions.len() as u32;
        positions.push([0.0, y, 0.0]);
        let first = positions.len() as u32;
        positions.extend(ring(y));
        for i in 0..radial_segments {
            if y > 0.0 {
                indices.extend_from_slice(&[center, first + i, first + i + 1]);
            } else {
                indices.extend_from_slice(&[center, first + i + 1, first + i]);
            }
        }
    }

    Mesh::with_positions_indices(positions, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_for_simple_points() {
        let mesh =
            Mesh::with_positions_indices(vec![[1.0, -2.0, 0.5], [-3.0, 4.0, 2.0]], vec![0, 1, 0]);
        let bounds = mesh.bounds().expect("bounds");
        assert_eq!(bounds.min, [-3.0, -2.0, 0.5]);
        assert_eq!(bounds.max, [1.0, 4.0, 2.0]);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn merge_offsets_indices() {
        let mesh_a = Mesh::with_positions_indices(vec![[0.0, 0.0, 0.0]], vec![0]);
        let mesh_b = Mesh::with_positions_indices(vec![[1.0, 0.0, 0.0]], vec![0]);
        let merged = Mesh::merge(&[mesh_a, mesh_b]);
        assert_eq!(merged.indices, vec![0, 1]);
    }

    #[test]
    fn transform_translates_positions() {
        let mut mesh = Mesh::with_positions_indices(vec![[1.0, 2.0, 3.0]], vec![0]);
        mesh.transform(Mat4::from_translation(Vec3::new(1.0, -2.0, 0.5)));
        assert_eq!(mesh.positions[0], [2.0, 0.0, 3.5]);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = make_sphere(0.5, 16, 8);
        assert_eq!(mesh.positions.len(), 17 * 9);
        for p in &mesh.positions {
            let len = Vec3::from(*p).length();
            assert!((len - 0.5).abs() < 1.0e-5);
        }
        // one triangle per quad on each pole row, two elsewhere
        assert_eq!(mesh.triangle_count(), 16 * 2 + 16 * 6 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn cylinder_spans_height_along_y() {
        let mesh = make_cylinder(0.05, 3.0, 12);
        let bounds = mesh.bounds().expect("bounds");
        assert!((bounds.min[1] + 1.5).abs() < 1.0e-6);
        assert!((bounds.max[1] - 1.5).abs() < 1.0e-6);
        let size = bounds.size();
        assert!((size[0] - 0.1).abs() < 1.0e-3);
        assert!((size[2] - 0.1).abs() < 1.0e-3);
        assert_eq!(mesh.triangle_count(), 12 * 2 + 12 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn zero_height_cylinder_is_flat() {
        let mesh = make_cylinder(0.05, 0.0, 8);
        let bounds = mesh.bounds().expect("bounds");
        assert_eq!(bounds.min[1], 0.0);
        assert_eq!(bounds.max[1], 0.0);
    }
}
