use crate::scene::{RenderLine, RenderMesh};
use egui_wgpu::wgpu;

/// Shared by triangle meshes and line lists; everything is flat colored.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) color: [f32; 3],
}

pub(crate) const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

const FALLBACK_COLOR: [f32; 3] = [0.7, 0.72, 0.75];

/// Helper line vertices per frame; one frustum uses 32 (16 segments).
pub(crate) const MAX_HELPER_VERTICES: usize = 64;

pub(crate) fn build_vertices(mesh: &RenderMesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(index, position)| Vertex {
            position: *position,
            color: mesh.colors.get(index).copied().unwrap_or(FALLBACK_COLOR),
        })
        .collect()
}

pub(crate) fn line_vertices(lines: &[RenderLine]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(lines.len() * 2);
    for line in lines {
        vertices.push(Vertex {
            position: line.start,
            color: line.color,
        });
        vertices.push(Vertex {
            position: line.end,
            color: line.color,
        });
    }
    vertices
}

pub(crate) fn grid_and_axes(height: f32) -> (Vec<Vertex>, Vec<Vertex>) {
    let grid_size = 12.0;
    let divisions = 24;
    let step = grid_size / divisions as f32;
    let half = grid_size * 0.5;

    let color = [0.25, 0.25, 0.25];
    let mut grid = Vec::with_capacity((divisions + 1) * 4);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        grid.extend_from_slice(&[
            Vertex {
                position: [offset, height, -half],
                color,
            },
            Vertex {
                position: [offset, height, half],
                color,
            },
            Vertex {
                position: [-half, height, offset],
                color,
            },
            Vertex {
                position: [half, height, offset],
                color,
            },
        ]);
    }

    let axis_len = 2.0;
    let axes = [
        ([axis_len, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, axis_len, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, axis_len], [0.1, 0.3, 1.0]),
    ]
    .into_iter()
    .flat_map(|(end, color)| {
        [
            Vertex {
                position: [0.0; 3],
                color,
            },
            Vertex {
                position: end,
                color,
            },
        ]
    })
    .collect();

    (grid, axes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_colors_fall_back() {
        let mesh = RenderMesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0]],
            colors: vec![[1.0, 0.0, 0.0]],
            indices: vec![],
        };
        let vertices = build_vertices(&mesh);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].color, FALLBACK_COLOR);
    }

    #[test]
    fn lines_expand_to_vertex_pairs() {
        let line = RenderLine {
            start: [0.0; 3],
            end: [1.0, 2.0, 3.0],
            color: [0.5; 3],
        };
        let vertices = line_vertices(&[line, line]);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[1].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn grid_sits_at_requested_height() {
        let (grid, axes) = grid_and_axes(-3.0);
        assert_eq!(grid.len() % 2, 0);
        assert!(grid.iter().all(|v| v.position[1] == -3.0));
        assert_eq!(axes.len(), 6);
    }
}
