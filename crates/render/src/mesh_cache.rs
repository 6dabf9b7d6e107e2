use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use egui_wgpu::wgpu;
use egui_wgpu::wgpu::util::DeviceExt as _;

pub(crate) struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeshCacheStats {
    pub(crate) mesh_count: u32,
    pub(crate) hits: u64,
    pub(crate) misses: u64,
    pub(crate) uploads: u64,
}

/// GPU buffers keyed by mesh id. Lookups count hits and misses so the
/// viewport stats can show how often a frame found its geometry resident.
#[derive(Default)]
pub(crate) struct GpuMeshCache {
    meshes: HashMap<u64, GpuMesh>,
    hits: AtomicU64,
    misses: AtomicU64,
    uploads: u64,
}

impl GpuMeshCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn upload_or_update(
        &mut self,
        device: &wgpu::Device,
        id: u64,
        vertex_bytes: &[u8],
        indices: &[u32],
    ) {
        if vertex_bytes.is_empty() || indices.is_empty() {
            self.meshes.remove(&id);
            return;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("forkview_mesh_vertices"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("forkview_mesh_indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            },
        );
        self.uploads += 1;
    }

    pub(crate) fn get(&self, id: u64) -> Option<&GpuMesh> {
        let mesh = self.meshes.get(&id);
        let counter = if mesh.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        mesh
    }

    pub(crate) fn stats_snapshot(&self) -> MeshCacheStats {
        MeshCacheStats {
            mesh_count: self.meshes.len() as u32,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            uploads: self.uploads,
        }
    }
}
