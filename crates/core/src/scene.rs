use std::collections::BTreeMap;

use glam::Vec3;

use crate::geometry::{make_edge_geometry, make_node_geometry, PrimitiveKind, Renderable};
use crate::mesh::Mesh;
use crate::settings::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

/// Everything currently displayed, addressed by id.
#[derive(Debug, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, Renderable>,
    next_id: u64,
    version: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, renderable: Renderable) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(id, renderable);
        self.version = self.version.wrapping_add(1);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Renderable> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            self.version = self.version.wrapping_add(1);
        }
        removed
    }

    pub fn get(&self, id: ObjectId) -> Option<&Renderable> {
        self.objects.get(&id)
    }

    pub fn set_translation(&mut self, id: ObjectId, translation: Vec3) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        object.transform.translation = translation;
        self.version = self.version.wrapping_add(1);
        true
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn count_of(&self, kind: PrimitiveKind) -> usize {
        self.objects.values().filter(|obj| obj.kind == kind).count()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let mut meshes = Vec::with_capacity(self.objects.len());
        let mut colors = Vec::new();
        for object in self.objects.values() {
            let mesh = object.world_mesh();
            colors.extend(std::iter::repeat(object.material.color).take(mesh.positions.len()));
            meshes.push(mesh);
        }
        let merged = Mesh::merge(&meshes);

        SceneSnapshot {
            mesh: SceneMesh {
                positions: merged.positions,
                colors,
                indices: merged.indices,
            },
            object_count: self.objects.len(),
            version: self.version,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// World-space flattening of a [`Scene`] at one version.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub mesh: SceneMesh,
    pub object_count: usize,
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    ChildLeft,
    ChildRight,
}

impl NodeRole {
    pub fn label(self) -> &'static str {
        match self {
            NodeRole::Root => "root",
            NodeRole::ChildLeft => "left",
            NodeRole::ChildRight => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    RootLeft,
    RootRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub role: NodeRole,
    pub position: Vec3,
    pub handle: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub role: EdgeRole,
    pub endpoints: (Vec3, Vec3),
    pub handle: ObjectId,
}

/// The three-node graph and the scene objects that display it.
#[derive(Debug)]
pub struct GraphScene {
    scene: Scene,
    nodes: [Node; 3],
    edges: Option<[Edge; 2]>,
    palette: Palette,
    rebuilds: u64,
}

impl GraphScene {
    /// Builds the root at the origin, both children, and the first pair of edges.
    pub fn assemble(palette: Palette, child_left: Vec3, child_right: Vec3) -> Self {
        let mut scene = Scene::new();
        let mut place = |role: NodeRole, position: Vec3, color: [f32; 3]| {
            let mut sphere = make_node_geometry(color);
            sphere.transform.translation = position;
            Node {
                role,
                position,
                handle: scene.add(sphere),
            }
        };
        let nodes = [
            place(NodeRole::Root, Vec3::ZERO, palette.root),
            place(NodeRole::ChildLeft, child_left, palette.child),
            place(NodeRole::ChildRight, child_right, palette.child),
        ];

        let mut graph = Self {
            scene,
            nodes,
            edges: None,
            palette,
            rebuilds: 0,
        };
        graph.rebuild_edges(Vec3::ZERO, child_left, child_right);
        tracing::info!("scene assembled with {} objects", graph.scene.len());
        graph
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn nodes(&self) -> &[Node; 3] {
        &self.nodes
    }

    pub fn node(&self, role: NodeRole) -> &Node {
        match role {
            NodeRole::Root => &self.nodes[0],
            NodeRole::ChildLeft => &self.nodes[1],
            NodeRole::ChildRight => &self.nodes[2],
        }
    }

    pub fn edges(&self) -> Option<&[Edge; 2]> {
        self.edges.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Moves both child spheres, then rebuilds the edges to meet them.
    pub fn apply_layout(&mut self, child_left: Vec3, child_right: Vec3) {
        for (index, position) in [(1, child_left), (2, child_right)] {
            let node = &mut self.nodes[index];
            node.position = position;
            self.scene.set_translation(node.handle, position);
        }
        let root = self.nodes[0].position;
        self.rebuild_edges(root, child_left, child_right);
    }

    /// Replaces both displayed edges with fresh ones built from the given endpoints.
    ///
    /// The new geometry is built before the old is removed, and both happen
    /// within this call, so every branch always has exactly one edge.
    pub fn rebuild_edges(&mut self, root: Vec3, child_left: Vec3, child_right: Vec3) {
        let color = self.palette.edge;
        let left = make_edge_geometry(root, child_left, color);
        let right = make_edge_geometry(root, child_right, color);

        if let Some(old) = self.edges.take() {
            for edge in old {
                self.scene.remove(edge.handle);
            }
        }

        self.edges = Some([
            Edge {
                role: EdgeRole::RootLeft,
                endpoints: (root, child_left),
                handle: self.scene.add(left),
            },
            Edge {
                role: EdgeRole::RootRight,
                endpoints: (root, child_right),
                handle: self.scene.add(right),
            },
        ]);
        self.rebuilds += 1;
        tracing::debug!("edges rebuilt (#{})", self.rebuilds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_child_positions, AngleParameter, BRANCH_DISTANCE};

    fn assembled() -> GraphScene {
        let (left, right) = compute_child_positions(AngleParameter::default(), BRANCH_DISTANCE);
        GraphScene::assemble(Palette::default(), left, right)
    }

    #[test]
    fn assembly_creates_three_nodes_and_two_edges() {
        let graph = assembled();
        assert_eq!(graph.scene().count_of(PrimitiveKind::Sphere), 3);
        assert_eq!(graph.scene().count_of(PrimitiveKind::Cylinder), 2);
        assert_eq!(graph.node(NodeRole::Root).position, Vec3::ZERO);
        assert_eq!(graph.rebuild_count(), 1);
    }

    #[test]
    fn rebuilding_twice_keeps_two_edges() {
        let mut graph = assembled();
        let left = graph.node(NodeRole::ChildLeft).position;
        let right = graph.node(NodeRole::ChildRight).position;
        graph.rebuild_edges(Vec3::ZERO, left, right);
        graph.rebuild_edges(Vec3::ZERO, left, right);
        assert_eq!(graph.scene().count_of(PrimitiveKind::Cylinder), 2);
        assert_eq!(graph.scene().len(), 5);
    }

    #[test]
    fn old_edge_handles_are_removed() {
        let mut graph = assembled();
        let old = *graph.edges().expect("edges");
        let (left, right) = compute_child_positions(AngleParameter::from_degrees(90.0), 3.0);
        graph.apply_layout(left, right);

        for edge in old {
            assert!(graph.scene().get(edge.handle).is_none());
        }
        let edges = graph.edges().expect("edges");
        assert_eq!(edges[0].endpoints, (Vec3::ZERO, left));
        assert_eq!(edges[1].endpoints, (Vec3::ZERO, right));
        for edge in edges {
            assert!(graph.scene().get(edge.handle).is_some());
        }
    }

    #[test]
    fn layout_moves_child_spheres() {
        let mut graph = assembled();
        let (left, right) = compute_child_positions(AngleParameter::from_degrees(120.0), 3.0);
        graph.apply_layout(left, right);

        let node = graph.node(NodeRole::ChildLeft);
        assert_eq!(node.position, left);
        let sphere = graph.scene().get(node.handle).expect("sphere");
        assert_eq!(sphere.transform.translation, left);
        assert_eq!(
            graph
                .scene()
                .get(graph.node(NodeRole::ChildRight).handle)
                .expect("sphere")
                .transform
                .translation,
            right
        );
    }

    #[test]
    fn edge_geometry_tracks_current_endpoints() {
        let mut graph = assembled();
        let (left, _) = compute_child_positions(AngleParameter::from_degrees(160.0), 3.0);
        let (_, right) = compute_child_positions(AngleParameter::from_degrees(160.0), 3.0);
        graph.apply_layout(left, right);

        let edge = graph.edges().expect("edges")[0];
        let cylinder = graph.scene().get(edge.handle).expect("cylinder");
        assert!((cylinder.transform.translation - left * 0.5).length() < 1.0e-5);
    }

    #[test]
    fn snapshot_flattens_all_objects() {
        let graph = assembled();
        let snapshot = graph.scene().snapshot();
        assert_eq!(snapshot.object_count, 5);
        assert_eq!(snapshot.mesh.positions.len(), snapshot.mesh.colors.len());
        assert!(snapshot
            .mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < snapshot.mesh.positions.len()));
        assert!(snapshot.mesh.colors.contains(&Palette::default().root));
        assert_eq!(snapshot.version, graph.scene().version());
    }

    #[test]
    fn scene_version_advances_on_mutation() {
        let mut scene = Scene::new();
        let v0 = scene.version();
        let id = scene.add(make_node_geometry([1.0; 3]));
        assert!(scene.version() > v0);
        let v1 = scene.version();
        assert!(scene.remove(id).is_some());
        assert!(scene.version() > v1);
        let v2 = scene.version();
        assert!(scene.remove(id).is_none());
        assert_eq!(scene.version(), v2);
        assert!(scene.is_empty());
    }
}
