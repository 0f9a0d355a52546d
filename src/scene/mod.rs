//! Retained scene graph.
//!
//! Nodes live in a flat arena and point at their parent. Every sub-scene is a
//! root [`NodeKind::Scene`] node; its lights and meshes are direct children.
//! Callers hold typed handles ([`SceneId`], [`LightId`], [`MeshId`]) that
//! resolve to `None` when used against a node of a different kind, so stale
//! or mismatched handles never panic.
//!
//! The graph is updated imperatively each tick (see
//! [`animation::animate_scene`](crate::animation::animate_scene)) and read
//! by the renderer when it encodes a pass.

mod node;
pub mod populate;
mod setup;

use glam::DVec3;

pub use node::{Light, NodeKind, SphereGeometry, SphereMesh, StandardMaterial};
pub use populate::{build_grid, build_random, SphereInstance};
pub use setup::{build_scenes, SceneSet};

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a sub-scene root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(NodeId);

/// Handle to a light node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(NodeId);

/// Handle to a sphere mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(NodeId);

/// Handle to a shared geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(u32);

impl SceneId {
    /// The underlying node.
    #[must_use]
    pub fn node(self) -> NodeId {
        self.0
    }
}

impl LightId {
    /// The underlying node.
    #[must_use]
    pub fn node(self) -> NodeId {
        self.0
    }
}

impl MeshId {
    /// The underlying node.
    #[must_use]
    pub fn node(self) -> NodeId {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Arena of scene nodes plus the geometries they share.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    geometries: Vec<SphereGeometry>,
}

impl SceneGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes (scenes, lights and meshes).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Register a geometry that meshes can reference.
    pub fn add_geometry(&mut self, geometry: SphereGeometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId((self.geometries.len() - 1) as u32)
    }

    /// Look up a geometry.
    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> Option<&SphereGeometry> {
        self.geometries.get(id.0 as usize)
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        self.nodes.push(Node { parent, kind });
        NodeId((self.nodes.len() - 1) as u32)
    }

    /// Create a new, empty sub-scene root.
    pub fn add_scene(&mut self, label: impl Into<String>) -> SceneId {
        SceneId(self.push(
            None,
            NodeKind::Scene {
                label: label.into(),
            },
        ))
    }

    /// Returns `true` if `scene` names a scene root in this graph.
    #[must_use]
    pub fn contains_scene(&self, scene: SceneId) -> bool {
        self.scene_label(scene).is_some()
    }

    /// The label a scene was created with.
    #[must_use]
    pub fn scene_label(&self, scene: SceneId) -> Option<&str> {
        match self.nodes.get(scene.0.index()).map(|n| &n.kind) {
            Some(NodeKind::Scene { label }) => Some(label),
            _ => None,
        }
    }

    /// Attach a light to `scene`. Returns `None` if `scene` is not a scene.
    pub fn add_light(&mut self, scene: SceneId, light: Light) -> Option<LightId> {
        if !self.contains_scene(scene) {
            return None;
        }
        Some(LightId(self.push(Some(scene.0), NodeKind::Light(light))))
    }

    /// Attach a mesh to `scene`. Returns `None` if `scene` is not a scene.
    pub fn add_mesh(
        &mut self,
        scene: SceneId,
        mesh: SphereMesh,
    ) -> Option<MeshId> {
        if !self.contains_scene(scene) {
            return None;
        }
        Some(MeshId(self.push(Some(scene.0), NodeKind::Mesh(mesh))))
    }

    /// Add one mesh per instance to `scene`, all sharing `geometry` and
    /// `material`.
    pub fn populate(
        &mut self,
        scene: SceneId,
        geometry: GeometryId,
        instances: &[SphereInstance],
        material: StandardMaterial,
    ) -> Vec<MeshId> {
        instances
            .iter()
            .filter_map(|&instance| {
                self.add_mesh(
                    scene,
                    SphereMesh::new(geometry, instance, material),
                )
            })
            .collect()
    }

    /// Look up a light.
    #[must_use]
    pub fn light(&self, id: LightId) -> Option<&Light> {
        match self.nodes.get(id.0.index()).map(|n| &n.kind) {
            Some(NodeKind::Light(light)) => Some(light),
            _ => None,
        }
    }

    /// Look up a mesh.
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&SphereMesh> {
        match self.nodes.get(id.0.index()).map(|n| &n.kind) {
            Some(NodeKind::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    /// Overwrite a mesh's render position. Returns `false` for unknown
    /// handles.
    pub fn set_mesh_position(&mut self, id: MeshId, position: DVec3) -> bool {
        match self.nodes.get_mut(id.0.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Mesh(mesh)) => {
                mesh.position = position;
                true
            }
            _ => false,
        }
    }

    fn children(&self, scene: SceneId) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| n.parent == Some(scene.0))
    }

    /// Lights attached to `scene`, in insertion order.
    pub fn lights(&self, scene: SceneId) -> impl Iterator<Item = &Light> {
        self.children(scene).filter_map(|n| match &n.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        })
    }

    /// Meshes attached to `scene`, in insertion order.
    pub fn meshes(&self, scene: SceneId) -> impl Iterator<Item = &SphereMesh> {
        self.children(scene).filter_map(|n| match &n.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    /// Mutable access to the meshes attached to `scene`.
    pub fn meshes_mut(
        &mut self,
        scene: SceneId,
    ) -> impl Iterator<Item = &mut SphereMesh> {
        self.nodes
            .iter_mut()
            .filter(move |n| n.parent == Some(scene.0))
            .filter_map(|n| match &mut n.kind {
                NodeKind::Mesh(mesh) => Some(mesh),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn graph_with_scene() -> (SceneGraph, SceneId, GeometryId) {
        let mut graph = SceneGraph::new();
        let geometry = graph.add_geometry(SphereGeometry::default());
        let scene = graph.add_scene("main");
        (graph, scene, geometry)
    }

    #[test]
    fn populate_adds_one_mesh_per_instance() {
        let (mut graph, scene, geometry) = graph_with_scene();
        let ids = graph.populate(
            scene,
            geometry,
            &build_grid(4, 20.0, 0.0, 10.0),
            StandardMaterial::default(),
        );
        assert_eq!(ids.len(), 16);
        assert_eq!(graph.meshes(scene).count(), 16);
        let mesh = graph.mesh(ids[11]).unwrap();
        assert_eq!(mesh.position, DVec3::new(40.0, 60.0, 0.0));
        assert_eq!(mesh.geometry, geometry);
    }

    #[test]
    fn scenes_do_not_share_children() {
        let (mut graph, main, geometry) = graph_with_scene();
        let bloom = graph.add_scene("bloom");
        let _ = graph.add_light(main, Light::point(Vec3::ZERO, 1.0));
        let _ = graph.add_light(main, Light::ambient(1.0));
        let _ = graph.add_light(bloom, Light::ambient(1.0));
        let _ = graph.populate(
            bloom,
            geometry,
            &build_grid(2, 1.0, 0.0, 1.0),
            StandardMaterial::default(),
        );

        assert_eq!(graph.lights(main).count(), 2);
        assert_eq!(graph.lights(bloom).count(), 1);
        assert_eq!(graph.meshes(main).count(), 0);
        assert_eq!(graph.meshes(bloom).count(), 4);
    }

    #[test]
    fn mismatched_handles_resolve_to_none() {
        let (mut graph, scene, _) = graph_with_scene();
        let light = graph.add_light(scene, Light::ambient(0.5)).unwrap();

        // A light's node is not a mesh, and a light is not a scene.
        let as_mesh = MeshId(light.node());
        assert!(graph.mesh(as_mesh).is_none());
        assert!(!graph.set_mesh_position(as_mesh, DVec3::ONE));
        assert!(graph.add_light(SceneId(light.node()), Light::ambient(1.0)).is_none());
        assert_eq!(graph.light(light), Some(&Light::ambient(0.5)));
    }

    #[test]
    fn set_mesh_position_only_moves_one_mesh() {
        let (mut graph, scene, geometry) = graph_with_scene();
        let ids = graph.populate(
            scene,
            geometry,
            &build_grid(2, 10.0, 0.0, 1.0),
            StandardMaterial::default(),
        );
        assert!(graph.set_mesh_position(ids[1], DVec3::splat(3.0)));
        assert_eq!(graph.mesh(ids[1]).unwrap().position, DVec3::splat(3.0));
        assert_eq!(graph.mesh(ids[0]).unwrap().position, DVec3::ZERO);
        // Base positions are untouched.
        assert_eq!(
            graph.mesh(ids[1]).unwrap().instance.base_position,
            DVec3::new(0.0, 10.0, 0.0)
        );
    }

    #[test]
    fn unknown_scene_is_empty() {
        let (graph, _, _) = graph_with_scene();
        let ghost = SceneId(NodeId(99));
        assert!(!graph.contains_scene(ghost));
        assert_eq!(graph.meshes(ghost).count(), 0);
        assert_eq!(graph.lights(ghost).count(), 0);
    }
}
