//! Retained scene registry
//!
//! Nodes are created detached and only drawn once attached. The AR viewer
//! relies on this: the loaded model is held detached until the first tap,
//! and the reticle is detached when the model is placed.

use glam::{Mat4, Vec3};

use crate::transform::Transform;

/// Handle to a mesh uploaded by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Model wrapped by a pivot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotContent {
    pub mesh: MeshId,
    /// Offset applied inside the pivot so the model's bounding-box center
    /// sits on the pivot origin
    pub offset: Vec3,
}

/// What a node draws
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Group node; empty until a model is loaded into it
    Pivot { content: Option<PivotContent> },
    /// Hit-test marker placed by a raw device pose
    Reticle { pose: Mat4 },
}

/// A node and its transform
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    attached: bool,
}

impl SceneNode {
    /// Local-to-world matrix of what this node draws
    pub fn world_matrix(&self) -> Mat4 {
        match self.kind {
            NodeKind::Reticle { pose } => pose,
            NodeKind::Pivot { content } => {
                let offset = content.map(|c| c.offset).unwrap_or(Vec3::ZERO);
                self.transform.matrix() * Mat4::from_translation(offset)
            }
        }
    }

    /// Mesh drawn by this node, if any
    pub fn mesh(&self) -> Option<MeshId> {
        match self.kind {
            NodeKind::Pivot { content } => content.map(|c| c.mesh),
            NodeKind::Reticle { .. } => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Flat scene graph
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node
    pub fn create(&mut self, kind: NodeKind, transform: Transform) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id,
            kind,
            transform,
            visible: true,
            attached: false,
        });
        id
    }

    /// Add a node to the render graph
    pub fn attach(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.attached = true;
        }
    }

    /// Remove a node from the render graph, keeping it for later reuse
    pub fn detach(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.attached = false;
        }
    }

    /// Delete a node entirely
    pub fn destroy(&mut self, id: NodeId) {
        self.nodes.retain(|n| n.id != id);
    }

    /// Whether the node is part of the render graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.attached)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Attached, visible nodes in creation order
    pub fn renderable(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|n| n.attached && n.visible)
    }
}
