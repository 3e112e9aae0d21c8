//! Scene Graph
//!
//! Append-only arena of scene nodes. A node never changes once added; its
//! transform relative to the globe is resolved at insertion. Only the globe
//! root rotation moves, and it is held by the graph rather than by a node.

use glam::{DMat4, DVec3};

use crate::trips::TripId;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    GlobeRoot,
    /// Rotates a folder's anchor to its coordinates
    Pivot,
    /// Lifts the folder off the globe surface
    Anchor,
    Folder,
    /// One preview photo, `width` x `height` in globe units
    ImagePlane { index: usize, width: f64, height: f64 },
    /// Where the folder's screen-space label is anchored
    Label,
}

impl NodeKind {
    /// Half extents of the pickable rectangle, if the node has one.
    pub fn pick_extents(&self) -> Option<(f64, f64)> {
        match *self {
            NodeKind::ImagePlane { width, height, .. } => Some((width * 0.5, height * 0.5)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    /// Transform relative to the parent
    pub local: DMat4,
    /// Transform relative to the globe root
    pub globe_space: DMat4,
    /// Folder this node belongs to, tagged when the node is created
    pub folder: Option<TripId>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root_rotation: DMat4,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// A graph holding only the globe root.
    pub fn new() -> Self {
        let root = SceneNode {
            id: NodeId(0),
            parent: None,
            kind: NodeKind::GlobeRoot,
            local: DMat4::IDENTITY,
            globe_space: DMat4::IDENTITY,
            folder: None,
        };
        Self {
            nodes: vec![root],
            root_rotation: DMat4::IDENTITY,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a node under `parent`. Children inherit the parent's folder tag
    /// unless they bring their own.
    ///
    /// # Panics
    /// If `parent` was not returned by this graph.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        local: DMat4,
        folder: Option<TripId>,
    ) -> NodeId {
        let parent_node = &self.nodes[parent.0];
        let globe_space = parent_node.globe_space * local;
        let folder = folder.or(parent_node.folder);
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            parent: Some(parent),
            kind,
            local,
            globe_space,
            folder,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SceneNode> + '_ {
        self.nodes.iter().filter(move |n| n.parent == Some(id))
    }

    /// Every node with a pickable rectangle.
    pub fn pickable(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.nodes.iter().filter(|n| n.kind.pick_extents().is_some())
    }

    pub fn root_rotation(&self) -> DMat4 {
        self.root_rotation
    }

    pub fn set_root_rotation(&mut self, rotation: DMat4) {
        self.root_rotation = rotation;
    }

    /// Node transform in world space, under the current globe rotation.
    pub fn world_transform(&self, id: NodeId) -> Option<DMat4> {
        self.node(id).map(|n| self.root_rotation * n.globe_space)
    }

    pub fn world_position(&self, id: NodeId) -> Option<DVec3> {
        self.world_transform(id)
            .map(|m| m.transform_point3(DVec3::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph_has_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node(graph.root()).unwrap().kind, NodeKind::GlobeRoot);
        assert_eq!(graph.pickable().count(), 0);
    }

    #[test]
    fn test_transforms_compose_at_insert() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(
            graph.root(),
            NodeKind::Anchor,
            DMat4::from_translation(DVec3::new(0.0, 0.0, 1.0)),
            None,
        );
        let b = graph.add_node(
            a,
            NodeKind::Folder,
            DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)),
            Some(TripId(4)),
        );
        let pos = graph.world_position(b).unwrap();
        assert!((pos - DVec3::new(1.0, 0.0, 1.0)).length() < 1e-12);
        assert_eq!(graph.node(b).unwrap().folder, Some(TripId(4)));
        assert_eq!(graph.node(a).unwrap().folder, None);
    }

    #[test]
    fn test_children_inherit_folder_tag() {
        let mut graph = SceneGraph::new();
        let folder = graph.add_node(graph.root(), NodeKind::Folder, DMat4::IDENTITY, Some(TripId(9)));
        let plane = graph.add_node(
            folder,
            NodeKind::ImagePlane { index: 0, width: 0.25, height: 0.2 },
            DMat4::IDENTITY,
            None,
        );
        assert_eq!(graph.node(plane).unwrap().folder, Some(TripId(9)));
        assert_eq!(graph.children(folder).count(), 1);
    }

    #[test]
    fn test_root_rotation_moves_world_positions() {
        let mut graph = SceneGraph::new();
        let n = graph.add_node(
            graph.root(),
            NodeKind::Anchor,
            DMat4::from_translation(DVec3::Z),
            None,
        );
        graph.set_root_rotation(DMat4::from_rotation_y(std::f64::consts::FRAC_PI_2));
        let pos = graph.world_position(n).unwrap();
        assert!((pos - DVec3::X).length() < 1e-12);
    }
}
