//! Arena-backed scene tree

use crate::foundation::math::Vec3;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// Scene graph errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// Node handle is stale or from another graph
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Node that was being attached
        child: NodeId,
        /// Requested parent
        parent: NodeId,
    },
    /// The root cannot be moved or removed
    #[error("the root node cannot be detached or removed")]
    Root,
}

/// A named transform node
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Debug name
    pub name: String,
    /// Position relative to the parent
    pub position: Vec3,
    /// Whether the node (and its subtree) is drawn
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::zeros(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Tree of scene nodes owned by a single arena
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph holding only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("root"));
        Self { nodes, root }
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node
    pub fn create(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name))
    }

    /// Create a node directly under `parent`
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let child = self.create(name);
        self.link(parent, child);
        Ok(child)
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check(child)?;
        if child == self.root {
            return Err(SceneError::Root);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }

        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    /// Detach `node` from its parent, keeping its subtree intact
    pub fn detach(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.check(node)?;
        if node == self.root {
            return Err(SceneError::Root);
        }
        self.unlink(node);
        Ok(())
    }

    /// Remove `node` and its whole subtree, returns the number of nodes removed
    pub fn remove(&mut self, node: NodeId) -> Result<usize, SceneError> {
        self.check(node)?;
        if node == self.root {
            return Err(SceneError::Root);
        }
        self.unlink(node);

        let mut stack = vec![node];
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Node by handle
    pub fn get(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Mutable node by handle
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node)
    }

    /// Set a node's local position
    pub fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(node).ok_or(SceneError::UnknownNode(node))?;
        node.position = position;
        Ok(())
    }

    /// Children of a node, empty for unknown handles
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(SceneNode::children).unwrap_or_default()
    }

    /// True if `node` is reachable from the root
    pub fn is_in_scene(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor(self.root, node)
    }

    /// First direct child of `parent` with the given name
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.name == name))
    }

    /// Number of nodes in `node`'s subtree, itself included
    pub fn subtree_len(&self, node: NodeId) -> usize {
        if !self.nodes.contains_key(node) {
            return 0;
        }
        1 + self
            .children(node)
            .iter()
            .map(|child| self.subtree_len(*child))
            .sum::<usize>()
    }

    /// Every live node handle, detached ones included
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Total number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check(&self, node: NodeId) -> Result<(), SceneError> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(node))
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(SceneNode::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(SceneNode::parent);
        }
        false
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|id| *id != child);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_reparent() {
        let mut graph = SceneGraph::new();
        let floor = graph.create("floor");
        let objects = graph.create("objects");
        let bench = graph.create_child(objects, "bench").unwrap();

        assert!(!graph.is_in_scene(bench));
        graph.attach(graph.root(), objects).unwrap();
        graph.attach(graph.root(), floor).unwrap();
        assert!(graph.is_in_scene(bench));
        assert_eq!(graph.children(graph.root()), &[objects, floor]);

        graph.attach(floor, bench).unwrap();
        assert!(graph.children(objects).is_empty());
        assert_eq!(graph.get(bench).unwrap().parent(), Some(floor));
    }

    #[test]
    fn test_cycles_and_root_are_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_child(graph.root(), "a").unwrap();
        let b = graph.create_child(a, "b").unwrap();

        assert_eq!(graph.attach(b, a), Err(SceneError::Cycle { child: a, parent: b }));
        assert_eq!(graph.attach(a, a), Err(SceneError::Cycle { child: a, parent: a }));
        assert_eq!(graph.attach(a, graph.root()), Err(SceneError::Root));
        assert_eq!(graph.remove(graph.root()), Err(SceneError::Root));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut graph = SceneGraph::new();
        let section = graph.create_child(graph.root(), "section").unwrap();
        let label = graph.create_child(section, "label").unwrap();
        graph.create_child(label, "glyph").unwrap();

        assert_eq!(graph.subtree_len(graph.root()), 4);
        assert_eq!(graph.remove(section), Ok(3));
        assert_eq!(graph.len(), 1);
        assert!(graph.get(label).is_none());
        assert_eq!(graph.detach(label), Err(SceneError::UnknownNode(label)));
    }

    #[test]
    fn test_node_ids_include_detached_nodes() {
        let mut graph = SceneGraph::new();
        let loose = graph.create("loose");
        let ids: Vec<NodeId> = graph.node_ids().collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&graph.root()));
        assert!(ids.contains(&loose));

        graph.remove(loose).unwrap();
        assert_eq!(graph.node_ids().count(), 1);
    }

    #[test]
    fn test_find_child_by_name() {
        let mut graph = SceneGraph::new();
        let floor = graph.create_child(graph.root(), "floor").unwrap();
        assert_eq!(graph.find_child(graph.root(), "floor"), Some(floor));
        assert_eq!(graph.find_child(graph.root(), "walls"), None);
    }
}
