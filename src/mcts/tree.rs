//! Arena-based search tree.
//!
//! Nodes are stored in a flat `Vec` and referenced by `NodeId` indices. The
//! tree is rebuilt from a fresh root every turn and dropped once the
//! decision is extracted; nothing survives across turns.

use crate::core::Coord;

use super::node::{NodeId, SearchNode};

/// Arena holding one turn's search tree.
#[derive(Clone, Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Create a tree whose root offers the given untried coordinates.
    #[must_use]
    pub fn new(root_untried: Vec<Coord>) -> Self {
        Self {
            nodes: vec![SearchNode::root(root_untried)],
        }
    }

    /// The root node ID (always 0).
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discard everything and restart from a fresh root.
    pub fn reset(&mut self, root_untried: Vec<Coord>) {
        self.nodes.clear();
        self.nodes.push(SearchNode::root(root_untried));
    }

    /// The root node.
    #[must_use]
    pub fn root_node(&self) -> &SearchNode {
        self.get(self.root())
    }

    /// The root node, mutably.
    pub fn root_node_mut(&mut self) -> &mut SearchNode {
        self.get_mut(self.root())
    }
}
