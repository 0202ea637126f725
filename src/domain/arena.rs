use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::classifier::predicted_class_from_label;
use crate::domain::entities::Position;
use crate::domain::error::DomainError;

/// Handle to a node stored in a [`TreeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Split test or terminal payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Internal node: `feature <= threshold` goes left, otherwise right
    Split { feature: String, threshold: f64 },
    /// Terminal node; `class` is `None` when the label carries no usable class
    Leaf { class: Option<String> },
}

/// Data payload for decision tree nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Human-readable description: the split test or the predicted class
    pub label: String,
    pub kind: NodeKind,
}

impl NodeData {
    pub fn split(label: impl Into<String>, feature: impl Into<String>, threshold: f64) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Split {
                feature: feature.into(),
                threshold,
            },
        }
    }

    /// Leaf whose class is derived from its label (`"Class: Guard"` -> `"guard"`).
    pub fn leaf(label: impl Into<String>) -> Self {
        let label = label.into();
        let class = predicted_class_from_label(&label).ok();
        Self {
            label,
            kind: NodeKind::Leaf { class },
        }
    }

    /// Leaf with an explicitly typed class; the label is display-only.
    pub fn leaf_with_class(label: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Leaf {
                class: Some(class.into().to_lowercase()),
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Label for display, with `<=` rendered as `≤`.
    pub fn display_label(&self) -> String {
        self.label.replace("<=", "≤")
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_label())
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Parent node, None for the root
    pub parent: Option<NodeId>,
    /// Child nodes: `[left, right]` for splits, empty for leaves
    pub children: Vec<NodeId>,
    /// Assigned by the layout engine
    pub(crate) position: Option<Position>,
    /// Record indices routed here, in arrival order
    pub(crate) points: Vec<usize>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn left(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn right(&self) -> Option<NodeId> {
        self.children.get(1).copied()
    }
}

/// Arena-based binary decision tree.
///
/// Owns node geometry and per-leaf accumulation lists. Node handles stay valid
/// for the lifetime of the arena.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<NodeId>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node below `parent`; children are appended left to right.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
            position: None,
            points: Vec::new(),
        };
        let node_id = NodeId(self.arena.insert(node));

        if let Some(parent_id) = parent {
            if let Some(parent) = self.arena.get_mut(parent_id.0) {
                parent.children.push(node_id);
            }
        } else {
            self.root = Some(node_id);
        }

        node_id
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(id.0)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal, left subtree before right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_id: NodeId) -> usize {
        if let Some(node) = self.get_node(node_id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }

    /// Position of a laid-out node.
    pub fn position(&self, id: NodeId) -> Result<Position, DomainError> {
        let node = self
            .get_node(id)
            .ok_or_else(|| DomainError::NotLaidOut(format!("{id:?}")))?;
        node.position
            .ok_or_else(|| DomainError::NotLaidOut(node.data.label.clone()))
    }

    /// Occupancy of a node's accumulation list.
    pub fn point_count(&self, id: NodeId) -> usize {
        self.get_node(id).map_or(0, |node| node.points.len())
    }

    /// Append a record to a node's accumulation list, returning its 0-based arrival index.
    pub(crate) fn accumulate(&mut self, id: NodeId, record_index: usize) -> usize {
        match self.get_node_mut(id) {
            Some(node) => {
                node.points.push(record_index);
                node.points.len() - 1
            }
            None => 0,
        }
    }

    /// Forget all geometry and accumulated points.
    #[instrument(level = "debug", skip(self))]
    pub fn clear_state(&mut self) {
        for (_, node) in self.arena.iter_mut() {
            node.position = None;
            node.points.clear();
        }
    }

    /// Check the binary-tree invariants: every node is either a leaf without
    /// children or a split with exactly two children.
    pub fn validate(&self) -> Result<(), DomainError> {
        let root = self.root.ok_or(DomainError::EmptyTree)?;
        let mut seen = 0;
        for (_, node) in self.iter() {
            seen += 1;
            match (&node.data.kind, node.children.len()) {
                (NodeKind::Split { .. }, 2) | (NodeKind::Leaf { .. }, 0) => {}
                (NodeKind::Split { .. }, n) => {
                    return Err(DomainError::InvalidTree {
                        node: node.data.label.clone(),
                        message: format!("split node must have exactly 2 children, found {n}"),
                    })
                }
                (NodeKind::Leaf { .. }, n) => {
                    return Err(DomainError::InvalidTree {
                        node: node.data.label.clone(),
                        message: format!("leaf node must have no children, found {n}"),
                    })
                }
            }
        }
        if seen != self.arena.len() {
            let label = self
                .get_node(root)
                .map(|n| n.data.label.clone())
                .unwrap_or_default();
            return Err(DomainError::InvalidTree {
                node: label,
                message: "nodes unreachable from the root".to_string(),
            });
        }
        Ok(())
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
