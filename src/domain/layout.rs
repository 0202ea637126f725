//! Recursive placement of tree nodes and edges.
//!
//! Vertical spacing grows with depth (`base_vertical + level * level_growth`), horizontal
//! spacing halves per level but never drops below `min_spacing`.

use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::entities::{Edge, Position};
use crate::domain::error::DomainError;

/// Spacing policy for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub base_vertical: f64,
    pub level_growth: f64,
    pub min_spacing: f64,
    /// Y coordinate of the root
    pub top_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_vertical: 80.0,
            level_growth: 60.0,
            min_spacing: 140.0,
            top_y: 50.0,
        }
    }
}

impl LayoutConfig {
    /// Distance between a node at `level` and its children.
    pub fn y_spacing(&self, level: u32) -> f64 {
        self.base_vertical + f64::from(level) * self.level_growth
    }

    /// Horizontal offset of the children of a node at `level`.
    pub fn x_spacing(&self, level: u32, viewport_width: f64) -> f64 {
        let halved = viewport_width / 2f64.powf(f64::from(level) + 1.5);
        self.min_spacing.max(halved)
    }
}

/// Lay the whole tree out from `(viewport_width / 2, top_y)` at level 1.
pub fn reset_layout(
    tree: &mut TreeArena,
    viewport_width: f64,
    config: &LayoutConfig,
) -> Result<Vec<Edge>, DomainError> {
    layout(tree, viewport_width / 2.0, config.top_y, 1, viewport_width, config)
}

/// Place the root at `(center_x, top_y)` and every descendant below it.
///
/// Prior positions and accumulated points are discarded first, so repeated calls with
/// the same inputs produce the same geometry. Returns one edge per parent/child pair,
/// in pre-order.
#[instrument(level = "debug", skip(tree, config))]
pub fn layout(
    tree: &mut TreeArena,
    center_x: f64,
    top_y: f64,
    level: u32,
    viewport_width: f64,
    config: &LayoutConfig,
) -> Result<Vec<Edge>, DomainError> {
    let root = tree.root().ok_or(DomainError::EmptyTree)?;
    tree.clear_state();

    let mut edges = Vec::with_capacity(tree.len().saturating_sub(1));
    place(
        tree,
        root,
        Position::new(center_x, top_y),
        level,
        viewport_width,
        config,
        &mut edges,
    );
    debug!("layout: placed {} nodes, {} edges", tree.len(), edges.len());
    Ok(edges)
}

fn place(
    tree: &mut TreeArena,
    node_id: NodeId,
    at: Position,
    level: u32,
    viewport_width: f64,
    config: &LayoutConfig,
    edges: &mut Vec<Edge>,
) {
    let children = match tree.get_node_mut(node_id) {
        Some(node) => {
            node.position = Some(at);
            trace!("place: '{}' at {}", node.data.label, at);
            node.children.clone()
        }
        None => return,
    };
    if children.is_empty() {
        return;
    }

    let y_spacing = config.y_spacing(level);
    let x_spacing = config.x_spacing(level, viewport_width);

    if let Some(&left) = children.first() {
        let left_at = at.offset(-x_spacing, y_spacing);
        edges.push(Edge::new(node_id, left, at, left_at));
        place(tree, left, left_at, level + 1, viewport_width, config, edges);
    }
    if let Some(&right) = children.get(1) {
        let right_at = at.offset(x_spacing, y_spacing);
        edges.push(Edge::new(node_id, right, at, right_at));
        place(tree, right, right_at, level + 1, viewport_width, config, edges);
    }
}
