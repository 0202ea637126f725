//! Text rendering of a laid-out decision tree.

use termtree::Tree;

use crate::domain::{NodeId, NodeKind, TreeArena, TreeNode};

pub trait TreeDisplay {
    fn to_display_tree(&self) -> Tree<String>;
}

fn node_line(node: &TreeNode) -> String {
    let at = node
        .position()
        .map(|p| format!(" @ {p}"))
        .unwrap_or_default();
    match &node.data.kind {
        NodeKind::Split { .. } => format!("{}{at}", node.data.display_label()),
        NodeKind::Leaf { class } => format!(
            "{}{at} [{}: {} pts]",
            node.data.display_label(),
            class.as_deref().unwrap_or("?"),
            node.points().len()
        ),
    }
}

impl TreeDisplay for TreeArena {
    fn to_display_tree(&self) -> Tree<String> {
        fn build(arena: &TreeArena, id: NodeId) -> Option<Tree<String>> {
            let node = arena.get_node(id)?;
            let leaves: Vec<Tree<String>> = node
                .children
                .iter()
                .filter_map(|&child| build(arena, child))
                .collect();
            Some(Tree::new(node_line(node)).with_leaves(leaves))
        }

        self.root()
            .and_then(|root| build(self, root))
            .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
    }
}
