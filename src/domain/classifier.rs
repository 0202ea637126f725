//! Threshold walk from the root to a leaf.

use tracing::{instrument, trace};

use crate::domain::arena::{NodeId, NodeKind, TreeArena};
use crate::domain::entities::Record;
use crate::domain::error::DomainError;

const CLASS_DELIMITER: &str = ": ";

/// Outcome of routing one record through the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub leaf: NodeId,
    /// Root first, leaf last
    pub path: Vec<NodeId>,
    /// Lower-case class of the leaf
    pub predicted: String,
    /// Position of this record in the leaf's accumulation list
    pub arrival_index: usize,
}

/// Class encoded in a leaf label: the text after the first `": "`, lower-cased.
pub fn predicted_class_from_label(label: &str) -> Result<String, DomainError> {
    label
        .split_once(CLASS_DELIMITER)
        .map(|(_, class)| class.to_lowercase())
        .ok_or_else(|| DomainError::MalformedLabel {
            label: label.to_string(),
        })
}

/// Walk `record` from the root to a leaf without touching the tree.
///
/// `value <= threshold` descends left, anything else descends right.
pub fn route(tree: &TreeArena, record: &Record) -> Result<(NodeId, Vec<NodeId>), DomainError> {
    let mut current = tree.root().ok_or(DomainError::EmptyTree)?;
    let mut path = vec![current];

    loop {
        let node = tree.get_node(current).ok_or(DomainError::EmptyTree)?;
        let (feature, threshold) = match &node.data.kind {
            NodeKind::Leaf { .. } => break,
            NodeKind::Split { feature, threshold } => (feature, *threshold),
        };
        let value = record
            .feature(feature)
            .ok_or_else(|| DomainError::MissingFeature {
                record: record.identity.clone(),
                feature: feature.clone(),
                node: node.data.label.clone(),
            })?;

        let next = if value <= threshold {
            node.left()
        } else {
            node.right()
        };
        current = next.ok_or_else(|| DomainError::InvalidTree {
            node: node.data.label.clone(),
            message: "split node is missing a child".to_string(),
        })?;
        trace!("route: {feature}={value} vs {threshold} -> {current:?}");
        path.push(current);
    }

    Ok((current, path))
}

/// Class predicted by `leaf`: its typed class, else the label rule.
pub fn leaf_class(tree: &TreeArena, leaf: NodeId) -> Result<String, DomainError> {
    let node = tree.get_node(leaf).ok_or(DomainError::EmptyTree)?;
    match &node.data.kind {
        NodeKind::Leaf { class: Some(class) } => Ok(class.clone()),
        _ => predicted_class_from_label(&node.data.label),
    }
}

/// Route `record` and append it to the reached leaf's accumulation list.
///
/// The append is the only mutation and happens after the class has been resolved, so a
/// failed record leaves the tree untouched.
#[instrument(level = "debug", skip(tree, record), fields(record = %record.identity))]
pub fn classify(
    tree: &mut TreeArena,
    record_index: usize,
    record: &Record,
) -> Result<Classification, DomainError> {
    let (leaf, path) = route(tree, record)?;
    let predicted = leaf_class(tree, leaf)?;
    let arrival_index = tree.accumulate(leaf, record_index);

    Ok(Classification {
        leaf,
        path,
        predicted,
        arrival_index,
    })
}
