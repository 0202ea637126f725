//! Document loading service
//!
//! Reads the tree and records documents and turns them into domain values.
//! Any failure here is fatal for the session.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, SessionState};
use crate::config::Settings;
use crate::domain::{DomainError, NodeData, NodeId, Record, TreeArena};
use crate::infrastructure::traits::FileSystem;

/// Tree document node: `{name, feature?, threshold?, class_name?, children?: [left, right]}`.
#[derive(Debug, Clone, Deserialize)]
struct TreeDocument {
    name: String,
    feature: Option<String>,
    threshold: Option<f64>,
    /// Typed class of a leaf; when absent it is derived from `name`
    class_name: Option<String>,
    children: Option<Vec<TreeDocument>>,
}

/// Records document entry.
#[derive(Debug, Clone, Deserialize)]
struct RecordDocument {
    player_name: String,
    actual_class_name: String,
    features: BTreeMap<String, f64>,
}

impl From<RecordDocument> for Record {
    fn from(doc: RecordDocument) -> Self {
        Record::new(doc.player_name, doc.features, doc.actual_class_name)
    }
}

/// Parse a tree document into an arena.
pub fn parse_tree(json: &str) -> Result<TreeArena, String> {
    let doc: TreeDocument = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let mut tree = TreeArena::new();
    insert_document(&mut tree, doc, None).map_err(|e| e.to_string())?;
    tree.validate().map_err(|e| e.to_string())?;
    Ok(tree)
}

/// Parse a records document, keeping document order.
pub fn parse_records(json: &str) -> Result<Vec<Record>, String> {
    let docs: Vec<RecordDocument> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(docs.into_iter().map(Record::from).collect())
}

fn insert_document(
    tree: &mut TreeArena,
    doc: TreeDocument,
    parent: Option<NodeId>,
) -> Result<NodeId, DomainError> {
    let children = doc.children.unwrap_or_default();
    if children.is_empty() {
        let data = match doc.class_name {
            Some(class) => NodeData::leaf_with_class(doc.name, class),
            None => NodeData::leaf(doc.name),
        };
        return Ok(tree.insert_node(data, parent));
    }

    if children.len() != 2 {
        return Err(DomainError::InvalidTree {
            node: doc.name,
            message: format!("expected 2 children, found {}", children.len()),
        });
    }
    let (feature, threshold) = match (doc.feature, doc.threshold) {
        (Some(feature), Some(threshold)) => (feature, threshold),
        _ => {
            return Err(DomainError::InvalidTree {
                node: doc.name,
                message: "internal node needs feature and threshold".to_string(),
            })
        }
    };

    let id = tree.insert_node(NodeData::split(doc.name, feature, threshold), parent);
    for child in children {
        insert_document(tree, child, Some(id))?;
    }
    Ok(id)
}

/// Service for reading the input documents.
pub struct DocumentLoader {
    fs: Arc<dyn FileSystem>,
}

impl DocumentLoader {
    /// Create a new loader.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path) -> ApplicationResult<TreeArena> {
        let json = self.read(path)?;
        let tree = parse_tree(&json).map_err(|message| load_err(path, message))?;
        debug!("load_tree: {} nodes, depth {}", tree.len(), tree.depth());
        Ok(tree)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_records(&self, path: &Path) -> ApplicationResult<Vec<Record>> {
        let json = self.read(path)?;
        let records = parse_records(&json).map_err(|message| load_err(path, message))?;
        debug!("load_records: {} records", records.len());
        Ok(records)
    }

    /// Load both documents and lay the tree out. Nothing is returned unless both
    /// documents are usable.
    pub fn load_session(&self, settings: &Settings) -> ApplicationResult<SessionState> {
        let tree = self.load_tree(&settings.tree_path)?;
        let records = self.load_records(&settings.records_path)?;
        SessionState::new(
            tree,
            records,
            settings.viewport_width,
            settings.layout_config(),
            settings.grid_config(),
        )
    }

    fn read(&self, path: &Path) -> ApplicationResult<String> {
        if !self.fs.exists(path) {
            return Err(load_err(path, "file not found".to_string()));
        }
        self.fs.read_to_string(path).with_load_context("read", path)
    }
}

fn load_err(path: &Path, message: String) -> ApplicationError {
    ApplicationError::Load {
        document: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeKind;

    #[test]
    fn given_nested_document_when_parsing_then_builds_left_right_children() {
        let json = r#"{
            "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
            "children": [{"name": "Leaf: Guard"}, {"name": "Leaf: Center"}]
        }"#;
        let tree = parse_tree(json).unwrap();
        let root = tree.get_node(tree.root().unwrap()).unwrap();
        let left = tree.get_node(root.left().unwrap()).unwrap();
        assert_eq!(left.data.label, "Leaf: Guard");
        assert_eq!(
            left.data.kind,
            NodeKind::Leaf {
                class: Some("guard".to_string())
            }
        );
    }

    #[test]
    fn given_explicit_class_name_when_parsing_then_label_is_display_only() {
        let json = r#"{
            "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
            "children": [{"name": "Guards", "class_name": "PG"}, {"name": "Class: C"}]
        }"#;
        let tree = parse_tree(json).unwrap();
        let left = tree.leaves()[0];
        assert_eq!(
            tree.get_node(left).unwrap().data.kind,
            NodeKind::Leaf {
                class: Some("pg".to_string())
            }
        );
    }

    #[test]
    fn given_three_children_when_parsing_then_rejects_arity() {
        let json = r#"{
            "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
            "children": [{"name": "a: x"}, {"name": "b: y"}, {"name": "c: z"}]
        }"#;
        let err = parse_tree(json).unwrap_err();
        assert!(err.contains("expected 2 children"), "got: {err}");
    }

    #[test]
    fn given_split_without_threshold_when_parsing_then_rejects() {
        let json = r#"{
            "name": "Age", "feature": "Age",
            "children": [{"name": "a: x"}, {"name": "b: y"}]
        }"#;
        assert!(parse_tree(json).is_err());
    }

    #[test]
    fn given_records_document_when_parsing_then_keeps_order() {
        let json = r#"[
            {"player_name": "A", "actual_class_name": "PG", "features": {"Age": 22}},
            {"player_name": "B", "actual_class_name": "C", "features": {"Age": 30.5}}
        ]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, "A");
        assert_eq!(records[0].feature("Age"), Some(22.0));
        assert_eq!(records[1].ground_truth, "C");
    }
}
