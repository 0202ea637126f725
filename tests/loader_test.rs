//! Tests for DocumentLoader
//!
//! Uses real files in temp directories plus an in-memory filesystem.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use dtviz::application::services::DocumentLoader;
use dtviz::application::ApplicationError;
use dtviz::config::Settings;
use dtviz::domain::{NodeKind, Position};
use dtviz::infrastructure::di::ServiceContainer;
use dtviz::infrastructure::traits::{FileSystem, RealFileSystem};
use dtviz::util::testing;

/// Filesystem backed by a map of path to contents.
#[derive(Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_string());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

const STUMP: &str = r#"{
    "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
    "children": [{"name": "Leaf: Guard"}, {"name": "Leaf: Center"}]
}"#;

const RECORDS: &str = r#"[
    {"player_name": "Young", "actual_class_name": "Guard", "features": {"Age": 22}},
    {"player_name": "Old", "actual_class_name": "Center", "features": {"Age": 30}}
]"#;

fn memory_settings() -> Settings {
    Settings {
        tree_path: PathBuf::from("/docs/tree.json"),
        records_path: PathBuf::from("/docs/records.json"),
        viewport_width: 800.0,
        ..Settings::default()
    }
}

// ============================================================
// Real files
// ============================================================

#[test]
fn given_fixture_documents_when_loading_session_then_tree_is_laid_out() {
    testing::init_test_setup();
    let settings = Settings {
        tree_path: PathBuf::from("tests/resources/nba_tree.json"),
        records_path: PathBuf::from("tests/resources/test_data.json"),
        viewport_width: 1200.0,
        ..Settings::default()
    };
    let container = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem));

    let session = container
        .document_loader()
        .load_session(&container.settings)
        .unwrap();

    assert_eq!(session.tree().len(), 7);
    assert_eq!(session.tree().leaves().len(), 4);
    assert_eq!(session.edges().len(), 6);
    assert_eq!(session.total(), 8);
    assert_eq!(session.cursor(), 0);
    let root = session.tree().root().unwrap();
    assert_eq!(session.tree().position(root).unwrap(), Position::new(600.0, 50.0));
}

#[test]
fn given_missing_file_when_loading_tree_then_returns_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let loader = DocumentLoader::new(Arc::new(RealFileSystem));

    let err = loader.load_tree(&path).unwrap_err();

    match err {
        ApplicationError::Load { document, message } => {
            assert_eq!(document, path);
            assert_eq!(message, "file not found");
        }
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn given_invalid_json_when_loading_records_then_returns_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.json");
    fs::write(&path, "[{\"player_name\": ").unwrap();
    let loader = DocumentLoader::new(Arc::new(RealFileSystem));

    let err = loader.load_records(&path).unwrap_err();

    assert!(err.is_load_error());
    assert!(err.to_string().contains("records.json"));
}

#[test]
fn given_tree_file_in_temp_dir_when_loading_then_parses_split() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stump.json");
    fs::write(&path, STUMP).unwrap();
    let loader = DocumentLoader::new(Arc::new(RealFileSystem));

    let tree = loader.load_tree(&path).unwrap();

    let root = tree.root().unwrap();
    let node = tree.get_node(root).unwrap();
    assert_eq!(
        node.data.kind,
        NodeKind::Split {
            feature: "Age".to_string(),
            threshold: 25.0
        }
    );
}

// ============================================================
// In-memory filesystem
// ============================================================

#[test]
fn given_memory_documents_when_loading_session_then_records_keep_document_order() {
    let fs = MemoryFileSystem::default()
        .with_file("/docs/tree.json", STUMP)
        .with_file("/docs/records.json", RECORDS);
    let loader = DocumentLoader::new(Arc::new(fs));

    let session = loader.load_session(&memory_settings()).unwrap();

    let names: Vec<&str> = session
        .records()
        .iter()
        .map(|r| r.identity.as_str())
        .collect();
    assert_eq!(names, vec!["Young", "Old"]);
    assert_eq!(session.records()[0].feature("Age"), Some(22.0));
    assert_eq!(session.viewport_width(), 800.0);
}

#[test]
fn given_missing_records_document_when_loading_session_then_nothing_is_returned() {
    let fs = MemoryFileSystem::default().with_file("/docs/tree.json", STUMP);
    let loader = DocumentLoader::new(Arc::new(fs));

    let err = loader.load_session(&memory_settings()).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Load { ref document, .. } if document == Path::new("/docs/records.json")
    ));
}

#[test]
fn given_split_with_one_child_when_loading_then_rejects_tree() {
    let lopsided = r#"{
        "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
        "children": [{"name": "Leaf: Guard"}]
    }"#;
    let fs = MemoryFileSystem::default().with_file("/docs/tree.json", lopsided);
    let loader = DocumentLoader::new(Arc::new(fs));

    let err = loader.load_tree(Path::new("/docs/tree.json")).unwrap_err();

    assert!(err.is_load_error());
    assert!(err.to_string().contains("expected 2 children, found 1"));
}

#[test]
fn given_empty_records_array_when_loading_session_then_session_has_no_data() {
    let fs = MemoryFileSystem::default()
        .with_file("/docs/tree.json", STUMP)
        .with_file("/docs/records.json", "[]");
    let loader = DocumentLoader::new(Arc::new(fs));

    let session = loader.load_session(&memory_settings()).unwrap();

    assert_eq!(session.total(), 0);
    assert!(session.is_complete());
}

#[test]
fn given_malformed_leaf_label_when_loading_then_load_succeeds_and_class_is_unknown() {
    let tree = r#"{
        "name": "Age <= 25.0", "feature": "Age", "threshold": 25.0,
        "children": [{"name": "Guard"}, {"name": "Leaf: Center"}]
    }"#;
    let fs = MemoryFileSystem::default().with_file("/docs/tree.json", tree);
    let loader = DocumentLoader::new(Arc::new(fs));

    let tree = loader.load_tree(Path::new("/docs/tree.json")).unwrap();

    let left = tree.get_node(tree.root().unwrap()).unwrap().left().unwrap();
    assert_eq!(
        tree.get_node(left).unwrap().data.kind,
        NodeKind::Leaf { class: None }
    );
}
