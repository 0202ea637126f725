//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree model and classification rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("record '{record}' lacks feature '{feature}' required by split node '{node}'")]
    MissingFeature {
        record: String,
        feature: String,
        node: String,
    },

    #[error("leaf label has no class delimiter ': ': {label}")]
    MalformedLabel { label: String },

    #[error("invalid tree at '{node}': {message}")]
    InvalidTree { node: String, message: String },

    #[error("tree has no root node")]
    EmptyTree,

    #[error("node has not been laid out: {0}")]
    NotLaidOut(String),
}
