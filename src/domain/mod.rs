//! Domain layer: tree model, layout, classification and packing
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod classifier;
pub mod entities;
pub mod error;
pub mod layout;
pub mod packer;

pub use arena::{NodeData, NodeId, NodeKind, TreeArena, TreeNode};
pub use classifier::{classify, leaf_class, predicted_class_from_label, route, Classification};
pub use entities::*;
pub use error::DomainError;
pub use layout::{layout, reset_layout, LayoutConfig};
pub use packer::{grid_offsets, pack_offset, GridConfig};
