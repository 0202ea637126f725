//! Decision tree layout and point-routing animation.
//!
//! A pretrained binary decision tree is laid out in 2D, records are classified by
//! walking feature thresholds from the root, and each record's point is animated along
//! its path until it settles in a packed grid cell of its leaf.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
