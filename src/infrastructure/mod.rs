//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O and frame-scheduling boundary traits and wires up services.

pub mod di;
pub mod traits;
