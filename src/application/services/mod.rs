//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, FrameClock)
//! but are themselves concrete structs, not traits.

mod loader;
mod scheduler;

pub use loader::{parse_records, parse_tree, DocumentLoader};
pub use scheduler::{
    AnimationConfig, AnimationScheduler, BatchOutcome, LogEntry, ProgressSink, TriggerLabel,
    TriggerState, COMPLETION_MESSAGE, NO_DATA_MESSAGE, PROCESSING_HEADER,
};
