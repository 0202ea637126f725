//! I/O and scheduling boundary traits for testability
//!
//! These traits abstract file access and frame pacing, allowing services
//! to be tested with deterministic implementations.

use std::future::Future;
use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Source of animation frames.
///
/// Each call suspends until the next frame is due and returns the frame timestamp,
/// measured from an arbitrary but fixed origin.
pub trait FrameClock {
    fn tick(&mut self) -> impl Future<Output = Duration>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Wall-clock frames paced by a tokio interval.
///
/// The interval is created on the first tick so the clock can be built outside a runtime.
#[derive(Debug)]
pub struct TokioFrameClock {
    period: Duration,
    interval: Option<(Interval, Instant)>,
}

impl TokioFrameClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }
}

impl FrameClock for TokioFrameClock {
    async fn tick(&mut self) -> Duration {
        let period = self.period;
        let (interval, origin) = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            (interval, Instant::now())
        });
        let at = interval.tick().await;
        at.saturating_duration_since(*origin)
    }
}

/// Frames that advance by a fixed step without waiting on wall time.
///
/// Still yields to the runtime on every tick, so suspension points are preserved.
#[derive(Debug, Clone)]
pub struct SteppedFrameClock {
    step: Duration,
    now: Duration,
    ticks: u64,
}

impl SteppedFrameClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            now: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Number of frames handed out so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl FrameClock for SteppedFrameClock {
    async fn tick(&mut self) -> Duration {
        tokio::task::yield_now().await;
        self.ticks += 1;
        self.now += self.step;
        self.now
    }
}
