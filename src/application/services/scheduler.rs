//! Animation scheduler
//!
//! Moves one point at a time along its decision path. Every motion frame is an await on
//! the [`FrameClock`]; a point is fully settled and logged before the next one starts,
//! and a batch runs to completion before another can begin.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use tracing::{debug, info, instrument, trace, warn};

use crate::application::{ApplicationResult, SessionState};
use crate::domain::{classify, pack_offset, Point, PointState, Position};
use crate::infrastructure::traits::FrameClock;

pub const NO_DATA_MESSAGE: &str = "No test data available.";
pub const PROCESSING_HEADER: &str = "Processing data points:";
pub const COMPLETION_MESSAGE: &str = "All data points have been processed.";

/// Motion and batching parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Time to travel one path segment
    pub segment_duration: Duration,
    /// Edge length of a point box; intermediate targets are offset by half of it
    pub point_size: f64,
    pub batch_size: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            segment_duration: Duration::from_millis(15),
            point_size: 20.0,
            batch_size: 20,
        }
    }
}

/// Text of the run trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLabel {
    RunFirst(usize),
    RunNext(usize),
    AllDone,
}

impl fmt::Display for TriggerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerLabel::RunFirst(n) => write!(f, "Run First {n}"),
            TriggerLabel::RunNext(n) => write!(f, "Run Next {n}"),
            TriggerLabel::AllDone => write!(f, "All Done"),
        }
    }
}

/// The single externally visible control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    pub label: TriggerLabel,
    /// False while a batch animates and once everything is done
    pub enabled: bool,
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// One settled point, as reported to the progress log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// 0-based record index
    pub record_index: usize,
    pub identity: String,
    pub predicted: String,
    pub actual: String,
    pub position: Position,
}

impl LogEntry {
    /// `Point <n>: Predicted <class>, Actual <class>` with a 1-based index.
    pub fn line(&self) -> String {
        format!(
            "Point {}: Predicted {}, Actual {}",
            self.record_index + 1,
            self.predicted,
            self.actual
        )
    }

    pub fn is_correct(&self) -> bool {
        self.predicted.eq_ignore_ascii_case(&self.actual)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line())
    }
}

/// Result of a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Records in `range` were settled in order
    Completed { range: Range<usize>, complete: bool },
    /// Every record was already processed; nothing changed
    AllDone,
    /// The records document is empty
    NoData,
    /// A batch is still animating; request ignored
    Busy,
}

/// Receiver of incremental progress.
pub trait ProgressSink {
    /// A batch covering `range` is about to start; `first` for the batch at cursor 0.
    fn batch_started(&mut self, _range: &Range<usize>, _first: bool) {}

    fn point_settled(&mut self, entry: &LogEntry);

    fn batch_finished(&mut self, _trigger: &TriggerState, _complete: bool) {}
}

impl ProgressSink for Vec<LogEntry> {
    fn point_settled(&mut self, entry: &LogEntry) {
        self.push(entry.clone());
    }
}

/// Drives points of a [`SessionState`] through the tree, frame by frame.
#[derive(Debug)]
pub struct AnimationScheduler<C: FrameClock> {
    session: SessionState,
    clock: C,
    config: AnimationConfig,
}

impl<C: FrameClock> AnimationScheduler<C> {
    pub fn new(session: SessionState, clock: C, config: AnimationConfig) -> Self {
        let config = AnimationConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        Self {
            session,
            clock,
            config,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Initial prompt shown before the first batch.
    pub fn prompt(&self) -> String {
        format!(
            "Click \"Run\" to animate the first {} test data points.",
            self.config.batch_size
        )
    }

    /// Current state of the run trigger.
    pub fn trigger(&self) -> TriggerState {
        let session = &self.session;
        if session.is_complete() {
            return TriggerState {
                label: TriggerLabel::AllDone,
                enabled: false,
            };
        }
        let n = self.config.batch_size.min(session.remaining());
        let label = if session.cursor() == 0 {
            TriggerLabel::RunFirst(n)
        } else {
            TriggerLabel::RunNext(n)
        };
        TriggerState {
            label,
            enabled: !session.is_animating(),
        }
    }

    /// Full reset after a viewport change: re-layout, drop all points and rewind the cursor.
    pub fn reset(&mut self, viewport_width: f64) -> ApplicationResult<()> {
        info!("reset: viewport width {viewport_width}");
        self.session.reset(viewport_width)
    }

    /// Animate the next `batch_size` records, one after another.
    ///
    /// A classification failure halts the batch: the failing record leaves no point
    /// behind, the cursor stays on it, and the error is returned.
    #[instrument(level = "debug", skip(self, sink), fields(cursor = self.session.cursor()))]
    pub async fn run_next_batch<S: ProgressSink>(
        &mut self,
        sink: &mut S,
    ) -> ApplicationResult<BatchOutcome> {
        if self.session.is_animating() {
            warn!("run_next_batch: batch in flight, request ignored");
            return Ok(BatchOutcome::Busy);
        }
        if self.session.total() == 0 {
            info!("{NO_DATA_MESSAGE}");
            return Ok(BatchOutcome::NoData);
        }
        if self.session.is_complete() {
            debug!("run_next_batch: all records processed");
            return Ok(BatchOutcome::AllDone);
        }

        let start = self.session.cursor();
        let end = (start + self.config.batch_size).min(self.session.total());
        let range = start..end;
        sink.batch_started(&range, start == 0);

        self.session.animating = true;
        for index in range.clone() {
            let entry = match self.animate_point(index).await {
                Ok(entry) => entry,
                Err(e) => {
                    self.session.animating = false;
                    warn!("run_next_batch: record {} halted the batch: {e}", index + 1);
                    return Err(e);
                }
            };
            self.session.log.push(entry.line());
            self.session.cursor = index + 1;
            sink.point_settled(&entry);
        }
        self.session.animating = false;

        let complete = self.session.is_complete();
        if complete {
            info!("{COMPLETION_MESSAGE}");
        }
        sink.batch_finished(&self.trigger(), complete);
        Ok(BatchOutcome::Completed { range, complete })
    }

    /// Run batches until every record is settled. Returns the number of batches run.
    pub async fn run_all<S: ProgressSink>(&mut self, sink: &mut S) -> ApplicationResult<usize> {
        let mut batches = 0;
        while let BatchOutcome::Completed { complete, .. } = self.run_next_batch(sink).await? {
            batches += 1;
            if complete {
                break;
            }
        }
        Ok(batches)
    }

    /// Classify one record, then move its point along the path until it settles.
    async fn animate_point(&mut self, index: usize) -> ApplicationResult<LogEntry> {
        let record = self.session.records[index].clone();
        let classification = classify(&mut self.session.tree, index, &record)?;

        let tree = &self.session.tree;
        let half = self.config.point_size / 2.0;
        let root = tree.position(classification.path[0])?;
        let leaf_center = tree.position(classification.leaf)?;
        let occupancy = tree.point_count(classification.leaf);
        let target = pack_offset(
            leaf_center,
            classification.arrival_index,
            occupancy,
            self.session.grid_config(),
        );

        // intermediate stops: node positions offset for the point box
        let mut stops = Vec::with_capacity(classification.path.len());
        for &node in classification.path.iter().skip(1) {
            stops.push(tree.position(node)?.offset(-half, -half));
        }
        match stops.last_mut() {
            Some(last) => *last = target,
            // the root is the leaf
            None => stops.push(target),
        }

        let slot = self.session.points.len();
        self.session.points.push(Point {
            record_index: index,
            position: root.offset(-half, -half),
            state: PointState::AtRoot,
            leaf: classification.leaf,
            path: classification.path,
            predicted: classification.predicted.clone(),
            target,
        });

        for (i, stop) in stops.into_iter().enumerate() {
            self.session.points[slot].state = PointState::Traveling { path_index: i + 1 };
            self.travel(slot, stop).await;
        }

        let point = &mut self.session.points[slot];
        point.position = target;
        point.state = PointState::Settled;
        debug!(
            "settled: point {} '{}' -> {} at {}",
            index + 1,
            record.identity,
            classification.predicted,
            target
        );

        Ok(LogEntry {
            record_index: index,
            identity: record.identity,
            predicted: classification.predicted,
            actual: record.ground_truth,
            position: target,
        })
    }

    /// Interpolate one segment, sampling once per frame until progress reaches 1.
    async fn travel(&mut self, slot: usize, to: Position) {
        let from = self.session.points[slot].position;
        let duration = self.config.segment_duration.as_secs_f64();
        let started = self.clock.tick().await;
        let mut now = started;

        loop {
            let progress = if duration > 0.0 {
                ((now.saturating_sub(started)).as_secs_f64() / duration).min(1.0)
            } else {
                1.0
            };
            let position = from.lerp(to, progress);
            self.session.points[slot].position = position;
            trace!("frame: point slot {slot} at {position} ({progress:.2})");
            if progress >= 1.0 {
                break;
            }
            now = self.clock.tick().await;
        }
    }
}
